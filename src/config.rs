/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::enemy::EnemyKind;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub physics: PhysicsConfig,
    pub scoring: ScoringConfig,
    pub random: RandomConfig,
    /// Per-level overrides of the enemy weight table.
    pub enemy_table: BTreeMap<u32, Vec<(EnemyKind, f32)>>,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub stats_file: PathBuf,
    pub player_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub hint_interval_ticks: u32,
}

/// Player kinematics and energy constants.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub speed: i32,
    pub dash_speed: i32,
    pub dash_duration: u32,
    pub dash_cooldown: u64,   // ticks between dash triggers
    pub dash_cost: f32,
    pub jump_power: i32,      // negative = up
    pub jump_cost: f32,
    pub max_jumps: u8,
    pub gravity: i32,
    pub max_energy: f32,
    pub energy_regen: f32,    // per tick
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub start_health: u32,
    pub start_score: u32,
    pub damage_penalty: u32,
    pub jump_limit: u32,
    pub time_limit_secs: u32,
}

/// Seed policy for the session random source.
/// `seed = None` reseeds from entropy on every attempt.
#[derive(Clone, Debug, Default)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    random: TomlRandom,
    #[serde(default)]
    enemies: TomlEnemies,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hint_interval")]
    hint_interval_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_speed")]
    speed: i32,
    #[serde(default = "default_dash_speed")]
    dash_speed: i32,
    #[serde(default = "default_dash_duration")]
    dash_duration: u32,
    #[serde(default = "default_dash_cooldown")]
    dash_cooldown: u64,
    #[serde(default = "default_dash_cost")]
    dash_cost: f32,
    #[serde(default = "default_jump_power")]
    jump_power: i32,
    #[serde(default = "default_jump_cost")]
    jump_cost: f32,
    #[serde(default = "default_max_jumps")]
    max_jumps: u8,
    #[serde(default = "default_gravity")]
    gravity: i32,
    #[serde(default = "default_max_energy")]
    max_energy: f32,
    #[serde(default = "default_energy_regen")]
    energy_regen: f32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_start_health")]
    start_health: u32,
    #[serde(default = "default_start_score")]
    start_score: u32,
    #[serde(default = "default_damage_penalty")]
    damage_penalty: u32,
    #[serde(default = "default_jump_limit")]
    jump_limit: u32,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlRandom {
    #[serde(default)]
    seed: Option<u64>,
}

/// `[enemies.table]` rows: `"4" = [["chase", 0.5], ["shooter", 0.5]]`
#[derive(Deserialize, Debug, Default)]
struct TomlEnemies {
    #[serde(default)]
    table: BTreeMap<String, Vec<(String, f32)>>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_dash")]
    dash: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_stats_file")]
    stats_file: String,
    #[serde(default)]
    player_name: Option<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }          // ~60 ticks per second
fn default_hint_interval() -> u32 { 180 }     // 3s at 60 ticks/s

fn default_speed() -> i32 { 5 }
fn default_dash_speed() -> i32 { 10 }
fn default_dash_duration() -> u32 { 10 }
fn default_dash_cooldown() -> u64 { 60 }
fn default_dash_cost() -> f32 { 20.0 }
fn default_jump_power() -> i32 { -15 }
fn default_jump_cost() -> f32 { 15.0 }
fn default_max_jumps() -> u8 { 2 }
fn default_gravity() -> i32 { 1 }
fn default_max_energy() -> f32 { 40.0 }
fn default_energy_regen() -> f32 { 0.3 }

fn default_start_health() -> u32 { 3 }
fn default_start_score() -> u32 { 10 }
fn default_damage_penalty() -> u32 { 2 }
fn default_jump_limit() -> u32 { 10 }
fn default_time_limit() -> u32 { 60 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "Y".into()] }
fn default_pad_dash() -> Vec<String> { vec!["X".into(), "R1".into(), "L1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into(), "B".into()] }
fn default_levels_dir() -> String { "levels".into() }
fn default_stats_file() -> String { "game_data.csv".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            hint_interval_ticks: default_hint_interval(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            speed: default_speed(),
            dash_speed: default_dash_speed(),
            dash_duration: default_dash_duration(),
            dash_cooldown: default_dash_cooldown(),
            dash_cost: default_dash_cost(),
            jump_power: default_jump_power(),
            jump_cost: default_jump_cost(),
            max_jumps: default_max_jumps(),
            gravity: default_gravity(),
            max_energy: default_max_energy(),
            energy_regen: default_energy_regen(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            start_health: default_start_health(),
            start_score: default_start_score(),
            damage_penalty: default_damage_penalty(),
            jump_limit: default_jump_limit(),
            time_limit_secs: default_time_limit(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            dash: default_pad_dash(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            stats_file: default_stats_file(),
            player_name: None,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        TomlPhysics::default().into()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        TomlScoring::default().into()
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        let s = TomlSpeed::default();
        SpeedConfig { tick_rate_ms: s.tick_rate_ms, hint_interval_ticks: s.hint_interval_ticks }
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(p: TomlPhysics) -> Self {
        PhysicsConfig {
            speed: p.speed,
            dash_speed: p.dash_speed,
            dash_duration: p.dash_duration,
            dash_cooldown: p.dash_cooldown,
            dash_cost: p.dash_cost,
            jump_power: p.jump_power,
            jump_cost: p.jump_cost,
            max_jumps: p.max_jumps,
            gravity: p.gravity,
            max_energy: p.max_energy.max(0.0),
            energy_regen: p.energy_regen,
        }
    }
}

impl From<TomlScoring> for ScoringConfig {
    fn from(s: TomlScoring) -> Self {
        ScoringConfig {
            start_health: s.start_health,
            start_score: s.start_score,
            damage_penalty: s.damage_penalty,
            jump_limit: s.jump_limit,
            time_limit_secs: s.time_limit_secs,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/shadowguide`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no directory search).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let player_name = toml_cfg.general.player_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                hint_interval_ticks: toml_cfg.speed.hint_interval_ticks.max(1),
            },
            physics: toml_cfg.physics.into(),
            scoring: toml_cfg.scoring.into(),
            random: RandomConfig { seed: toml_cfg.random.seed },
            enemy_table: parse_enemy_table(&toml_cfg.enemies.table),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                dash: toml_cfg.gamepad.dash,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            levels_dir,
            stats_file: PathBuf::from(toml_cfg.general.stats_file),
            player_name,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Convert `[enemies.table]` rows, skipping anything malformed.
fn parse_enemy_table(raw: &BTreeMap<String, Vec<(String, f32)>>) -> BTreeMap<u32, Vec<(EnemyKind, f32)>> {
    let mut table = BTreeMap::new();
    for (level, row) in raw {
        let level = match level.trim().parse::<u32>() {
            Ok(l) => l,
            Err(_) => {
                tracing::warn!("config: ignoring enemy table row with non-numeric level {level:?}");
                continue;
            }
        };
        let entries: Vec<(EnemyKind, f32)> = row.iter()
            .filter_map(|(name, weight)| match EnemyKind::from_name(name) {
                Some(kind) if *weight > 0.0 && weight.is_finite() => Some((kind, *weight)),
                _ => {
                    tracing::warn!("config: ignoring enemy entry {name:?} = {weight} for level {level}");
                    None
                }
            })
            .collect();
        if !entries.is_empty() {
            table.insert(level, entries);
        }
    }
    table
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/shadowguide");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        tracing::info!("config: loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!("config: {} parse error: {e}; using defaults", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    tracing::warn!("config: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.speed.hint_interval_ticks, 180);
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.physics.max_jumps, 2);
        assert_eq!(cfg.scoring.start_health, 3);
        assert!(cfg.random.seed.is_none());
        assert!(cfg.enemy_table.is_empty());
        assert!(cfg.player_name.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str("[physics]\nspeed = 7\n[random]\nseed = 99\n").unwrap();
        assert_eq!(cfg.physics.speed, 7);
        assert_eq!(cfg.physics.jump_power, -15);
        assert_eq!(cfg.random.seed, Some(99));
    }

    #[test]
    fn enemy_table_rows_are_parsed() {
        let text = r#"
[enemies.table]
"2" = [["chase", 0.5], ["trap", 0.5]]
"x" = [["patrol", 1.0]]
"3" = [["nonsense", 1.0], ["flyer", -1.0]]
"#;
        let cfg = GameConfig::from_toml_str(text).unwrap();
        assert_eq!(cfg.enemy_table.len(), 1);
        assert_eq!(cfg.enemy_table[&2], vec![(EnemyKind::Chase, 0.5), (EnemyKind::Trap, 0.5)]);
    }

    #[test]
    fn blank_player_name_is_none() {
        let cfg = GameConfig::from_toml_str("[general]\nplayer_name = \"   \"\n").unwrap();
        assert!(cfg.player_name.is_none());
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[physics\nspeed = ").is_err());
    }
}
