/// WorldState: everything one attempt at one level owns.
///
/// ## Lifecycle
///
/// `WorldState::start` parses the level, places the player, draws one enemy
/// per spawn marker from the weighted table and seeds the session random
/// source. `step::step` then advances it one tick at a time until the phase
/// becomes terminal (`Dead` or `GoalReached`). A new attempt is a new
/// `WorldState`; nothing carries over except what the frontend passes in.
///
/// ## Time
///
/// All durations are simulated: one tick is 1/60 s regardless of the real
/// tick rate, so scoring and stats do not depend on frame pacing.
///
/// ## Render handoff
///
/// `view()` hands out a read-only `FrameView`. The renderer never sees the
/// mutable world.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, ScoringConfig};
use crate::domain::enemy::Enemy;
use crate::domain::entity::Effect;
use crate::domain::hint::HintKind;
use crate::domain::physics::{Platform, Rect};
use crate::domain::player::Player;
use crate::domain::spawn::SpawnTable;
use super::level::{LevelDef, LevelError, LevelGrid};
use super::stats::SessionStats;

pub const TICKS_PER_SECOND: u64 = 60;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Dead,
    GoalReached,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Phase::Playing
    }
}

pub struct WorldState {
    pub level: LevelGrid,
    /// 0-based progression counter; the spawn table clamps it.
    pub level_number: u32,
    pub player_name: String,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub effects: Vec<Effect>,

    pub stats: SessionStats,
    pub hints: Vec<HintKind>,
    pub last_hint_tick: Option<u64>,
    pub hint_interval: u32,
    pub scoring: ScoringConfig,

    pub phase: Phase,
    pub tick: u64,
    pub rng: StdRng,
}

/// Random source for one attempt.
/// With a configured seed the attempt replays identically per level.
pub fn session_rng(seed: Option<u64>, level_number: u32) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s ^ ((u64::from(level_number) << 32) | u64::from(level_number))),
        None => StdRng::from_entropy(),
    }
}

impl WorldState {
    pub fn start(
        def: &LevelDef,
        level_number: u32,
        player_name: &str,
        config: &GameConfig,
        table: &SpawnTable,
    ) -> Result<Self, LevelError> {
        let level = LevelGrid::from_def(def)?;
        let mut rng = session_rng(config.random.seed, level_number);

        let mut player = Player::new(level.spawn_points[0], config.physics.clone());
        player.reset_position(&level.spawn_points, &mut rng);

        let enemies: Vec<Enemy> = level.enemy_markers.iter()
            .map(|&(x, y)| table.spawn(level_number, x, y, &mut rng))
            .collect();

        tracing::info!(
            "session start: level {} ({:?}), {} platforms, {} enemies, seed {:?}",
            level_number, level.name, level.platforms.len(), enemies.len(), config.random.seed,
        );

        Ok(WorldState {
            level,
            level_number,
            player_name: player_name.to_string(),
            player,
            enemies,
            effects: vec![],
            stats: SessionStats::new(&config.scoring),
            hints: vec![],
            last_hint_tick: None,
            hint_interval: config.speed.hint_interval_ticks.max(1),
            scoring: config.scoring.clone(),
            phase: Phase::Playing,
            tick: 0,
            rng,
        })
    }

    /// Simulated seconds since the attempt started.
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 / TICKS_PER_SECOND as f32
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            player: self.player.rect,
            dashing: self.player.dash.active,
            energy_ratio: self.player.energy_ratio(),
            platforms: &self.level.platforms,
            goal: self.level.goal,
            enemies: &self.enemies,
            effects: &self.effects,
            hints: &self.hints,
            health: self.stats.health,
            score: self.stats.score,
            level_number: self.level_number,
            level_name: &self.level.name,
            elapsed_secs: self.elapsed_secs(),
            world_w: self.level.pixel_width(),
            world_h: self.level.pixel_height(),
        }
    }
}

/// Read-only snapshot handed to the renderer each frame.
pub struct FrameView<'a> {
    pub player: Rect,
    pub dashing: bool,
    pub energy_ratio: f32,
    pub platforms: &'a [Platform],
    pub goal: Option<Rect>,
    pub enemies: &'a [Enemy],
    pub effects: &'a [Effect],
    pub hints: &'a [HintKind],
    pub health: u32,
    pub score: u32,
    pub level_number: u32,
    pub level_name: &'a str,
    pub elapsed_secs: f32,
    pub world_w: i32,
    pub world_h: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enemy::EnemyKind;
    use crate::sim::level::parse_level_text;

    fn seeded_config(seed: u64) -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.random.seed = Some(seed);
        cfg
    }

    const MAP: &str = "; Test\n\n  P   E    E  G\n###############";

    #[test]
    fn start_places_player_and_enemies() {
        let def = parse_level_text("t", MAP);
        let w = WorldState::start(&def, 0, "ann", &seeded_config(1), &SpawnTable::default()).unwrap();
        assert_eq!((w.player.rect.x, w.player.rect.y), (60, 30));
        assert_eq!(w.enemies.len(), 2);
        assert!(w.enemies.iter().all(|e| e.kind() == EnemyKind::Patrol));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.stats.health, 3);
    }

    #[test]
    fn start_rejects_bad_levels() {
        let def = parse_level_text("t", "P   G");
        let r = WorldState::start(&def, 0, "ann", &GameConfig::default(), &SpawnTable::default());
        assert!(matches!(r, Err(LevelError::NoPlatforms(_))));
    }

    #[test]
    fn same_seed_same_level_same_enemies() {
        let def = parse_level_text("t", "P EEEEEEEE G\n############");
        let cfg = seeded_config(77);
        let table = SpawnTable::default();
        let a = WorldState::start(&def, 4, "x", &cfg, &table).unwrap();
        let b = WorldState::start(&def, 4, "x", &cfg, &table).unwrap();
        let kinds = |w: &WorldState| w.enemies.iter().map(|e| e.kind()).collect::<Vec<_>>();
        assert_eq!(kinds(&a), kinds(&b));
    }

    #[test]
    fn view_reflects_world() {
        let def = parse_level_text("t", MAP);
        let w = WorldState::start(&def, 2, "ann", &seeded_config(3), &SpawnTable::default()).unwrap();
        let v = w.view();
        assert_eq!(v.player, w.player.rect);
        assert_eq!(v.platforms.len(), 15);
        assert_eq!(v.level_name, "Test");
        assert_eq!(v.world_h, 90);
        assert!((v.energy_ratio - 1.0).abs() < 1e-6);
        assert!(v.hints.is_empty());
    }
}
