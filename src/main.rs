/// Entry point, level progression and the frame loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::entity::FrameInput;
use domain::spawn::SpawnTable;
use sim::event::GameEvent;
use sim::level::{load_catalog, LevelDef, LevelError, LevelRotation};
use sim::stats;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{keys_label, InputState, TextKey};
use ui::renderer::{Renderer, Screen};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MAX_NAME_LEN: usize = 16;
const FALLBACK_NAME: &str = "player";

fn main() {
    let log_path = logging::init();
    let config = GameConfig::load();
    match &log_path {
        Ok(path) => tracing::info!("logging to {}", path.display()),
        Err(e) => eprintln!("Logging disabled: {e}"),
    }

    let table = SpawnTable::with_overrides(&config.enemy_table);
    let catalog = load_catalog(&config.levels_dir);
    let progress = match Progress::new(catalog, config.random.seed) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            return;
        }
    };
    let mut app = App::new(&config, table, progress);

    let mut renderer = Renderer::new();
    let key_releases = match renderer.init() {
        Ok(releases) => releases,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), key_releases);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        tracing::error!("game loop: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Shadow Guide!");
    if !app.progress.completed_scores.is_empty() {
        println!(
            "Levels cleared: {}  Average score: {:.1}",
            app.progress.completed_scores.len(),
            app.progress.average_score(),
        );
    }
    tracing::info!("exit");
}

// ── Level progression ──

/// Which level is next: the opener first, then the rest drawn at random
/// without repetition.
struct Progress {
    catalog: Vec<LevelDef>,
    rotation: LevelRotation,
    current: usize,
    level_number: u32,
    completed_scores: Vec<u32>,
    rng: StdRng,
}

impl Progress {
    fn new(catalog: Vec<LevelDef>, seed: Option<u64>) -> Result<Self, LevelError> {
        let rotation = LevelRotation::new(&catalog)?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Progress {
            current: rotation.opener(),
            catalog,
            rotation,
            level_number: 0,
            completed_scores: vec![],
            rng,
        })
    }

    /// Back to the opener with a full rotation.
    fn restart(&mut self) -> Result<(), LevelError> {
        self.rotation = LevelRotation::new(&self.catalog)?;
        self.current = self.rotation.opener();
        self.level_number = 0;
        self.completed_scores.clear();
        Ok(())
    }

    fn current_def(&self) -> &LevelDef {
        &self.catalog[self.current]
    }

    fn has_next(&self) -> bool {
        self.rotation.remaining() > 0
    }

    /// Move to the next level. False when every level has been played.
    fn advance(&mut self) -> bool {
        match self.rotation.next(&mut self.rng) {
            Some(i) => {
                self.current = i;
                self.level_number += 1;
                true
            }
            None => false,
        }
    }

    fn average_score(&self) -> f32 {
        if self.completed_scores.is_empty() {
            return 0.0;
        }
        self.completed_scores.iter().sum::<u32>() as f32 / self.completed_scores.len() as f32
    }
}

// ── Frontend state ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AppPhase {
    NameEntry,
    Controls,
    Playing,
    LevelComplete,
    GameOver,
    AllCleared,
}

struct App<'a> {
    config: &'a GameConfig,
    table: SpawnTable,
    progress: Progress,
    phase: AppPhase,
    name: String,
    world: Option<WorldState>,
    paused: bool,
    /// `(binding, action)` rows shown on the controls screen.
    controls: Vec<(String, String)>,
}

impl<'a> App<'a> {
    fn new(config: &'a GameConfig, table: SpawnTable, progress: Progress) -> Self {
        let preset = config.player_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        App {
            config,
            table,
            progress,
            phase: AppPhase::NameEntry,
            name: preset.unwrap_or_default().to_string(),
            world: None,
            paused: false,
            controls: controls_table(&[]),
        }
    }

    /// Start an attempt at the current level. A level that fails to load
    /// is skipped; running out of levels that way is an error.
    fn start_level(&mut self) -> Result<(), LevelError> {
        loop {
            let def = self.progress.current_def();
            match WorldState::start(def, self.progress.level_number, &self.name, self.config, &self.table) {
                Ok(world) => {
                    self.world = Some(world);
                    self.phase = AppPhase::Playing;
                    self.paused = false;
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!("skipping level {:?}: {e}", def.id);
                    if !self.progress.advance() {
                        return Err(e);
                    }
                }
            }
        }
    }

    /// After a cleared level: the next playable level, or the results
    /// screen once none is left.
    fn continue_run(&mut self) {
        if self.progress.advance() && self.start_level().is_ok() {
            return;
        }
        tracing::info!("all levels cleared, average {:.1}", self.progress.average_score());
        self.world = None;
        self.phase = AppPhase::AllCleared;
    }

    fn start_run(&mut self) -> Result<(), LevelError> {
        if self.name.trim().is_empty() {
            self.name = FALLBACK_NAME.to_string();
        }
        tracing::info!("run start for {:?}", self.name);
        self.progress.restart()?;
        self.start_level()
    }

    fn to_name_entry(&mut self) {
        self.world = None;
        self.paused = false;
        self.phase = AppPhase::NameEntry;
    }

    fn edit_name(&mut self, keys: &[TextKey]) {
        for key in keys {
            match key {
                TextKey::Char(c) if self.name.chars().count() < MAX_NAME_LEN => self.name.push(*c),
                TextKey::Char(_) => {}
                TextKey::Backspace => { self.name.pop(); }
            }
        }
    }

    /// One simulation tick; moves the frontend phase on terminal outcomes.
    fn tick(&mut self, input: FrameInput, sound: Option<&SoundEngine>) {
        let Some(world) = self.world.as_mut() else { return };
        let events = step::step(world, input);
        process_events(self.config, sound, &events);

        match world.phase {
            Phase::Playing => {}
            Phase::GoalReached => {
                self.progress.completed_scores.push(world.stats.score);
                self.phase = AppPhase::LevelComplete;
            }
            Phase::Dead => self.phase = AppPhase::GameOver,
        }
    }

    fn screen(&self) -> Screen<'_> {
        let view = self.world.as_ref().map(|w| w.view());
        match (self.phase, view) {
            (AppPhase::Playing, Some(view)) => Screen::Playing { view, paused: self.paused },
            (AppPhase::LevelComplete, Some(view)) => Screen::LevelComplete { view, has_next: self.progress.has_next() },
            (AppPhase::GameOver, Some(view)) => Screen::GameOver { view },
            (AppPhase::Controls, _) => Screen::Controls { rows: &self.controls },
            (AppPhase::AllCleared, _) => Screen::AllCleared {
                cleared: self.progress.completed_scores.len(),
                average_score: self.progress.average_score(),
            },
            _ => Screen::NameEntry { name: &self.name },
        }
    }
}

fn game_loop(
    app: &mut App<'_>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    key_releases: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new(key_releases);
    let mut gp = GamepadState::new();
    gp.load_button_config(&app.config.gamepad);
    app.controls = controls_table(&gp.bindings());
    let tick_rate = Duration::from_millis(app.config.speed.tick_rate_ms.max(1));
    let mut last_tick = Instant::now();

    // Edge presses seen between ticks are held until the next tick.
    let mut pending_jump = false;
    let mut pending_dash = false;

    if app.config.player_name.is_some() && !app.name.is_empty() {
        app.start_run()?;
    }

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        let before = app.phase;
        if handle_meta(app, &kb, &gp)? {
            break;
        }
        if app.phase != before && app.phase == AppPhase::Playing {
            renderer.reset_camera();
            pending_jump = false;
            pending_dash = false;
        }

        if app.phase == AppPhase::Playing && !app.paused {
            pending_jump |= kb.any_pressed(KEYS_JUMP) || gp.jump_pressed();
            pending_dash |= kb.any_pressed(KEYS_DASH) || kb.shift_arrow_pressed() || gp.dash_pressed();
        }

        if last_tick.elapsed() >= tick_rate {
            if app.phase == AppPhase::Playing && !app.paused {
                let input = FrameInput {
                    left: kb.any_held(KEYS_LEFT) || kb.any_pressed(KEYS_LEFT) || gp.left_held(),
                    right: kb.any_held(KEYS_RIGHT) || kb.any_pressed(KEYS_RIGHT) || gp.right_held(),
                    jump: std::mem::take(&mut pending_jump),
                    dash: std::mem::take(&mut pending_dash),
                };
                app.tick(input, sound);
            }
            last_tick = Instant::now();
        }

        renderer.render(&app.screen())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(config: &GameConfig, sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Damaged { cause, health_left } => {
                tracing::debug!("damage from {cause:?}, {health_left} left");
            }
            GameEvent::StatsFlushed(record) => {
                if let Err(e) = stats::append_record(&config.stats_file, record) {
                    tracing::warn!("stats: cannot write {}: {e}", config.stats_file.display());
                }
            }
            _ => {}
        }

        let Some(sfx) = sound else { continue };
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::DashStarted => sfx.play_dash(),
            GameEvent::Damaged { health_left, .. } if *health_left > 0 => sfx.play_hurt(),
            GameEvent::Exploded => sfx.play_explosion(),
            GameEvent::GoalReached => sfx.play_goal(),
            GameEvent::PlayerDied => sfx.play_game_over(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DASH: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X'), KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_CONTINUE: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('y'), KeyCode::Char('Y')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Char('b'), KeyCode::Char('B')];

/// Rows of the controls screen: keyboard first, then the gamepad bindings.
fn controls_table(pad: &[(&str, String)]) -> Vec<(String, String)> {
    let mut rows = vec![
        (format!("{} {}", keys_label(KEYS_LEFT), keys_label(KEYS_RIGHT)), "Move left / right".to_string()),
        (keys_label(KEYS_JUMP), "Jump, again in mid-air (costs energy)".to_string()),
        (format!("{} SHIFT+←/→", keys_label(KEYS_DASH)), "Dash (costs energy, cooldown)".to_string()),
        ("F1".to_string(), "Pause".to_string()),
        (keys_label(KEYS_CONTINUE), "Next level / retry".to_string()),
        (keys_label(KEYS_BACK), "Back to name entry".to_string()),
        ("ESC".to_string(), "Leave the level, quit from name entry".to_string()),
        ("CTRL+C".to_string(), "Quit".to_string()),
    ];
    if !pad.is_empty() {
        rows.push(("Pad D-pad/stick".to_string(), "Move, d-pad up jumps".to_string()));
    }
    rows.extend(pad.iter().map(|(action, buttons)| (format!("Pad {buttons}"), action.to_string())));
    rows
}

/// Phase transitions driven by input. Returns true to quit.
fn handle_meta(app: &mut App<'_>, kb: &InputState, gp: &GamepadState) -> Result<bool, LevelError> {
    let proceed = kb.any_pressed(KEYS_CONTINUE) || gp.confirm_pressed();
    let back = kb.any_pressed(KEYS_BACK) || gp.cancel_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]);

    match app.phase {
        AppPhase::NameEntry => {
            if esc {
                return Ok(true);
            }
            // letters like y/n/b are part of the name here
            if kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                app.start_run()?;
            } else if kb.was_pressed(KeyCode::Tab) || gp.cancel_pressed() {
                app.phase = AppPhase::Controls;
            } else {
                app.edit_name(&kb.typed());
            }
        }

        AppPhase::Controls => {
            if esc || back || proceed || kb.was_pressed(KeyCode::Tab) {
                app.phase = AppPhase::NameEntry;
            }
        }

        AppPhase::Playing => {
            if kb.was_pressed(KeyCode::F(1)) {
                app.paused = !app.paused;
            } else if esc || (app.paused && gp.cancel_pressed()) {
                tracing::info!("attempt abandoned");
                app.to_name_entry();
            }
        }

        AppPhase::LevelComplete => {
            if proceed {
                app.continue_run();
            } else if back || esc {
                app.to_name_entry();
            }
        }

        AppPhase::GameOver => {
            if proceed {
                app.start_level()?;
            } else if back || esc {
                app.to_name_entry();
            }
        }

        AppPhase::AllCleared => {
            if esc {
                return Ok(true);
            }
            if proceed {
                app.start_run()?;
            } else if back {
                app.to_name_entry();
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_level_text;

    fn catalog(ids: &[&str]) -> Vec<LevelDef> {
        ids.iter().map(|id| parse_level_text(id, "P   G\n#####")).collect()
    }

    #[test]
    fn progress_starts_at_opener_and_never_repeats() {
        let mut p = Progress::new(catalog(&["a", "level0", "b", "c"]), Some(9)).unwrap();
        assert_eq!(p.current_def().id, "level0");
        let mut seen = vec![p.current];
        while p.advance() {
            assert!(!seen.contains(&p.current));
            seen.push(p.current);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(p.level_number, 3);
        assert!(!p.has_next());
    }

    #[test]
    fn restart_resets_rotation_and_scores() {
        let mut p = Progress::new(catalog(&["x", "y"]), Some(1)).unwrap();
        p.completed_scores.push(8);
        assert!(p.advance());
        p.restart().unwrap();
        assert_eq!((p.current, p.level_number), (0, 0));
        assert!(p.completed_scores.is_empty());
        assert!(p.has_next());
    }

    #[test]
    fn average_of_completed_scores() {
        let mut p = Progress::new(catalog(&["x"]), None).unwrap();
        assert_eq!(p.average_score(), 0.0);
        p.completed_scores.extend([10, 7, 4]);
        assert!((p.average_score() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn empty_catalog_cannot_start() {
        assert!(matches!(Progress::new(vec![], None), Err(LevelError::NoLevels)));
    }

    #[test]
    fn bad_levels_are_skipped() {
        let mut defs = catalog(&["level0", "ok"]);
        defs[0] = parse_level_text("level0", "P  G");
        let config = GameConfig::default();
        let mut app = App::new(&config, SpawnTable::default(), Progress::new(defs, Some(2)).unwrap());
        app.name = "ann".into();
        app.start_run().unwrap();
        assert_eq!(app.phase, AppPhase::Playing);
        assert_eq!(app.progress.current_def().id, "ok");
        assert_eq!(app.world.as_ref().map(|w| w.level_number), Some(1));
    }

    #[test]
    fn broken_remaining_levels_lead_to_results() {
        let mut defs = catalog(&["level0", "broken"]);
        defs[1] = parse_level_text("broken", "P  G");
        let config = GameConfig::default();
        let mut app = App::new(&config, SpawnTable::default(), Progress::new(defs, Some(4)).unwrap());
        app.name = "ann".into();
        app.start_run().unwrap();
        app.progress.completed_scores.push(9);
        app.phase = AppPhase::LevelComplete;

        app.continue_run();
        assert_eq!(app.phase, AppPhase::AllCleared);
        assert!(app.world.is_none());
        assert!(matches!(app.screen(), Screen::AllCleared { cleared: 1, .. }));
    }

    #[test]
    fn cleared_level_moves_to_next() {
        let config = GameConfig::default();
        let mut app = App::new(&config, SpawnTable::default(), Progress::new(catalog(&["level0", "b"]), Some(4)).unwrap());
        app.start_run().unwrap();
        app.phase = AppPhase::LevelComplete;
        app.continue_run();
        assert_eq!(app.phase, AppPhase::Playing);
        assert_eq!(app.progress.current_def().id, "b");
    }

    #[test]
    fn controls_list_keys_and_pad_bindings() {
        let pad = [("Jump", "A/Y".to_string()), ("Dash", "X".to_string())];
        let rows = controls_table(&pad);
        assert_eq!(rows[0].0, "←/A →/D");
        assert!(rows.iter().any(|(k, a)| k == "SPACE/↑/W" && a.starts_with("Jump")));
        assert!(rows.iter().any(|(k, a)| k == "Pad A/Y" && a == "Jump"));
        assert!(rows.iter().any(|(k, a)| k == "Pad X" && a == "Dash"));
        assert!(!controls_table(&[]).iter().any(|(k, _)| k.starts_with("Pad")));
    }

    #[test]
    fn controls_screen_shows_rows() {
        let config = GameConfig::default();
        let mut app = App::new(&config, SpawnTable::default(), Progress::new(catalog(&["x"]), None).unwrap());
        app.phase = AppPhase::Controls;
        match app.screen() {
            Screen::Controls { rows } => assert_eq!(rows.len(), app.controls.len()),
            _ => panic!("expected the controls screen"),
        }
    }

    #[test]
    fn name_editing_caps_length() {
        let config = GameConfig::default();
        let mut app = App::new(&config, SpawnTable::default(), Progress::new(catalog(&["x"]), None).unwrap());
        let keys: Vec<TextKey> = std::iter::repeat(TextKey::Char('z')).take(20).collect();
        app.edit_name(&keys);
        assert_eq!(app.name.len(), MAX_NAME_LEN);
        app.edit_name(&[TextKey::Backspace, TextKey::Char('!')]);
        assert!(app.name.ends_with("z!"));
    }
}
