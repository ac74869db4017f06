/// The step function: advances one attempt by one tick.
///
/// Processing order:
///   1. Gravity + energy regen
///   2. Vertical collision (landing resets the jump counter)
///   3. Jump (fresh press only)
///   4. Horizontal intent (dash has priority)
///   5. Horizontal collision
///   6. Fall-bound check
///   7. Enemy updates, explosion damage, contact damage
///   8. Effect aging
///   9. Goal check
///  10. Hint evaluation (throttled)
///
/// Every loss of health goes through `apply_damage`. Terminal phases are
/// entered at most once, and each one flushes the stats record exactly once.
/// A terminal world ignores further steps.

use crate::domain::enemy::UpdateCtx;
use crate::domain::entity::FrameInput;
use crate::domain::hint::{self, HintScene};
use super::event::{DamageCause, GameEvent};
use super::stats::Outcome;
use super::world::{Phase, WorldState, TICKS_PER_SECOND};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase.is_terminal() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    world.player.apply_gravity();
    world.player.resolve_vertical(&world.level.platforms);
    resolve_jump(world, &input, &mut events);
    let dx = resolve_intent(world, &input, &mut events);
    world.player.resolve_horizontal(&world.level.platforms, dx);

    resolve_fall(world, &mut events);
    if world.phase.is_terminal() { return events; }

    resolve_enemies(world, &mut events);
    if world.phase.is_terminal() { return events; }

    age_effects(world);
    resolve_goal(world, &mut events);
    if world.phase.is_terminal() { return events; }

    resolve_hints(world, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_jump(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if input.jump && world.player.jump() {
        world.stats.record_jump(world.tick, TICKS_PER_SECOND);
        events.push(GameEvent::Jumped);
    }
}

fn resolve_intent(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) -> i32 {
    let before = world.player.dash.last_tick;
    let dx = world.player.move_horizontal(input, world.tick);
    if world.player.dash.last_tick != before {
        events.push(GameEvent::DashStarted);
    }
    dx
}

fn resolve_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.rect.top() > world.level.pixel_height() {
        apply_damage(world, DamageCause::Fall, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Damage
// ══════════════════════════════════════════════════════════════

/// The single damage transition: lose health and score, count the death,
/// respawn. Reaching zero health ends the attempt.
pub fn apply_damage(world: &mut WorldState, cause: DamageCause, events: &mut Vec<GameEvent>) {
    if world.phase.is_terminal() { return; }

    let stats = &mut world.stats;
    stats.health = stats.health.saturating_sub(1);
    stats.score = stats.score.saturating_sub(world.scoring.damage_penalty);
    stats.death_count += 1;
    if cause != DamageCause::Fall {
        stats.enemy_triggered += 1;
    }
    let health_left = stats.health;

    world.player.reset_position(&world.level.spawn_points, &mut world.rng);
    tracing::info!("damage ({cause:?}) at tick {}: health {health_left}, score {}", world.tick, world.stats.score);
    events.push(GameEvent::Damaged { cause, health_left });

    if health_left == 0 {
        world.phase = Phase::Dead;
        events.push(GameEvent::PlayerDied);
        flush_stats(world, Outcome::Dead, events);
    }
}

fn flush_stats(world: &WorldState, outcome: Outcome, events: &mut Vec<GameEvent>) {
    let record = world.stats.to_record(&world.player_name, world.level_number, outcome);
    tracing::info!(
        "attempt over ({}): level {}, score {}, jumps {}, deaths {}, hints {}",
        outcome.as_str(), record.level, record.score, record.jump_count,
        record.death_count, record.hint_count,
    );
    events.push(GameEvent::StatsFlushed(record));
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player = world.player.rect;
    let mut blasts = 0;

    for enemy in world.enemies.iter_mut() {
        let mut ctx = UpdateCtx { player, rng: &mut world.rng };
        let tick = enemy.update(&mut ctx);
        if let Some(fx) = tick.effect {
            events.push(GameEvent::Exploded);
            world.effects.push(fx);
        }
        if tick.damage_to_player {
            blasts += 1;
        }
    }
    world.enemies.retain(|e| !e.is_spent());

    for _ in 0..blasts {
        apply_damage(world, DamageCause::Explosion, events);
        if world.phase.is_terminal() { return; }
    }

    // Contact is checked against the player's current rectangle, which
    // moves when an earlier hit respawns it.
    for i in 0..world.enemies.len() {
        let player = world.player.rect;
        if world.enemies[i].contact(&player) {
            apply_damage(world, DamageCause::Enemy, events);
            if world.phase.is_terminal() { return; }
        }
    }
}

fn age_effects(world: &mut WorldState) {
    world.effects.retain_mut(|fx| !fx.tick());
}

// ══════════════════════════════════════════════════════════════
// Goal / hints
// ══════════════════════════════════════════════════════════════

fn resolve_goal(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let goal = match world.level.goal { Some(g) => g, None => return };
    if !world.player.rect.intersects(&goal) { return; }

    let mut score = world.stats.score;
    if world.stats.jump_count > world.scoring.jump_limit {
        score = score.saturating_sub(1);
    }
    if world.elapsed_secs() > world.scoring.time_limit_secs as f32 {
        score = score.saturating_sub(1);
    }
    world.stats.score = score;
    world.phase = Phase::GoalReached;
    events.push(GameEvent::GoalReached);
    flush_stats(world, Outcome::Goal, events);
}

fn resolve_hints(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let due = match world.last_hint_tick {
        None => true,
        Some(last) => world.tick - last >= u64::from(world.hint_interval),
    };
    if !due { return; }

    let scene = HintScene {
        player: world.player.rect,
        facing: world.player.facing,
        platforms: &world.level.platforms,
        enemies: &world.enemies,
        goal: world.level.goal,
    };
    let hints = hint::evaluate(&scene);
    world.stats.record_hints(&hints);
    world.hints = hints;
    world.last_hint_tick = Some(world.tick);
    events.push(GameEvent::HintsUpdated);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::enemy::{Enemy, EnemyKind, EnemyState};
    use crate::domain::entity::{Effect, Projectile};
    use crate::domain::hint::HintKind;
    use crate::domain::spawn::SpawnTable;
    use crate::sim::level::parse_level_text;

    const MAP: &[&str] = &[
        "                    ",
        "                    ",
        "  P                G",
        "####################",
    ];

    fn world() -> WorldState {
        let mut cfg = GameConfig::default();
        cfg.random.seed = Some(5);
        let def = parse_level_text("test", &MAP.join("\n"));
        WorldState::start(&def, 0, "tester", &cfg, &SpawnTable::default()).unwrap()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn damage_causes(events: &[GameEvent]) -> Vec<DamageCause> {
        events.iter().filter_map(|e| match e {
            GameEvent::Damaged { cause, .. } => Some(*cause),
            _ => None,
        }).collect()
    }

    fn flush_count(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::StatsFlushed(_))).count()
    }

    #[test]
    fn player_settles_on_floor() {
        let mut w = world();
        step(&mut w, idle());
        assert!(w.player.on_ground);
        assert_eq!(w.player.rect.bottom(), 90);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn falling_out_costs_health_and_score() {
        let mut w = world();
        w.player.rect.y = 200;
        let events = step(&mut w, idle());
        assert_eq!(damage_causes(&events), vec![DamageCause::Fall]);
        assert_eq!(w.stats.health, 2);
        assert_eq!(w.stats.score, 8);
        assert_eq!(w.stats.death_count, 1);
        assert_eq!(w.stats.enemy_triggered, 0);
        assert_eq!((w.player.rect.x, w.player.rect.y), (60, 60));
        assert_eq!(w.player.velocity_y, 0);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut w = world();
        w.stats.score = 1;
        w.player.rect.y = 200;
        step(&mut w, idle());
        assert_eq!(w.stats.score, 0);
    }

    #[test]
    fn last_life_ends_attempt_exactly_once() {
        let mut w = world();
        w.stats.health = 1;
        w.player.rect.y = 200;
        let events = step(&mut w, idle());
        assert_eq!(w.phase, Phase::Dead);
        assert_eq!(w.stats.health, 0);
        assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::PlayerDied)).count(), 1);
        assert_eq!(flush_count(&events), 1);
        match events.last() {
            Some(GameEvent::StatsFlushed(rec)) => {
                assert_eq!(rec.outcome, Outcome::Dead);
                assert_eq!(rec.player_name, "tester");
                assert_eq!(rec.death_count, 1);
            }
            other => panic!("expected stats flush, got {other:?}"),
        }

        let tick = w.tick;
        w.player.rect.y = 200;
        assert!(step(&mut w, idle()).is_empty());
        assert_eq!(w.tick, tick);
        assert_eq!(w.stats.death_count, 1);
    }

    #[test]
    fn damage_after_death_is_ignored() {
        let mut w = world();
        w.phase = Phase::Dead;
        let mut events = vec![];
        apply_damage(&mut w, DamageCause::Enemy, &mut events);
        assert!(events.is_empty());
        assert_eq!(w.stats.health, 3);
    }

    #[test]
    fn enemy_contact_damages_and_counts_trigger() {
        let mut w = world();
        w.enemies.push(Enemy::spawn(EnemyKind::Trap, 70, 58));
        let events = step(&mut w, idle());
        assert_eq!(damage_causes(&events), vec![DamageCause::Enemy]);
        assert_eq!(w.stats.enemy_triggered, 1);
        assert_eq!(w.stats.death_count, 1);
    }

    #[test]
    fn projectile_hit_damages_and_is_consumed() {
        let mut w = world();
        let mut shooter = Enemy::spawn(EnemyKind::Shooter, 500, 58);
        if let EnemyState::Shooter { bullets, .. } = &mut shooter.state {
            bullets.push(Projectile::aimed(75.0, 75.0, 200.0, 75.0, 0.0));
        }
        w.enemies.push(shooter);
        let events = step(&mut w, idle());
        assert_eq!(damage_causes(&events), vec![DamageCause::Enemy]);
        assert!(w.enemies[0].projectiles().is_empty());
    }

    #[test]
    fn exploder_blast_damages_once_and_leaves_effect() {
        let mut w = world();
        w.enemies.push(Enemy::spawn(EnemyKind::Exploder, 100, 58));
        let events = step(&mut w, idle());
        assert_eq!(damage_causes(&events), vec![DamageCause::Explosion]);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Exploded)));
        assert!(w.enemies.is_empty());
        assert_eq!(w.stats.enemy_triggered, 1);
        assert_eq!(w.effects.len(), 1);

        for _ in 0..Effect::EXPLOSION_FRAMES - 2 {
            step(&mut w, idle());
        }
        assert_eq!(w.effects.len(), 1);
        step(&mut w, idle());
        assert!(w.effects.is_empty());
    }

    #[test]
    fn reaching_goal_scores_and_flushes() {
        let mut w = world();
        w.player.rect.x = 560;
        let events = step(&mut w, idle());
        assert_eq!(w.phase, Phase::GoalReached);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GoalReached)));
        assert_eq!(w.stats.score, 10);
        assert_eq!(flush_count(&events), 1);
        assert!(step(&mut w, idle()).is_empty());
    }

    #[test]
    fn goal_penalties_for_jumps_and_time() {
        let mut w = world();
        w.stats.jump_count = 11;
        w.tick = 60 * 60 + 1;
        w.player.rect.x = 560;
        step(&mut w, idle());
        assert_eq!(w.stats.score, 8);

        let mut w = world();
        w.stats.jump_count = 10;
        w.tick = 60 * 60 - 1;
        w.player.rect.x = 560;
        step(&mut w, idle());
        assert_eq!(w.stats.score, 10);
    }

    #[test]
    fn hints_are_throttled() {
        let mut w = world();
        let mut updates = 0;
        for _ in 0..180 {
            let events = step(&mut w, idle());
            updates += events.iter().filter(|e| matches!(e, GameEvent::HintsUpdated)).count();
        }
        assert_eq!(updates, 1);
        assert_eq!(w.hints, vec![HintKind::BeCareful]);
        assert_eq!(w.stats.hint_total, 1);

        step(&mut w, idle());
        assert_eq!(w.stats.hint_total, 2);
        assert_eq!(w.stats.hint_count(HintKind::BeCareful), 2);
    }

    #[test]
    fn jumps_are_recorded_with_intervals() {
        let mut w = world();
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        let events = step(&mut w, jump);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Jumped)));
        for _ in 0..29 {
            step(&mut w, idle());
        }
        step(&mut w, jump);
        assert_eq!(w.stats.jump_count, 2);
        assert_eq!(w.stats.jump_intervals, vec![0.5]);
    }

    #[test]
    fn landing_refreshes_jumps_before_same_tick_press() {
        let mut w = world();
        w.player.jump_count = 2;
        w.player.velocity_y = 5;
        w.player.rect.y = 90 - 30 - 1;
        let jump = FrameInput { jump: true, ..FrameInput::default() };
        let events = step(&mut w, jump);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Jumped)));
        assert_eq!(w.player.jump_count, 1);
        assert_eq!(w.player.velocity_y, -15);
        assert!(!w.player.on_ground);
        assert_eq!(w.stats.jump_count, 1);
    }

    #[test]
    fn dash_start_is_reported_once() {
        let mut w = world();
        let dash = FrameInput { dash: true, ..FrameInput::default() };
        let events = step(&mut w, dash);
        assert!(events.iter().any(|e| matches!(e, GameEvent::DashStarted)));
        let events = step(&mut w, dash);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::DashStarted)));
        assert_eq!(w.player.rect.x, 60 + 30);
    }
}
