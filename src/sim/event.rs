/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound, messages and the stats log.

use super::stats::LevelRecord;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DamageCause {
    Fall,
    Enemy,
    Explosion,
}

#[derive(Clone, Debug)]
pub enum GameEvent {
    Jumped,
    DashStarted,
    Damaged { cause: DamageCause, health_left: u32 },
    Exploded,
    HintsUpdated,
    PlayerDied,
    GoalReached,
    /// Final record of a finished attempt, emitted exactly once.
    StatsFlushed(LevelRecord),
}
