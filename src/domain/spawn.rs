/// Weighted enemy factory.
///
/// Each level number (clamped to 1..=5) owns a row of `(variant, weight)`
/// pairs. Weights are relative and need not sum to 1. A row that cannot be
/// sampled (empty, all zero, non-finite) yields `Patrol`.

use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

use super::enemy::{Enemy, EnemyKind};

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 5;

const DEFAULT_ROWS: [&[(EnemyKind, f32)]; 5] = [
    &[(EnemyKind::Patrol, 1.0)],
    &[(EnemyKind::Patrol, 0.6), (EnemyKind::Chase, 0.4)],
    &[(EnemyKind::Patrol, 0.4), (EnemyKind::Chase, 0.3), (EnemyKind::JumpOscillate, 0.3)],
    &[
        (EnemyKind::Chase, 0.3),
        (EnemyKind::JumpOscillate, 0.2),
        (EnemyKind::Shooter, 0.3),
        (EnemyKind::Teleporter, 0.2),
    ],
    &[
        (EnemyKind::JumpOscillate, 0.2),
        (EnemyKind::Shooter, 0.25),
        (EnemyKind::Exploder, 0.3),
        (EnemyKind::Teleporter, 0.15),
        (EnemyKind::Dropper, 0.1),
    ],
];

pub fn clamp_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

#[derive(Clone, Debug)]
pub struct SpawnTable {
    rows: BTreeMap<u32, Vec<(EnemyKind, f32)>>,
}

impl Default for SpawnTable {
    fn default() -> Self {
        let rows = (MIN_LEVEL..=MAX_LEVEL)
            .zip(DEFAULT_ROWS.iter())
            .map(|(level, row)| (level, row.to_vec()))
            .collect();
        SpawnTable { rows }
    }
}

impl SpawnTable {
    /// Default table with some rows replaced.
    pub fn with_overrides(overrides: &BTreeMap<u32, Vec<(EnemyKind, f32)>>) -> Self {
        let mut table = Self::default();
        for (&level, row) in overrides {
            if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                tracing::warn!("spawn: override for level {level} is outside {MIN_LEVEL}..={MAX_LEVEL}, ignored");
                continue;
            }
            let entries: Vec<String> = row.iter().map(|(kind, w)| format!("{}={w}", kind.name())).collect();
            tracing::debug!("spawn: level {level} row overridden: {}", entries.join(", "));
            table.rows.insert(level, row.clone());
        }
        table
    }

    pub fn row(&self, level: u32) -> &[(EnemyKind, f32)] {
        self.rows.get(&clamp_level(level)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pick(&self, level: u32, rng: &mut dyn RngCore) -> EnemyKind {
        pick_weighted(self.row(level), rng)
    }

    /// Draw a variant for `level` and create it at (x, y).
    pub fn spawn(&self, level: u32, x: i32, y: i32, rng: &mut dyn RngCore) -> Enemy {
        Enemy::spawn(self.pick(level, rng), x, y)
    }
}

/// Weighted draw from `entries`; `Patrol` if the weights are unusable.
pub fn pick_weighted(entries: &[(EnemyKind, f32)], rng: &mut dyn RngCore) -> EnemyKind {
    match WeightedIndex::new(entries.iter().map(|&(_, w)| w)) {
        Ok(dist) => entries[dist.sample(rng)].0,
        Err(_) => EnemyKind::Patrol,
    }
}
