/// Kinematic player controller.
///
/// Owns position, vertical velocity, jump/dash state and energy. All
/// operations are total: they clamp instead of failing.
///
/// Per-tick call order used by the session (see `sim::step`):
///   1. `apply_gravity()`   : velocity, position and energy regen together
///   2. `resolve_vertical()`: landing resets the jump counter
///   3. `jump()`            : only on a fresh jump press
///   4. `move_horizontal()` : dash has priority over walking
///   5. `resolve_horizontal()`
///
/// Horizontal speed is never accumulated: each tick's delta is computed
/// fresh from input and dash state.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::config::PhysicsConfig;
use super::entity::{Facing, FrameInput};
use super::physics::{Platform, Rect};
use super::tile::TILE_SIZE;

/// Where the player appears when a level has no spawn marker.
pub const DEFAULT_SPAWN: (i32, i32) = (100, 300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashState {
    pub active: bool,
    pub remaining: u32,
    /// Tick of the most recent trigger; `None` = never dashed.
    pub last_tick: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub velocity_y: i32,
    pub on_ground: bool,
    pub jump_count: u8,
    pub energy: f32,
    pub dash: DashState,
    pub facing: Facing,
    tuning: PhysicsConfig,
}

impl Player {
    pub fn new(spawn: (i32, i32), tuning: PhysicsConfig) -> Self {
        Player {
            rect: Rect::new(spawn.0, spawn.1, TILE_SIZE, TILE_SIZE),
            velocity_y: 0,
            on_ground: false,
            jump_count: 0,
            energy: tuning.max_energy,
            dash: DashState::default(),
            facing: Facing::Right,
            tuning,
        }
    }

    /// Energy as a 0.0..=1.0 fraction, for the HUD bar.
    pub fn energy_ratio(&self) -> f32 {
        if self.tuning.max_energy <= 0.0 { return 0.0; }
        (self.energy / self.tuning.max_energy).clamp(0.0, 1.0)
    }

    fn spend(&mut self, cost: f32) {
        self.energy = (self.energy - cost).max(0.0);
    }

    fn dash_ready(&self, tick: u64) -> bool {
        match self.dash.last_tick {
            None => true,
            Some(last) => tick.saturating_sub(last) >= self.tuning.dash_cooldown,
        }
    }

    /// Resolve horizontal intent for this tick. Returns the x delta.
    pub fn move_horizontal(&mut self, input: &FrameInput, tick: u64) -> i32 {
        let t = &self.tuning;

        if input.dash
            && !self.dash.active
            && self.dash_ready(tick)
            && self.energy >= t.dash_cost
            && t.dash_duration > 0
        {
            self.dash = DashState {
                active: true,
                remaining: t.dash_duration,
                last_tick: Some(tick),
            };
            let cost = t.dash_cost;
            self.spend(cost);
            tracing::debug!("dash triggered at tick {tick}, energy {:.1}", self.energy);
        }

        if self.dash.active {
            let dx = self.facing.sign() * (self.tuning.speed + self.tuning.dash_speed);
            self.dash.remaining = self.dash.remaining.saturating_sub(1);
            if self.dash.remaining == 0 {
                self.dash.active = false;
            }
            return dx;
        }

        if input.left {
            self.facing = Facing::Left;
            -self.tuning.speed
        } else if input.right {
            self.facing = Facing::Right;
            self.tuning.speed
        } else {
            0
        }
    }

    /// Single or double jump. Returns true if the jump happened.
    pub fn jump(&mut self) -> bool {
        if self.jump_count >= self.tuning.max_jumps { return false; }
        if self.energy < self.tuning.jump_cost { return false; }

        self.velocity_y = self.tuning.jump_power;
        self.on_ground = false;
        self.jump_count += 1;
        let cost = self.tuning.jump_cost;
        self.spend(cost);
        true
    }

    /// Gravity integration and passive energy regen, as one step.
    pub fn apply_gravity(&mut self) {
        self.velocity_y += self.tuning.gravity;
        self.rect.y += self.velocity_y;
        self.energy = (self.energy + self.tuning.energy_regen).min(self.tuning.max_energy);
    }

    /// Snap out of every platform hit on the vertical axis.
    pub fn resolve_vertical(&mut self, platforms: &[Platform]) {
        self.on_ground = false;
        for plat in platforms {
            if !self.rect.intersects(&plat.rect) { continue; }
            if self.velocity_y > 0 {
                self.rect.set_bottom(plat.rect.top());
                self.velocity_y = 0;
                self.on_ground = true;
                self.jump_count = 0;
            } else if self.velocity_y < 0 {
                self.rect.set_top(plat.rect.bottom());
                self.velocity_y = 0;
            }
        }
    }

    /// Apply `dx`, then push out of every platform along the move direction.
    pub fn resolve_horizontal(&mut self, platforms: &[Platform], dx: i32) {
        self.rect.x += dx;
        if dx == 0 { return; }
        for plat in platforms {
            if !self.rect.intersects(&plat.rect) { continue; }
            if dx > 0 {
                self.rect.set_right(plat.rect.left());
            } else {
                self.rect.set_left(plat.rect.right());
            }
        }
    }

    /// Teleport to a random spawn point (or the default one) at rest.
    pub fn reset_position(&mut self, spawns: &[(i32, i32)], rng: &mut dyn RngCore) {
        let (x, y) = spawns.choose(rng).copied().unwrap_or(DEFAULT_SPAWN);
        self.rect.x = x;
        self.rect.y = y;
        self.velocity_y = 0;
        self.dash.active = false;
        self.dash.remaining = 0;
    }
}
