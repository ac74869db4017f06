/// Small value types shared by the player, enemies and the session:
/// input frames, facing, transient effects.

use super::physics::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Frame input sampled once per tick.
/// Movement = continuous (held key), jump/dash = edge-triggered (fresh press).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dash: bool,
}

/// Explosion visual: frame-counted and self-expiring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Effect {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub frame: u32,
    pub duration: u32,
}

impl Effect {
    pub const EXPLOSION_RADIUS: i32 = 80;
    pub const EXPLOSION_FRAMES: u32 = 30;

    pub fn explosion(x: i32, y: i32) -> Self {
        Effect {
            x, y,
            radius: Self::EXPLOSION_RADIUS,
            frame: 0,
            duration: Self::EXPLOSION_FRAMES,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frame < self.duration
    }

    /// Fade progress: 0.0 (fresh) → 1.0 (gone).
    pub fn progress(&self) -> f32 {
        if self.duration == 0 { return 1.0; }
        (self.frame as f32 / self.duration as f32).min(1.0)
    }

    /// Advance one frame. Returns true if the effect just expired.
    pub fn tick(&mut self) -> bool {
        if self.frame < self.duration {
            self.frame += 1;
        }
        !self.is_active()
    }
}

/// A Shooter's bullet: constant velocity, aimed once at spawn time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: u32,
}

impl Projectile {
    pub const SIZE: i32 = 8;

    /// Spawn at (x, y) heading toward (tx, ty) at `speed` px/tick.
    /// A target exactly on the spawn point fires straight right.
    pub fn aimed(x: f32, y: f32, tx: f32, ty: f32, speed: f32) -> Self {
        let dx = tx - x;
        let dy = ty - y;
        let len = dx.hypot(dy);
        let (vx, vy) = if len > f32::EPSILON {
            (dx / len * speed, dy / len * speed)
        } else {
            (speed, 0.0)
        };
        Projectile { x, y, vx, vy, age: 0 }
    }

    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.age += 1;
    }

    pub fn rect(&self) -> Rect {
        let half = Self::SIZE / 2;
        Rect::new(self.x.round() as i32 - half, self.y.round() as i32 - half, Self::SIZE, Self::SIZE)
    }
}
