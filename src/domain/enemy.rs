/// Enemy behavior system.
///
/// Every enemy carries an immutable variant tag (`EnemyKind`) and a
/// variant-specific state (`EnemyState`). Behavior is looked up in the
/// registered table `BEHAVIORS`, indexed by tag: one spawn function and one
/// update function per variant, no trait objects. Adding a variant means
/// adding a tag, a state arm and a table row.
///
/// ## Update contract
///
/// The only external inputs to an update are the player's rectangle and a
/// random source (`UpdateCtx`). An update may change the enemy's own
/// rectangle and state, and nothing else. Every update returns the same
/// result shape (`EnemyTick`), which the session applies uniformly.
///
/// Contact damage (body or projectile touching the player) is NOT part of
/// the update; the session checks it separately via `Enemy::contact`.

use rand::{Rng, RngCore};

use super::entity::{Effect, Projectile};
use super::physics::Rect;

pub const ENEMY_SIZE: i32 = 32;

const PATROL_SPEED: i32 = 2;
const PATROL_RANGE: i32 = 100;

const CHASE_SPEED: i32 = 2;
const CHASE_RADIUS: f32 = 200.0;

const JUMP_AMPLITUDE: f32 = 40.0;
const JUMP_FREQUENCY: f32 = 0.1;
const FLY_AMPLITUDE: f32 = 30.0;
const FLY_FREQUENCY: f32 = 0.05;

const SHOOT_COOLDOWN: u32 = 90;
const BULLET_SPEED: f32 = 4.0;
const BULLET_LIFETIME: u32 = 180;
const MAX_BULLETS: usize = 6;

const EXPLODE_TRIGGER_RADIUS: f32 = 60.0;
const EXPLODE_DAMAGE_RADIUS: f32 = 80.0;

const TELEPORT_INTERVAL: u32 = 120;
const TELEPORT_RANGE_X: i32 = 120;
const TELEPORT_RANGE_Y: i32 = 60;

const DROP_BAND: i32 = 20;
const DROP_SPEED: i32 = 6;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EnemyKind {
    Patrol,
    Chase,
    JumpOscillate,
    FlyOscillate,
    Shooter,
    Exploder,
    Teleporter,
    Dropper,
    Trap,
}

impl EnemyKind {
    pub fn behavior(self) -> &'static Behavior {
        &BEHAVIORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.behavior().name
    }

    /// Parse a config name (case-insensitive; a few aliases accepted).
    pub fn from_name(s: &str) -> Option<EnemyKind> {
        let lower = s.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "patrolling" => "patrol",
            "chasing" | "chaser" => "chase",
            "jumping" | "jumper" => "jump",
            "flying" | "flyer" => "fly",
            "shooting" => "shooter",
            "exploding" => "exploder",
            "teleporting" => "teleporter",
            "dropping" => "dropper",
            other => other,
        };
        BEHAVIORS.iter().find(|b| b.name == alias).map(|b| b.kind)
    }
}

/// Variant-specific fields.
#[derive(Clone, Debug, PartialEq)]
pub enum EnemyState {
    Patrol { origin_x: i32, direction: i32 },
    Chase,
    Oscillate { base_y: i32, phase: u32 },
    Shooter { cooldown: u32, bullets: Vec<Projectile> },
    Exploder { spent: bool },
    Teleporter { timer: u32 },
    Dropper { falling: bool },
    Trap,
}

/// Uniform per-tick result of any enemy update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyTick {
    pub effect: Option<Effect>,
    pub damage_to_player: bool,
}

/// Everything an enemy may look at during its update.
pub struct UpdateCtx<'a> {
    pub player: Rect,
    pub rng: &'a mut dyn RngCore,
}

type SpawnFn = fn(x: i32, y: i32) -> EnemyState;
type UpdateFn = fn(&mut Enemy, &mut UpdateCtx<'_>) -> EnemyTick;

/// A registered variant: its tag, config name, render glyph and functions.
pub struct Behavior {
    pub kind: EnemyKind,
    pub name: &'static str,
    pub glyph: char,
    spawn: SpawnFn,
    update: UpdateFn,
}

/// The variant registry, in `EnemyKind` discriminant order.
pub static BEHAVIORS: [Behavior; 9] = [
    Behavior { kind: EnemyKind::Patrol, name: "patrol", glyph: 'p', spawn: spawn_patrol, update: update_patrol },
    Behavior { kind: EnemyKind::Chase, name: "chase", glyph: 'c', spawn: spawn_chase, update: update_chase },
    Behavior { kind: EnemyKind::JumpOscillate, name: "jump", glyph: 'j', spawn: spawn_oscillate, update: update_jumper },
    Behavior { kind: EnemyKind::FlyOscillate, name: "fly", glyph: 'f', spawn: spawn_oscillate, update: update_flyer },
    Behavior { kind: EnemyKind::Shooter, name: "shooter", glyph: 's', spawn: spawn_shooter, update: update_shooter },
    Behavior { kind: EnemyKind::Exploder, name: "exploder", glyph: 'x', spawn: spawn_exploder, update: update_exploder },
    Behavior { kind: EnemyKind::Teleporter, name: "teleporter", glyph: 't', spawn: spawn_teleporter, update: update_teleporter },
    Behavior { kind: EnemyKind::Dropper, name: "dropper", glyph: 'd', spawn: spawn_dropper, update: update_dropper },
    Behavior { kind: EnemyKind::Trap, name: "trap", glyph: '^', spawn: spawn_trap, update: update_trap },
];

#[derive(Clone, Debug)]
pub struct Enemy {
    kind: EnemyKind,
    pub rect: Rect,
    pub state: EnemyState,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, x: i32, y: i32) -> Self {
        Enemy {
            kind,
            rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            state: (kind.behavior().spawn)(x, y),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn update(&mut self, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
        if self.is_spent() {
            return EnemyTick::default();
        }
        (self.kind.behavior().update)(self, ctx)
    }

    /// Has this enemy removed itself from play (Exploder after detonation)?
    pub fn is_spent(&self) -> bool {
        matches!(self.state, EnemyState::Exploder { spent: true })
    }

    pub fn projectiles(&self) -> &[Projectile] {
        match &self.state {
            EnemyState::Shooter { bullets, .. } => bullets,
            _ => &[],
        }
    }

    /// Is the player touching this enemy's body or one of its projectiles?
    /// Projectiles that hit are consumed.
    pub fn contact(&mut self, player: &Rect) -> bool {
        if self.is_spent() { return false; }
        let mut hit = self.rect.intersects(player);
        if let EnemyState::Shooter { bullets, .. } = &mut self.state {
            let before = bullets.len();
            bullets.retain(|b| !b.rect().intersects(player));
            hit |= bullets.len() != before;
        }
        hit
    }
}

// ══════════════════════════════════════════════════════════════
// Spawn functions
// ══════════════════════════════════════════════════════════════

fn spawn_patrol(x: i32, _y: i32) -> EnemyState {
    EnemyState::Patrol { origin_x: x, direction: 1 }
}

fn spawn_chase(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Chase
}

fn spawn_oscillate(_x: i32, y: i32) -> EnemyState {
    EnemyState::Oscillate { base_y: y, phase: 0 }
}

fn spawn_shooter(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Shooter { cooldown: SHOOT_COOLDOWN, bullets: Vec::with_capacity(MAX_BULLETS) }
}

fn spawn_exploder(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Exploder { spent: false }
}

fn spawn_teleporter(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Teleporter { timer: 0 }
}

fn spawn_dropper(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Dropper { falling: false }
}

fn spawn_trap(_x: i32, _y: i32) -> EnemyState {
    EnemyState::Trap
}

// ══════════════════════════════════════════════════════════════
// Update functions
// ══════════════════════════════════════════════════════════════

fn update_patrol(e: &mut Enemy, _ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    if let EnemyState::Patrol { origin_x, direction } = &mut e.state {
        e.rect.x += PATROL_SPEED * *direction;
        if (e.rect.x - *origin_x).abs() > PATROL_RANGE {
            *direction = -*direction;
        }
    }
    EnemyTick::default()
}

fn update_chase(e: &mut Enemy, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    if e.rect.center_distance(&ctx.player) < CHASE_RADIUS {
        if ctx.player.center_x() < e.rect.center_x() {
            e.rect.x -= CHASE_SPEED;
        } else {
            e.rect.x += CHASE_SPEED;
        }
    }
    EnemyTick::default()
}

fn oscillate(e: &mut Enemy, amplitude: f32, frequency: f32) {
    if let EnemyState::Oscillate { base_y, phase } = &mut e.state {
        *phase += 1;
        let offset = ((*phase as f32) * frequency).sin() * amplitude;
        e.rect.y = *base_y + offset as i32;
    }
}

fn update_jumper(e: &mut Enemy, _ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    oscillate(e, JUMP_AMPLITUDE, JUMP_FREQUENCY);
    EnemyTick::default()
}

fn update_flyer(e: &mut Enemy, _ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    oscillate(e, FLY_AMPLITUDE, FLY_FREQUENCY);
    EnemyTick::default()
}

fn update_shooter(e: &mut Enemy, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    let (cx, cy) = (e.rect.center_x() as f32, e.rect.center_y() as f32);
    if let EnemyState::Shooter { cooldown, bullets } = &mut e.state {
        for b in bullets.iter_mut() {
            b.advance();
        }
        bullets.retain(|b| b.age < BULLET_LIFETIME);

        *cooldown = cooldown.saturating_sub(1);
        if *cooldown == 0 {
            let (tx, ty) = (ctx.player.center_x() as f32, ctx.player.center_y() as f32);
            bullets.push(Projectile::aimed(cx, cy, tx, ty, BULLET_SPEED));
            if bullets.len() > MAX_BULLETS {
                bullets.remove(0);
            }
            *cooldown = SHOOT_COOLDOWN;
        }
    }
    EnemyTick::default()
}

fn update_exploder(e: &mut Enemy, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    let dist = e.rect.center_distance(&ctx.player);
    if dist >= EXPLODE_TRIGGER_RADIUS {
        return EnemyTick::default();
    }
    e.state = EnemyState::Exploder { spent: true };
    tracing::debug!("exploder at ({}, {}) detonated, player {:.0}px away", e.rect.x, e.rect.y, dist);
    EnemyTick {
        effect: Some(Effect::explosion(e.rect.center_x(), e.rect.center_y())),
        damage_to_player: dist < EXPLODE_DAMAGE_RADIUS,
    }
}

fn update_teleporter(e: &mut Enemy, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    if let EnemyState::Teleporter { timer } = &mut e.state {
        *timer += 1;
        if *timer >= TELEPORT_INTERVAL {
            *timer = 0;
            let dx = ctx.rng.gen_range(-TELEPORT_RANGE_X..=TELEPORT_RANGE_X);
            let dy = ctx.rng.gen_range(-TELEPORT_RANGE_Y..=0);
            e.rect.x = ctx.player.x + dx;
            e.rect.y = ctx.player.y + dy;
        }
    }
    EnemyTick::default()
}

fn update_dropper(e: &mut Enemy, ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    if let EnemyState::Dropper { falling } = &mut e.state {
        if !*falling
            && (ctx.player.center_x() - e.rect.center_x()).abs() <= DROP_BAND
            && ctx.player.center_y() > e.rect.center_y()
        {
            *falling = true;
        }
        if *falling {
            e.rect.y += DROP_SPEED;
        }
    }
    EnemyTick::default()
}

fn update_trap(_e: &mut Enemy, _ctx: &mut UpdateCtx<'_>) -> EnemyTick {
    EnemyTick::default()
}
