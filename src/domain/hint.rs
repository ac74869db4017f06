/// Hint advisor: a stateless read of the world that produces short warnings.
///
/// Checks run in a fixed order and each contributes at most one advisory:
///
/// 1. gap ahead        → `JumpNow`
/// 2. enemy proximity  → `EnemyClose`
/// 3. goal proximity   → `AlmostThere`
/// 4. directional risk → `GoLeft` / `GoRight` / `BeCareful` (tie)
///
/// The directional check always answers, so one evaluation yields 1..=4
/// advisories.

use super::enemy::Enemy;
use super::entity::Facing;
use super::physics::{any_platform_hit, Platform, Rect};

const PROBE_DX: i32 = 40;
const PROBE_DY: i32 = 5;
const ENEMY_WINDOW_X: i32 = 100;
const ENEMY_WINDOW_Y: i32 = 80;
const GOAL_THRESHOLD: i32 = 200;
const RISK_BAND: i32 = 150;
const ENEMY_RISK: u32 = 3;
const GAP_RISK: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum HintKind {
    JumpNow,
    EnemyClose,
    AlmostThere,
    GoLeft,
    GoRight,
    BeCareful,
}

impl HintKind {
    pub const ALL: [HintKind; 6] = [
        HintKind::JumpNow,
        HintKind::EnemyClose,
        HintKind::AlmostThere,
        HintKind::GoLeft,
        HintKind::GoRight,
        HintKind::BeCareful,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HintKind::JumpNow => "Jump Now!",
            HintKind::EnemyClose => "Enemy Close!",
            HintKind::AlmostThere => "Almost There!",
            HintKind::GoLeft => "Go Left!",
            HintKind::GoRight => "Go Right!",
            HintKind::BeCareful => "Be Careful!",
        }
    }

    /// Stable identifier used for stats columns.
    pub fn key(self) -> &'static str {
        match self {
            HintKind::JumpNow => "jump_now",
            HintKind::EnemyClose => "enemy_close",
            HintKind::AlmostThere => "almost_there",
            HintKind::GoLeft => "go_left",
            HintKind::GoRight => "go_right",
            HintKind::BeCareful => "be_careful",
        }
    }
}

/// Everything the advisor looks at. Borrowed, never mutated.
pub struct HintScene<'a> {
    pub player: Rect,
    pub facing: Facing,
    pub platforms: &'a [Platform],
    pub enemies: &'a [Enemy],
    pub goal: Option<Rect>,
}

pub fn evaluate(scene: &HintScene<'_>) -> Vec<HintKind> {
    let mut hints = Vec::with_capacity(4);
    if gap_ahead(scene) {
        hints.push(HintKind::JumpNow);
    }
    if enemy_close(scene) {
        hints.push(HintKind::EnemyClose);
    }
    if near_goal(scene) {
        hints.push(HintKind::AlmostThere);
    }
    hints.push(direction(scene));
    hints
}

/// No platform under a probe shifted forward and slightly down.
fn gap_ahead(scene: &HintScene<'_>) -> bool {
    is_gap(scene, scene.facing.sign() * PROBE_DX)
}

fn is_gap(scene: &HintScene<'_>, dx: i32) -> bool {
    !any_platform_hit(&scene.player.translated(dx, PROBE_DY), scene.platforms)
}

fn enemy_close(scene: &HintScene<'_>) -> bool {
    let (px, py) = (scene.player.center_x(), scene.player.center_y());
    scene.enemies.iter().any(|e| {
        (e.rect.center_x() - px).abs() < ENEMY_WINDOW_X
            && (e.rect.center_y() - py).abs() < ENEMY_WINDOW_Y
    })
}

fn near_goal(scene: &HintScene<'_>) -> bool {
    scene.goal.map_or(false, |g| (g.center_x() - scene.player.center_x()).abs() < GOAL_THRESHOLD)
}

fn direction(scene: &HintScene<'_>) -> HintKind {
    let px = scene.player.center_x();
    let mut left_risk = 0;
    let mut right_risk = 0;

    for e in scene.enemies {
        let ex = e.rect.center_x();
        if (ex - px).abs() < RISK_BAND {
            if ex < px {
                left_risk += ENEMY_RISK;
            } else if ex > px {
                right_risk += ENEMY_RISK;
            }
        }
    }

    if is_gap(scene, -PROBE_DX) {
        left_risk += GAP_RISK;
    }
    if is_gap(scene, PROBE_DX) {
        right_risk += GAP_RISK;
    }

    match left_risk.cmp(&right_risk) {
        std::cmp::Ordering::Less => HintKind::GoLeft,
        std::cmp::Ordering::Greater => HintKind::GoRight,
        std::cmp::Ordering::Equal => HintKind::BeCareful,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enemy::EnemyKind;
    use crate::domain::tile::PlatformKind;

    fn floor(x0: i32, x1: i32, y: i32) -> Vec<Platform> {
        (x0..x1)
            .step_by(30)
            .map(|x| Platform { rect: Rect::new(x, y, 30, 30), kind: PlatformKind::Grass })
            .collect()
    }

    fn scene<'a>(player: Rect, platforms: &'a [Platform], enemies: &'a [Enemy], goal: Option<Rect>) -> HintScene<'a> {
        HintScene { player, facing: Facing::Right, platforms, enemies, goal }
    }

    #[test]
    fn safe_floor_only_says_be_careful() {
        let plats = floor(0, 600, 330);
        let s = scene(Rect::new(300, 300, 30, 30), &plats, &[], None);
        assert_eq!(evaluate(&s), vec![HintKind::BeCareful]);
    }

    #[test]
    fn gap_ahead_triggers_jump_and_go_left() {
        // floor ends at x = 330, player stands on its last tiles
        let plats = floor(0, 330, 330);
        let s = scene(Rect::new(290, 300, 30, 30), &plats, &[], None);
        assert_eq!(evaluate(&s), vec![HintKind::JumpNow, HintKind::GoLeft]);
    }

    #[test]
    fn gap_probe_follows_facing() {
        let plats = floor(300, 900, 330);
        let mut s = scene(Rect::new(310, 300, 30, 30), &plats, &[], None);
        assert!(!evaluate(&s).contains(&HintKind::JumpNow));
        s.facing = Facing::Left;
        assert!(evaluate(&s).contains(&HintKind::JumpNow));
    }

    #[test]
    fn enemy_window_is_strict() {
        let plats = floor(0, 900, 330);
        let player = Rect::new(300, 300, 30, 30);
        // centers: player 315; enemy x 384 → center 400 → dx 85
        let near = [Enemy::spawn(EnemyKind::Trap, 384, 300)];
        let s = scene(player, &plats, &near, None);
        assert!(evaluate(&s).contains(&HintKind::EnemyClose));
        // dx exactly 100 does not count
        let edge = [Enemy::spawn(EnemyKind::Trap, 399, 300)];
        let s = scene(player, &plats, &edge, None);
        assert!(!evaluate(&s).contains(&HintKind::EnemyClose));
        // vertical window
        let above = [Enemy::spawn(EnemyKind::Trap, 300, 200)];
        let s = scene(player, &plats, &above, None);
        assert!(!evaluate(&s).contains(&HintKind::EnemyClose));
    }

    #[test]
    fn enemy_on_right_points_left() {
        let plats = floor(0, 900, 330);
        let enemies = [Enemy::spawn(EnemyKind::Patrol, 420, 300)];
        let s = scene(Rect::new(300, 300, 30, 30), &plats, &enemies, None);
        assert_eq!(evaluate(&s).last(), Some(&HintKind::GoLeft));
    }

    #[test]
    fn goal_proximity() {
        let plats = floor(0, 900, 330);
        let player = Rect::new(300, 300, 30, 30);
        let s = scene(player, &plats, &[], Some(Rect::new(450, 300, 30, 30)));
        assert_eq!(evaluate(&s), vec![HintKind::AlmostThere, HintKind::BeCareful]);
        let s = scene(player, &plats, &[], Some(Rect::new(600, 300, 30, 30)));
        assert!(!evaluate(&s).contains(&HintKind::AlmostThere));
    }

    #[test]
    fn all_four_checks_keep_their_order() {
        let plats = floor(0, 330, 330);
        let enemies = [Enemy::spawn(EnemyKind::Trap, 240, 300)];
        let s = scene(Rect::new(290, 300, 30, 30), &plats, &enemies, Some(Rect::new(330, 270, 30, 30)));
        assert_eq!(
            evaluate(&s),
            vec![HintKind::JumpNow, HintKind::EnemyClose, HintKind::AlmostThere, HintKind::GoLeft],
        );
    }

    #[test]
    fn labels_and_keys_are_distinct() {
        let mut labels: Vec<_> = HintKind::ALL.iter().map(|k| k.label()).collect();
        let mut keys: Vec<_> = HintKind::ALL.iter().map(|k| k.key()).collect();
        labels.dedup();
        keys.sort();
        keys.dedup();
        assert_eq!(labels.len(), 6);
        assert_eq!(keys.len(), 6);
    }
}
