/// Rectangle geometry shared by every system.
///
/// ## Coordinates
///
/// World space is in pixels, origin top-left, +y pointing down.
/// A level tile at grid (col, row) covers
/// `(col * TILE_SIZE, row * TILE_SIZE, TILE_SIZE, TILE_SIZE)`.
///
/// ## Overlap rule
///
/// Two rectangles intersect only when their interiors overlap:
/// rectangles that merely share an edge do NOT intersect, and a rectangle
/// with zero width or height never intersects anything. Collision
/// resolution snaps bodies flush against platform edges and relies on this
/// rule so that a body resting on a platform is not "inside" it.

use super::tile::PlatformKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline] pub fn left(&self) -> i32 { self.x }
    #[inline] pub fn right(&self) -> i32 { self.x + self.w }
    #[inline] pub fn top(&self) -> i32 { self.y }
    #[inline] pub fn bottom(&self) -> i32 { self.y + self.h }
    #[inline] pub fn center_x(&self) -> i32 { self.x + self.w / 2 }
    #[inline] pub fn center_y(&self) -> i32 { self.y + self.h / 2 }

    pub fn set_left(&mut self, v: i32) { self.x = v; }
    pub fn set_right(&mut self, v: i32) { self.x = v - self.w; }
    pub fn set_top(&mut self, v: i32) { self.y = v; }
    pub fn set_bottom(&mut self, v: i32) { self.y = v - self.h; }

    /// A copy shifted by (dx, dy).
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Strict interior overlap. See module docs.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.w <= 0 || self.h <= 0 || other.w <= 0 || other.h <= 0 {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Euclidean distance between the two centers.
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let dx = (other.center_x() - self.center_x()) as f32;
        let dy = (other.center_y() - self.center_y()) as f32;
        dx.hypot(dy)
    }
}

/// An immutable obstacle rectangle tagged with its rendering kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

/// Does any platform intersect `probe`?
pub fn any_platform_hit(probe: &Rect, platforms: &[Platform]) -> bool {
    platforms.iter().any(|p| p.rect.intersects(probe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0, 0, 30, 30);
        let b = Rect::new(29, 29, 30, 30);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 30, 30);
        assert!(!a.intersects(&Rect::new(30, 0, 30, 30)));
        assert!(!a.intersects(&Rect::new(0, 30, 30, 30)));
    }

    #[test]
    fn empty_rect_never_intersects() {
        let a = Rect::new(0, 0, 30, 30);
        assert!(!a.intersects(&Rect::new(5, 5, 0, 10)));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(10, 10, 30, 20);
        r.set_bottom(100);
        assert_eq!((r.top(), r.bottom()), (80, 100));
        r.set_right(50);
        assert_eq!((r.left(), r.right()), (20, 50));
        assert_eq!((r.w, r.h), (30, 20));
    }

    #[test]
    fn center_distance_is_euclidean() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(30, 40, 10, 10);
        assert!((a.center_distance(&b) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn platform_hit_checks_every_platform() {
        let plats = [
            Platform { rect: Rect::new(0, 0, 30, 30), kind: PlatformKind::Grass },
            Platform { rect: Rect::new(90, 0, 30, 30), kind: PlatformKind::Stone },
        ];
        assert!(any_platform_hit(&Rect::new(95, 5, 5, 5), &plats));
        assert!(!any_platform_hit(&Rect::new(40, 5, 5, 5), &plats));
    }
}
