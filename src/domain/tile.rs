/// Tile symbols of a level grid and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

/// Side length of one grid tile in world pixels.
pub const TILE_SIZE: i32 = 30;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Grass,       // '#'
    Stone,       // 'S'
    Wood,        // 'W'
    EnemySpawn,  // 'E'
    Goal,        // 'G'
    PlayerSpawn, // 'P'
}

impl Tile {
    /// Map a level character to a tile. Unknown symbols are empty space.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            '#' => Tile::Grass,
            'S' => Tile::Stone,
            'W' => Tile::Wood,
            'E' => Tile::EnemySpawn,
            'G' => Tile::Goal,
            'P' => Tile::PlayerSpawn,
            _ => Tile::Empty,
        }
    }

    /// The platform kind of this tile, if it is solid.
    pub fn platform_kind(self) -> Option<PlatformKind> {
        match self {
            Tile::Grass => Some(PlatformKind::Grass),
            Tile::Stone => Some(PlatformKind::Stone),
            Tile::Wood => Some(PlatformKind::Wood),
            _ => None,
        }
    }
}

/// Rendering tag carried by every platform. Has no effect on collision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlatformKind {
    Grass,
    Stone,
    Wood,
}
