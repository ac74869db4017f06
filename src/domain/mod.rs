pub mod enemy;
pub mod entity;
pub mod hint;
pub mod physics;
pub mod player;
pub mod spawn;
pub mod tile;
