pub mod event;
pub mod level;
pub mod stats;
pub mod step;
pub mod world;
