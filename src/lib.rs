pub mod config;
pub mod error;
pub mod follower;
pub mod grid;
pub mod pathfinding;

pub use error::GridError;
pub use follower::PathFollower;
pub use grid::{Grid, FREE, OBSTACLE};
pub use pathfinding::{GridPathfinder, GridSource, Position};
