mod generator;
mod grid;

pub use generator::{GeneratedMap, MapGenerator};
pub use grid::{Grid, GridError, Room, Tile};
