mod cell;
mod coin;
mod generator;
mod grid;
mod luck;

pub use cell::{Cell, CellId, CellRegistry};
pub use coin::Coin;
pub use generator::CacheGenerator;
pub use grid::{
    Direction, GeoBounds, GeoPoint, GridAddress, GridMapper, GRID_INDEX_LIMIT, MAX_NEIGHBORHOOD_SIZE,
};
pub use luck::{Luck, Sha256Luck};
