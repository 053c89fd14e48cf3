use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest neighborhood radius the grid will enumerate.
pub const MAX_NEIGHBORHOOD_SIZE: u32 = 256;
/// Player cells are kept within this many tiles of the origin on each axis.
pub const GRID_INDEX_LIMIT: i32 = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Integer cell address anchored at the global grid origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridAddress {
    pub i: i32,
    pub j: i32,
}

impl GridAddress {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub fn chebyshev_distance(self, other: GridAddress) -> u32 {
        let di = (i64::from(self.i) - i64::from(other.i)).unsigned_abs();
        let dj = (i64::from(self.j) - i64::from(other.j)).unsigned_abs();
        di.max(dj) as u32
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    /// Half-open: the south and west edges belong to the cell, the north and
    /// east edges belong to its neighbours.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat < self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng < self.north_east.lng
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn grid_delta(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::South => (-1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    tile_size_degrees: f64,
    origin: GeoPoint,
}

impl GridMapper {
    pub fn new(tile_size_degrees: f64, origin: GeoPoint) -> Self {
        Self {
            tile_size_degrees,
            origin,
        }
    }

    /// Saturates at the `i32` range; use `try_to_grid` for untrusted points.
    pub fn to_grid(&self, point: GeoPoint) -> GridAddress {
        GridAddress {
            i: ((point.lat - self.origin.lat) / self.tile_size_degrees).floor() as i32,
            j: ((point.lng - self.origin.lng) / self.tile_size_degrees).floor() as i32,
        }
    }

    /// `None` for non-finite points and for cells beyond `GRID_INDEX_LIMIT`.
    pub fn try_to_grid(&self, point: GeoPoint) -> Option<GridAddress> {
        Some(GridAddress {
            i: self.axis_index(point.lat, self.origin.lat)?,
            j: self.axis_index(point.lng, self.origin.lng)?,
        })
    }

    fn axis_index(&self, value: f64, origin: f64) -> Option<i32> {
        let index = ((value - origin) / self.tile_size_degrees).floor();
        if index.is_finite() && index.abs() <= f64::from(GRID_INDEX_LIMIT) {
            Some(index as i32)
        } else {
            None
        }
    }

    pub fn to_geo(&self, address: GridAddress) -> GeoBounds {
        let size = self.tile_size_degrees;
        GeoBounds {
            south_west: GeoPoint {
                lat: self.origin.lat + f64::from(address.i) * size,
                lng: self.origin.lng + f64::from(address.j) * size,
            },
            north_east: GeoPoint {
                lat: self.origin.lat + (f64::from(address.i) + 1.0) * size,
                lng: self.origin.lng + (f64::from(address.j) + 1.0) * size,
            },
        }
    }

    pub fn cell_center(&self, address: GridAddress) -> GeoPoint {
        self.to_geo(address).center()
    }

    /// Moves one tile in `direction`, keeping the offset inside the cell.
    pub fn step(&self, point: GeoPoint, direction: Direction) -> GeoPoint {
        let (di, dj) = direction.grid_delta();
        GeoPoint {
            lat: point.lat + f64::from(di) * self.tile_size_degrees,
            lng: point.lng + f64::from(dj) * self.tile_size_degrees,
        }
    }

    /// Every address within `radius` (Chebyshev, inclusive) of `center`, row-major
    /// from the south-west corner. Addresses past the `i32` range are left out.
    pub fn neighborhood(&self, center: GridAddress, radius: u32) -> Vec<GridAddress> {
        let radius = i64::from(radius.min(MAX_NEIGHBORHOOD_SIZE));
        let side = (2 * radius + 1) as usize;
        let mut addresses = Vec::with_capacity(side * side);
        for di in -radius..=radius {
            let Ok(i) = i32::try_from(i64::from(center.i) + di) else {
                continue;
            };
            for dj in -radius..=radius {
                if let Ok(j) = i32::try_from(i64::from(center.j) + dj) {
                    addresses.push(GridAddress::new(i, j));
                }
            }
        }
        addresses
    }
}
