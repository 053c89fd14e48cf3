use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{GeoPoint, GridMapper, MAX_NEIGHBORHOOD_SIZE};

pub const DEFAULT_TILE_SIZE_DEGREES: f64 = 1e-4;
pub const DEFAULT_NEIGHBORHOOD_SIZE: u32 = 8;
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
pub const DEFAULT_INITIAL_VALUE_SCALE: u32 = 100;
pub const OAKES_CLASSROOM: GeoPoint = GeoPoint::new(36.98949379578401, -122.06277128548504);

/// World constants, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub tile_size_degrees: f64,
    pub neighborhood_size: u32,
    pub spawn_probability: f64,
    pub initial_value_scale: u32,
    pub grid_origin: GeoPoint,
    pub player_start: GeoPoint,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size_degrees: DEFAULT_TILE_SIZE_DEGREES,
            neighborhood_size: DEFAULT_NEIGHBORHOOD_SIZE,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            initial_value_scale: DEFAULT_INITIAL_VALUE_SCALE,
            grid_origin: GeoPoint::new(0.0, 0.0),
            player_start: OAKES_CLASSROOM,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tile_size_degrees must be finite and positive, got {0}")]
    TileSize(f64),
    #[error("neighborhood_size must be at most {max}, got {value}")]
    NeighborhoodSize { value: u32, max: u32 },
    #[error("spawn_probability must be within [0, 1], got {0}")]
    SpawnProbability(f64),
    #[error("{field} must be finite, got ({lat}, {lng})")]
    NonFinitePoint {
        field: &'static str,
        lat: f64,
        lng: f64,
    },
    #[error(
        "player_start ({lat}, {lng}) is too far from grid_origin for tile_size_degrees {tile_size_degrees}"
    )]
    StartOutsideGrid {
        lat: f64,
        lng: f64,
        tile_size_degrees: f64,
    },
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_size_degrees.is_finite() || self.tile_size_degrees <= 0.0 {
            return Err(ConfigError::TileSize(self.tile_size_degrees));
        }
        if self.neighborhood_size > MAX_NEIGHBORHOOD_SIZE {
            return Err(ConfigError::NeighborhoodSize {
                value: self.neighborhood_size,
                max: MAX_NEIGHBORHOOD_SIZE,
            });
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::SpawnProbability(self.spawn_probability));
        }
        for (field, point) in [
            ("grid_origin", self.grid_origin),
            ("player_start", self.player_start),
        ] {
            if !point.lat.is_finite() || !point.lng.is_finite() {
                return Err(ConfigError::NonFinitePoint {
                    field,
                    lat: point.lat,
                    lng: point.lng,
                });
            }
        }
        let mapper = GridMapper::new(self.tile_size_degrees, self.grid_origin);
        if mapper.try_to_grid(self.player_start).is_none() {
            return Err(ConfigError::StartOutsideGrid {
                lat: self.player_start.lat,
                lng: self.player_start.lng,
                tile_size_degrees: self.tile_size_degrees,
            });
        }
        Ok(())
    }
}
