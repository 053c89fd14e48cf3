use crate::world::{Cell, GeoPoint};

/// Presentation side of the session. The session tells it what became visible;
/// it never reads anything back.
pub trait CacheView {
    fn caches_cleared(&mut self) {}
    fn cache_materialized(&mut self, _cell: &Cell) {}
    fn cache_changed(&mut self, _cell: &Cell) {}
    fn player_moved(&mut self, _position: GeoPoint, _history: &[GeoPoint]) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl CacheView for NullView {}
