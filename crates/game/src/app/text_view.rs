use std::collections::BTreeMap;

use geocoin_engine::{CacheView, Cell, GeoPoint, GridAddress};

/// Prints a short summary of what the session shows after every move.
#[derive(Debug, Default)]
pub(crate) struct TextView {
    caches: BTreeMap<GridAddress, usize>,
}

impl TextView {
    fn summary(&self, position: GeoPoint, steps: usize) -> String {
        let total: usize = self.caches.values().sum();
        format!(
            "at ({:.6}, {:.6}) after {} moves: {} caches nearby holding {} coins",
            position.lat,
            position.lng,
            steps,
            self.caches.len(),
            total
        )
    }
}

impl CacheView for TextView {
    fn caches_cleared(&mut self) {
        self.caches.clear();
    }

    fn cache_materialized(&mut self, cell: &Cell) {
        self.caches.insert(cell.address, cell.value());
    }

    fn cache_changed(&mut self, cell: &Cell) {
        self.caches.insert(cell.address, cell.value());
        println!("cache {} now holds {} coins", cell.address, cell.value());
    }

    fn player_moved(&mut self, position: GeoPoint, history: &[GeoPoint]) {
        println!("{}", self.summary(position, history.len().saturating_sub(1)));
    }
}
