use std::collections::HashMap;

use super::coin::Coin;
use super::grid::{GeoBounds, GridAddress, GridMapper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub u32);

/// Flyweight for one grid address: its geometry plus a working copy of the coins
/// it holds. The memento store, not this copy, is authoritative.
#[derive(Debug, Clone)]
pub struct Cell {
    pub id: CellId,
    pub address: GridAddress,
    pub bounds: GeoBounds,
    pub coins: Vec<Coin>,
}

impl Cell {
    pub fn value(&self) -> usize {
        self.coins.len()
    }

    pub fn top_coin(&self) -> Option<&Coin> {
        self.coins.last()
    }
}

#[derive(Debug, Default, Clone)]
pub struct CellRegistry {
    cells: Vec<Cell>,
    ids_by_address: HashMap<GridAddress, CellId>,
}

impl CellRegistry {
    /// Returns the handle registered for `address`, creating an empty cell the
    /// first time the address is seen.
    pub fn get(&mut self, address: GridAddress, mapper: &GridMapper) -> CellId {
        if let Some(id) = self.ids_by_address.get(&address) {
            return *id;
        }

        let id = CellId(self.cells.len() as u32);
        self.cells.push(Cell {
            id,
            address,
            bounds: mapper.to_geo(address),
            coins: Vec::new(),
        });
        self.ids_by_address.insert(address, id);
        id
    }

    pub fn lookup(&self, address: GridAddress) -> Option<CellId> {
        self.ids_by_address.get(&address).copied()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0 as usize)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
