use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::world::{Coin, GridAddress};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MementoRecord {
    i: i32,
    j: i32,
    coins: Vec<Coin>,
}

/// Authoritative coin contents per visited address, independent of any cell
/// currently on screen.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MementoStore {
    records: BTreeMap<GridAddress, Vec<Coin>>,
}

impl MementoStore {
    pub fn has(&self, address: GridAddress) -> bool {
        self.records.contains_key(&address)
    }

    pub fn get(&self, address: GridAddress) -> Option<&[Coin]> {
        self.records.get(&address).map(Vec::as_slice)
    }

    pub fn set(&mut self, address: GridAddress, coins: &[Coin]) {
        self.records.insert(address, coins.to_vec());
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridAddress, &[Coin])> {
        self.records
            .iter()
            .map(|(address, coins)| (*address, coins.as_slice()))
    }

    pub fn total_coins(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let records = self
            .records
            .iter()
            .map(|(address, coins)| MementoRecord {
                i: address.i,
                j: address.j,
                coins: coins.clone(),
            })
            .collect::<Vec<_>>();
        serde_json::to_string(&records)
    }

    /// Restores records one at a time. A record that fails to parse, or that
    /// repeats an address already restored, is dropped so its address counts
    /// as never visited. An unreadable document restores nothing.
    pub fn from_json(raw: &str) -> Self {
        let mut store = Self::default();
        let values = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
            Ok(values) => values,
            Err(error) => {
                warn!(error = %error, "memento_document_unreadable");
                return store;
            }
        };

        for (index, value) in values.into_iter().enumerate() {
            let record = match serde_json::from_value::<MementoRecord>(value) {
                Ok(record) => record,
                Err(error) => {
                    warn!(index, error = %error, "memento_record_skipped");
                    continue;
                }
            };
            let address = GridAddress::new(record.i, record.j);
            match store.records.entry(address) {
                Entry::Vacant(slot) => {
                    slot.insert(record.coins);
                }
                Entry::Occupied(_) => {
                    warn!(index, address = %address, "memento_record_duplicate_address_skipped");
                }
            }
        }
        store
    }
}
