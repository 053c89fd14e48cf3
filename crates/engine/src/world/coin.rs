use std::fmt;

use serde::{Deserialize, Serialize};

use super::grid::GridAddress;

/// A minted coin. Only its custody ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub origin: GridAddress,
    pub serial: u32,
}

impl Coin {
    pub const fn new(origin: GridAddress, serial: u32) -> Self {
        Self { origin, serial }
    }

    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.origin.i, self.origin.j, self.serial)
    }
}
