use tracing::debug;

use crate::world::{Cell, Coin};

use super::memento::MementoStore;
use super::player::PlayerInventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred(Coin),
    /// The giving side held no coins; nothing changed.
    SourceEmpty,
}

impl TransferOutcome {
    pub fn coin(&self) -> Option<Coin> {
        match self {
            Self::Transferred(coin) => Some(*coin),
            Self::SourceEmpty => None,
        }
    }
}

/// Moves the top coin of `cell` onto the player's stack and writes the cell's
/// new contents through to `mementos`.
pub fn collect(
    cell: &mut Cell,
    player: &mut PlayerInventory,
    mementos: &mut MementoStore,
) -> TransferOutcome {
    let Some(coin) = cell.coins.pop() else {
        debug!(address = %cell.address, "collect_source_empty");
        return TransferOutcome::SourceEmpty;
    };
    player.push(coin);
    mementos.set(cell.address, &cell.coins);
    TransferOutcome::Transferred(coin)
}

/// Moves the player's top coin onto `cell` and writes the cell's new contents
/// through to `mementos`.
pub fn deposit(
    cell: &mut Cell,
    player: &mut PlayerInventory,
    mementos: &mut MementoStore,
) -> TransferOutcome {
    let Some(coin) = player.pop() else {
        debug!(address = %cell.address, "deposit_source_empty");
        return TransferOutcome::SourceEmpty;
    };
    cell.coins.push(coin);
    mementos.set(cell.address, &cell.coins);
    TransferOutcome::Transferred(coin)
}
