use crate::world::Coin;

/// Coins in the player's custody; the most recently collected is on top.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlayerInventory {
    coins: Vec<Coin>,
}

impl PlayerInventory {
    pub fn from_coins(coins: Vec<Coin>) -> Self {
        Self { coins }
    }

    pub fn points(&self) -> usize {
        self.coins.len()
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub(crate) fn push(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    pub(crate) fn pop(&mut self) -> Option<Coin> {
        self.coins.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.coins.clear();
    }
}
