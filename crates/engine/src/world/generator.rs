use super::coin::Coin;
use super::grid::GridAddress;
use super::luck::Luck;

fn spawn_key(address: GridAddress) -> String {
    format!("{},{}", address.i, address.j)
}

fn initial_value_key(address: GridAddress) -> String {
    format!("{},{},initialValue", address.i, address.j)
}

/// Pure function of address and luck: decides where caches exist and what they
/// start with.
pub struct CacheGenerator {
    luck: Box<dyn Luck>,
    spawn_probability: f64,
    initial_value_scale: u32,
}

impl CacheGenerator {
    pub fn new(luck: Box<dyn Luck>, spawn_probability: f64, initial_value_scale: u32) -> Self {
        Self {
            luck,
            spawn_probability,
            initial_value_scale,
        }
    }

    pub fn should_spawn(&self, address: GridAddress) -> bool {
        self.luck.luck(&spawn_key(address)) < self.spawn_probability
    }

    pub fn initial_value(&self, address: GridAddress) -> u32 {
        let roll = self.luck.luck(&initial_value_key(address));
        (roll * f64::from(self.initial_value_scale)).floor() as u32
    }

    /// Mints the initial coins for `address`, serials ascending from zero.
    pub fn generate(&self, address: GridAddress) -> Vec<Coin> {
        (0..self.initial_value(address))
            .map(|serial| Coin::new(address, serial))
            .collect()
    }
}

impl std::fmt::Debug for CacheGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheGenerator")
            .field("spawn_probability", &self.spawn_probability)
            .field("initial_value_scale", &self.initial_value_scale)
            .finish_non_exhaustive()
    }
}
