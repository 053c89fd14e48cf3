use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, WorldConfig};
use crate::state::{
    self, clear_saved_state, load_saved_state, save_mementos, save_player, save_position,
    save_version, KeyValueStore, MementoStore, PlayerInventory, TransferOutcome,
};
use crate::view::{CacheView, NullView};
use crate::world::{
    CacheGenerator, Cell, CellId, CellRegistry, Coin, Direction, GeoPoint, GridAddress,
    GridMapper, Luck, Sha256Luck,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no cache is visible at {address}")]
    CacheNotVisible { address: GridAddress },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorUpdate {
    Applied,
    /// Tracking is off.
    Ignored,
    /// Non-finite or off the grid; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionTracking {
    #[default]
    Manual,
    Sensor,
}

/// One player's world: owns every registry and store for as long as it lives.
/// All mutations run to completion, persistence included, before returning.
pub struct GeoSession {
    config: WorldConfig,
    mapper: GridMapper,
    generator: CacheGenerator,
    registry: CellRegistry,
    mementos: MementoStore,
    player: PlayerInventory,
    position: GeoPoint,
    history: Vec<GeoPoint>,
    visible: Vec<CellId>,
    tracking: PositionTracking,
    store: Box<dyn KeyValueStore>,
    view: Box<dyn CacheView>,
}

impl GeoSession {
    pub fn start(config: WorldConfig, store: Box<dyn KeyValueStore>) -> Result<Self, SessionError> {
        Self::start_with(config, store, Box::new(Sha256Luck), Box::new(NullView))
    }

    pub fn start_with(
        config: WorldConfig,
        store: Box<dyn KeyValueStore>,
        luck: Box<dyn Luck>,
        view: Box<dyn CacheView>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let saved = load_saved_state(store.as_ref());
        let mapper = GridMapper::new(config.tile_size_degrees, config.grid_origin);
        let (position, mut history) = match saved.position {
            Some(position) if mapper.try_to_grid(position).is_some() => (position, saved.history),
            Some(position) => {
                warn!(
                    lat = position.lat,
                    lng = position.lng,
                    "saved_position_off_grid_starting_over"
                );
                (config.player_start, Vec::new())
            }
            None => (config.player_start, saved.history),
        };
        if history.is_empty() {
            history.push(position);
        }

        let mut session = Self {
            mapper,
            generator: CacheGenerator::new(
                luck,
                config.spawn_probability,
                config.initial_value_scale,
            ),
            config,
            registry: CellRegistry::default(),
            mementos: saved.mementos,
            player: saved.player,
            position,
            history,
            visible: Vec::new(),
            tracking: PositionTracking::Manual,
            store,
            view,
        };
        info!(
            lat = session.position.lat,
            lng = session.position.lng,
            points = session.player.points(),
            memento_count = session.mementos.len(),
            "session_started"
        );

        session.persist_or_warn("session_start");
        session.regenerate();
        session.view.player_moved(session.position, &session.history);
        Ok(session)
    }

    /// Returns false, leaving the player in place, when the step would leave the grid.
    pub fn step(&mut self, direction: Direction) -> bool {
        let next = self.mapper.step(self.position, direction);
        debug!(direction = direction.as_token(), "player_step");
        self.move_to(next)
    }

    /// Applies a position sample from the sensor. Ignored while tracking is off.
    pub fn sensor_update(&mut self, point: GeoPoint) -> SensorUpdate {
        if self.tracking != PositionTracking::Sensor {
            debug!(lat = point.lat, lng = point.lng, "sensor_update_ignored");
            return SensorUpdate::Ignored;
        }
        if self.move_to(point) {
            SensorUpdate::Applied
        } else {
            SensorUpdate::Rejected
        }
    }

    pub fn set_tracking(&mut self, enabled: bool) {
        self.tracking = if enabled {
            PositionTracking::Sensor
        } else {
            PositionTracking::Manual
        };
        info!(tracking = ?self.tracking, "position_tracking_changed");
    }

    fn move_to(&mut self, point: GeoPoint) -> bool {
        if self.mapper.try_to_grid(point).is_none() {
            warn!(lat = point.lat, lng = point.lng, "position_off_grid_rejected");
            return false;
        }
        self.position = point;
        self.history.push(point);
        if let Err(error) = save_position(self.store.as_mut(), self.position, &self.history) {
            warn!(error = %error, "persist_position_failed");
        }
        self.regenerate();
        self.view.player_moved(self.position, &self.history);
        true
    }

    /// Rebuilds every visible cache around the player. Addresses with a memento
    /// are restored from it whatever the spawn roll says; others are generated
    /// and recorded on first sight.
    pub fn regenerate(&mut self) {
        self.view.caches_cleared();
        self.visible.clear();

        let center = self.mapper.to_grid(self.position);
        let mut generated = 0usize;
        for address in self
            .mapper
            .neighborhood(center, self.config.neighborhood_size)
        {
            let coins = if let Some(coins) = self.mementos.get(address) {
                coins.to_vec()
            } else if self.generator.should_spawn(address) {
                let coins = self.generator.generate(address);
                self.mementos.set(address, &coins);
                generated += 1;
                debug!(address = %address, coin_count = coins.len(), "cache_generated");
                coins
            } else {
                continue;
            };

            let id = self.registry.get(address, &self.mapper);
            if let Some(cell) = self.registry.cell_mut(id) {
                cell.coins = coins;
                self.view.cache_materialized(cell);
            }
            self.visible.push(id);
        }

        if generated > 0 {
            if let Err(error) = save_mementos(self.store.as_mut(), &self.mementos) {
                warn!(error = %error, "persist_mementos_failed");
            }
        }
        info!(
            center = %center,
            visible_count = self.visible.len(),
            generated,
            "neighborhood_regenerated"
        );
    }

    pub fn collect(&mut self, address: GridAddress) -> Result<TransferOutcome, SessionError> {
        let id = self.visible_cell_id(address)?;
        let cell = self
            .registry
            .cell_mut(id)
            .ok_or(SessionError::CacheNotVisible { address })?;
        let outcome = state::collect(cell, &mut self.player, &mut self.mementos);
        if let TransferOutcome::Transferred(coin) = outcome {
            self.view.cache_changed(cell);
            info!(
                coin = %coin,
                address = %address,
                points = self.player.points(),
                "coin_collected"
            );
            self.persist_transfer();
        }
        Ok(outcome)
    }

    pub fn deposit(&mut self, address: GridAddress) -> Result<TransferOutcome, SessionError> {
        let id = self.visible_cell_id(address)?;
        let cell = self
            .registry
            .cell_mut(id)
            .ok_or(SessionError::CacheNotVisible { address })?;
        let outcome = state::deposit(cell, &mut self.player, &mut self.mementos);
        if let TransferOutcome::Transferred(coin) = outcome {
            self.view.cache_changed(cell);
            info!(
                coin = %coin,
                address = %address,
                points = self.player.points(),
                "coin_deposited"
            );
            self.persist_transfer();
        }
        Ok(outcome)
    }

    /// Forgets every visited cache and the player's coins, then starts over at
    /// the configured start point.
    pub fn reset(&mut self) {
        if let Err(error) = clear_saved_state(self.store.as_mut()) {
            warn!(error = %error, "clear_saved_state_failed");
        }
        self.mementos.clear();
        self.player.clear();
        self.position = self.config.player_start;
        self.history.clear();
        self.history.push(self.position);
        info!("session_reset");

        self.persist_or_warn("session_reset");
        self.regenerate();
        self.view.player_moved(self.position, &self.history);
    }

    pub fn persist(&mut self) -> Result<(), state::SaveError> {
        let store = self.store.as_mut();
        save_version(store)?;
        save_position(store, self.position, &self.history)?;
        save_mementos(store, &self.mementos)?;
        save_player(store, &self.player)
    }

    fn persist_or_warn(&mut self, reason: &'static str) {
        if let Err(error) = self.persist() {
            warn!(reason, error = %error, "persist_failed");
        }
    }

    fn persist_transfer(&mut self) {
        let store = self.store.as_mut();
        let result =
            save_mementos(store, &self.mementos).and_then(|()| save_player(store, &self.player));
        if let Err(error) = result {
            warn!(error = %error, "persist_transfer_failed");
        }
    }

    fn visible_cell_id(&self, address: GridAddress) -> Result<CellId, SessionError> {
        self.registry
            .lookup(address)
            .filter(|id| self.visible.contains(id))
            .ok_or(SessionError::CacheNotVisible { address })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn player_address(&self) -> GridAddress {
        self.mapper.to_grid(self.position)
    }

    pub fn history(&self) -> &[GeoPoint] {
        &self.history
    }

    pub fn tracking(&self) -> PositionTracking {
        self.tracking
    }

    pub fn points(&self) -> usize {
        self.player.points()
    }

    pub fn player_coins(&self) -> &[Coin] {
        self.player.coins()
    }

    pub fn visible_caches(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.visible.iter().filter_map(|id| self.registry.cell(*id))
    }

    pub fn visible_cache(&self, address: GridAddress) -> Option<&Cell> {
        let id = self.visible_cell_id(address).ok()?;
        self.registry.cell(id)
    }

    /// Flyweight handle for `address`, if one was ever created in this session.
    pub fn cell_handle(&self, address: GridAddress) -> Option<CellId> {
        self.registry.lookup(address)
    }

    pub fn mementos(&self) -> &MementoStore {
        &self.mementos
    }

    /// Coins currently held anywhere: every memento plus the player.
    pub fn coin_census(&self) -> usize {
        self.mementos.total_coins() + self.player.points()
    }

    /// Coins ever minted across the addresses this session has recorded.
    pub fn minted_total(&self) -> usize {
        self.mementos
            .iter()
            .map(|(address, _)| self.generator.initial_value(address) as usize)
            .sum()
    }

    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }
}
