use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::world::{Coin, GeoPoint};

use super::memento::MementoStore;
use super::player::PlayerInventory;
use super::storage::{KeyValueStore, StorageError};

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_VERSION_KEY: &str = "save_version";
pub const PLAYER_POSITION_KEY: &str = "player_position";
pub const PLAYER_POINTS_KEY: &str = "player_points";
pub const MOVEMENT_HISTORY_KEY: &str = "movement_history";
pub const CACHE_MEMENTOS_KEY: &str = "cache_mementos";
pub const PLAYER_COINS_KEY: &str = "player_coins";

const ALL_KEYS: [&str; 6] = [
    SAVE_VERSION_KEY,
    PLAYER_POSITION_KEY,
    PLAYER_POINTS_KEY,
    MOVEMENT_HISTORY_KEY,
    CACHE_MEMENTOS_KEY,
    PLAYER_COINS_KEY,
];

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SavedState {
    pub position: Option<GeoPoint>,
    pub history: Vec<GeoPoint>,
    pub mementos: MementoStore,
    pub player: PlayerInventory,
}

/// Reads every key independently; anything missing or unreadable falls back to
/// its default so startup never fails on storage.
pub fn load_saved_state(store: &dyn KeyValueStore) -> SavedState {
    if let Some(version) = load_value::<u32>(store, SAVE_VERSION_KEY) {
        if version != SAVE_VERSION {
            warn!(
                expected = SAVE_VERSION,
                actual = version,
                "save_version_mismatch_starting_fresh"
            );
            return SavedState::default();
        }
    }

    let mementos = match load_raw(store, CACHE_MEMENTOS_KEY) {
        Some(raw) => MementoStore::from_json(&raw),
        None => MementoStore::default(),
    };
    let player = PlayerInventory::from_coins(
        load_value::<Vec<Coin>>(store, PLAYER_COINS_KEY).unwrap_or_default(),
    );
    if let Some(points) = load_value::<usize>(store, PLAYER_POINTS_KEY) {
        if points != player.points() {
            warn!(
                saved_points = points,
                coin_count = player.points(),
                "player_points_rederived_from_coins"
            );
        }
    }

    SavedState {
        position: load_value::<GeoPoint>(store, PLAYER_POSITION_KEY),
        history: load_value::<Vec<GeoPoint>>(store, MOVEMENT_HISTORY_KEY).unwrap_or_default(),
        mementos,
        player,
    }
}

pub fn save_position(
    store: &mut dyn KeyValueStore,
    position: GeoPoint,
    history: &[GeoPoint],
) -> Result<(), SaveError> {
    save_value(store, PLAYER_POSITION_KEY, &position)?;
    save_value(store, MOVEMENT_HISTORY_KEY, history)
}

pub fn save_mementos(
    store: &mut dyn KeyValueStore,
    mementos: &MementoStore,
) -> Result<(), SaveError> {
    let json = mementos.to_json().map_err(|source| SaveError::Encode {
        key: CACHE_MEMENTOS_KEY,
        source,
    })?;
    store.save(CACHE_MEMENTOS_KEY, &json)?;
    Ok(())
}

pub fn save_player(
    store: &mut dyn KeyValueStore,
    player: &PlayerInventory,
) -> Result<(), SaveError> {
    save_value(store, PLAYER_COINS_KEY, player.coins())?;
    save_value(store, PLAYER_POINTS_KEY, &player.points())
}

pub fn save_version(store: &mut dyn KeyValueStore) -> Result<(), SaveError> {
    save_value(store, SAVE_VERSION_KEY, &SAVE_VERSION)
}

pub fn clear_saved_state(store: &mut dyn KeyValueStore) -> Result<(), SaveError> {
    for key in ALL_KEYS {
        store.remove(key)?;
    }
    Ok(())
}

fn save_value<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), SaveError> {
    let json = serde_json::to_string(value).map_err(|source| SaveError::Encode { key, source })?;
    store.save(key, &json)?;
    Ok(())
}

fn load_raw(store: &dyn KeyValueStore, key: &'static str) -> Option<String> {
    match store.load(key) {
        Ok(value) => value,
        Err(error) => {
            warn!(key, error = %error, "save_key_unavailable");
            None
        }
    }
}

fn load_value<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &'static str) -> Option<T> {
    let raw = load_raw(store, key)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, error = %error, "save_key_unreadable");
            None
        }
    }
}
