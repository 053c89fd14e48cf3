mod atomic_io;
mod memento;
mod player;
mod save;
mod storage;
mod transfer;

pub use memento::MementoStore;
pub use player::PlayerInventory;
pub use save::{
    clear_saved_state, load_saved_state, save_mementos, save_player, save_position, save_version,
    SaveError, SavedState, CACHE_MEMENTOS_KEY, MOVEMENT_HISTORY_KEY, PLAYER_COINS_KEY,
    PLAYER_POINTS_KEY, PLAYER_POSITION_KEY, SAVE_VERSION, SAVE_VERSION_KEY,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use transfer::{collect, deposit, TransferOutcome};
