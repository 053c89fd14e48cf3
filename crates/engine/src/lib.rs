use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod config;
pub mod session;
pub mod state;
pub mod view;
pub mod world;

pub use config::{ConfigError, WorldConfig, OAKES_CLASSROOM};
pub use session::{GeoSession, PositionTracking, SensorUpdate, SessionError};
pub use state::{
    FileStore, KeyValueStore, MementoStore, MemoryStore, PlayerInventory, SaveError,
    StorageError, TransferOutcome,
};
pub use view::{CacheView, NullView};
pub use world::{
    CacheGenerator, Cell, CellId, CellRegistry, Coin, Direction, GeoBounds, GeoPoint,
    GridAddress, GridMapper, Luck, Sha256Luck, GRID_INDEX_LIMIT, MAX_NEIGHBORHOOD_SIZE,
};

pub const SAVE_DIR_ENV_VAR: &str = "GEOCOIN_SAVE_DIR";
pub const DEFAULT_SAVE_DIR_NAME: &str = "save";
pub const CONFIG_FILE_NAME: &str = "geocoin.config.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub save_dir: PathBuf,
    pub config_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("GEOCOIN_SAVE_DIR is set but empty")]
    EmptySaveDir,
}

/// Save directory from `GEOCOIN_SAVE_DIR`, else `./save`. Created if missing.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let save_dir = match env::var(SAVE_DIR_ENV_VAR) {
        Ok(value) if value.trim().is_empty() => return Err(StartupError::EmptySaveDir),
        Ok(value) => PathBuf::from(value),
        Err(env::VarError::NotPresent) => env::current_dir()
            .map_err(StartupError::CurrentDir)?
            .join(DEFAULT_SAVE_DIR_NAME),
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: SAVE_DIR_ENV_VAR,
                source,
            })
        }
    };

    fs::create_dir_all(&save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: save_dir.clone(),
        source,
    })?;
    let save_dir = normalize_path(&save_dir);

    Ok(AppPaths {
        config_path: save_dir.join(CONFIG_FILE_NAME),
        save_dir,
    })
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
