use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geocoin_engine::{ConfigError, WorldConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ConfigFileError {
    #[error("read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse config '{path}' at {location}: {message}")]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("config '{path}' is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Missing file means defaults; a present file must parse and validate.
pub(crate) fn load_world_config(path: &Path) -> Result<WorldConfig, ConfigFileError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "world_config_missing_using_defaults");
            return Ok(WorldConfig::default());
        }
        Err(source) => {
            return Err(ConfigFileError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_world_config(&raw).map_err(|(location, message)| ConfigFileError::Parse {
        path: path.to_path_buf(),
        location,
        message,
    })?;
    config
        .validate()
        .map_err(|source| ConfigFileError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(config)
}

fn parse_world_config(raw: &str) -> Result<WorldConfig, (String, String)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldConfig>(&mut deserializer).map_err(|error| {
        let location = error.path().to_string();
        let source = error.into_inner();
        (location, source.to_string())
    })
}
