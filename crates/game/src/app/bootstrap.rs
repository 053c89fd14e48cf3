use geocoin_engine::{
    resolve_app_paths, AppPaths, FileStore, GeoSession, SessionError, Sha256Luck, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config_file::{load_world_config, ConfigFileError};
use super::text_view::TextView;

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
    pub(crate) session: GeoSession,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Geocoin Startup ===");

    let paths = resolve_app_paths()?;
    let config = load_world_config(&paths.config_path)?;
    info!(
        save_dir = %paths.save_dir.display(),
        tile_size_degrees = config.tile_size_degrees,
        neighborhood_size = config.neighborhood_size,
        spawn_probability = config.spawn_probability,
        "world_config_loaded"
    );

    let session = GeoSession::start_with(
        config,
        Box::new(FileStore::new(&paths.save_dir)),
        Box::new(Sha256Luck),
        Box::new(TextView::default()),
    )?;

    Ok(AppWiring { paths, session })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
