//! Subcommand implementations.

pub mod album;
pub mod migrate;
pub mod photo;
pub mod pin;
pub mod region;

use thiserror::Error;
use virtual_tourist::config::database_url_from_env;
use virtual_tourist::{
    AppConfig, AppState, ConfigError, InitError, Pin, PipelineError, RepositoryError, Store,
};
use virtual_tourist_core::{Coordinate, CoordinateError, PhotoId, RegionError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("startup failed: {0}")]
    Init(#[from] InitError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] CoordinateError),

    #[error("invalid region: {0}")]
    Region(#[from] RegionError),

    #[error("no pin at {0}")]
    PinNotFound(Coordinate),

    #[error("no photo with id {0}")]
    PhotoNotFound(PhotoId),

    #[error("{failed} of {total} images failed to download")]
    DownloadsFailed { failed: usize, total: usize },
}

/// Open the store without requiring a Flickr API key.
async fn open_store() -> Result<Store, CommandError> {
    let database_url = database_url_from_env();
    Ok(Store::open(&database_url).await?)
}

/// Load the full configuration and bring up store and pipeline.
async fn init_state() -> Result<AppState, CommandError> {
    let config = AppConfig::from_env()?;
    Ok(AppState::init(&config).await?)
}

/// The pin at exactly this coordinate, or `PinNotFound`.
async fn require_pin(store: &Store, latitude: f64, longitude: f64) -> Result<Pin, CommandError> {
    let coordinate = Coordinate::new(latitude, longitude)?;
    store
        .find_pin(coordinate)
        .await?
        .ok_or(CommandError::PinNotFound(coordinate))
}
