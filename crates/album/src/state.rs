//! Application state shared by every collaborator.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::RepositoryError;
use crate::flickr::{FlickrClient, FlickrError};
use crate::pipeline::PhotoPipeline;
use crate::store::Store;

/// Error bringing the application up.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("storage unavailable: {0}")]
    Storage(#[from] RepositoryError),
    #[error("flickr client: {0}")]
    Flickr(#[from] FlickrError),
}

/// Application state.
///
/// This struct is cheaply cloneable via `Arc` and hands out the store and
/// the photo pipeline sharing it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    pipeline: PhotoPipeline,
}

impl AppState {
    /// Open the database, apply migrations and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `InitError::Storage` if the database cannot be opened or
    /// migrated, `InitError::Flickr` if the HTTP client cannot be built.
    pub async fn init(config: &AppConfig) -> Result<Self, InitError> {
        let store = Store::open(&config.database_url).await?;
        let flickr = FlickrClient::new(&config.flickr)?;

        Ok(Self::new(store, flickr))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn new(store: Store, flickr: FlickrClient) -> Self {
        let pipeline = PhotoPipeline::new(store.clone(), flickr);

        Self {
            inner: Arc::new(AppStateInner {
                store,
                pipeline,
            }),
        }
    }

    /// Get a reference to the pin/photo store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the photo pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &PhotoPipeline {
        &self.inner.pipeline
    }

    /// Close the database pool.
    pub async fn shutdown(&self) {
        self.inner.store.close().await;
    }
}
