//! Photo fetch pipeline.
//!
//! Turns a pin into an album: search Flickr around the pin, sample up to
//! [`ALBUM_SIZE`](virtual_tourist_core::ALBUM_SIZE) URLs, persist them as
//! stubs, then download image bytes lazily, one photo at a time or a whole
//! album concurrently.
//!
//! A photo moves `Stub` -> `Downloading` -> `Materialized`. `Downloading`
//! lives only in memory, in the pipeline's in-flight table.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use virtual_tourist_core::{Coordinate, PhotoId, PhotoState, PinId};

use crate::db::RepositoryError;
use crate::flickr::{FlickrClient, FlickrError};
use crate::models::{Photo, Pin};
use crate::sampling::sample_album;
use crate::store::Store;

/// Errors that can occur while filling or materialising an album.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Search or download failed.
    #[error(transparent)]
    Flickr(#[from] FlickrError),

    /// Reading or writing the store failed.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Outcome of loading one photo's bytes as part of a bulk load.
pub type ImageLoad = (PhotoId, Result<Option<Vec<u8>>, PipelineError>);

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Search, persist and download pipeline.
///
/// Cheap to clone; clones share the in-flight table.
#[derive(Clone)]
pub struct PhotoPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    store: Store,
    flickr: FlickrClient,
    /// One slot per photo with a download in progress or queued.
    in_flight: std::sync::Mutex<HashMap<PhotoId, Slot>>,
}

impl PhotoPipeline {
    #[must_use]
    pub fn new(store: Store, flickr: FlickrClient) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                store,
                flickr,
                in_flight: std::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// Search for photo URLs around a coordinate.
    ///
    /// # Errors
    ///
    /// Returns the `FlickrError` of the search request.
    pub async fn search_photos(&self, coordinate: Coordinate) -> Result<Vec<String>, FlickrError> {
        self.inner.flickr.search_photos(coordinate).await
    }

    /// Download the bytes behind an image URL.
    ///
    /// # Errors
    ///
    /// Returns the `FlickrError` of the download request.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, FlickrError> {
        self.inner.flickr.download_image(url).await
    }

    // =========================================================================
    // Albums
    // =========================================================================

    /// Fetch a fresh album for a pin, replacing the current one.
    ///
    /// On search failure the current album is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Flickr` if the search fails or finds nothing,
    /// `PipelineError::Storage` if the album cannot be stored.
    #[instrument(skip(self, pin), fields(pin_id = %pin.id))]
    pub async fn reload_album(&self, pin: &Pin) -> Result<Vec<Photo>, PipelineError> {
        let urls = self.search_photos(pin.coordinate).await?;
        let found = urls.len();

        let sampled = sample_album(urls);
        let photos = self
            .inner
            .store
            .replace_photos(pin.id, &sampled)
            .await?;

        info!(found, count = photos.len(), "Album reloaded");
        Ok(photos)
    }

    /// The stored album of a pin, fetching one first if it has none.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if the store cannot be read or the first fetch
    /// fails.
    #[instrument(skip(self, pin), fields(pin_id = %pin.id))]
    pub async fn ensure_album(&self, pin: &Pin) -> Result<Vec<Photo>, PipelineError> {
        let photos = self.inner.store.list_photos(pin.id).await?;
        if !photos.is_empty() {
            debug!(count = photos.len(), "Album already stored");
            return Ok(photos);
        }

        self.reload_album(pin).await
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// The current state of a photo, including in-progress downloads.
    #[must_use]
    pub fn photo_state(&self, photo: &Photo) -> PhotoState {
        if photo.image_data.is_some() {
            return PhotoState::Materialized;
        }

        let in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if in_flight.contains_key(&photo.id) {
            PhotoState::Downloading
        } else {
            PhotoState::Stub
        }
    }

    /// The bytes of a photo, downloading and storing them if it is a stub.
    ///
    /// A materialised photo is answered from the store without a request.
    /// Concurrent calls for the same photo share a single download. Returns
    /// `None` if the photo does not exist or was deleted mid-download.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Flickr` if the download fails (the photo stays
    /// a stub), `PipelineError::Storage` if the store fails.
    #[instrument(skip(self), fields(photo_id = %photo_id))]
    pub async fn load_image(&self, photo_id: PhotoId) -> Result<Option<Vec<u8>>, PipelineError> {
        let Some(photo) = self.inner.store.get_photo(photo_id).await? else {
            return Ok(None);
        };
        if let Some(data) = photo.image_data {
            debug!("Image already stored");
            return Ok(Some(data));
        }

        let slot = SlotGuard::acquire(&self.inner, photo_id);
        let _permit = slot.lock().await;

        // Another caller may have finished the download while we waited.
        let Some(photo) = self.inner.store.get_photo(photo_id).await? else {
            return Ok(None);
        };
        if let Some(data) = photo.image_data {
            debug!("Image stored by concurrent load");
            return Ok(Some(data));
        }

        let data = self.download_image(&photo.image_url).await?;

        if !self.inner.store.set_photo_image(photo_id, &data).await? {
            warn!("Photo deleted during download, image discarded");
            return Ok(None);
        }

        Ok(Some(data))
    }

    /// Load every photo of a pin concurrently.
    ///
    /// Returns one result per photo; one failure does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Storage` if the album cannot be listed.
    #[instrument(skip(self), fields(pin_id = %pin_id))]
    pub async fn load_images(&self, pin_id: PinId) -> Result<Vec<ImageLoad>, PipelineError> {
        let photos = self.inner.store.list_photos(pin_id).await?;

        let loads = photos.iter().map(|photo| async move {
            (photo.id, self.load_image(photo.id).await)
        });
        let results = join_all(loads).await;

        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "Some images failed to load");
        } else {
            debug!(count = results.len(), "Album images loaded");
        }

        Ok(results)
    }
}

impl std::fmt::Debug for PhotoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoPipeline")
            .field("flickr", &self.inner.flickr)
            .finish_non_exhaustive()
    }
}

/// Holds a photo's in-flight slot; the entry is removed when the last
/// holder drops, even if the load future is cancelled.
struct SlotGuard<'a> {
    inner: &'a PipelineInner,
    photo_id: PhotoId,
    slot: Slot,
}

impl<'a> SlotGuard<'a> {
    fn acquire(inner: &'a PipelineInner, photo_id: PhotoId) -> Self {
        let mut in_flight = inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = Arc::clone(in_flight.entry(photo_id).or_default());

        Self {
            inner,
            photo_id,
            slot,
        }
    }
}

impl std::ops::Deref for SlotGuard<'_> {
    type Target = tokio::sync::Mutex<()>;

    fn deref(&self) -> &Self::Target {
        &self.slot
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // The table holds one reference, this guard the other.
        if Arc::strong_count(&self.slot) == 2 {
            in_flight.remove(&self.photo_id);
        }
    }
}
