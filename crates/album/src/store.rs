//! Durable pin/photo store with change notification.
//!
//! All writes go through one writer lock and commit before the call returns.
//! Every committed mutation is published as a [`StoreEvent`] to subscribers.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, instrument, warn};

use virtual_tourist_core::{
    ALBUM_SIZE, ChangeKind, Coordinate, MapRegion, PhotoId, PinId, StoreEvent,
};

use crate::db::settings::MAP_REGION_KEY;
use crate::db::{self, PhotoRepository, PinRepository, RepositoryError, SettingsRepository};
use crate::models::{Photo, Pin};

/// Capacity of the change channel. Slow subscribers past this lag.
const EVENT_CAPACITY: usize = 256;

/// Handle to the local pin/photo database.
///
/// Cheaply cloneable; clones share the pool, the writer lock and the
/// event channel.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    pool: SqlitePool,
    write_lock: Mutex<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl Store {
    /// Wrap an existing pool. Migrations must already be applied.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                pool,
                write_lock: Mutex::new(()),
                events,
            }),
        }
    }

    /// Open (creating if needed) the database and apply migrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database cannot be opened or migrated.
    pub async fn open(database_url: &SecretString) -> Result<Self, RepositoryError> {
        let pool = db::create_pool(database_url).await?;
        db::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.inner.pool.close().await;
    }

    // =========================================================================
    // Change notification
    // =========================================================================

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Stream of store events.
    ///
    /// Events missed by a lagging consumer are skipped with a warning. The
    /// stream ends when the store is dropped.
    pub fn changes(&self) -> impl Stream<Item = StoreEvent> + use<> {
        let mut receiver = self.subscribe();

        stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Change subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    fn publish(&self, event: StoreEvent) {
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }

    // =========================================================================
    // Pins
    // =========================================================================

    /// Create a pin at `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    #[instrument(skip(self), fields(coordinate = %coordinate))]
    pub async fn create_pin(&self, coordinate: Coordinate) -> Result<Pin, RepositoryError> {
        let _guard = self.inner.write_lock.lock().await;

        let pin = PinRepository::new(&self.inner.pool).create(coordinate).await?;
        debug!(pin_id = %pin.id, "Pin created");

        self.publish(StoreEvent::pin(ChangeKind::Inserted, pin.id));
        Ok(pin)
    }

    /// Find the pin at exactly `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn find_pin(&self, coordinate: Coordinate) -> Result<Option<Pin>, RepositoryError> {
        PinRepository::new(&self.inner.pool)
            .get_by_coordinate(coordinate)
            .await
    }

    /// Get a pin by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_pin(&self, pin_id: PinId) -> Result<Option<Pin>, RepositoryError> {
        PinRepository::new(&self.inner.pool).get_by_id(pin_id).await
    }

    /// List every pin, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_pins(&self) -> Result<Vec<Pin>, RepositoryError> {
        PinRepository::new(&self.inner.pool).list().await
    }

    /// Delete a pin together with its whole album.
    ///
    /// Returns `false` if the pin did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    #[instrument(skip(self), fields(pin_id = %pin_id))]
    pub async fn delete_pin(&self, pin_id: PinId) -> Result<bool, RepositoryError> {
        let _guard = self.inner.write_lock.lock().await;

        let Some(photo_ids) = PinRepository::new(&self.inner.pool).delete(pin_id).await? else {
            debug!("Pin already gone");
            return Ok(false);
        };

        debug!(count = photo_ids.len(), "Pin deleted with its photos");
        for photo_id in photo_ids {
            self.publish(StoreEvent::photo(ChangeKind::Deleted, pin_id, photo_id));
        }
        self.publish(StoreEvent::pin(ChangeKind::Deleted, pin_id));

        Ok(true)
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// List the album of a pin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_photos(&self, pin_id: PinId) -> Result<Vec<Photo>, RepositoryError> {
        PhotoRepository::new(&self.inner.pool)
            .list_for_pin(pin_id)
            .await
    }

    /// Number of photos in a pin's album.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn count_photos(&self, pin_id: PinId) -> Result<usize, RepositoryError> {
        PhotoRepository::new(&self.inner.pool)
            .count_for_pin(pin_id)
            .await
    }

    /// Get a photo by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_photo(&self, photo_id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        PhotoRepository::new(&self.inner.pool)
            .get_by_id(photo_id)
            .await
    }

    /// Replace the album of a pin with one stub per URL.
    ///
    /// At most [`ALBUM_SIZE`] URLs are used, in the order given. The old
    /// photos are deleted in the same transaction. Returns an empty album if
    /// the pin no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the transaction fails; the previous
    /// album is kept in that case.
    #[instrument(skip(self, urls), fields(pin_id = %pin_id, count = urls.len()))]
    pub async fn replace_photos(
        &self,
        pin_id: PinId,
        urls: &[String],
    ) -> Result<Vec<Photo>, RepositoryError> {
        let urls = urls.get(..ALBUM_SIZE).unwrap_or(urls);
        let _guard = self.inner.write_lock.lock().await;

        let Some(replaced) = PhotoRepository::new(&self.inner.pool)
            .replace_for_pin(pin_id, urls)
            .await?
        else {
            warn!("Pin deleted before its album was stored, discarding");
            return Ok(Vec::new());
        };

        debug!(
            removed = replaced.removed.len(),
            inserted = replaced.inserted.len(),
            "Album replaced"
        );
        for photo_id in replaced.removed {
            self.publish(StoreEvent::photo(ChangeKind::Deleted, pin_id, photo_id));
        }
        for photo in &replaced.inserted {
            self.publish(StoreEvent::photo(ChangeKind::Inserted, pin_id, photo.id));
        }

        Ok(replaced.inserted)
    }

    /// Store downloaded bytes for a photo.
    ///
    /// Returns `false` without error if the photo no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    #[instrument(skip(self, data), fields(photo_id = %photo_id, bytes = data.len()))]
    pub async fn set_photo_image(
        &self,
        photo_id: PhotoId,
        data: &[u8],
    ) -> Result<bool, RepositoryError> {
        let _guard = self.inner.write_lock.lock().await;

        let Some(pin_id) = PhotoRepository::new(&self.inner.pool)
            .set_image(photo_id, data)
            .await?
        else {
            warn!("Photo deleted before its image arrived, discarding");
            return Ok(false);
        };

        self.publish(StoreEvent::photo(ChangeKind::Updated, pin_id, photo_id));
        Ok(true)
    }

    /// Delete a single photo.
    ///
    /// Returns `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    #[instrument(skip(self), fields(photo_id = %photo_id))]
    pub async fn delete_photo(&self, photo_id: PhotoId) -> Result<bool, RepositoryError> {
        let _guard = self.inner.write_lock.lock().await;

        let Some(pin_id) = PhotoRepository::new(&self.inner.pool)
            .delete(photo_id)
            .await?
        else {
            return Ok(false);
        };

        self.publish(StoreEvent::photo(ChangeKind::Deleted, pin_id, photo_id));
        Ok(true)
    }

    // =========================================================================
    // Map region
    // =========================================================================

    /// The last saved map region, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the stored value is
    /// unreadable.
    pub async fn map_region(&self) -> Result<Option<MapRegion>, RepositoryError> {
        SettingsRepository::new(&self.inner.pool)
            .get(MAP_REGION_KEY)
            .await
    }

    /// Persist the visible map region.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    pub async fn save_map_region(&self, region: &MapRegion) -> Result<(), RepositoryError> {
        let _guard = self.inner.write_lock.lock().await;

        SettingsRepository::new(&self.inner.pool)
            .put(MAP_REGION_KEY, region)
            .await?;

        self.publish(StoreEvent::map_region());
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.inner.events.receiver_count())
            .finish_non_exhaustive()
    }
}
