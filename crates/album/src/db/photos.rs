//! Photo repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use virtual_tourist_core::{PhotoId, PinId};

use super::RepositoryError;
use crate::models::Photo;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for photo queries.
#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    id: i64,
    pin_id: i64,
    image_url: String,
    image_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Self {
            id: PhotoId::new(row.id),
            pin_id: PinId::new(row.pin_id),
            image_url: row.image_url,
            image_data: row.image_data,
            created_at: row.created_at,
        }
    }
}

/// Outcome of replacing a pin's album.
#[derive(Debug, Clone)]
pub struct ReplacedAlbum {
    /// Photos that were deleted.
    pub removed: Vec<PhotoId>,
    /// Newly inserted stubs, in URL order.
    pub inserted: Vec<Photo>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for photo database operations.
pub struct PhotoRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PhotoRepository<'a> {
    /// Create a new photo repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all photos of a pin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_pin(&self, pin_id: PinId) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, pin_id, image_url, image_data, created_at
            FROM photo
            WHERE pin_id = ?
            ORDER BY id
            ",
        )
        .bind(pin_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }

    /// Count the photos of a pin without loading image data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_pin(&self, pin_id: PinId) -> Result<usize, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM photo WHERE pin_id = ?")
            .bind(pin_id)
            .fetch_one(self.pool)
            .await?;

        usize::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative photo count {count}")))
    }

    /// Get a photo by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r"
            SELECT id, pin_id, image_url, image_data, created_at
            FROM photo
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Photo::from))
    }

    /// Replace every photo of a pin with one stub per URL, atomically.
    ///
    /// Returns `None` if the pin no longer exists; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails. The old
    /// album is kept intact in that case.
    pub async fn replace_for_pin(
        &self,
        pin_id: PinId,
        urls: &[String],
    ) -> Result<Option<ReplacedAlbum>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let pin_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pin WHERE id = ?")
            .bind(pin_id)
            .fetch_one(&mut *tx)
            .await?
            > 0;

        if !pin_exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query_scalar::<_, PhotoId>(
            r"
            DELETE FROM photo
            WHERE pin_id = ?
            RETURNING id
            ",
        )
        .bind(pin_id)
        .fetch_all(&mut *tx)
        .await?;

        let created_at = Utc::now();
        let mut inserted = Vec::with_capacity(urls.len());
        for url in urls {
            let row = sqlx::query_as::<_, PhotoRow>(
                r"
                INSERT INTO photo (pin_id, image_url, image_data, created_at)
                VALUES (?, ?, NULL, ?)
                RETURNING id, pin_id, image_url, image_data, created_at
                ",
            )
            .bind(pin_id)
            .bind(url)
            .bind(created_at)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(Photo::from(row));
        }

        tx.commit().await?;

        Ok(Some(ReplacedAlbum { removed, inserted }))
    }

    /// Store downloaded image bytes for a photo.
    ///
    /// Returns the owning pin, or `None` if the photo was deleted meanwhile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_image(
        &self,
        id: PhotoId,
        data: &[u8],
    ) -> Result<Option<PinId>, RepositoryError> {
        let pin_id = sqlx::query_scalar::<_, PinId>(
            r"
            UPDATE photo
            SET image_data = ?
            WHERE id = ?
            RETURNING pin_id
            ",
        )
        .bind(data)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(pin_id)
    }

    /// Delete a single photo.
    ///
    /// Returns the owning pin, or `None` if the photo was already gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: PhotoId) -> Result<Option<PinId>, RepositoryError> {
        let pin_id = sqlx::query_scalar::<_, PinId>(
            r"
            DELETE FROM photo
            WHERE id = ?
            RETURNING pin_id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(pin_id)
    }
}
