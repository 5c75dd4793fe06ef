//! Pin repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use virtual_tourist_core::{Coordinate, PhotoId, PinId};

use super::RepositoryError;
use crate::models::Pin;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for pin queries.
#[derive(Debug, sqlx::FromRow)]
struct PinRow {
    id: i64,
    latitude: f64,
    longitude: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PinRow> for Pin {
    type Error = RepositoryError;

    fn try_from(row: PinRow) -> Result<Self, Self::Error> {
        let coordinate = Coordinate::new(row.latitude, row.longitude).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid coordinate for pin {}: {e}", row.id))
        })?;

        Ok(Self {
            id: PinId::new(row.id),
            coordinate,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for pin database operations.
pub struct PinRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PinRepository<'a> {
    /// Create a new pin repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new pin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, coordinate: Coordinate) -> Result<Pin, RepositoryError> {
        let row = sqlx::query_as::<_, PinRow>(
            r"
            INSERT INTO pin (latitude, longitude, created_at)
            VALUES (?, ?, ?)
            RETURNING id, latitude, longitude, created_at
            ",
        )
        .bind(coordinate.latitude())
        .bind(coordinate.longitude())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a pin by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PinId) -> Result<Option<Pin>, RepositoryError> {
        let row = sqlx::query_as::<_, PinRow>(
            r"
            SELECT id, latitude, longitude, created_at
            FROM pin
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the pin at exactly this coordinate.
    ///
    /// If several pins share a coordinate the oldest one is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_coordinate(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<Pin>, RepositoryError> {
        let row = sqlx::query_as::<_, PinRow>(
            r"
            SELECT id, latitude, longitude, created_at
            FROM pin
            WHERE latitude = ? AND longitude = ?
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(coordinate.latitude())
        .bind(coordinate.longitude())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all pins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Pin>, RepositoryError> {
        let rows = sqlx::query_as::<_, PinRow>(
            r"
            SELECT id, latitude, longitude, created_at
            FROM pin
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete a pin and, through the foreign key cascade, all of its photos.
    ///
    /// Returns the IDs of the photos that went with it, or `None` if the pin
    /// did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails. Nothing is
    /// deleted in that case.
    pub async fn delete(&self, id: PinId) -> Result<Option<Vec<PhotoId>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let photo_ids = sqlx::query_scalar::<_, PhotoId>(
            r"
            SELECT id FROM photo
            WHERE pin_id = ?
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM pin WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(photo_ids))
    }
}
