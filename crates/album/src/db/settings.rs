//! Key/value settings stored as JSON text.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

use super::RepositoryError;

/// Key under which the last visible map region is kept.
pub const MAP_REGION_KEY: &str = "map_region";

/// Repository for the `setting` table.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a setting and decode it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored JSON does not decode
    /// into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM setting WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid setting {key}: {e}"))
                })
            })
            .transpose()
    }

    /// Write a setting, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the value cannot be encoded,
    /// or `RepositoryError::Database` if the upsert fails.
    pub async fn put<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(value)?;

        sqlx::query(
            r"
            INSERT INTO setting (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(json)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
