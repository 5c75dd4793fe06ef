//! Database operations for the local SQLite store.
//!
//! # Database: `virtual_tourist.db`
//!
//! A single file owned by one process. Writes go through [`crate::store::Store`],
//! which serialises them; the repositories here are the raw SQL layer.
//!
//! ## Tables
//!
//! - `pin` - Bookmarked coordinates
//! - `photo` - Album entries, `ON DELETE CASCADE` from `pin`
//! - `setting` - Key/value settings (JSON values), e.g. the last map region
//!
//! # Migrations
//!
//! Migrations are stored in `crates/album/migrations/`, embedded at compile
//! time and applied by [`run_migrations`]:
//! ```bash
//! cargo run -p virtual-tourist-cli -- migrate
//! ```

pub mod photos;
pub mod pins;
pub mod settings;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use photos::PhotoRepository;
pub use pins::PinRepository;
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
///
/// This is the storage failure surfaced to callers of the store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying embedded migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a SQLite connection pool.
///
/// The database file is created if missing. WAL journaling lets readers keep
/// reading the last committed state while a write transaction is open.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the file cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
