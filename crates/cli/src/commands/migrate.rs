//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! vt migrate
//! ```
//!
//! # Environment Variables
//!
//! - `VT_DATABASE_URL` - SQLite connection string (default: `sqlite://virtual_tourist.db`)
//!
//! Migrations live in `crates/album/migrations/` and are embedded in the binary.

use super::{CommandError, open_store};

/// Create the database if needed and apply pending migrations.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Opening database and applying migrations...");
    let store = open_store().await?;
    store.close().await;

    tracing::info!("Migrations complete!");
    Ok(())
}
