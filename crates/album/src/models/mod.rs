//! Domain models for pins and their photo albums.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod photo;
pub mod pin;

pub use photo::Photo;
pub use pin::Pin;
