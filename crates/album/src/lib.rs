//! Virtual Tourist library.
//!
//! Bookmarks map locations as pins and keeps, for each pin, an album of
//! nearby photos fetched from Flickr. Everything a map or album view needs
//! goes through two entry points:
//!
//! - [`store::Store`] - durable pins, photos and map region on SQLite, with
//!   change notification
//! - [`pipeline::PhotoPipeline`] - search, sample, persist and lazily download
//!
//! [`state::AppState`] wires both from an [`config::AppConfig`] at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod flickr;
pub mod models;
pub mod pipeline;
pub mod sampling;
pub mod state;
pub mod store;

pub use config::{AppConfig, ConfigError, FlickrConfig};
pub use db::RepositoryError;
pub use flickr::{FlickrClient, FlickrError};
pub use models::{Photo, Pin};
pub use pipeline::{PhotoPipeline, PipelineError};
pub use sampling::sample_album;
pub use state::{AppState, InitError};
pub use store::Store;
