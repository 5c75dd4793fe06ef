//! Flickr photo search and image download.
//!
//! # Architecture
//!
//! - One `GET` per search against `flickr.photos.search`, restricted to a
//!   bounding box around the pin, returning medium-size (`url_m`) URLs
//! - One `GET` per image download, raw bytes
//! - No retries; transport-default timeouts
//!
//! Non-success responses are logged with a truncated body and surfaced as
//! [`FlickrError::HttpStatus`].

pub mod client;
pub mod types;

pub use client::FlickrClient;

use thiserror::Error;

/// Errors that can occur when talking to Flickr.
#[derive(Debug, Error)]
pub enum FlickrError {
    /// Transport failure (DNS, connect, TLS, reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered outside the 2xx range.
    #[error("unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Server answered 2xx with no body.
    #[error("empty response body")]
    EmptyBody,

    /// Body was not the expected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Search succeeded but matched no photos.
    #[error("no photos found")]
    NoResults,

    /// Flickr reported a failure in a 2xx body (`"stat": "fail"`).
    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },
}
