//! Flickr REST client.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};
use url::Url;

use virtual_tourist_core::{BoundingBox, Coordinate};

use super::FlickrError;
use super::types::parse_search_response;
use crate::config::FlickrConfig;

const SEARCH_METHOD: &str = "flickr.photos.search";

/// Longest response body excerpt written to the log.
const MAX_LOGGED_BODY: usize = 500;

/// Flickr API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct FlickrClient {
    inner: Arc<FlickrClientInner>,
}

struct FlickrClientInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
}

impl FlickrClient {
    /// Create a new Flickr client.
    ///
    /// # Errors
    ///
    /// Returns `FlickrError::Network` if the HTTP client fails to build.
    pub fn new(config: &FlickrConfig) -> Result<Self, FlickrError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(FlickrClientInner {
                client,
                endpoint: config.endpoint.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Build the search request URL for photos around `coordinate`.
    ///
    /// The URL carries the API key; do not log it.
    #[must_use]
    pub fn search_url(&self, coordinate: Coordinate) -> Url {
        let bbox = BoundingBox::around(coordinate, BoundingBox::DEFAULT_HALF_SPAN);

        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("method", SEARCH_METHOD)
            .append_pair("api_key", self.inner.api_key.expose_secret())
            .append_pair("extras", "url_m")
            .append_pair("format", "json")
            .append_pair("nojsoncallback", "1")
            .append_pair("safe_search", "1")
            .append_pair("bbox", &bbox.to_string());
        url
    }

    /// Search for photos around a coordinate.
    ///
    /// Returns the medium-size image URL of every match, in response order.
    ///
    /// # Errors
    ///
    /// Returns `FlickrError::Network` on transport failure,
    /// `FlickrError::HttpStatus` on a non-2xx answer, and the parse errors of
    /// [`parse_search_response`] otherwise.
    #[instrument(skip(self), fields(coordinate = %coordinate))]
    pub async fn search_photos(&self, coordinate: Coordinate) -> Result<Vec<String>, FlickrError> {
        let response = self
            .inner
            .client
            .get(self.search_url(coordinate))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        let body = response.bytes().await?;
        let urls = parse_search_response(&body)?;

        debug!(count = urls.len(), "Search returned photos");
        Ok(urls)
    }

    /// Download the bytes behind an image URL.
    ///
    /// # Errors
    ///
    /// Returns `FlickrError::Network` on transport failure or
    /// `FlickrError::HttpStatus` on a non-2xx answer.
    #[instrument(skip(self))]
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, FlickrError> {
        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes.to_vec())
    }

    /// Log a non-success response and turn it into an error.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> FlickrError {
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(MAX_LOGGED_BODY).collect();

        error!(status = status.as_u16(), body = %excerpt, "Flickr request failed");

        FlickrError::HttpStatus {
            status: status.as_u16(),
        }
    }
}

impl std::fmt::Debug for FlickrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}
