//! Integration test support for Virtual Tourist.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p virtual-tourist-integration-tests
//! ```
//!
//! No external services are needed. Every test gets:
//!
//! - a fresh SQLite file in a temporary directory ([`TestStore`])
//! - an in-process fake of the Flickr REST endpoint and image host
//!   ([`FakeFlickr`]) bound to `127.0.0.1:0`
//!
//! # Test Categories
//!
//! - `store` - persistence, cascade and change events
//! - `pipeline` - search, sampling, downloads and failure handling

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use secrecy::SecretString;
use tempfile::TempDir;
use url::Url;

use virtual_tourist::config::FlickrConfig;
use virtual_tourist::{FlickrClient, PhotoPipeline, Store};

/// API key accepted by the fake endpoint.
pub const TEST_API_KEY: &str = "3f9a1c7e2b8d4f60a5c3e9b1d7f2a648";

// =============================================================================
// Store
// =============================================================================

/// A migrated store backed by a temporary SQLite file.
///
/// The file is removed when this value is dropped.
pub struct TestStore {
    pub store: Store,
    database_url: SecretString,
    _dir: TempDir,
}

impl TestStore {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", dir.path().join("virtual_tourist.db").display());

        let database_url = SecretString::from(url);

        let store = Store::open(&database_url)
            .await
            .expect("Failed to open test store");

        Self {
            store,
            database_url,
            _dir: dir,
        }
    }

    /// Connection string of the backing file, for opening a second pool.
    #[must_use]
    pub const fn database_url(&self) -> &SecretString {
        &self.database_url
    }
}

// =============================================================================
// Fake Flickr
// =============================================================================

#[derive(Clone)]
struct FakeState {
    search: Arc<Mutex<(StatusCode, String)>>,
    search_hits: Arc<AtomicUsize>,
    image_hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<HashMap<String, String>>>,
    image_delay: Arc<Mutex<Duration>>,
}

/// In-process stand-in for the Flickr search endpoint and image host.
///
/// - `GET /services/rest` answers with the configured status and body
/// - `GET /images/{name}` answers `image:{name}` as bytes, or 404 when the
///   name starts with `missing`, or 500 when it starts with `broken`
#[derive(Clone)]
pub struct FakeFlickr {
    base: Url,
    state: FakeState,
}

impl FakeFlickr {
    /// Start the server with an empty successful search.
    pub async fn spawn() -> Self {
        let state = FakeState {
            search: Arc::new(Mutex::new((StatusCode::OK, search_body(&[])))),
            search_hits: Arc::new(AtomicUsize::new(0)),
            image_hits: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(HashMap::new())),
            image_delay: Arc::new(Mutex::new(Duration::ZERO)),
        };

        let app = Router::new()
            .route("/services/rest", get(search))
            .route("/images/{name}", get(image))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Flickr");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake Flickr server failed");
        });

        let base = Url::parse(&format!("http://{addr}/")).expect("Invalid base URL");
        Self { base, state }
    }

    /// The search endpoint to put in [`FlickrConfig`].
    #[must_use]
    pub fn endpoint(&self) -> Url {
        self.base.join("services/rest").expect("Invalid endpoint")
    }

    /// URL of a served image.
    #[must_use]
    pub fn image_url(&self, name: &str) -> String {
        self.base
            .join(&format!("images/{name}"))
            .expect("Invalid image URL")
            .to_string()
    }

    /// `count` distinct image URLs.
    #[must_use]
    pub fn image_urls(&self, count: usize) -> Vec<String> {
        (0..count).map(|i| self.image_url(&format!("{i}.jpg"))).collect()
    }

    /// Answer searches with a successful response listing `urls`.
    pub fn respond_with_urls(&self, urls: &[String]) {
        self.respond(StatusCode::OK, search_body(urls));
    }

    /// Answer searches with an arbitrary status and body.
    pub fn respond(&self, status: StatusCode, body: impl Into<String>) {
        *lock(&self.state.search) = (status, body.into());
    }

    /// Delay every image response.
    pub fn delay_images(&self, delay: Duration) {
        *lock(&self.state.image_delay) = delay;
    }

    #[must_use]
    pub fn search_hits(&self) -> usize {
        self.state.search_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn image_hits(&self) -> usize {
        self.state.image_hits.load(Ordering::SeqCst)
    }

    /// Query parameters of the most recent search request.
    #[must_use]
    pub fn last_query(&self) -> HashMap<String, String> {
        lock(&self.state.last_query).clone()
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> FlickrConfig {
        FlickrConfig {
            api_key: SecretString::from(TEST_API_KEY),
            endpoint: self.endpoint(),
            user_agent: "virtual-tourist/integration-tests".to_string(),
        }
    }

    /// A client pointing at this server.
    #[must_use]
    pub fn client(&self) -> FlickrClient {
        FlickrClient::new(&self.config()).expect("Failed to build Flickr client")
    }

    /// A pipeline over `store` that talks to this server.
    #[must_use]
    pub fn pipeline(&self, store: &Store) -> PhotoPipeline {
        PhotoPipeline::new(store.clone(), self.client())
    }
}

/// A `flickr.photos.search` success body listing `urls`.
#[must_use]
pub fn search_body(urls: &[String]) -> String {
    let photos: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            serde_json::json!({
                "id": i.to_string(),
                "owner": "12345678@N00",
                "title": format!("photo {i}"),
                "url_m": url,
                "height_m": 375,
                "width_m": 500,
            })
        })
        .collect();

    serde_json::json!({
        "photos": {
            "page": 1,
            "pages": 1,
            "perpage": 250,
            "total": urls.len(),
            "photo": photos,
        },
        "stat": "ok",
    })
    .to_string()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn search(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.search_hits.fetch_add(1, Ordering::SeqCst);
    *lock(&state.last_query) = params;

    lock(&state.search).clone()
}

async fn image(
    State(state): State<FakeState>,
    Path(name): Path<String>,
) -> (StatusCode, Vec<u8>) {
    state.image_hits.fetch_add(1, Ordering::SeqCst);

    let delay = *lock(&state.image_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if name.starts_with("missing") {
        return (StatusCode::NOT_FOUND, b"Not Found".to_vec());
    }
    if name.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Vec::new());
    }

    (StatusCode::OK, format!("image:{name}").into_bytes())
}
