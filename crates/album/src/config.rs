//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FLICKR_API_KEY` - Flickr API key used for photo search
//!
//! ## Optional
//! - `VT_DATABASE_URL` - SQLite connection string (default: `sqlite://virtual_tourist.db`,
//!   falls back to `DATABASE_URL`)
//! - `FLICKR_ENDPOINT` - Flickr REST endpoint (default: `https://api.flickr.com/services/rest`)
//! - `VT_USER_AGENT` - User-Agent sent with every request (default: `virtual-tourist/<version>`)

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default SQLite database, created next to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://virtual_tourist.db";

/// Default Flickr REST endpoint.
pub const DEFAULT_FLICKR_ENDPOINT: &str = "https://api.flickr.com/services/rest";

const MIN_API_KEY_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "api_key_here",
    "key_here",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// Flickr API configuration
    pub flickr: FlickrConfig,
}

/// Flickr API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FlickrConfig {
    /// Flickr API key
    pub api_key: SecretString,
    /// REST endpoint the search request is sent to
    pub endpoint: Url,
    /// User-Agent header for search and image requests
    pub user_agent: String,
}

impl std::fmt::Debug for FlickrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint.as_str())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("VT_DATABASE_URL");
        let flickr = FlickrConfig::from_env()?;

        Ok(Self {
            database_url,
            flickr,
        })
    }
}

/// Load only the database URL from the environment.
///
/// For commands that never talk to Flickr and so must not require an API key.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    let _ = dotenvy::dotenv();
    get_database_url("VT_DATABASE_URL")
}

impl FlickrConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_env_or_default("FLICKR_ENDPOINT", DEFAULT_FLICKR_ENDPOINT);
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            ConfigError::InvalidEnvVar("FLICKR_ENDPOINT".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_key: get_validated_api_key("FLICKR_API_KEY")?,
            endpoint,
            user_agent: get_env_or_default("VT_USER_AGENT", &default_user_agent()),
        })
    }
}

/// `virtual-tourist/<crate version>`.
#[must_use]
pub fn default_user_agent() -> String {
    format!("virtual-tourist/{}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`, then the local default.
fn get_database_url(primary_key: &str) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(DEFAULT_DATABASE_URL)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that an API key is not a placeholder and is long enough to be real.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = key.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if key.len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_API_KEY_LENGTH} characters (got {})",
                key.len()
            ),
        ));
    }

    Ok(())
}

/// Load and validate an API key from environment.
fn get_validated_api_key(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_api_key(value.trim(), key)?;
    Ok(SecretString::from(value.trim().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_key_placeholder() {
        let result = validate_api_key("FLICKR_API_KEY_HERE", "FLICKR_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_api_key_changeme() {
        assert!(validate_api_key("changeme-changeme-1234", "FLICKR_API_KEY").is_err());
    }

    #[test]
    fn test_validate_api_key_too_short() {
        let err = validate_api_key("3f9a1c", "FLICKR_API_KEY").unwrap_err();
        assert!(err.to_string().contains("at least 16 characters"));
    }

    #[test]
    fn test_validate_api_key_valid() {
        assert!(validate_api_key("3f9a1c7e2b8d4f60a5c3e9b1d7f2a648", "FLICKR_API_KEY").is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        assert!(default_user_agent().starts_with("virtual-tourist/"));
    }

    #[test]
    fn test_flickr_config_debug_redacts_api_key() {
        let config = FlickrConfig {
            api_key: SecretString::from("super_secret_flickr_key_value"),
            endpoint: Url::parse(DEFAULT_FLICKR_ENDPOINT).unwrap(),
            user_agent: "virtual-tourist/test".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("api.flickr.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_flickr_key_value"));
    }
}
