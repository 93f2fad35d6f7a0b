//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAPSHOP_API_URL` - Base URL of the LapShop backend (e.g., `http://localhost:8080`)
//!
//! ## Optional
//! - `LAPSHOP_API_VERSION` - API version segment (default: `v1`)
//! - `LAPSHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `LAPSHOP_STATE_DIR` - Directory for persisted client state; when unset,
//!   state lives in memory only and is lost on exit
//! - `LAPSHOP_USER_AGENT` - User-Agent header (default: `lapshop-client/<version>`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// LapShop client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without the API version suffix.
    pub api_url: Url,
    /// API version segment appended to the base URL (e.g., `v1`).
    pub api_version: String,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
    /// Directory for persisted client state. `None` means in-memory only.
    pub state_dir: Option<PathBuf>,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("LAPSHOP_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("LAPSHOP_API_URL".to_string(), e.to_string()))?;
        let api_version = get_env_or_default("LAPSHOP_API_VERSION", "v1");
        let timeout_secs = get_env_or_default("LAPSHOP_HTTP_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LAPSHOP_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let state_dir = get_optional_env("LAPSHOP_STATE_DIR").map(PathBuf::from);
        let user_agent = get_env_or_default(
            "LAPSHOP_USER_AGENT",
            concat!("lapshop-client/", env!("CARGO_PKG_VERSION")),
        );

        Ok(Self {
            api_url,
            api_version,
            http_timeout: Duration::from_secs(timeout_secs),
            state_dir,
            user_agent,
        })
    }

    /// Create a configuration pointing at the given base URL, with defaults
    /// for everything else. Used by tests and by callers that do not read
    /// the environment.
    #[must_use]
    pub fn for_url(api_url: Url) -> Self {
        Self {
            api_url,
            api_version: "v1".to_string(),
            http_timeout: Duration::from_secs(10),
            state_dir: None,
            user_agent: concat!("lapshop-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// The versioned API root every endpoint path is joined onto,
    /// e.g. `http://localhost:8080/api/v1/`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the base URL cannot be a base
    /// (e.g., a `data:` URL).
    pub fn api_root(&self) -> Result<Url, ConfigError> {
        let mut root = self.api_url.clone();
        {
            let mut segments = root.path_segments_mut().map_err(|()| {
                ConfigError::InvalidEnvVar(
                    "LAPSHOP_API_URL".to_string(),
                    "URL cannot be a base".to_string(),
                )
            })?;
            segments.pop_if_empty().push("api").push(&self.api_version).push("");
        }
        Ok(root)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root_appends_version() {
        let config = ClientConfig::for_url("http://localhost:8080".parse().unwrap());
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "http://localhost:8080/api/v1/"
        );
    }

    #[test]
    fn test_api_root_preserves_existing_path() {
        let mut config = ClientConfig::for_url("http://shop.example.com/backend".parse().unwrap());
        config.api_version = "v2".to_string();
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "http://shop.example.com/backend/api/v2/"
        );
    }

    #[test]
    fn test_endpoint_join_does_not_escape_root() {
        let config = ClientConfig::for_url("http://localhost:8080".parse().unwrap());
        let root = config.api_root().unwrap();
        let joined = root.join("products/filter").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8080/api/v1/products/filter");
    }
}
