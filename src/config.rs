//! Configuration loaded from environment variables (and `.env` for local runs).
//!
//! The OAuth handshake happens elsewhere; this crate only consumes the
//! resulting access token.

use std::env;
use std::path::PathBuf;

/// Default Strava API root.
pub const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Default location of the local store snapshot.
pub const DEFAULT_STORE_PATH: &str = "data/strava_store.json";

/// Default number of detailed-activity fetches allowed in flight at once.
pub const DEFAULT_DETAIL_FETCH_CONCURRENCY: usize = 4;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth bearer token for the Strava API
    pub strava_access_token: String,
    /// API root, overridable for proxies and tests
    pub api_base_url: String,
    /// JSON snapshot of the local entity store
    pub store_path: PathBuf,
    /// Upper bound on concurrent detail fetches after a list sync
    pub detail_fetch_concurrency: usize,
}

impl Config {
    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            strava_access_token: "test_access_token".to_string(),
            api_base_url: "http://localhost:9999/api/v3".to_string(),
            store_path: PathBuf::from("target/test_store.json"),
            detail_fetch_concurrency: 2,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_access_token: env::var("STRAVA_ACCESS_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_ACCESS_TOKEN"))?,
            api_base_url: env::var("STRAVA_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
            detail_fetch_concurrency: env::var("DETAIL_FETCH_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DETAIL_FETCH_CONCURRENCY)
                .max(1),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
