//! Storefront configuration loaded from environment variables.
//!
//! Every variable has a default, so the engine runs with zero
//! configuration.
//!
//! # Environment Variables
//!
//! - `MARIGOLD_DATA_DIR` - Directory for persisted state and the catalog
//!   (default: `data`)
//! - `MARIGOLD_CATALOG_FILE` - Catalog YAML path (default:
//!   `<data_dir>/catalog.yaml`)
//! - `MARIGOLD_SEARCH_DEBOUNCE_MS` - Search-as-you-type quiet period
//!   (default: 300)
//! - `MARIGOLD_SEARCH_LIMIT` - Maximum hits per search (default: 24)
//! - `MARIGOLD_SEARCH_CACHE_SIZE` - Cached search result sets
//!   (default: 256)
//! - `MARIGOLD_CHECKOUT_DELAY_MS` - Mock checkout latency (default: 1500)
//! - `MARIGOLD_TOAST_TTL_MS` - Toast auto-dismiss delay (default: 4000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront engine configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding persisted state and the default catalog file.
    pub data_dir: PathBuf,
    /// Path to the catalog YAML file.
    ///
    /// The catalog file also declares the storefront currency.
    pub catalog_file: PathBuf,
    /// Search tuning.
    pub search: SearchConfig,
    /// Simulated network latency for the mock checkout.
    pub checkout_delay: Duration,
    /// How long a toast stays up before auto-dismissing.
    pub toast_ttl: Duration,
}

/// Search tuning parameters.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period before a typed query is executed.
    pub debounce: Duration,
    /// Maximum number of hits returned per search.
    pub limit: usize,
    /// Maximum number of cached result sets.
    pub cache_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            limit: 24,
            cache_size: 256,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            catalog_file: data_dir.join("catalog.yaml"),
            data_dir,
            search: SearchConfig::default(),
            checkout_delay: Duration::from_millis(1500),
            toast_ttl: Duration::from_millis(4000),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("MARIGOLD_DATA_DIR", "data"));
        let catalog_file = std::env::var("MARIGOLD_CATALOG_FILE")
            .map_or_else(|_| data_dir.join("catalog.yaml"), PathBuf::from);

        let search = SearchConfig {
            debounce: duration_env("MARIGOLD_SEARCH_DEBOUNCE_MS", 300)?,
            limit: parse_env("MARIGOLD_SEARCH_LIMIT", 24)?,
            cache_size: parse_env("MARIGOLD_SEARCH_CACHE_SIZE", 256)?,
        };

        Ok(Self {
            data_dir,
            catalog_file,
            search,
            checkout_delay: duration_env("MARIGOLD_CHECKOUT_DELAY_MS", 1500)?,
            toast_ttl: duration_env("MARIGOLD_TOAST_TTL_MS", 4000)?,
        })
    }

    /// Path of the local (persistent) storage file.
    #[must_use]
    pub fn local_storage_file(&self) -> PathBuf {
        self.data_dir.join("local.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse a millisecond environment variable into a `Duration`.
fn duration_env(key: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    parse_env(key, default_ms).map(Duration::from_millis)
}
