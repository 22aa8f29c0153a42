//! Unified error handling for the storefront engine.
//!
//! `StorefrontError` is the library-seam error: anything that can go
//! wrong while opening or operating the engine itself. User-facing
//! validation outcomes (cart rejections, profile validation) are *not*
//! here - those are returned values on the store operations, mirroring
//! how the storefront UI surfaces them as messages rather than failures.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::search::SearchError;
use crate::storage::StorageError;

/// Engine-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The product catalog could not be loaded or validated.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The search index failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_source() {
        let err = StorefrontError::Search(SearchError::Query("bad query".to_string()));
        assert_eq!(err.to_string(), "Search error: Query error: bad query");
    }
}
