//! String-keyed storage areas for store persistence.
//!
//! A [`StorageArea`] plays the role local and session storage play for
//! a web storefront. A **persistent** area is backed by a JSON file
//! (loaded on open, flushed on every write); an **ephemeral** area
//! lives only as long as the process, like session storage.
//!
//! Values are arbitrary serde types, stored as JSON. Well-known keys
//! live in [`keys`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Well-known storage keys.
pub mod keys {
    /// Key for the persisted shopping cart.
    pub const CART: &str = "cart";

    /// Key for the persisted user profile.
    pub const PROFILE: &str = "profile";

    /// Key for the persisted display mode preference.
    pub const DISPLAY_MODE: &str = "display_mode";

    /// Key for the most recent order (session-scoped, never on disk).
    pub const LAST_ORDER: &str = "last_order";
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or deserialized.
    #[error("Storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The storage lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string-keyed JSON value store.
///
/// Cheaply cloneable; clones share the same underlying area.
#[derive(Debug, Clone)]
pub struct StorageArea {
    inner: Arc<Mutex<AreaInner>>,
}

#[derive(Debug)]
struct AreaInner {
    values: HashMap<String, Value>,
    path: Option<PathBuf>,
}

impl StorageArea {
    /// Open a persistent area backed by a JSON file.
    ///
    /// A missing file starts the area empty; a file that exists but
    /// does not parse is discarded with a warning and overwritten on
    /// the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable storage file");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(AreaInner {
                values,
                path: Some(path),
            })),
        })
    }

    /// Open an ephemeral (memory-only) area.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AreaInner {
                values: HashMap::new(),
                path: None,
            })),
        }
    }

    /// Read and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value does not deserialize to `T`
    /// or the lock is poisoned.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        inner
            .values
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Serialize and store `value` under `key`, flushing to disk for
    /// persistent areas.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the flush fails.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        inner
            .values
            .insert(key.to_string(), serde_json::to_value(value)?);
        inner.flush()
    }

    /// Remove the value under `key`, flushing to disk for persistent
    /// areas. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        if inner.values.remove(key).is_some() {
            inner.flush()?;
        }
        Ok(())
    }

    /// Whether a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.values.contains_key(key))
            .unwrap_or(false)
    }
}

impl AreaInner {
    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
