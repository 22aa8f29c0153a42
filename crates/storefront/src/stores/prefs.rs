//! The display preference store.
//!
//! Only the persisted preference lives here; what a frontend does with
//! it is its own business.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::{StorageArea, keys};

/// The display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    /// The other mode.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// The display preference store.
///
/// Cheaply cloneable; clones share the same preference.
#[derive(Clone)]
pub struct PrefsStore {
    inner: Arc<PrefsInner>,
}

struct PrefsInner {
    state: watch::Sender<DisplayMode>,
    local: StorageArea,
}

impl PrefsStore {
    /// Build the store, hydrating from local storage.
    pub(crate) fn hydrate(local: StorageArea) -> Self {
        let mode = match local.get::<DisplayMode>(keys::DISPLAY_MODE) {
            Ok(Some(mode)) => mode,
            Ok(None) => DisplayMode::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable display mode");
                DisplayMode::default()
            }
        };

        Self {
            inner: Arc::new(PrefsInner {
                state: watch::channel(mode).0,
                local,
            }),
        }
    }

    /// Subscribe to preference changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisplayMode> {
        self.inner.state.subscribe()
    }

    /// The current display mode.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        *self.inner.state.borrow()
    }

    /// Set the display mode.
    pub fn set(&self, mode: DisplayMode) {
        let modified = self.inner.state.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                *current = mode;
                true
            }
        });
        if modified {
            self.persist(mode);
        }
    }

    /// Flip between light and dark; returns the new mode.
    pub fn toggle(&self) -> DisplayMode {
        let mode = self.display_mode().flipped();
        self.set(mode);
        mode
    }

    fn persist(&self, mode: DisplayMode) {
        if let Err(e) = self.inner.local.insert(keys::DISPLAY_MODE, &mode) {
            tracing::warn!(error = %e, "Failed to persist display mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        let store = PrefsStore::hydrate(StorageArea::ephemeral());
        assert_eq!(store.display_mode(), DisplayMode::Light);
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let local = StorageArea::ephemeral();
        let store = PrefsStore::hydrate(local.clone());

        assert_eq!(store.toggle(), DisplayMode::Dark);
        assert_eq!(store.toggle(), DisplayMode::Light);
        assert_eq!(store.toggle(), DisplayMode::Dark);

        let reopened = PrefsStore::hydrate(local);
        assert_eq!(reopened.display_mode(), DisplayMode::Dark);
    }

    #[test]
    fn test_set_same_mode_does_not_notify() {
        let store = PrefsStore::hydrate(StorageArea::ephemeral());
        let rx = store.subscribe();
        store.set(DisplayMode::Light);
        assert!(!rx.has_changed().unwrap_or(true));
    }
}
