//! The toast notification store.
//!
//! A small queue of transient messages. Each pushed toast schedules its
//! own expiry task; dismissal just removes it early. Never persisted.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use crate::models::toast::{Toast, ToastLevel};

/// The toast store.
///
/// Cheaply cloneable; clones share the same queue. Must be used inside
/// a Tokio runtime: `push` spawns the expiry timer.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastInner>,
}

struct ToastInner {
    state: watch::Sender<Vec<Toast>>,
    ttl: Duration,
}

impl ToastStore {
    /// Create an empty store whose toasts live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(ToastInner {
                state: watch::channel(Vec::new()).0,
                ttl,
            }),
        }
    }

    /// Subscribe to queue changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.state.subscribe()
    }

    /// The current queue, oldest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.state.borrow().clone()
    }

    /// Push a toast and schedule its auto-dismissal.
    ///
    /// Returns the toast's id for early dismissal.
    pub fn push(&self, level: ToastLevel, message: impl Into<String>) -> Uuid {
        let toast = Toast::new(level, message);
        let id = toast.id;
        tracing::debug!(%id, level = %level, "Toast pushed");

        self.inner.state.send_modify(|toasts| toasts.push(toast));

        let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
        });

        id
    }

    /// Dismiss a toast early. Returns whether it was still up.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.inner.remove(id)
    }
}

impl ToastInner {
    fn remove(&self, id: Uuid) -> bool {
        self.state.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|toast| toast.id != id);
            toasts.len() != before
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(4000);

    #[tokio::test(start_paused = true)]
    async fn test_push_and_auto_expiry() {
        let store = ToastStore::new(TTL);
        store.push(ToastLevel::Success, "Added to cart");
        assert_eq!(store.toasts().len(), 1);

        // Let the expiry task fire.
        tokio::time::sleep(TTL + Duration::from_millis(1)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_before_expiry() {
        let store = ToastStore::new(TTL);
        let id = store.push(ToastLevel::Error, "Only 2 in stock");

        assert!(store.dismiss(id));
        assert!(store.toasts().is_empty());
        // Expiry after dismissal is a no-op.
        assert!(!store.dismiss(id));
        tokio::time::sleep(TTL + Duration::from_millis(1)).await;
        assert!(store.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_keeps_insertion_order() {
        let store = ToastStore::new(TTL);
        store.push(ToastLevel::Info, "first");
        store.push(ToastLevel::Info, "second");

        let messages: Vec<String> = store
            .toasts()
            .into_iter()
            .map(|toast| toast.message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staggered_toasts_expire_independently() {
        let store = ToastStore::new(TTL);
        store.push(ToastLevel::Info, "early");
        tokio::time::sleep(TTL / 2).await;
        store.push(ToastLevel::Info, "late");

        tokio::time::sleep(TTL / 2 + Duration::from_millis(1)).await;
        let remaining = store.toasts();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.first().unwrap().message, "late");
    }
}
