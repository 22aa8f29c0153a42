//! Delay-and-collapse debouncing for rapidly changing values.
//!
//! A [`Debouncer`] absorbs a stream of pushed values and emits only the
//! latest one, once the configured delay has elapsed with no newer
//! push. `flush` short-circuits the wait; `cancel` drops the pending
//! value entirely. This is what keeps search-as-you-type from querying
//! the index on every keystroke.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

/// A generation-counted debouncer.
///
/// Each `push` bumps the generation and arms a timer; when a timer
/// fires it only emits if no newer push (or flush/cancel) has happened
/// in the meantime. Cheaply cloneable; clones share the same pending
/// value and output channel.
///
/// Must be used inside a Tokio runtime: `push` spawns the timer task.
#[derive(Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Arc<Mutex<Pending<T>>>,
    out: Arc<watch::Sender<Option<T>>>,
}

struct Pending<T> {
    value: Option<T>,
    generation: u64,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(Pending {
                value: None,
                generation: 0,
            })),
            out: Arc::new(watch::channel(None).0),
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Subscribe to emitted values.
    ///
    /// The receiver starts at `None`; every emission replaces the value
    /// with `Some(latest)`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.out.subscribe()
    }

    /// Supply a new value, restarting the quiet period.
    pub fn push(&self, value: T) {
        let generation = {
            let Ok(mut pending) = self.pending.lock() else {
                return;
            };
            pending.value = Some(value);
            pending.generation += 1;
            pending.generation
        };

        let pending = Arc::clone(&self.pending);
        let out = Arc::clone(&self.out);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let emit = {
                let Ok(mut pending) = pending.lock() else {
                    return;
                };
                if pending.generation == generation {
                    pending.value.take()
                } else {
                    // A newer push restarted the clock; let its timer win.
                    None
                }
            };
            if let Some(value) = emit {
                out.send_replace(Some(value));
            }
        });
    }

    /// Emit the pending value immediately, if any.
    pub fn flush(&self) {
        let value = {
            let Ok(mut pending) = self.pending.lock() else {
                return;
            };
            pending.generation += 1;
            pending.value.take()
        };
        if let Some(value) = value {
            self.out.send_replace(Some(value));
        }
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.generation += 1;
            pending.value = None;
        }
    }
}
