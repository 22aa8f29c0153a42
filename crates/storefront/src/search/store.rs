//! The search store: debounced queries against the product index.
//!
//! Keystrokes go through a [`Debouncer`]; filter and sort changes take
//! effect immediately. A worker task watches both, runs the search, and
//! publishes results through a watch channel. Result sets for repeated
//! (query, filters, sort) combinations are served from a `moka` cache
//! once the index is ready.

use std::sync::{Arc, Weak};

use moka::sync::Cache;
use tokio::sync::watch;

use crate::config::SearchConfig;

use super::debounce::Debouncer;
use super::{SearchFilters, SearchIndex, SearchResults, SearchSort};

/// Filter and sort state applied to every search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub filters: SearchFilters,
    pub sort: SearchSort,
}

/// Cache key: the full shape of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    filters: SearchFilters,
    sort: SearchSort,
}

/// The search store.
///
/// Cheaply cloneable; clones share the same query state and results.
/// Must be created inside a Tokio runtime: construction spawns the
/// search worker.
#[derive(Clone)]
pub struct SearchStore {
    inner: Arc<SearchStoreInner>,
}

struct SearchStoreInner {
    index: SearchIndex,
    debouncer: Debouncer<String>,
    criteria: watch::Sender<SearchCriteria>,
    results: watch::Sender<Arc<SearchResults>>,
    cache: Cache<CacheKey, Arc<SearchResults>>,
    limit: usize,
}

impl SearchStore {
    /// Create the store around an index handle.
    ///
    /// The index may still be empty; results stay empty until it is
    /// built and a query or criteria change happens.
    #[must_use]
    pub fn new(index: SearchIndex, config: &SearchConfig) -> Self {
        let inner = Arc::new(SearchStoreInner {
            index,
            debouncer: Debouncer::new(config.debounce),
            criteria: watch::channel(SearchCriteria::default()).0,
            results: watch::channel(Arc::new(SearchResults::default())).0,
            cache: Cache::builder().max_capacity(config.cache_size).build(),
            limit: config.limit,
        });
        Self::spawn_worker(&inner);
        Self { inner }
    }

    /// The shared index handle (for the background builder).
    #[must_use]
    pub fn index(&self) -> &SearchIndex {
        &self.inner.index
    }

    /// Subscribe to published result sets.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<SearchResults>> {
        self.inner.results.subscribe()
    }

    /// The most recently published results.
    #[must_use]
    pub fn results(&self) -> Arc<SearchResults> {
        self.inner.results.borrow().clone()
    }

    /// Feed a keystroke's worth of query text; the search runs once the
    /// debounce quiet period elapses.
    pub fn set_query(&self, query: impl Into<String>) {
        self.inner.debouncer.push(query.into());
    }

    /// Run the pending query immediately (e.g. the user pressed Enter).
    pub fn flush_query(&self) {
        self.inner.debouncer.flush();
    }

    /// Drop the pending query without running it (e.g. the search box
    /// was closed).
    pub fn cancel_pending(&self) {
        self.inner.debouncer.cancel();
    }

    /// Replace the filters; takes effect immediately.
    pub fn set_filters(&self, filters: SearchFilters) {
        self.inner
            .criteria
            .send_modify(|criteria| criteria.filters = filters);
    }

    /// Replace the sort order; takes effect immediately.
    pub fn set_sort(&self, sort: SearchSort) {
        self.inner
            .criteria
            .send_modify(|criteria| criteria.sort = sort);
    }

    /// The current filter and sort state.
    #[must_use]
    pub fn criteria(&self) -> SearchCriteria {
        self.inner.criteria.borrow().clone()
    }

    /// Spawn the worker that turns query/criteria changes into
    /// published results.
    ///
    /// The worker holds only a weak reference; it exits when the store
    /// is dropped (every channel sender goes with it).
    fn spawn_worker(inner: &Arc<SearchStoreInner>) {
        let mut query_rx = inner.debouncer.subscribe();
        let mut criteria_rx = inner.criteria.subscribe();
        let weak: Weak<SearchStoreInner> = Arc::downgrade(inner);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = criteria_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                // Coalesce whatever arrived while we were searching.
                let query = query_rx.borrow_and_update().clone().unwrap_or_default();
                let criteria = criteria_rx.borrow_and_update().clone();

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let results = inner.execute(&query, &criteria);
                inner.results.send_replace(results);
            }
        });
    }
}

impl SearchStoreInner {
    /// Run one search, consulting the cache when the index is ready.
    fn execute(&self, query: &str, criteria: &SearchCriteria) -> Arc<SearchResults> {
        let normalized = query.trim().to_lowercase();

        if !self.index.is_ready() {
            // Don't cache pre-build emptiness; it would mask the real
            // results once the index lands.
            return Arc::new(SearchResults {
                query: normalized,
                ..Default::default()
            });
        }

        let key = CacheKey {
            query: normalized.clone(),
            filters: criteria.filters.clone(),
            sort: criteria.sort,
        };
        self.cache.get_with(key, || {
            match self
                .index
                .search(&normalized, &criteria.filters, criteria.sort, self.limit)
            {
                Ok(results) => Arc::new(results),
                Err(e) => {
                    tracing::warn!(error = %e, query = %normalized, "Search failed");
                    Arc::new(SearchResults {
                        query: normalized.clone(),
                        ..Default::default()
                    })
                }
            }
        })
    }
}
