//! The storefront composition root.
//!
//! [`Storefront`] wires the config, catalog, storage areas, and every
//! store together behind one cheaply-cloneable handle. Opening the
//! storefront hydrates persisted state; search indexing is started
//! separately so callers control when the background work begins.

use std::sync::Arc;

use crate::catalog::ProductCatalog;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::search::{SearchIndex, SearchStore, build_index_async, build_index_sync};
use crate::storage::StorageArea;
use crate::stores::{CartStore, PrefsStore, ProfileStore, ToastStore};

/// The assembled storefront engine.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog and every store. Must be created inside a Tokio runtime:
/// the search store spawns its worker at construction.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    catalog: ProductCatalog,
    local: StorageArea,
    session: StorageArea,
    cart: CartStore,
    profile: ProfileStore,
    prefs: PrefsStore,
    toasts: ToastStore,
    search: SearchStore,
}

impl Storefront {
    /// Open the storefront: load the catalog from the configured file
    /// and hydrate all persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or local storage cannot be
    /// loaded.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let catalog = ProductCatalog::load(&config.catalog_file)?;
        Self::with_catalog(config, catalog)
    }

    /// Open the storefront around an already-loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be loaded.
    pub fn with_catalog(config: StorefrontConfig, catalog: ProductCatalog) -> Result<Self> {
        let local = StorageArea::persistent(config.local_storage_file())?;
        let session = StorageArea::ephemeral();

        let cart = CartStore::hydrate(
            local.clone(),
            session.clone(),
            &catalog,
            catalog.currency(),
            config.checkout_delay,
        );
        let profile = ProfileStore::hydrate(local.clone());
        let prefs = PrefsStore::hydrate(local.clone());
        let toasts = ToastStore::new(config.toast_ttl);
        let search = SearchStore::new(SearchIndex::new(), &config.search);

        tracing::info!(products = catalog.len(), "Storefront opened");

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                catalog,
                local,
                session,
                cart,
                profile,
                prefs,
                toasts,
                search,
            }),
        })
    }

    /// Start building the search index in the background.
    ///
    /// Until the build lands, searches return empty results.
    pub fn start_search_indexing(&self) {
        build_index_async(
            self.inner.search.index().clone(),
            self.inner.catalog.clone(),
        );
    }

    /// Build the search index inline. One-shot tools and tests use this
    /// instead of the background build.
    ///
    /// # Errors
    ///
    /// Returns an error if the index build fails.
    pub fn build_search_index(&self) -> Result<()> {
        build_index_sync(self.inner.search.index(), &self.inner.catalog)?;
        Ok(())
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the profile store.
    #[must_use]
    pub fn profile(&self) -> &ProfileStore {
        &self.inner.profile
    }

    /// Get a reference to the preferences store.
    #[must_use]
    pub fn prefs(&self) -> &PrefsStore {
        &self.inner.prefs
    }

    /// Get a reference to the toast store.
    #[must_use]
    pub fn toasts(&self) -> &ToastStore {
        &self.inner.toasts
    }

    /// Get a reference to the search store.
    #[must_use]
    pub fn search(&self) -> &SearchStore {
        &self.inner.search
    }

    /// The persistent (local) storage area. Frontends may keep their
    /// own keys here alongside the engine's.
    #[must_use]
    pub fn local_storage(&self) -> &StorageArea {
        &self.inner.local
    }

    /// The ephemeral (session) storage area.
    #[must_use]
    pub fn session_storage(&self) -> &StorageArea {
        &self.inner.session
    }
}
