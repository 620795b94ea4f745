//! Application state shared across the host process.

use std::sync::Arc;

use crate::cache::MenuCache;
use crate::cart::CartStore;
use crate::clock::{SharedClock, SystemClock};
use crate::config::MenuConfig;
use crate::sbis::{CatalogFetcher, SbisClient, SbisError};
use crate::store::SharedStore;

/// Application state: every long-lived component, constructed once and
/// injected from here.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MenuConfig,
    menu: MenuCache,
    carts: CartStore,
}

impl AppState {
    /// Create the application state over an already-connected store.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn new(config: MenuConfig, store: Arc<dyn SharedStore>) -> Result<Self, SbisError> {
        let clock: SharedClock = Arc::new(SystemClock);
        Self::with_clock(config, store, clock)
    }

    /// Create the application state with an explicit clock (used by
    /// tests to control expiry).
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn with_clock(
        config: MenuConfig,
        store: Arc<dyn SharedStore>,
        clock: SharedClock,
    ) -> Result<Self, SbisError> {
        let client = SbisClient::new(config.sbis.clone(), Arc::clone(&clock))?;
        let fetcher = CatalogFetcher::new(client);
        let menu = MenuCache::new(fetcher, Arc::clone(&store), clock);
        let carts = CartStore::new(store);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                menu,
                carts,
            }),
        })
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &MenuConfig {
        &self.inner.config
    }

    /// Get a reference to the layered catalog cache.
    #[must_use]
    pub fn menu(&self) -> &MenuCache {
        &self.inner.menu
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }
}
