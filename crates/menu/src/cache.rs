//! Layered catalog caching.
//!
//! Two short-TTL in-process tiers (categories: 15 minutes, single
//! product: 5 minutes) sit in front of the shared store, which holds the
//! full catalog snapshot and is refreshed wholesale by a periodic
//! background task. Store failures never propagate out of a read path;
//! they degrade to a direct upstream fetch.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, instrument, warn};

use samovar_core::{ProductId, ProductRecord};

use crate::clock::SharedClock;
use crate::sbis::SbisError;
use crate::sbis::catalog::CatalogFetcher;
use crate::sbis::types::Nomenclature;
use crate::store::{SharedStore, StoreError};

const CATEGORY_TTL: Duration = Duration::from_secs(15 * 60);
const PRODUCT_TTL: Duration = Duration::from_secs(5 * 60);

/// A failure of one refresh cycle. Contained by the periodic task;
/// surfaced only to direct callers of [`MenuCache::refresh_once`].
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] SbisError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// TtlCache
// =============================================================================

/// A small expiring map with an injected clock.
///
/// Entries are immutable once constructed; concurrent writers may race
/// on population and the last writer wins, which is harmless because
/// both wrote the same upstream answer.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: SharedClock,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries expire `ttl` after insertion.
    #[must_use]
    pub fn new(ttl: Duration, clock: SharedClock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Get a live entry; expired entries are treated as absent.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Insert a value, restarting its TTL.
    pub async fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(key, Entry { value, expires_at });
    }
}

// =============================================================================
// MenuCache
// =============================================================================

/// Read-side facade over the fetch pipeline, the TTL tiers, and the
/// shared snapshot.
#[derive(Clone)]
pub struct MenuCache {
    inner: Arc<MenuCacheInner>,
}

struct MenuCacheInner {
    fetcher: CatalogFetcher,
    store: Arc<dyn SharedStore>,
    tenant: String,
    categories: TtlCache<String, Arc<Vec<Nomenclature>>>,
    products: TtlCache<String, ProductRecord>,
}

impl MenuCache {
    /// Create the cache facade.
    #[must_use]
    pub fn new(fetcher: CatalogFetcher, store: Arc<dyn SharedStore>, clock: SharedClock) -> Self {
        let tenant = fetcher.client().config().app_client_id.clone();
        Self {
            inner: Arc::new(MenuCacheInner {
                fetcher,
                store,
                tenant,
                categories: TtlCache::new(CATEGORY_TTL, Arc::clone(&clock)),
                products: TtlCache::new(PRODUCT_TTL, clock),
            }),
        }
    }

    /// The underlying fetcher, for callers that need an uncached read.
    #[must_use]
    pub fn fetcher(&self) -> &CatalogFetcher {
        &self.inner.fetcher
    }

    /// Get the full catalog.
    ///
    /// Served from the shared snapshot; an empty or unreadable snapshot
    /// falls through to a direct upstream fetch instead of returning
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] only if the fallback fetch itself fails.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Vec<ProductRecord>, SbisError> {
        match self.inner.store.catalog().await {
            Ok(records) if !records.is_empty() => {
                debug!(count = records.len(), "catalog served from shared store");
                return Ok(records);
            }
            Ok(_) => debug!("shared store empty, fetching catalog directly"),
            Err(e) => warn!(error = %e, "shared store unreadable, fetching catalog directly"),
        }
        self.inner.fetcher.fetch_full_catalog().await
    }

    /// Get the top-level categories (15-minute in-process cache).
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] if the entry is stale and the refetch
    /// fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Nomenclature>>, SbisError> {
        if let Some(categories) = self.inner.categories.get(&self.inner.tenant).await {
            debug!("category cache hit");
            return Ok(categories);
        }

        let categories = Arc::new(self.inner.fetcher.fetch_categories().await?);
        self.inner
            .categories
            .insert(self.inner.tenant.clone(), Arc::clone(&categories))
            .await;
        Ok(categories)
    }

    /// Get one product by id.
    ///
    /// Read order: shared snapshot, then the 5-minute detail cache, then
    /// a full upstream fetch. Only found products are cached; an absent
    /// product is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] if every cached tier misses and the
    /// upstream fetch fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_detail(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductRecord>, SbisError> {
        match self.inner.store.product(product_id).await {
            Ok(Some(record)) => {
                debug!("product served from shared store");
                return Ok(Some(record));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "shared store unreadable for product read"),
        }

        let key = format!("{}:{product_id}", self.inner.tenant);
        if let Some(record) = self.inner.products.get(&key).await {
            debug!("product detail cache hit");
            return Ok(Some(record));
        }

        let record = self.inner.fetcher.fetch_product_detail(product_id).await?;
        if let Some(record) = &record {
            self.inner.products.insert(key, record.clone()).await;
        }
        Ok(record)
    }

    /// Run one refresh cycle: fetch the full catalog and replace the
    /// shared snapshot.
    ///
    /// A fetch failure leaves the previous snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError`] if the fetch or the snapshot swap fails.
    #[instrument(skip(self))]
    pub async fn refresh_once(&self) -> Result<usize, RefreshError> {
        let records = self.inner.fetcher.fetch_full_catalog().await?;
        self.inner.store.replace_catalog(&records).await?;
        info!(count = records.len(), "catalog snapshot refreshed");
        Ok(records.len())
    }

    /// Spawn the periodic refresh task.
    ///
    /// Runs until `shutdown` signals (or its sender is dropped). Cycle
    /// failures are logged and contained; the next tick retries.
    pub fn spawn_refresh(
        &self,
        interval: Duration,
        mut shutdown: watch::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "catalog refresh task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = cache.refresh_once().await {
                            error!(error = %e, "catalog refresh cycle failed, keeping previous snapshot");
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("catalog refresh task stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual_clock() -> (Arc<ManualClock>, SharedClock) {
        let clock = Arc::new(ManualClock::new());
        let shared: SharedClock = Arc::clone(&clock) as SharedClock;
        (clock, shared)
    }

    #[tokio::test]
    async fn test_ttl_cache_hit_before_expiry() {
        let (_, shared) = manual_clock();
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60), shared);

        cache.insert("k", 7).await;
        assert_eq!(cache.get(&"k").await, Some(7));
    }

    #[tokio::test]
    async fn test_ttl_cache_expires() {
        let (clock, shared) = manual_clock();
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60), shared);

        cache.insert("k", 7).await;
        clock.advance(Duration::from_secs(61));
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn test_ttl_cache_insert_restarts_ttl() {
        let (clock, shared) = manual_clock();
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60), shared);

        cache.insert("k", 7).await;
        clock.advance(Duration::from_secs(45));
        cache.insert("k", 8).await;
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get(&"k").await, Some(8));
    }
}
