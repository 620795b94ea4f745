//! Redis backend for the shared store.
//!
//! The catalog snapshot is one hash (`menu:catalog`), field = product
//! id, value = serialized record. A refresh writes the new snapshot
//! under a staging key and `RENAME`s it over the live key, so concurrent
//! readers never observe a half-written snapshot.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::warn;

use samovar_core::{Cart, ProductId, ProductRecord, UserId};

use super::{SharedStore, StoreError};

const CATALOG_KEY: &str = "menu:catalog";
const CATALOG_STAGING_KEY: &str = "menu:catalog:staging";

/// Build the per-user cart key.
fn cart_key(user_id: UserId) -> String {
    format!("menu:cart:{user_id}")
}

/// Shared store backed by Redis.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn replace_catalog(&self, products: &[ProductRecord]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        if products.is_empty() {
            let _: () = conn.del(CATALOG_KEY).await?;
            return Ok(());
        }

        let mut fields = Vec::with_capacity(products.len());
        for product in products {
            fields.push((product.id.to_string(), serde_json::to_string(product)?));
        }

        // Leftover staging data from an aborted earlier cycle is stale.
        let _: () = conn.del(CATALOG_STAGING_KEY).await?;
        let _: () = conn.hset_multiple(CATALOG_STAGING_KEY, &fields).await?;
        let _: () = conn.rename(CATALOG_STAGING_KEY, CATALOG_KEY).await?;
        Ok(())
    }

    async fn catalog(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: std::collections::HashMap<String, String> = conn.hgetall(CATALOG_KEY).await?;

        let mut records = Vec::with_capacity(raw.len());
        for (id, value) in raw {
            match serde_json::from_str::<ProductRecord>(&value) {
                Ok(record) => records.push(record),
                // One corrupt entry must not take down the whole read.
                Err(e) => warn!(id, error = %e, "skipping unreadable catalog entry"),
            }
        }
        Ok(records)
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.hget(CATALOG_KEY, id.to_string()).await?;
        raw.map(|value| serde_json::from_str(&value).map_err(StoreError::from))
            .transpose()
    }

    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(cart_key(user_id)).await?;
        raw.map(|value| serde_json::from_str(&value).map_err(StoreError::from))
            .transpose()
    }

    async fn put_cart(&self, user_id: UserId, cart: &Cart) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let value = serde_json::to_string(cart)?;
        let _: () = conn.set(cart_key(user_id), value).await?;
        Ok(())
    }
}
