//! In-memory backend for the shared store.
//!
//! Used by tests and local runs without Redis. The catalog map is
//! swapped wholesale under a write lock, giving the same
//! snapshot-or-nothing visibility as the Redis staging rename.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use samovar_core::{Cart, ProductId, ProductRecord, UserId};

use super::{SharedStore, StoreError};

/// Shared store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    catalog: RwLock<HashMap<ProductId, ProductRecord>>,
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn replace_catalog(&self, products: &[ProductRecord]) -> Result<(), StoreError> {
        let snapshot: HashMap<ProductId, ProductRecord> = products
            .iter()
            .map(|record| (record.id, record.clone()))
            .collect();
        *self.catalog.write().await = snapshot;
        Ok(())
    }

    async fn catalog(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.catalog.read().await.values().cloned().collect())
    }

    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.catalog.read().await.get(&id).cloned())
    }

    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn put_cart(&self, user_id: UserId, cart: &Cart) -> Result<(), StoreError> {
        self.carts.write().await.insert(user_id, cart.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use samovar_core::{Price, ProductStatus};

    use super::*;

    fn record(id: i64) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(id),
            name: format!("item-{id}"),
            price: Price::new(100 * id),
            description: None,
            image: None,
            status: ProductStatus::Available,
        }
    }

    #[tokio::test]
    async fn test_replace_catalog_is_wholesale() {
        let store = MemoryStore::new();
        store.replace_catalog(&[record(1), record(2)]).await.unwrap();
        store.replace_catalog(&[record(3)]).await.unwrap();

        let catalog = store.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.first().unwrap().id, ProductId::new(3));
        assert!(store.product(ProductId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_round_trip() {
        let store = MemoryStore::new();
        let user = UserId::new(77);
        assert!(store.cart(user).await.unwrap().is_none());

        let mut cart = Cart::new();
        cart.add(ProductId::new(5), 2);
        store.put_cart(user, &cart).await.unwrap();

        assert_eq!(store.cart(user).await.unwrap(), Some(cart));
    }
}
