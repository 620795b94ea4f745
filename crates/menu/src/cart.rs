//! Per-user cart persistence.
//!
//! Each operation is a read-modify-write of the user's cart blob in the
//! shared store, serialized per user by a keyed async mutex so
//! concurrent mutations for the same user cannot lose updates. Reads
//! degrade to an empty cart when the store is unreadable; mutations
//! propagate store failures so a caller never sees a write confirmed
//! that was not persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{instrument, warn};

use samovar_core::{Cart, ProductId, UserId};

use crate::store::{SharedStore, StoreError};

/// Cart CRUD over the shared store.
pub struct CartStore {
    store: Arc<dyn SharedStore>,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl CartStore {
    /// Create a cart store over the shared substrate.
    #[must_use]
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get a user's cart; absent or unreadable carts read as empty.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get(&self, user_id: UserId) -> Cart {
        match self.store.cart(user_id).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "cart unreadable, serving empty cart");
                Cart::new()
            }
        }
    }

    /// Add `quantity` of a product, merging with an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be loaded or stored.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, StoreError> {
        self.mutate(user_id, |cart| cart.add(product_id, quantity))
            .await
    }

    /// Set a product's quantity; zero removes the entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be loaded or stored.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, StoreError> {
        self.mutate(user_id, |cart| cart.set_quantity(product_id, quantity))
            .await
    }

    /// Remove a product from the cart; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be loaded or stored.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn delete(&self, user_id: UserId, product_id: ProductId) -> Result<Cart, StoreError> {
        self.mutate(user_id, |cart| cart.remove(product_id)).await
    }

    /// Run one serialized read-modify-write cycle for a user.
    async fn mutate(
        &self,
        user_id: UserId,
        apply: impl FnOnce(&mut Cart),
    ) -> Result<Cart, StoreError> {
        let lock = self.user_lock(user_id).await;
        let guard = lock.lock().await;

        let result = async {
            let mut cart = self.store.cart(user_id).await?.unwrap_or_default();
            apply(&mut cart);
            self.store.put_cart(user_id, &cart).await?;
            Ok(cart)
        }
        .await;

        drop(guard);
        drop(lock);
        self.release_user_lock(user_id).await;
        result
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Evict the user's lock entry once no other task holds it, so the
    /// map does not grow with every user ever seen.
    async fn release_user_lock(&self, user_id: UserId) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(&user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&user_id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cart_store() -> CartStore {
        CartStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_get_missing_cart_is_empty() {
        let carts = cart_store();
        assert!(carts.get(UserId::new(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_add_merges_quantities() {
        let carts = cart_store();
        let user = UserId::new(1);
        let product = ProductId::new(10);

        carts.add(user, product, 2).await.unwrap();
        let cart = carts.add(user, product, 3).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of(product), 5);
        assert_eq!(carts.get(user).await, cart);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_entry() {
        let carts = cart_store();
        let user = UserId::new(1);
        let product = ProductId::new(10);

        carts.add(user, product, 5).await.unwrap();
        let cart = carts.update(user, product, 0).await.unwrap();

        assert!(cart.is_empty());
        assert!(carts.get(user).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_entry_is_noop() {
        let carts = cart_store();
        let user = UserId::new(1);

        carts.add(user, ProductId::new(10), 1).await.unwrap();
        let cart = carts.delete(user, ProductId::new(99)).await.unwrap();

        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_carts_are_scoped_per_user() {
        let carts = cart_store();
        carts.add(UserId::new(1), ProductId::new(10), 1).await.unwrap();
        carts.add(UserId::new(2), ProductId::new(20), 2).await.unwrap();

        assert_eq!(carts.get(UserId::new(1)).await.items.len(), 1);
        assert_eq!(
            carts.get(UserId::new(2)).await.quantity_of(ProductId::new(20)),
            2
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let carts = Arc::new(cart_store());
        let user = UserId::new(1);
        let product = ProductId::new(10);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let carts = Arc::clone(&carts);
            handles.push(tokio::spawn(async move {
                carts.add(user, product, 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(carts.get(user).await.quantity_of(product), 10);
        assert!(carts.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_user_locks_are_evicted_after_mutations() {
        let carts = cart_store();

        carts.add(UserId::new(1), ProductId::new(10), 1).await.unwrap();
        carts.add(UserId::new(2), ProductId::new(20), 1).await.unwrap();
        carts.delete(UserId::new(1), ProductId::new(10)).await.unwrap();

        assert!(carts.locks.lock().await.is_empty());
    }
}
