//! Shared persistence substrate.
//!
//! One longer-lived key/value store is shared by the catalog refresh
//! task and the cart operations: the full catalog snapshot lives under a
//! single hash key (product id -> serialized record) and each user's
//! cart under its own key. [`RedisStore`] is the production backend;
//! [`MemoryStore`] backs tests and local runs.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use thiserror::Error;

use samovar_core::{Cart, ProductId, ProductRecord, UserId};

/// Errors from the shared store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store refused or failed the operation.
    #[error("store error: {0}")]
    Backend(#[from] ::redis::RedisError),

    /// A stored value could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value operations required of the shared store.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Atomically replace the full catalog snapshot.
    ///
    /// Readers observe either the previous snapshot or the new one,
    /// never a partially written mix.
    async fn replace_catalog(&self, products: &[ProductRecord]) -> Result<(), StoreError>;

    /// Read the full catalog snapshot; empty if never refreshed.
    async fn catalog(&self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Read one product from the snapshot.
    async fn product(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError>;

    /// Read a user's stored cart, `None` if absent.
    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError>;

    /// Store a user's cart wholesale.
    async fn put_cart(&self, user_id: UserId, cart: &Cart) -> Result<(), StoreError>;
}
