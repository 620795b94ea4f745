//! Per-user cart model.
//!
//! The cart is a small value object persisted as one JSON blob per user.
//! All mutation logic lives here as pure methods so the store layer only
//! has to do a load-mutate-save cycle; the invariant that a product id
//! appears at most once is enforced by the methods, never by callers.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A single cart line: product and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A user's cart: an ordered sequence of entries with unique product ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a product.
    ///
    /// If the product is already in the cart its quantity is incremented;
    /// otherwise a new entry is appended. Adding zero of a new product
    /// still creates the entry, matching the append semantics of the
    /// underlying API.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(entry) = self.items.iter_mut().find(|e| e.product_id == product_id) {
            entry.quantity = entry.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartEntry {
                product_id,
                quantity,
            });
        }
    }

    /// Set the quantity of a product.
    ///
    /// A quantity of zero removes the entry entirely. Setting a quantity
    /// for a product not in the cart inserts it.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(entry) = self.items.iter_mut().find(|e| e.product_id == product_id) {
            entry.quantity = quantity;
        } else {
            self.items.push(CartEntry {
                product_id,
                quantity,
            });
        }
    }

    /// Remove a product from the cart; no-op if it is not present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|e| e.product_id != product_id);
    }

    /// Quantity of a product, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|e| e.product_id == product_id)
            .map_or(0, |e| e.quantity)
    }
}
