//! Core types for Samovar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartEntry};
pub use id::*;
pub use price::Price;
pub use product::ProductRecord;
pub use status::ProductStatus;
