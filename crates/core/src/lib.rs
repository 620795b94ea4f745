//! Samovar Core - Shared types library.
//!
//! This crate provides common types used across all Samovar components:
//! - `menu` - Catalog fetch/cache service and its host binary
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no Redis access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices, the
//!   normalized product record, and the cart model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
