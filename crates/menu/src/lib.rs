//! Samovar Menu library.
//!
//! This crate provides the catalog fetch/cache core as a library,
//! allowing it to be tested and reused by host processes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cart;
pub mod clock;
pub mod config;
pub mod sbis;
pub mod state;
pub mod store;
