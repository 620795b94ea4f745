//! SBIS retail API access layer.
//!
//! # Architecture
//!
//! - [`auth::TokenManager`] issues and caches access tokens per client id
//!   (fixed 1-hour validity, explicit invalidation).
//! - [`client::SbisClient`] executes single API calls with bounded
//!   retries, a fixed 1-second backoff on transport failures, and
//!   token-invalidation-on-401.
//! - [`catalog::CatalogFetcher`] orchestrates the multi-step catalog
//!   assembly (sales point -> price list -> nomenclature list) and
//!   normalizes entries into [`samovar_core::ProductRecord`]s.
//!
//! The upstream contract: token issuance is a JSON `POST` to
//! `/oauth/service/` on the authorization host; all retail endpoints live
//! on the API host and carry the token in the `X-SBISAccessToken` header.

pub mod auth;
pub mod catalog;
pub mod client;
pub mod types;

pub use auth::{AccessToken, TokenManager};
pub use catalog::CatalogFetcher;
pub use client::SbisClient;

use thiserror::Error;

/// Errors that can occur when talking to the SBIS API.
#[derive(Debug, Error)]
pub enum SbisError {
    /// Credential rejected or malformed token response. Never retried
    /// internally; the boundary layer maps this to an unauthorized
    /// response.
    #[error("SBIS authorization failed: {0}")]
    Auth(String),

    /// Upstream returned a non-success status (after retries for 401).
    #[error("SBIS request failed with status {0}")]
    Status(u16),

    /// Transport-level failure (timeout, connection error) after retries
    /// were exhausted.
    #[error("SBIS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("SBIS response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An upstream collection was missing an entry the pipeline relies
    /// on (e.g., no sales points, or too few price lists).
    #[error("SBIS response incomplete: {0}")]
    Incomplete(&'static str),
}

impl SbisError {
    /// Whether this error represents a rejected credential.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Status(401))
    }
}
