//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Availability status of a normalized catalog product.
///
/// Every record produced by a catalog fetch is marked `Available`;
/// `Unavailable` exists so that a stop-listed item can be kept in the
/// snapshot instead of silently disappearing from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Available,
    Unavailable,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::Available).unwrap(),
            "\"available\""
        );
        let status: ProductStatus = serde_json::from_str("\"unavailable\"").unwrap();
        assert_eq!(status, ProductStatus::Unavailable);
    }

    #[test]
    fn test_status_default() {
        assert_eq!(ProductStatus::default(), ProductStatus::Available);
    }
}
