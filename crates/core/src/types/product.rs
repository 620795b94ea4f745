//! Normalized catalog product record.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;
use crate::types::status::ProductStatus;

/// A normalized catalog entry.
///
/// This is the unit the shared store holds and clients read. It is
/// rebuilt wholesale on every refresh cycle; the `id` is the upstream
/// hierarchical identifier and the shared key between the fetch
/// pipeline, the store, and cart entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// Declared cost in minor currency units.
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    /// Decoded photo URL; `None` when the image reference could not be
    /// decoded.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trips_through_json() {
        let record = ProductRecord {
            id: ProductId::new(101),
            name: "Pelmeni".to_string(),
            price: Price::new(35_000),
            description: Some("With sour cream".to_string()),
            image: None,
            status: ProductStatus::Available,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_tolerates_missing_optional_fields() {
        let record: ProductRecord =
            serde_json::from_str(r#"{"id": 5, "name": "Tea", "price": 9000}"#).unwrap();
        assert_eq!(record.id, ProductId::new(5));
        assert_eq!(record.description, None);
        assert_eq!(record.image, None);
        assert_eq!(record.status, ProductStatus::Available);
    }
}
