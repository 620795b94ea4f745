//! Multi-step catalog assembly.
//!
//! Every operation walks the same upstream chain: token, sales point,
//! price list, nomenclature list. The sales point is always the first
//! one returned (single-point-per-tenant assumption); the price list is
//! selected by position, see the constants below.

use chrono::Local;
use tracing::{debug, instrument};

use samovar_core::{Price, ProductId, ProductRecord, ProductStatus, SalesPointId};

use crate::sbis::SbisError;
use crate::sbis::client::SbisClient;
use crate::sbis::types::{Nomenclature, NomenclatureQuery, decode_photo_url};

/// Position of the full-product price list in the upstream-ordered
/// `priceLists` collection.
///
/// Upstream documents no stable order for this collection, so selection
/// by position is a compatibility risk inherited from the upstream
/// integration; if SBIS ever exposes a stable discriminator, select by
/// that instead.
pub const PRICE_LIST_PRODUCTS_POSITION: usize = 3;

/// Position of the category-listing price list. Same caveat as
/// [`PRICE_LIST_PRODUCTS_POSITION`].
pub const PRICE_LIST_CATEGORIES_POSITION: usize = 1;

/// Parent-category marker of entries excluded from the public catalog.
pub const EXCLUDED_PARENT: i64 = 2382;

/// Parent marker identifying top-level category nodes.
pub const CATEGORY_ROOT_PARENT: i64 = 2110;

/// Builds normalized catalog data from the retail API.
#[derive(Clone)]
pub struct CatalogFetcher {
    client: SbisClient,
}

impl CatalogFetcher {
    /// Create a fetcher over an API client.
    #[must_use]
    pub const fn new(client: SbisClient) -> Self {
        Self { client }
    }

    /// The API client backing this fetcher.
    #[must_use]
    pub const fn client(&self) -> &SbisClient {
        &self.client
    }

    /// Fetch the full catalog as normalized product records.
    ///
    /// Entries without an image reference, and entries under the
    /// excluded parent category, are dropped. An entry whose image
    /// reference fails to decode is kept with `image: None`.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] if any pipeline step fails.
    #[instrument(skip(self))]
    pub async fn fetch_full_catalog(&self) -> Result<Vec<ProductRecord>, SbisError> {
        let listing = self
            .fetch_nomenclature(PRICE_LIST_PRODUCTS_POSITION, NomenclatureQuery::products)
            .await?;

        let records: Vec<ProductRecord> = listing
            .into_iter()
            .filter_map(|entry| Self::normalize(&entry))
            .collect();

        debug!(count = records.len(), "catalog normalized");
        Ok(records)
    }

    /// Fetch the top-level category entries, unconverted.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] if any pipeline step fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Nomenclature>, SbisError> {
        let listing = self
            .fetch_nomenclature(PRICE_LIST_CATEGORIES_POSITION, NomenclatureQuery::categories)
            .await?;

        Ok(listing
            .into_iter()
            .filter(|entry| entry.hierarchical_parent == Some(CATEGORY_ROOT_PARENT))
            .collect())
    }

    /// Fetch one product by id.
    ///
    /// There is no single-product upstream endpoint; this repeats the
    /// full pipeline and scans the listing. An absent product is
    /// `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] if any pipeline step fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn fetch_product_detail(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductRecord>, SbisError> {
        let listing = self
            .fetch_nomenclature(PRICE_LIST_PRODUCTS_POSITION, NomenclatureQuery::products)
            .await?;

        Ok(listing
            .into_iter()
            .find(|entry| entry.hierarchical_id == product_id)
            .map(|entry| Self::to_record(&entry)))
    }

    /// Run the token -> point -> price list -> nomenclature chain.
    async fn fetch_nomenclature(
        &self,
        price_list_position: usize,
        build_query: impl FnOnce(SalesPointId, samovar_core::PriceListId) -> NomenclatureQuery,
    ) -> Result<Vec<Nomenclature>, SbisError> {
        let points = self.client.sales_points().await?;
        let point = points
            .sales_points
            .first()
            .ok_or(SbisError::Incomplete("no sales points for tenant"))?;

        let actual_date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let price_lists = self.client.price_lists(point.id, &actual_date).await?;
        let price_list = price_lists
            .price_lists
            .get(price_list_position)
            .ok_or(SbisError::Incomplete("price list position out of range"))?;

        let listing = self
            .client
            .nomenclature(&build_query(point.id, price_list.id))
            .await?;
        Ok(listing.nomenclatures)
    }

    /// Apply the catalog inclusion rules to one entry.
    ///
    /// `None` means the entry is dropped from the catalog entirely; a
    /// failed image decode only nulls the image.
    fn normalize(entry: &Nomenclature) -> Option<ProductRecord> {
        if entry.first_image().is_none() {
            return None;
        }
        if entry.hierarchical_parent == Some(EXCLUDED_PARENT) {
            return None;
        }
        Some(Self::to_record(entry))
    }

    /// Convert an upstream entry into the normalized record.
    fn to_record(entry: &Nomenclature) -> ProductRecord {
        ProductRecord {
            id: entry.hierarchical_id,
            name: entry.name.clone().unwrap_or_default(),
            price: Price::new(entry.cost.unwrap_or(0)),
            description: entry.description_simple.clone(),
            image: entry.first_image().and_then(decode_photo_url),
            status: ProductStatus::Available,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(id: i64, parent: i64, images: Vec<String>) -> Nomenclature {
        serde_json::from_value(serde_json::json!({
            "hierarchicalId": id,
            "hierarchicalParent": parent,
            "name": format!("item-{id}"),
            "cost": 100 * id,
            "description_simple": "d",
            "images": images,
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_drops_imageless_entries() {
        assert!(CatalogFetcher::normalize(&entry(2, 10, vec![])).is_none());
    }

    #[test]
    fn test_normalize_drops_excluded_parent() {
        let e = entry(3, EXCLUDED_PARENT, vec!["/img?params=Y".to_string()]);
        assert!(CatalogFetcher::normalize(&e).is_none());
    }

    #[test]
    fn test_normalize_keeps_entry_with_undecodable_image() {
        let e = entry(1, 10, vec!["/img?params=X".to_string()]);
        let record = CatalogFetcher::normalize(&e).unwrap();
        assert_eq!(record.id, ProductId::new(1));
        assert_eq!(record.image, None);
        assert_eq!(record.price, Price::new(100));
        assert_eq!(record.status, ProductStatus::Available);
    }
}
