//! Wire types for the SBIS retail API.
//!
//! Field names follow the upstream JSON exactly (camelCase for the
//! retail endpoints, snake_case for the OAuth endpoint). Most catalog
//! fields are optional with defaults because category nodes and product
//! leaves share the nomenclature shape but carry different subsets.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use samovar_core::{PriceListId, ProductId, SalesPointId};

/// Body of the token issuance request.
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub app_client_id: &'a str,
    pub app_secret: &'a str,
    pub secret_key: &'a str,
}

/// Response of the token issuance request.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub token: String,
}

/// `GET /retail/point/list` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPointList {
    #[serde(default)]
    pub sales_points: Vec<SalesPoint>,
}

/// A retail location in the upstream system.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesPoint {
    pub id: SalesPointId,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /retail/nomenclature/price-list` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListPage {
    #[serde(default)]
    pub price_lists: Vec<PriceList>,
}

/// An upstream pricing context.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceList {
    pub id: PriceListId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Query parameters for `GET /retail/nomenclature/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NomenclatureQuery {
    pub point_id: SalesPointId,
    pub price_list_id: PriceListId,
    pub with_balance: bool,
    pub with_barcode: bool,
    pub only_published: bool,
    pub page_size: u32,
    pub no_stop_list: bool,
}

impl NomenclatureQuery {
    /// Upstream page size; large enough to return the whole catalog in
    /// one page.
    pub const PAGE_SIZE: u32 = 2000;

    /// Flags used on the full-product fetch path.
    #[must_use]
    pub const fn products(point_id: SalesPointId, price_list_id: PriceListId) -> Self {
        Self {
            point_id,
            price_list_id,
            with_balance: true,
            with_barcode: false,
            only_published: false,
            page_size: Self::PAGE_SIZE,
            no_stop_list: true,
        }
    }

    /// Flags used on the category-listing path.
    #[must_use]
    pub const fn categories(point_id: SalesPointId, price_list_id: PriceListId) -> Self {
        Self {
            point_id,
            price_list_id,
            with_balance: true,
            with_barcode: true,
            only_published: true,
            page_size: Self::PAGE_SIZE,
            no_stop_list: true,
        }
    }
}

/// `GET /retail/nomenclature/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct NomenclatureList {
    #[serde(default)]
    pub nomenclatures: Vec<Nomenclature>,
}

/// One entry of the upstream catalog tree (product leaf or category
/// node).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomenclature {
    pub hierarchical_id: ProductId,
    #[serde(default)]
    pub hierarchical_parent: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Declared cost in minor currency units; absent on category nodes.
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default, rename = "description_simple")]
    pub description_simple: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl Nomenclature {
    /// First image reference, if the entry carries any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images
            .as_deref()
            .and_then(|images| images.first())
            .map(String::as_str)
    }
}

/// Extract the photo URL embedded in an image reference.
///
/// The reference is a relative URL whose `params` query parameter is a
/// base64-encoded JSON document carrying a `PhotoURL` field. Any failure
/// along the way (missing parameter, bad base64, bad JSON, missing
/// field) yields `None`; the caller decides whether that drops the item
/// or just leaves it without an image.
#[must_use]
pub fn decode_photo_url(image_ref: &str) -> Option<String> {
    let encoded = image_ref.rsplit("?params=").next()?;
    let decoded = BASE64.decode(encoded).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    value
        .get("PhotoURL")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}
