//! Snapshot refresh behavior with an in-memory shared store.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use samovar_core::ProductId;
use samovar_menu::cache::{MenuCache, RefreshError};
use samovar_menu::clock::{SharedClock, SystemClock};
use samovar_menu::store::{MemoryStore, SharedStore};

fn menu_for(server_uri: &str, store: Arc<dyn SharedStore>) -> MenuCache {
    let clock: SharedClock = Arc::new(SystemClock);
    MenuCache::new(common::fetcher_for(server_uri), store, clock)
}

fn product_entry(id: i64, name: &str) -> serde_json::Value {
    json!({
        "hierarchicalId": id,
        "hierarchicalParent": 10,
        "name": name,
        "cost": 1000 + id,
        "images": [common::encoded_image_ref("https://cdn.example/item.png")],
    })
}

#[tokio::test]
async fn test_refresh_replaces_shared_snapshot() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server, 1).await;
    common::mount_point_and_price_lists(&server).await;
    common::mount_nomenclatures(
        &server,
        json!([product_entry(1, "Pelmeni"), product_entry(2, "Borscht")]),
    )
    .await;

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let menu = menu_for(&server.uri(), Arc::clone(&store));

    let count = menu.refresh_once().await.unwrap();
    assert_eq!(count, 2);

    // Served straight from the snapshot afterwards.
    let snapshot = store.catalog().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert!(
        store
            .product(ProductId::new(1))
            .await
            .unwrap()
            .is_some_and(|r| r.name == "Pelmeni")
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server, 1).await;
    common::mount_point_and_price_lists(&server).await;

    // First listing succeeds, every later one fails.
    Mock::given(method("GET"))
        .and(path("/retail/nomenclature/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nomenclatures": [product_entry(1, "Pelmeni")],
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/retail/nomenclature/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let menu = menu_for(&server.uri(), Arc::clone(&store));

    assert_eq!(menu.refresh_once().await.unwrap(), 1);

    let err = menu.refresh_once().await.unwrap_err();
    assert!(matches!(err, RefreshError::Fetch(_)));

    // Readers keep seeing the last good snapshot.
    let catalog = menu.catalog().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Pelmeni");
}

#[tokio::test]
async fn test_catalog_read_falls_back_to_upstream_when_store_empty() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server, 1).await;
    common::mount_point_and_price_lists(&server).await;
    common::mount_nomenclatures(&server, json!([product_entry(5, "Kvass")])).await;

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let menu = menu_for(&server.uri(), Arc::clone(&store));

    // No refresh has run yet; the read goes upstream directly and does
    // not populate the snapshot as a side effect.
    let catalog = menu.catalog().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Kvass");
    assert!(store.catalog().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_product_detail_prefers_snapshot_over_upstream() {
    let server = MockServer::start().await;
    common::mount_token_endpoint(&server, 1).await;
    common::mount_point_and_price_lists(&server).await;
    // The listing endpoint must not be hit once the snapshot holds the
    // product.
    Mock::given(method("GET"))
        .and(path("/retail/nomenclature/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nomenclatures": [product_entry(9, "Syrniki")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let menu = menu_for(&server.uri(), Arc::clone(&store));

    menu.refresh_once().await.unwrap();

    let record = menu.product_detail(ProductId::new(9)).await.unwrap();
    assert_eq!(record.unwrap().name, "Syrniki");
}
