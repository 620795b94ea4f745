//! Shared fixtures for the wiremock-backed tests.

#![allow(dead_code)]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use samovar_menu::clock::{SharedClock, SystemClock};
use samovar_menu::config::SbisConfig;
use samovar_menu::sbis::{CatalogFetcher, SbisClient};

pub const TEST_CLIENT_ID: &str = "test-client";

/// Tenant config pointing both hosts at the given base URLs.
pub fn sbis_config(auth_url: &str, api_url: &str) -> SbisConfig {
    SbisConfig {
        auth_url: auth_url.trim_end_matches('/').to_string(),
        api_url: api_url.trim_end_matches('/').to_string(),
        app_client_id: TEST_CLIENT_ID.to_string(),
        app_secret: SecretString::from("aB3$xY9!mK2@nL5#"),
        secret_key: SecretString::from("pQ7&rT0*uW4^zC6!"),
    }
}

/// Client with auth and API both served by one mock server.
pub fn client_for(server_uri: &str) -> SbisClient {
    let clock: SharedClock = Arc::new(SystemClock);
    SbisClient::new(sbis_config(server_uri, server_uri), clock).expect("client must build")
}

pub fn fetcher_for(server_uri: &str) -> CatalogFetcher {
    CatalogFetcher::new(client_for(server_uri))
}

/// Mount the token endpoint, expecting exactly `expected_calls` hits.
pub async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/service/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "sid": "sid-1",
            "token": "token-1",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount the sales point and price list steps of the pipeline.
///
/// Four price lists are returned so both the category position (1) and
/// the product position (3) resolve.
pub async fn mount_point_and_price_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/retail/point/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "salesPoints": [{"id": 501, "name": "Main kitchen"}],
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/retail/nomenclature/price-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "priceLists": [
                {"id": 11, "name": "bar"},
                {"id": 12, "name": "categories"},
                {"id": 13, "name": "delivery"},
                {"id": 14, "name": "menu"},
            ],
        })))
        .mount(server)
        .await;
}

/// Mount the nomenclature listing with the given entries.
pub async fn mount_nomenclatures(server: &MockServer, nomenclatures: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/retail/nomenclature/list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "nomenclatures": nomenclatures })),
        )
        .mount(server)
        .await;
}

/// Base64 image reference whose payload decodes to `photo_url`.
pub fn encoded_image_ref(photo_url: &str) -> String {
    use base64::Engine;
    let payload = json!({ "PhotoURL": photo_url }).to_string();
    format!(
        "/img?params={}",
        base64::engine::general_purpose::STANDARD.encode(payload)
    )
}
