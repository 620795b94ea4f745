//! Retrying HTTP access to the retail API.
//!
//! Retry policy, per attempt:
//! - 200: return the parsed body.
//! - 401 with attempts remaining: invalidate the cached token and try
//!   again (the next attempt acquires a fresh token).
//! - any other non-200: fail immediately; non-auth statuses are not
//!   assumed transient.
//! - transport failure: fixed 1-second backoff, then retry.
//!
//! The fixed short backoff bounds total added latency to about two
//! seconds across the three attempts.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use samovar_core::SalesPointId;

use crate::clock::SharedClock;
use crate::config::SbisConfig;
use crate::sbis::SbisError;
use crate::sbis::auth::TokenManager;
use crate::sbis::types::{NomenclatureList, NomenclatureQuery, PriceListPage, SalesPointList};

/// Header carrying the access token on retail endpoints.
pub const ACCESS_TOKEN_HEADER: &str = "X-SBISAccessToken";

/// Total HTTP timeout per request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Client for the SBIS retail API with bounded retries.
#[derive(Clone)]
pub struct SbisClient {
    http: reqwest::Client,
    config: SbisConfig,
    tokens: Arc<TokenManager>,
}

impl SbisClient {
    /// Create a new client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError::Transport`] if the underlying HTTP client
    /// fails to build.
    pub fn new(config: SbisConfig, clock: SharedClock) -> Result<Self, SbisError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            config.auth_url.clone(),
            clock,
        ));

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// The token manager backing this client.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// The tenant configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &SbisConfig {
        &self.config
    }

    /// List the tenant's sales points.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] on auth, transport, or upstream failure.
    #[instrument(skip(self))]
    pub async fn sales_points(&self) -> Result<SalesPointList, SbisError> {
        self.get_json(
            "/retail/point/list",
            &[("withPhones", "true"), ("withPrices", "true")],
        )
        .await
    }

    /// List price lists for a sales point at `actual_date`
    /// (`%Y-%m-%d %H:%M:%S`).
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] on auth, transport, or upstream failure.
    #[instrument(skip(self), fields(point_id = %point_id))]
    pub async fn price_lists(
        &self,
        point_id: SalesPointId,
        actual_date: &str,
    ) -> Result<PriceListPage, SbisError> {
        self.get_json(
            "/retail/nomenclature/price-list",
            &[
                ("pointId", point_id.to_string().as_str()),
                ("actualDate", actual_date),
            ],
        )
        .await
    }

    /// List nomenclature entries for a (sales point, price list) pair.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError`] on auth, transport, or upstream failure.
    #[instrument(skip(self, query), fields(point_id = %query.point_id, price_list_id = %query.price_list_id))]
    pub async fn nomenclature(
        &self,
        query: &NomenclatureQuery,
    ) -> Result<NomenclatureList, SbisError> {
        self.get_json("/retail/nomenclature/list", query).await
    }

    /// Execute one `GET` against the retail API with the retry policy.
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, SbisError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.config.api_url);
        let mut attempt = 1;

        loop {
            // Acquired per attempt: after a 401 invalidation the next
            // attempt carries a freshly issued token.
            let token = self.tokens.token(&self.config).await?;

            let result = self
                .http
                .get(&url)
                .query(query)
                .header(ACCESS_TOKEN_HEADER, token.value())
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::OK {
                        let body = response.text().await?;
                        return serde_json::from_str(&body).map_err(SbisError::Parse);
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        if attempt < MAX_ATTEMPTS {
                            warn!(attempt, path, "401 from upstream, reissuing token");
                            self.tokens.invalidate(&self.config.app_client_id).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(SbisError::Status(status.as_u16()));
                    }

                    // Non-auth failures are not assumed transient.
                    warn!(status = status.as_u16(), path, "upstream request failed");
                    return Err(SbisError::Status(status.as_u16()));
                }
                Err(e) => {
                    if attempt >= MAX_ATTEMPTS {
                        warn!(attempt, path, error = %e, "request failed, retries exhausted");
                        return Err(SbisError::Transport(e));
                    }
                    debug!(attempt, path, error = %e, "transport failure, backing off");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    attempt += 1;
                }
            }
        }
    }
}
