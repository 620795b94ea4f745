//! Access token issuance and caching.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::clock::SharedClock;
use crate::config::SbisConfig;
use crate::sbis::SbisError;
use crate::sbis::types::{AuthRequest, AuthResponse};

/// Fixed token validity window. The upstream response does not carry an
/// expiry, so staleness is bounded deterministically on our side.
const TOKEN_VALIDITY: Duration = Duration::from_secs(60 * 60);

/// An upstream access token with its validity window.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    issued_at: Instant,
    expires_at: Instant,
}

impl AccessToken {
    /// The raw header value for `X-SBISAccessToken`.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the token was issued.
    #[must_use]
    pub const fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Whether the token is still valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Issues and caches access tokens, one live token per client id.
///
/// Issuance failures are never retried here; use-time retry (and the
/// 401-triggered invalidation that forces reissue) is the request
/// client's job.
pub struct TokenManager {
    http: reqwest::Client,
    auth_url: String,
    clock: SharedClock,
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl TokenManager {
    /// Create a token manager issuing against `auth_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, auth_url: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            clock,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Get a valid token for the configured client, issuing a new one if
    /// the cached token is absent or expired.
    ///
    /// # Errors
    ///
    /// Returns [`SbisError::Auth`] if the upstream rejects the
    /// credentials or answers with a malformed body.
    #[instrument(skip_all, fields(client_id = %config.app_client_id))]
    pub async fn token(&self, config: &SbisConfig) -> Result<AccessToken, SbisError> {
        let now = self.clock.now();

        if let Some(token) = self.cached(&config.app_client_id, now).await {
            debug!("token cache hit");
            return Ok(token);
        }

        let token = self.issue(config, now).await?;
        self.tokens
            .write()
            .await
            .insert(config.app_client_id.clone(), token.clone());
        Ok(token)
    }

    /// Drop the cached token for a client so the next call reissues.
    pub async fn invalidate(&self, client_id: &str) {
        if self.tokens.write().await.remove(client_id).is_some() {
            warn!(client_id, "access token invalidated");
        }
    }

    async fn cached(&self, client_id: &str, now: Instant) -> Option<AccessToken> {
        let tokens = self.tokens.read().await;
        tokens
            .get(client_id)
            .filter(|token| token.is_valid_at(now))
            .cloned()
    }

    async fn issue(&self, config: &SbisConfig, now: Instant) -> Result<AccessToken, SbisError> {
        let (app_client_id, app_secret, secret_key) = config.credentials();
        let body = AuthRequest {
            app_client_id,
            app_secret,
            secret_key,
        };

        let response = self
            .http
            .post(format!("{}/oauth/service/", self.auth_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SbisError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SbisError::Auth(format!("status {}", status.as_u16())));
        }

        let parsed: AuthResponse = response
            .json()
            .await
            .map_err(|e| SbisError::Auth(format!("malformed token response: {e}")))?;

        debug!("access token issued");
        Ok(AccessToken {
            value: parsed.access_token,
            issued_at: now,
            expires_at: now + TOKEN_VALIDITY,
        })
    }
}
