//! Menu service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SBIS_APP_CLIENT_ID` - SBIS application client id
//! - `SBIS_APP_SECRET` - SBIS application secret
//! - `SBIS_SECRET_KEY` - SBIS service signing key
//!
//! ## Optional
//! - `SBIS_AUTH_URL` - Authorization host (default: <https://online.sbis.ru>)
//! - `SBIS_API_URL` - Retail API host (default: <https://api.sbis.ru>)
//! - `REDIS_URL` - Shared store connection string (default: redis://127.0.0.1:6379)
//! - `MENU_REFRESH_SECS` - Catalog refresh interval in seconds (default: 30)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_AUTH_URL: &str = "https://online.sbis.ru";
const DEFAULT_API_URL: &str = "https://api.sbis.ru";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_REFRESH_SECS: u64 = 30;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Menu service configuration.
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// SBIS upstream API configuration
    pub sbis: SbisConfig,
    /// Shared store connection string
    pub redis_url: String,
    /// Catalog refresh interval for the background task
    pub refresh_interval: Duration,
}

/// SBIS retail API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SbisConfig {
    /// Authorization host (token issuance)
    pub auth_url: String,
    /// Retail API host
    pub api_url: String,
    /// Application client id (safe to log)
    pub app_client_id: String,
    /// Application secret
    pub app_secret: SecretString,
    /// Service signing key
    pub secret_key: SecretString,
}

impl std::fmt::Debug for SbisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SbisConfig")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("app_client_id", &self.app_client_id)
            .field("app_secret", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl MenuConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let sbis = SbisConfig::from_env()?;
        let redis_url = get_env_or_default("REDIS_URL", DEFAULT_REDIS_URL);
        let refresh_secs = get_env_or_default("MENU_REFRESH_SECS", &DEFAULT_REFRESH_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MENU_REFRESH_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            sbis,
            redis_url,
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }
}

impl SbisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth_url: get_url_or_default("SBIS_AUTH_URL", DEFAULT_AUTH_URL)?,
            api_url: get_url_or_default("SBIS_API_URL", DEFAULT_API_URL)?,
            app_client_id: get_required_env("SBIS_APP_CLIENT_ID")?,
            app_secret: get_validated_secret("SBIS_APP_SECRET")?,
            secret_key: get_validated_secret("SBIS_SECRET_KEY")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a URL-valued environment variable with a default, trimming any
/// trailing slash so path joins stay predictable.
fn get_url_or_default(key: &str, default: &str) -> Result<String, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by SBIS."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

impl SbisConfig {
    /// Expose the credential triple for the token request body.
    #[must_use]
    pub fn credentials(&self) -> (&str, &str, &str) {
        (
            &self.app_client_id,
            self.app_secret.expose_secret(),
            self.secret_key.expose_secret(),
        )
    }
}
