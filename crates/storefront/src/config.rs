//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HEADSHOP_CATALOG_URL` - Base URL of the product persistence service
//!   (PostgREST-style REST endpoint)
//! - `HEADSHOP_CATALOG_API_KEY` - API key for the persistence service
//! - `HEADSHOP_SHIPPING_URL` - Base URL of the shipping-rate provider
//! - `HEADSHOP_ORIGIN_POSTAL_CODE` - 8-digit origin postal code quotes are
//!   computed from
//!
//! ## Optional
//! - `HEADSHOP_CATALOG_TABLE` - Product table name (default: produtos)
//! - `HEADSHOP_SHIPPING_API_KEY` - Rate-provider key path segment
//! - `HEADSHOP_ADMIN_INTROSPECTION_URL` - Token introspection endpoint for
//!   the admin gate; admin operations are refused when unset
//! - `SENTRY_DSN` - Sentry error tracking DSN

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use headshop_core::PostalCode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Product persistence service configuration
    pub catalog: CatalogConfig,
    /// Shipping-rate provider configuration
    pub shipping: ShippingConfig,
    /// Token introspection endpoint for the admin gate
    pub admin_introspection_url: Option<Url>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Product persistence service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL of the REST endpoint (e.g., `https://x.supabase.co/rest/v1`)
    pub base_url: Url,
    /// API key sent on every request
    pub api_key: SecretString,
    /// Product table name
    pub table: String,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("table", &self.table)
            .finish()
    }
}

/// Shipping-rate provider configuration.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Base URL of the rate provider
    pub base_url: Url,
    /// Origin postal code parcels ship from
    pub origin: PostalCode,
    /// Provider key appended to the request path
    pub api_key: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let catalog = CatalogConfig {
            base_url: require_url("HEADSHOP_CATALOG_URL")?,
            api_key: SecretString::from(require_env("HEADSHOP_CATALOG_API_KEY")?),
            table: optional_env("HEADSHOP_CATALOG_TABLE").unwrap_or_else(|| "produtos".to_owned()),
        };

        let origin_raw = require_env("HEADSHOP_ORIGIN_POSTAL_CODE")?;
        let origin = PostalCode::parse(&origin_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("HEADSHOP_ORIGIN_POSTAL_CODE".to_owned(), e.to_string())
        })?;

        let shipping = ShippingConfig {
            base_url: require_url("HEADSHOP_SHIPPING_URL")?,
            origin,
            api_key: optional_env("HEADSHOP_SHIPPING_API_KEY").unwrap_or_default(),
        };

        let admin_introspection_url = optional_env("HEADSHOP_ADMIN_INTROSPECTION_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "HEADSHOP_ADMIN_INTROSPECTION_URL".to_owned(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            catalog,
            shipping,
            admin_introspection_url,
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn require_url(name: &str) -> Result<Url, ConfigError> {
    let raw = require_env(name)?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_debug_redacts_api_key() {
        let config = CatalogConfig {
            base_url: Url::parse("https://example.supabase.co/rest/v1").unwrap(),
            api_key: SecretString::from("super-secret-key".to_owned()),
            table: "produtos".to_owned(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn test_missing_env_var_error_names_the_variable() {
        let err = require_env("HEADSHOP_DOES_NOT_EXIST").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: HEADSHOP_DOES_NOT_EXIST"
        );
    }
}
