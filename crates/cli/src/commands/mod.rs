//! CLI command implementations.

pub mod admin;
pub mod products;
pub mod quote;

use headshop_storefront::config::{ConfigError, StorefrontConfig};

/// Load `.env` then the process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if a required variable is missing or malformed.
pub fn load_config() -> Result<StorefrontConfig, ConfigError> {
    dotenvy::dotenv().ok();
    StorefrontConfig::from_env()
}
