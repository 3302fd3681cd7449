//! Shipping-quote command.
//!
//! # Usage
//!
//! ```bash
//! headshop quote -d 01310100 -n 3
//! ```
//!
//! # Environment Variables
//!
//! - `HEADSHOP_SHIPPING_URL` - Rate-provider base URL
//! - `HEADSHOP_ORIGIN_POSTAL_CODE` - Origin postal code
//! - `HEADSHOP_SHIPPING_API_KEY` - Provider key (optional)

use tracing::info;

use headshop_core::{PostalCode, ServiceLevel};
use headshop_storefront::shipping::{RateClient, parcel_weight_grams};

/// Fetch and print a quote for an `items`-item parcel to `destination`.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the postal code is
/// malformed, or the provider call fails.
pub async fn fetch(destination: &str, items: u32) -> Result<(), Box<dyn std::error::Error>> {
    let destination = PostalCode::parse(destination)?;
    let config = super::load_config()?;
    let client = RateClient::new(config.shipping);

    let quote = client.quote(&destination, items).await?;

    info!(
        destination = %quote.destination,
        items,
        weight_grams = parcel_weight_grams(items),
        "quote fetched"
    );
    for level in [ServiceLevel::Standard, ServiceLevel::Express] {
        info!(
            service = level.label(),
            quoted = %quote.quoted_rate(level),
            charged = %quote.charged_rate(level),
            days = quote.lead_time_days(level),
            "rate"
        );
    }
    Ok(())
}
