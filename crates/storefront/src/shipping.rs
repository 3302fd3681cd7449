//! Shipping-rate provider client and quote/selection state.
//!
//! The provider is an unauthenticated HTTP GET keyed by origin, destination,
//! weight, and a fixed parcel box; it answers rate and lead-time for the two
//! service levels as string decimals. Best-effort: failures are reported,
//! never retried.
//!
//! There is no per-product weight field - parcel weight is approximated as a
//! fixed 350 g per cart unit.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use headshop_core::{PostalCode, ServiceLevel, ShippingQuote};

use crate::config::ShippingConfig;
use crate::error::ValidationError;
use crate::notify::ChangeNotifier;

/// Per-unit weight approximation, in grams.
pub const PER_ITEM_WEIGHT_GRAMS: u32 = 350;

/// Fixed parcel dimensions sent with every rate request, in centimeters.
const BOX_DIMENSIONS_CM: (u32, u32, u32) = (20, 20, 20);

/// Parcel weight for a cart of `item_count` units.
#[must_use]
pub const fn parcel_weight_grams(item_count: u32) -> u32 {
    item_count * PER_ITEM_WEIGHT_GRAMS
}

/// Errors from the shipping-rate provider.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not parse as a rate table.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Provider wire format: string decimals, one field pair per service level.
#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(rename = "valorpac")]
    standard_rate: String,
    #[serde(rename = "prazopac")]
    standard_days: String,
    #[serde(rename = "valorsedex")]
    express_rate: String,
    #[serde(rename = "prazosedex")]
    express_days: String,
}

// =============================================================================
// RateClient
// =============================================================================

/// Client for the shipping-rate provider.
#[derive(Clone)]
pub struct RateClient {
    inner: Arc<RateClientInner>,
}

struct RateClientInner {
    client: reqwest::Client,
    config: ShippingConfig,
}

impl RateClient {
    #[must_use]
    pub fn new(config: ShippingConfig) -> Self {
        Self {
            inner: Arc::new(RateClientInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    /// Fetch a quote for `item_count` cart units shipped to `destination`.
    ///
    /// The returned quote is stamped with the weight it was computed for, so
    /// a caller can recognize it as stale if the cart changed while the
    /// request was in flight.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError`] on transport failure, a non-success status, or
    /// a malformed rate table.
    #[instrument(skip(self), fields(destination = %destination))]
    pub async fn quote(
        &self,
        destination: &PostalCode,
        item_count: u32,
    ) -> Result<ShippingQuote, QuoteError> {
        let weight = parcel_weight_grams(item_count);
        let (w, h, d) = BOX_DIMENSIONS_CM;
        let config = &self.inner.config;

        let mut url = config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QuoteError::Parse("shipping base URL cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend([
                "ws",
                "json-frete",
                config.origin.as_str(),
                destination.as_str(),
                &weight.to_string(),
                &w.to_string(),
                &h.to_string(),
                &d.to_string(),
                &config.api_key,
            ]);

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(QuoteError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let rates: RateResponse =
            serde_json::from_str(&body).map_err(|e| QuoteError::Parse(e.to_string()))?;
        parse_quote(&rates, weight, destination.clone())
    }
}

fn parse_quote(
    rates: &RateResponse,
    weight_grams: u32,
    destination: PostalCode,
) -> Result<ShippingQuote, QuoteError> {
    let parse_rate = |field: &str, value: &str| {
        Decimal::from_str(value.trim())
            .map_err(|e| QuoteError::Parse(format!("bad {field} {value:?}: {e}")))
    };

    Ok(ShippingQuote {
        standard_rate: parse_rate("standard rate", &rates.standard_rate)?,
        standard_days: rates.standard_days.clone(),
        express_rate: parse_rate("express rate", &rates.express_rate)?,
        express_days: rates.express_days.clone(),
        weight_grams,
        destination,
        fetched_at: Utc::now(),
    })
}

// =============================================================================
// ShippingState
// =============================================================================

/// The session's current quote and service-level selection.
///
/// A quote is only ever displayed alongside an explicit user choice: storing
/// a new quote always resets the selection to none, forcing a re-choice so a
/// stale-but-previously-selected level is never silently billed at a new
/// rate.
#[derive(Debug, Default)]
pub struct ShippingState {
    quote: Option<ShippingQuote>,
    selection: Option<ServiceLevel>,
    notifier: ChangeNotifier,
}

impl ShippingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the quote; always resets the selection to none.
    pub fn set_quote(&mut self, quote: ShippingQuote) {
        self.quote = Some(quote);
        self.selection = None;
        self.notifier.notify();
    }

    /// Clear the selection after a failed fetch so no stale price displays.
    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.notifier.notify();
        }
    }

    /// Choose a service level from the current quote.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ShippingNotQuoted`] when no quote is held.
    pub fn select(&mut self, level: ServiceLevel) -> Result<(), ValidationError> {
        if self.quote.is_none() {
            return Err(ValidationError::ShippingNotQuoted);
        }
        self.selection = Some(level);
        self.notifier.notify();
        Ok(())
    }

    /// Drop both quote and selection (checkout completion).
    pub fn reset(&mut self) {
        if self.quote.take().is_some() | self.selection.take().is_some() {
            self.notifier.notify();
        }
    }

    #[must_use]
    pub const fn quote(&self) -> Option<&ShippingQuote> {
        self.quote.as_ref()
    }

    #[must_use]
    pub const fn selection(&self) -> Option<ServiceLevel> {
        self.selection
    }

    /// Subscribe to quote/selection changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.notifier.watch()
    }
}
