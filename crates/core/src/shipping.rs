//! Carrier service levels and shipping quotes.
//!
//! A quote is valid only for the destination/weight pair that produced it.
//! The quoted carrier rate is never charged as-is: each service level has a
//! price floor, and a flat promotional discount is applied on top of the
//! floor, so `charged = max(floor, quoted - discount)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::PostalCode;

/// Flat promotional shipping subsidy, in currency units.
pub const QUOTE_DISCOUNT: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Carrier service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    Standard,
    Express,
}

impl ServiceLevel {
    /// Minimum charged price for this service level, in currency units.
    ///
    /// The floor dominates the discount: the promotional subsidy never drops
    /// the charged price below it.
    #[must_use]
    pub const fn floor(self) -> Decimal {
        match self {
            Self::Standard => Decimal::from_parts(15, 0, 0, false, 0),
            Self::Express => Decimal::from_parts(28, 0, 0, false, 0),
        }
    }

    /// Carrier-facing display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Express => "Express",
        }
    }
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A carrier rate/lead-time quote for both service levels.
///
/// Stamped with the parcel weight and destination it was computed for, so a
/// quote that resolves after the cart composition changed can be recognized
/// as stale and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    /// Raw quoted rate for standard service, before floor/discount.
    pub standard_rate: Decimal,
    /// Lead time for standard service, in business days.
    pub standard_days: String,
    /// Raw quoted rate for express service, before floor/discount.
    pub express_rate: Decimal,
    /// Lead time for express service, in business days.
    pub express_days: String,
    /// Parcel weight this quote was computed for, in grams.
    pub weight_grams: u32,
    /// Destination the quote applies to.
    pub destination: PostalCode,
    pub fetched_at: DateTime<Utc>,
}

impl ShippingQuote {
    /// Raw quoted rate for a service level, before floor/discount.
    #[must_use]
    pub const fn quoted_rate(&self, level: ServiceLevel) -> Decimal {
        match level {
            ServiceLevel::Standard => self.standard_rate,
            ServiceLevel::Express => self.express_rate,
        }
    }

    /// Lead time for a service level, in business days.
    #[must_use]
    pub fn lead_time_days(&self, level: ServiceLevel) -> &str {
        match level {
            ServiceLevel::Standard => &self.standard_days,
            ServiceLevel::Express => &self.express_days,
        }
    }

    /// The price actually charged for a service level:
    /// `max(floor, quoted - discount)`.
    #[must_use]
    pub fn charged_rate(&self, level: ServiceLevel) -> Decimal {
        let discounted = self.quoted_rate(level) - QUOTE_DISCOUNT;
        discounted.max(level.floor())
    }
}
