//! Derived cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Subtotal/shipping/taxes/total breakdown for the current cart.
///
/// Never stored: recomputed from the cart, the product mirror, and the
/// selected shipping option on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    /// Reserved for customs/import duty display; currently always zero.
    pub taxes: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Whether no shipping charge is assessed.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}
