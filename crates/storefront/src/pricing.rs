//! Pure totals computation.
//!
//! `compute_totals` is a function of cart contents, the product lookup, and
//! the shipping selection - identical inputs always yield identical totals.
//! It is cheap enough to run on every read; nothing here is cached.
//!
//! Shipping resolution order is deliberate:
//!
//! 1. an explicitly selected service level with a quote present is charged
//!    `max(floor, quoted - discount)` - the floor-then-discount order means
//!    the promotional subsidy never drops the price below the level's floor;
//! 2. otherwise a subtotal at or over the free-shipping threshold ships free;
//! 3. otherwise no charge is assessed until a quote is obtained and chosen.

use rust_decimal::Decimal;

use headshop_core::{Product, ServiceLevel, ShippingQuote, Sku, Totals};

/// Subtotal at/above which shipping is waived absent an explicit paid
/// selection, in currency units.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(130, 0, 0, false, 0);

/// Compute the totals for the given cart state.
///
/// `lookup` resolves a SKU to the latest known product; a cart line whose
/// SKU resolves to `None` is skipped, not an error - the cart may hold
/// entries for products that have since been removed from the cache.
pub fn compute_totals<'a, L>(
    cart: impl IntoIterator<Item = (&'a Sku, u32)>,
    lookup: L,
    selection: Option<ServiceLevel>,
    quote: Option<&ShippingQuote>,
) -> Totals
where
    L: Fn(&Sku) -> Option<Product>,
{
    let mut subtotal = Decimal::ZERO;
    for (sku, quantity) in cart {
        if let Some(product) = lookup(sku) {
            subtotal += product.price * Decimal::from(quantity);
        }
    }

    let shipping = match (selection, quote) {
        (Some(level), Some(quote)) => quote.charged_rate(level),
        _ => Decimal::ZERO, // free over threshold, and unquoted carts are not charged
    };

    let taxes = Decimal::ZERO;
    let total = subtotal + shipping + taxes;

    Totals {
        subtotal,
        shipping,
        taxes,
        total,
    }
}

/// How much subtotal is still missing for free shipping; zero at/over the
/// threshold. Drives the progress display next to the cart summary.
#[must_use]
pub fn free_shipping_gap(subtotal: Decimal) -> Decimal {
    (FREE_SHIPPING_THRESHOLD - subtotal).max(Decimal::ZERO)
}
