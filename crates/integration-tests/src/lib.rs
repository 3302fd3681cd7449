//! Integration tests for the headshop storefront engine.
//!
//! The tests under `tests/` drive the full engine (session, cache, admin
//! workflow) over the in-memory mock backend; no network or database is
//! required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p headshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flow` - Visitor journey: browse, cart, quote, checkout
//! - `admin_flow` - Catalog writes and cache consistency

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use headshop_core::{Category, Product, ProductId, Sku};
use headshop_storefront::Result;
use headshop_storefront::admin::AdminGate;
use headshop_storefront::error::StoreError;

/// Build a catalog row for seeding the mock backend.
///
/// # Panics
///
/// Panics on a malformed SKU; test fixtures use literals.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(sku: &str, price: Decimal, stock: u32, category: Option<Category>) -> Product {
    Product {
        id: ProductId::generate(),
        sku: Sku::parse(sku).unwrap(),
        title: format!("Product {sku}"),
        price,
        description: format!("Description for {sku}"),
        image_url: String::new(),
        stock,
        active: true,
        category,
    }
}

/// Gate accepting one fixed token, for tests that exercise the unlock path.
pub struct StaticGate {
    accepted: &'static str,
}

impl StaticGate {
    #[must_use]
    pub const fn accepting(accepted: &'static str) -> Self {
        Self { accepted }
    }
}

impl AdminGate for StaticGate {
    async fn authorize(&self, token: &str) -> Result<()> {
        if token == self.accepted {
            Ok(())
        } else {
            Err(StoreError::Gate("token is not active".to_owned()))
        }
    }
}
