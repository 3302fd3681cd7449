//! Headshop Core - Shared domain types.
//!
//! This crate provides the common types used across the Headshop components:
//! - `storefront` - cart, pricing, caching, and admin workflow engine
//! - `cli` - command-line management tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain rules - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, SKUs, emails, and postal codes
//! - [`product`] - The product record mirrored from the persistence service
//! - [`shipping`] - Carrier service levels and shipping quotes
//! - [`totals`] - Derived cart totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod product;
pub mod shipping;
pub mod totals;
pub mod types;

pub use product::{Category, Product, ProductDraft};
pub use shipping::{ServiceLevel, ShippingQuote};
pub use totals::Totals;
pub use types::*;
