//! Core types for Headshop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod postal;
pub mod sku;

pub use email::{Email, EmailError};
pub use id::*;
pub use postal::{PostalCode, PostalCodeError};
pub use sku::{Sku, SkuError};
