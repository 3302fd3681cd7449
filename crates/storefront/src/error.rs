//! Unified error handling with Sentry integration.
//!
//! Three failure families exist, and they recover differently:
//!
//! - [`ValidationError`] blocks the action inline and is fixed by correcting
//!   input.
//! - Remote failures ([`BackendError`](crate::backend::BackendError),
//!   [`QuoteError`](crate::shipping::QuoteError)) surface as a blocking
//!   notice; local state is left unchanged and the action must be retried
//!   manually.
//! - A cart line whose SKU is gone from the cache is skipped defensively in
//!   pricing and display, never an error.
//!
//! No error is fatal: every failure path returns the session to a
//! consistent, re-actionable state.

use thiserror::Error;

use headshop_core::{EmailError, PostalCodeError, SkuError};

use crate::backend::BackendError;
use crate::shipping::QuoteError;

/// Application-level error type for the storefront engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// User input failed validation; fully recoverable.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence-service operation failed; local state unchanged.
    #[error("Catalog error: {0}")]
    Backend(#[from] BackendError),

    /// Shipping-rate provider failed; any selected option was cleared.
    #[error("Shipping quote error: {0}")]
    Quote(#[from] QuoteError),

    /// Admin gate refused or could not verify the token.
    #[error("Admin gate error: {0}")]
    Gate(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Whether the user can recover by correcting input, without a retry of
    /// any remote call.
    #[must_use]
    pub const fn is_recoverable_inline(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// User-input validation failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("invalid postal code: {0}")]
    PostalCode(#[from] PostalCodeError),

    #[error("invalid sku: {0}")]
    Sku(#[from] SkuError),

    /// Checkout requires a fetched quote and an explicit service choice.
    #[error("shipping has not been quoted")]
    ShippingNotQuoted,

    /// A required admin-form field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid price {value:?}: must be a non-negative decimal")]
    InvalidPrice { value: String },

    #[error("invalid stock {value:?}: must be a non-negative integer")]
    InvalidStock { value: String },
}

/// Report a remote failure to Sentry and the log.
///
/// Validation errors are user mistakes and are deliberately not captured.
pub fn report(error: &StoreError) {
    if error.is_recoverable_inline() {
        tracing::debug!(error = %error, "validation rejected");
        return;
    }

    let event_id = sentry::capture_error(error);
    tracing::error!(error = %error, sentry_event_id = %event_id, "storefront error");
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_recoverable_inline() {
        let err = StoreError::Validation(ValidationError::EmptyCart);
        assert!(err.is_recoverable_inline());
    }

    #[test]
    fn test_remote_errors_are_not_inline_recoverable() {
        let err = StoreError::Gate("introspection endpoint unreachable".to_owned());
        assert!(!err.is_recoverable_inline());

        let err = StoreError::NotFound("sku TS-01".to_owned());
        assert!(!err.is_recoverable_inline());
    }

    #[test]
    fn test_display_strings() {
        let err = ValidationError::MissingField("sku");
        assert_eq!(err.to_string(), "missing required field: sku");

        let err = ValidationError::InvalidStock {
            value: "-3".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid stock \"-3\": must be a non-negative integer"
        );
    }
}
