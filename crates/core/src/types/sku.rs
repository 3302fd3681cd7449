//! SKU type.
//!
//! The SKU is the stable user-facing product key. It is distinct from
//! [`ProductId`](super::id::ProductId): cart lines, feedback notices, and the
//! storefront display are all keyed by SKU, while the persistence service
//! keys rows by ID.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SkuError {
    /// The input string is empty after trimming.
    #[error("sku cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("sku must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A stock-keeping unit: the user-facing product key.
///
/// ## Examples
///
/// ```
/// use headshop_core::Sku;
///
/// let sku = Sku::parse("TS-01").unwrap();
/// assert_eq!(sku.as_str(), "TS-01");
/// assert!(Sku::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Sku` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than 64
    /// characters.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(SkuError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let sku = Sku::parse("BONG-042").unwrap();
        assert_eq!(sku.as_str(), "BONG-042");
    }

    #[test]
    fn test_parse_trims() {
        let sku = Sku::parse(" TS-01 ").unwrap();
        assert_eq!(sku.as_str(), "TS-01");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Sku::parse(""), Err(SkuError::Empty)));
        assert!(matches!(Sku::parse("  "), Err(SkuError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(65);
        assert!(matches!(Sku::parse(&long), Err(SkuError::TooLong { .. })));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = Sku::parse("A-01").unwrap();
        let b = Sku::parse("B-01").unwrap();
        assert!(a < b);
    }
}
