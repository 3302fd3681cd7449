//! Destination postal code type.
//!
//! The shipping-rate provider quotes against 8-digit numeric postal codes.
//! Non-digit characters (separators users commonly type) are stripped before
//! length validation, so `"01001-000"` and `"01001000"` parse to the same
//! value.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PostalCodeError {
    /// The input contains no digits at all.
    #[error("postal code cannot be empty")]
    Empty,
    /// The digit count is not exactly eight.
    #[error("postal code must be exactly 8 digits, got {got}")]
    WrongLength {
        /// Number of digits found in the input.
        got: usize,
    },
}

/// An 8-digit numeric postal code.
///
/// ## Examples
///
/// ```
/// use headshop_core::PostalCode;
///
/// let code = PostalCode::parse("01310-100").unwrap();
/// assert_eq!(code.as_str(), "01310100");
/// assert!(PostalCode::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Required number of digits.
    pub const DIGITS: usize = 8;

    /// Parse a `PostalCode`, stripping any non-digit characters first.
    ///
    /// # Errors
    ///
    /// Returns an error if the input holds no digits, or a digit count other
    /// than exactly eight.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        if digits.len() != Self::DIGITS {
            return Err(PostalCodeError::WrongLength { got: digits.len() });
        }

        Ok(Self(digits))
    }

    /// Returns the bare digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_digits() {
        let code = PostalCode::parse("01001000").unwrap();
        assert_eq!(code.as_str(), "01001000");
    }

    #[test]
    fn test_parse_strips_separators() {
        let code = PostalCode::parse("01001-000").unwrap();
        assert_eq!(code.as_str(), "01001000");

        let code = PostalCode::parse(" 01.001-000 ").unwrap();
        assert_eq!(code.as_str(), "01001000");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(PostalCode::parse(""), Err(PostalCodeError::Empty)));
        assert!(matches!(
            PostalCode::parse("abc-def"),
            Err(PostalCodeError::Empty)
        ));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            PostalCode::parse("1234"),
            Err(PostalCodeError::WrongLength { got: 4 })
        ));
        assert!(matches!(
            PostalCode::parse("123456789"),
            Err(PostalCodeError::WrongLength { got: 9 })
        ));
    }
}
