// File: sensiscan-core/src/validators.rs
//! Identifier validation for dynamic SQL.
//!
//! Table and column names are discovered at run time and cannot be bound as
//! parameters, so they are checked against a strict allow-list before they are
//! interpolated into query text. Values are never interpolated; they are always
//! bound.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ScanError;

/// Longest identifier accepted for interpolation.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

static SAFE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is a valid regex"));

/// Returns `true` if `name` consists only of ASCII letters, digits and underscores.
///
/// # Examples
///
/// ```
/// use sensiscan_core::validators::is_safe_identifier;
///
/// assert!(is_safe_identifier("Customers"));
/// assert!(is_safe_identifier("tax_id_2"));
/// assert!(!is_safe_identifier("Tax ID"));
/// assert!(!is_safe_identifier("x\"; DROP TABLE y; --"));
/// ```
pub fn is_safe_identifier(name: &str) -> bool {
    name.len() <= MAX_IDENTIFIER_LENGTH && SAFE_IDENTIFIER.is_match(name)
}

/// Checks `name` and returns it unchanged, or `ScanError::UnsafeIdentifier`.
pub fn ensure_safe_identifier(name: &str) -> Result<&str, ScanError> {
    if is_safe_identifier(name) {
        Ok(name)
    } else {
        Err(ScanError::UnsafeIdentifier(name.to_string(), MAX_IDENTIFIER_LENGTH))
    }
}

/// Validates `name` and wraps it in double quotes for use as an SQL identifier.
pub fn quote_identifier(name: &str) -> Result<String, ScanError> {
    ensure_safe_identifier(name).map(|n| format!("\"{}\"", n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for name in ["dbo", "Customers", "TaxID", "_x", "col_2", "2024_sales"] {
            assert!(is_safe_identifier(name), "{} should be accepted", name);
        }
    }

    #[test]
    fn rejects_anything_else() {
        for name in ["", "Tax ID", "a-b", "a.b", "a\"b", "naïve", "x]; --", "a\nb"] {
            assert!(!is_safe_identifier(name), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(!is_safe_identifier(&long));
        assert!(is_safe_identifier(&long[..MAX_IDENTIFIER_LENGTH]));
    }

    #[test]
    fn quotes_valid_identifiers() {
        assert_eq!(quote_identifier("Customers").unwrap(), "\"Customers\"");
        assert!(matches!(
            quote_identifier("bad name"),
            Err(ScanError::UnsafeIdentifier(name, _)) if name == "bad name"
        ));
    }
}
