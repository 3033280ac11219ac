//! # Validation Module
//!
//! Field validation for scanned item segments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Code printer (external)                                       │
//! │  └── Produces `name~category~quantity` segments                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Frame decoder (Rust)                                          │
//! │  └── THIS MODULE: non-empty names, numeric quantities                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK (stock >= 0)                                      │
//! │  └── UNIQUE category names (case-insensitive)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{FIELD_SEPARATOR, ITEM_SEPARATOR, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a scanned product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use stockscan_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Rice").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a scanned category name.
///
/// Same rules as [`validate_item_name`].
pub fn validate_category_name(category: &str) -> ValidationResult<()> {
    validate_name("category", category)
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Checks that a value can be written into a frame without breaking it.
///
/// The wire format has no escaping, so `|` and `~` cannot appear in names.
pub fn validate_encodable(field: &str, value: &str) -> ValidationResult<()> {
    if value.contains(ITEM_SEPARATOR) || value.contains(FIELD_SEPARATOR) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must not contain '{ITEM_SEPARATOR}' or '{FIELD_SEPARATOR}'"),
        });
    }

    validate_name(field, value)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a scanned quantity.
///
/// ## Rules
/// - ASCII digits only after trimming (no sign, no decimals)
/// - Must fit in an `i64`
///
/// ## Example
/// ```rust
/// use stockscan_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 42 ").unwrap(), 42);
/// assert!(parse_quantity("-1").is_err());
/// assert!(parse_quantity("4.5").is_err());
/// ```
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("{raw:?} is not a non-negative integer"),
        });
    }

    raw.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: format!("{raw:?} is too large"),
    })
}

/// Parses one side of a frame header (`index` or `total`).
///
/// Returns `None` unless the trimmed value is all ASCII digits and fits
/// in a `u32`.
pub fn parse_frame_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Rice").is_ok());
        assert!(validate_item_name("  Brown Rice  ").is_ok());

        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_category_name_reports_field() {
        let err = validate_category_name("").unwrap_err();
        assert_eq!(err.to_string(), "category is required");
    }

    #[test]
    fn test_validate_encodable() {
        assert!(validate_encodable("name", "Rice").is_ok());
        assert!(validate_encodable("name", "Rice|Beans").is_err());
        assert!(validate_encodable("name", "Rice~1").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity(" 50 ").unwrap(), 50);
        assert_eq!(parse_quantity("007").unwrap(), 7);

        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("+5").is_err());
        assert!(parse_quantity("-5").is_err());
        assert!(parse_quantity("five").is_err());
        assert!(parse_quantity("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_frame_number() {
        assert_eq!(parse_frame_number(" 3 "), Some(3));
        assert_eq!(parse_frame_number("0"), Some(0));
        assert_eq!(parse_frame_number(""), None);
        assert_eq!(parse_frame_number("x"), None);
        assert_eq!(parse_frame_number("99999999999"), None);
    }
}
