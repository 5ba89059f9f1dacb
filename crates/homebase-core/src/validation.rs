//! # Validation Module
//!
//! Input validation for Homebase billing.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: ranges, formats, limits                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Totals engine                                                │
//! │  └── Trusts its input, no checks                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (owner_id, number)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use homebase_core::validation::{validate_line_item, validate_percentage};
//! use homebase_core::LineItem;
//! use rust_decimal::Decimal;
//!
//! let item = LineItem::new("Hosting", Decimal::ONE, Decimal::from(49));
//! validate_line_item(&item).unwrap();
//!
//! assert!(validate_percentage("discount_percent", Decimal::from(101)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{LineItem, NewDocument};
use crate::MAX_LINE_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest quantity or unit price accepted.
///
/// With [`MAX_LINE_ITEMS`] lines a subtotal stays at or below 5 × 10^26,
/// and multiplying it by a percentage (≤ 100) stays below the 96-bit
/// decimal limit of about 7.9 × 10^28.
const MAX_AMOUNT: i64 = 1_000_000_000_000;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a percentage: 0 to 100 inclusive.
pub fn validate_percentage(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a non-negative amount (quantity or price).
pub fn validate_amount(field: &str, value: Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if value > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

/// Validates a numbering year (four digits).
pub fn validate_year(year: i32) -> ValidationResult<()> {
    if !(1000..=9999).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 1000,
            max: 9999,
        });
    }

    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates one line item.
///
/// ## Rules
/// - quantity and unit_price: 0 ≤ x ≤ 10^12
/// - discount_percent and vat_rate_percent: 0 ≤ x ≤ 100
/// - description: at most 500 characters
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_amount("quantity", item.quantity)?;
    validate_amount("unit_price", item.unit_price)?;
    validate_percentage("discount_percent", item.discount_percent)?;
    validate_percentage("vat_rate_percent", item.vat_rate_percent)?;

    if item.description.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates all line items of a document and their count.
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line_items".to_string(),
            min: 0,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    items.iter().try_for_each(validate_line_item)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a document number prefix.
///
/// ## Rules
/// - May be empty
/// - At most 10 characters
/// - ASCII letters, digits and `-` only (no `LIKE` wildcards)
pub fn validate_number_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "prefix".to_string(),
            max: 10,
        });
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "prefix".to_string(),
            reason: "must contain only letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates an ISO 4217 currency code (three uppercase letters).
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

/// Validates an owner identifier: non-empty, at most 100 characters.
pub fn validate_owner_id(owner_id: &str) -> ValidationResult<()> {
    let owner_id = owner_id.trim();

    if owner_id.is_empty() {
        return Err(ValidationError::Required {
            field: "owner_id".to_string(),
        });
    }

    if owner_id.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "owner_id".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates creation input for a document.
pub fn validate_new_document(input: &NewDocument) -> ValidationResult<()> {
    validate_owner_id(&input.owner_id)?;
    validate_currency(&input.currency)?;
    validate_percentage("document_discount_percent", input.document_discount_percent)?;
    validate_line_items(&input.line_items)?;

    if let Some(due) = input.due_date {
        if due < input.issue_date {
            return Err(ValidationError::InvalidFormat {
                field: "due_date".to_string(),
                reason: "must not be before issue_date".to_string(),
            });
        }
    }

    if let Some(notes) = &input.notes {
        if notes.chars().count() > 5000 {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: 5000,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn new_document() -> NewDocument {
        NewDocument {
            owner_id: "owner-1".to_string(),
            kind: DocumentKind::Invoice,
            contact_id: None,
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 10),
            currency: "SEK".to_string(),
            document_discount_percent: dec!(5),
            line_items: vec![LineItem::new("Work", dec!(1), dec!(100))],
            notes: None,
        }
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("p", dec!(0)).is_ok());
        assert!(validate_percentage("p", dec!(12.5)).is_ok());
        assert!(validate_percentage("p", dec!(100)).is_ok());

        assert!(validate_percentage("p", dec!(-0.01)).is_err());
        assert!(validate_percentage("p", dec!(100.01)).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("quantity", dec!(0)).is_ok());
        assert!(validate_amount("quantity", dec!(1.5)).is_ok());
        assert!(validate_amount("quantity", dec!(-1)).is_err());
        assert!(validate_amount("unit_price", dec!(1000000000001)).is_err());
    }

    #[test]
    fn test_validate_line_item() {
        let ok = LineItem::new("Work", dec!(2), dec!(100));
        assert!(validate_line_item(&ok).is_ok());

        let bad_vat = ok.clone().with_vat_rate(dec!(125));
        assert!(validate_line_item(&bad_vat).is_err());

        let bad_discount = ok.clone().with_discount(dec!(-5));
        assert!(validate_line_item(&bad_discount).is_err());

        let long = LineItem::new("x".repeat(501), dec!(1), dec!(1));
        assert!(validate_line_item(&long).is_err());
    }

    #[test]
    fn test_validate_line_items_limit() {
        let items = vec![LineItem::new("", dec!(1), dec!(1)); MAX_LINE_ITEMS + 1];
        assert!(validate_line_items(&items).is_err());
        assert!(validate_line_items(&items[..MAX_LINE_ITEMS]).is_ok());
    }

    #[test]
    fn test_validate_number_prefix() {
        assert!(validate_number_prefix("").is_ok());
        assert!(validate_number_prefix("INV").is_ok());
        assert!(validate_number_prefix("RE-").is_ok());

        assert!(validate_number_prefix("IN%").is_err());
        assert!(validate_number_prefix("IN V").is_err());
        assert!(validate_number_prefix("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(2025).is_ok());
        assert!(validate_year(999).is_err());
        assert!(validate_year(10000).is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("SEK").is_ok());
        assert!(validate_currency("sek").is_err());
        assert!(validate_currency("SEKK").is_err());
    }

    #[test]
    fn test_validate_new_document() {
        assert!(validate_new_document(&new_document()).is_ok());

        let mut input = new_document();
        input.owner_id = "  ".to_string();
        assert!(validate_new_document(&input).is_err());

        let mut input = new_document();
        input.due_date = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert!(validate_new_document(&input).is_err());

        let mut input = new_document();
        input.document_discount_percent = dec!(150);
        assert!(validate_new_document(&input).is_err());
    }
}
