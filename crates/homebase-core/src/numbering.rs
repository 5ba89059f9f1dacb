//! # Document Numbering Rules
//!
//! Format, parse, and sequence rules for document numbers. The database
//! layer owns allocation; everything here is pure.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │     INV   2025  -  007                                                  │
//! │     ───   ────     ───                                                  │
//! │      │     │        └── sequence, zero-padded to 3 digits               │
//! │      │     └── calendar year, 4 digits (restarts the sequence)          │
//! │      └── optional prefix ("INV" for invoices, "" for estimates)         │
//! │                                                                         │
//! │  Padding keeps lexicographic order equal to numeric order, so the      │
//! │  highest number can be found with ORDER BY number DESC.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::DocumentKind;
use crate::validation::{validate_number_prefix, validate_year};

/// Digits in the sequence part.
pub const SEQUENCE_WIDTH: usize = 3;

/// Highest sequence that fits [`SEQUENCE_WIDTH`].
pub const MAX_SEQUENCE: u32 = 999;

/// Upper bound on candidate checks and conflict retries per allocation.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 100;

// =============================================================================
// Document Number
// =============================================================================

/// A formatted document number such as `INV2025-007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Formats `<prefix><year>-<sequence>`.
    ///
    /// ## Example
    /// ```rust
    /// use homebase_core::DocumentNumber;
    ///
    /// assert_eq!(DocumentNumber::format("INV", 2025, 7).unwrap().as_str(), "INV2025-007");
    /// assert_eq!(DocumentNumber::format("", 2025, 12).unwrap().as_str(), "2025-012");
    /// assert!(DocumentNumber::format("INV", 2025, 1000).is_err());
    /// ```
    pub fn format(prefix: &str, year: i32, sequence: u32) -> CoreResult<Self> {
        validate_number_prefix(prefix)?;
        validate_year(year)?;

        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(CoreError::SequenceOverflow {
                sequence,
                width: SEQUENCE_WIDTH,
            });
        }

        Ok(DocumentNumber(format!(
            "{prefix}{year:04}-{sequence:0width$}",
            width = SEQUENCE_WIDTH
        )))
    }

    /// Reads the sequence out of `number`, which must carry exactly this
    /// prefix and year.
    pub fn parse_sequence(number: &str, prefix: &str, year: i32) -> CoreResult<u32> {
        let invalid = |reason: &str| CoreError::InvalidDocumentNumber {
            number: number.to_string(),
            reason: reason.to_string(),
        };

        let rest = number
            .strip_prefix(prefix)
            .ok_or_else(|| invalid("prefix does not match"))?;
        let rest = rest
            .strip_prefix(&format!("{year:04}-"))
            .ok_or_else(|| invalid("year does not match"))?;

        if rest.len() != SEQUENCE_WIDTH || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be 3 digits"));
        }

        rest.parse::<u32>()
            .map_err(|_| invalid("sequence is not a number"))
    }

    /// Wraps a stored number without checking its shape.
    pub fn from_stored(number: String) -> Self {
        DocumentNumber(number)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Sequence Helpers
// =============================================================================

/// SQL `LIKE` pattern matching every number for `prefix` and `year`.
///
/// Prefixes are validated to contain no `LIKE` wildcards.
pub fn like_pattern(prefix: &str, year: i32) -> String {
    format!("{prefix}{year:04}-%")
}

/// Sequence following the highest one already issued, or 1.
pub fn next_sequence(highest: Option<u32>) -> u32 {
    highest.map_or(1, |seq| seq + 1)
}

// =============================================================================
// Numbering Configuration
// =============================================================================

/// Prefix per document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingConfig {
    pub invoice_prefix: String,
    pub estimate_prefix: String,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        NumberingConfig {
            invoice_prefix: "INV".to_string(),
            estimate_prefix: String::new(),
        }
    }
}

impl NumberingConfig {
    pub fn prefix_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Invoice => &self.invoice_prefix,
            DocumentKind::Estimate => &self.estimate_prefix,
        }
    }

    /// Checks both prefixes.
    pub fn validate(&self) -> CoreResult<()> {
        validate_number_prefix(&self.invoice_prefix)?;
        validate_number_prefix(&self.estimate_prefix)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
