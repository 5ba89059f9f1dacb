//! # Error Types
//!
//! Domain-specific error types for homebase-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  homebase-core errors (this file)                                      │
//! │  ├── CoreError        - Document rules, numbering format               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  homebase-db errors (separate crate)                                   │
//! │  └── DbError          - Database and allocation failures               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → HTTP handler            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{DocumentKind, DocumentStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Billing rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The status does not exist for this kind of document.
    ///
    /// ## When This Occurs
    /// - Marking an estimate as `paid`
    /// - Marking an invoice as `accepted`
    #[error("Status {status:?} is not valid for a {kind:?}")]
    StatusNotAllowed {
        kind: DocumentKind,
        status: DocumentStatus,
    },

    /// The document is not in a state that allows the requested edit.
    ///
    /// ## When This Occurs
    /// - Deleting a document that already carries a number
    #[error("Document {document_id} is {status:?}, cannot perform operation")]
    InvalidDocumentStatus {
        document_id: String,
        status: DocumentStatus,
    },

    /// Numbers are assigned once and never replaced.
    #[error("Document {document_id} already has number {number}")]
    AlreadyNumbered { document_id: String, number: String },

    /// A string could not be read as `<prefix><year>-<sequence>`.
    #[error("Invalid document number '{number}': {reason}")]
    InvalidDocumentNumber { number: String, reason: String },

    /// The sequence no longer fits the fixed zero-padded width.
    #[error("Sequence {sequence} exceeds the {width}-digit document number format")]
    SequenceOverflow { sequence: u32, width: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the [`crate::validation`] layer before values reach the
/// calculator, which itself trusts its input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
