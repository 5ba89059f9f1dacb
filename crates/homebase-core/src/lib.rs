//! # homebase-core: Pure Billing Logic for Homebase
//!
//! This crate is the **heart** of Homebase invoicing. It contains the
//! totals engine and the document numbering rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Homebase Billing Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP handlers / React frontend                  │   │
//! │  │   create invoice ──► edit lines ──► send ──► mark paid          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ homebase-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  totals   │  │ numbering │  │ validation│  │   │
//! │  │   │ Document  │  │ compute() │  │ INV2025-  │  │   rules   │  │   │
//! │  │   │ LineItem  │  │ breakdown │  │   007     │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  homebase-db (SQLite, sqlx)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Document, LineItem, DocumentTotals, ...)
//! - [`totals`] - The totals engine (discounts, proportional VAT)
//! - [`numbering`] - Document number format and sequence rules
//! - [`money`] - Decimal rounding helpers
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation that runs before the engine
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit
//! 2. **No I/O**: no database, no clock, no environment
//! 3. **Decimal Money**: `rust_decimal::Decimal` everywhere, rounded once
//! 4. **Explicit Parameters**: owner and year are always passed in
//!
//! ## Example Usage
//!
//! ```rust
//! use homebase_core::{totals, LineItem};
//! use rust_decimal::Decimal;
//!
//! let items = vec![LineItem::new("Consulting", Decimal::from(2), Decimal::from(100))];
//! let result = totals::compute(&items, Decimal::ZERO);
//!
//! assert_eq!(result.subtotal, Decimal::from(200));
//! assert_eq!(result.total_vat, Decimal::from(50));
//! assert_eq!(result.total, Decimal::from(250));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use numbering::{DocumentNumber, NumberingConfig};
pub use totals::{LineBreakdown, TotalsBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT rate applied to a line item when none is given (Swedish standard rate).
pub const DEFAULT_VAT_RATE_PERCENT: u32 = 25;

/// Currency used when a document does not name one.
pub const DEFAULT_CURRENCY: &str = "SEK";

/// Maximum line items on a single document.
pub const MAX_LINE_ITEMS: usize = 500;
