//! # Domain Types
//!
//! Core domain types used throughout Homebase billing.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Document     │   │    LineItem     │   │ DocumentTotals  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  quantity       │   │  subtotal       │       │
//! │  │  owner_id       │──►│  unit_price     │   │  total_vat      │       │
//! │  │  kind           │   │  discount %     │   │  total          │       │
//! │  │  number?        │   │  vat rate %     │   │  (7 fields)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DocumentKind   │   │ DocumentStatus  │   │ NumberingState  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Invoice        │   │  Draft, Sent    │   │  Unnumbered     │       │
//! │  │  Estimate       │   │  Paid, ...      │   │  Numbered       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `number`: business ID (`INV2025-007`) - absent while drafting,
//!   assigned once, never changed afterwards

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::numbering::DocumentNumber;
use crate::totals;
use crate::{DEFAULT_CURRENCY, DEFAULT_VAT_RATE_PERCENT};

fn default_vat_rate_percent() -> Decimal {
    Decimal::from(DEFAULT_VAT_RATE_PERCENT)
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// =============================================================================
// Line Item
// =============================================================================

/// One billable row within a document.
///
/// Only the four numeric fields take part in the totals; order and
/// description affect display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Free text shown on the document.
    #[serde(default)]
    pub description: String,

    #[ts(as = "String")]
    pub quantity: Decimal,

    /// Price per unit, excluding VAT.
    #[ts(as = "String")]
    pub unit_price: Decimal,

    /// Line discount in percent (0-100).
    #[serde(default)]
    #[ts(as = "String")]
    pub discount_percent: Decimal,

    /// VAT rate in percent (0-100).
    #[serde(default = "default_vat_rate_percent")]
    #[ts(as = "String")]
    pub vat_rate_percent: Decimal,
}

impl LineItem {
    /// Creates a line item with no discount and the default VAT rate.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            unit_price,
            discount_percent: Decimal::ZERO,
            vat_rate_percent: default_vat_rate_percent(),
        }
    }

    /// Sets the line discount percentage.
    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    /// Sets the VAT rate percentage.
    pub fn with_vat_rate(mut self, percent: Decimal) -> Self {
        self.vat_rate_percent = percent;
        self
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Monetary totals of a document, each rounded to the minor unit.
///
/// Produced only by [`totals::compute`]; callers store it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    /// Σ quantity × unit_price.
    #[ts(as = "String")]
    pub subtotal: Decimal,
    /// Σ line discounts.
    #[ts(as = "String")]
    pub total_discount: Decimal,
    #[ts(as = "String")]
    pub subtotal_after_discount: Decimal,
    #[ts(as = "String")]
    pub document_discount_amount: Decimal,
    #[ts(as = "String")]
    pub subtotal_after_document_discount: Decimal,
    #[ts(as = "String")]
    pub total_vat: Decimal,
    /// Amount payable.
    #[ts(as = "String")]
    pub total: Decimal,
}

// =============================================================================
// Document Kind
// =============================================================================

/// Invoices and estimates share the totals and numbering contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Estimate,
}

impl DocumentKind {
    /// Stable lowercase name, matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Estimate => "estimate",
        }
    }

    /// Checks whether a status exists for this kind of document.
    pub fn allows(&self, status: DocumentStatus) -> bool {
        use DocumentStatus::*;

        match self {
            DocumentKind::Invoice => matches!(status, Draft | Sent | Paid | Overdue | Cancelled),
            DocumentKind::Estimate => {
                matches!(status, Draft | Sent | Accepted | Declined | Cancelled)
            }
        }
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being edited, no number yet.
    #[default]
    Draft,
    /// Delivered to the customer.
    Sent,
    /// Invoice settled.
    Paid,
    /// Invoice past its due date.
    Overdue,
    /// Estimate accepted by the customer.
    Accepted,
    /// Estimate declined by the customer.
    Declined,
    Cancelled,
}

impl DocumentStatus {
    /// Finalized statuses are the ones a document can only reach after it
    /// has left the drafting stage; entering one requires a number.
    pub const fn is_finalized(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Sent
                | DocumentStatus::Paid
                | DocumentStatus::Overdue
                | DocumentStatus::Accepted
                | DocumentStatus::Declined
        )
    }
}

// =============================================================================
// Numbering State
// =============================================================================

/// `Unnumbered → Numbered`, one way only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingState {
    Unnumbered,
    Numbered,
}

// =============================================================================
// Document
// =============================================================================

/// Input for creating a draft document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDocument {
    pub owner_id: String,
    pub kind: DocumentKind,
    pub contact_id: Option<String>,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    #[ts(as = "String")]
    pub document_discount_percent: Decimal,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub notes: Option<String>,
}

/// An invoice or estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Document {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Account whose numbering sequence this document belongs to.
    pub owner_id: String,

    pub kind: DocumentKind,

    /// Assigned on the first move into a finalized status.
    pub number: Option<DocumentNumber>,

    pub status: DocumentStatus,

    pub contact_id: Option<String>,

    #[ts(as = "String")]
    pub issue_date: NaiveDate,

    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    /// ISO 4217 code.
    pub currency: String,

    #[ts(as = "String")]
    pub document_discount_percent: Decimal,

    pub line_items: Vec<LineItem>,

    /// Always equal to `totals::compute(line_items, document_discount_percent)`.
    pub totals: DocumentTotals,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Last time the status actually changed.
    #[ts(as = "Option<String>")]
    pub status_changed_at: Option<DateTime<Utc>>,

    /// First time the invoice was marked paid.
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Result of [`Document::apply_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// False when the document was already in the requested status.
    pub changed: bool,
    /// True when the caller must allocate a number before persisting.
    pub needs_number: bool,
}

impl Document {
    /// Builds a draft from creation input, computing its totals.
    pub fn new_draft(id: String, input: NewDocument, now: DateTime<Utc>) -> Self {
        let totals = totals::compute(&input.line_items, input.document_discount_percent);

        Document {
            id,
            owner_id: input.owner_id,
            kind: input.kind,
            number: None,
            status: DocumentStatus::Draft,
            contact_id: input.contact_id,
            issue_date: input.issue_date,
            due_date: input.due_date,
            currency: input.currency,
            document_discount_percent: input.document_discount_percent,
            line_items: input.line_items,
            totals,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            status_changed_at: None,
            paid_at: None,
        }
    }

    /// Recomputes `totals` from the current line items and discount.
    pub fn recalculate(&mut self) {
        self.totals = totals::compute(&self.line_items, self.document_discount_percent);
    }

    /// Replaces the line items and document discount, then recalculates.
    pub fn set_pricing(
        &mut self,
        line_items: Vec<LineItem>,
        document_discount_percent: Decimal,
        now: DateTime<Utc>,
    ) {
        self.line_items = line_items;
        self.document_discount_percent = document_discount_percent;
        self.updated_at = now;
        self.recalculate();
    }

    pub fn numbering_state(&self) -> NumberingState {
        match self.number {
            Some(_) => NumberingState::Numbered,
            None => NumberingState::Unnumbered,
        }
    }

    /// Moves the document to `status`.
    ///
    /// `status_changed_at` is stamped on every real change, `paid_at` only
    /// on the first move into `Paid`. Requesting the current status is a
    /// no-op. The returned [`StatusChange`] tells the caller whether a
    /// number has to be allocated in the same transaction.
    pub fn apply_status(
        &mut self,
        status: DocumentStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<StatusChange> {
        if !self.kind.allows(status) {
            return Err(CoreError::StatusNotAllowed {
                kind: self.kind,
                status,
            });
        }

        if self.status == status {
            return Ok(StatusChange {
                changed: false,
                needs_number: false,
            });
        }

        self.status = status;
        self.status_changed_at = Some(now);
        self.updated_at = now;

        if status == DocumentStatus::Paid && self.paid_at.is_none() {
            self.paid_at = Some(now);
        }

        Ok(StatusChange {
            changed: true,
            needs_number: status.is_finalized() && self.number.is_none(),
        })
    }

    /// Attaches an allocated number. Fails if one is already present.
    pub fn assign_number(&mut self, number: DocumentNumber) -> CoreResult<()> {
        if let Some(existing) = &self.number {
            return Err(CoreError::AlreadyNumbered {
                document_id: self.id.clone(),
                number: existing.to_string(),
            });
        }

        self.number = Some(number);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
