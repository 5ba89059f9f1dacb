//! # Document Repository
//!
//! Database operations for invoices and estimates.
//!
//! ## Document Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Document Lifecycle                                │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                       │
//! │     └── create_draft() → Document { status: Draft, number: None }      │
//! │                                                                         │
//! │  2. EDIT                                                               │
//! │     └── update_pricing() → totals recomputed on every edit             │
//! │     └── update_details() → contact, dates, currency, notes             │
//! │                                                                         │
//! │  3. FINALIZE                                                           │
//! │     └── change_status(Sent) → number allocated in the same             │
//! │         transaction as the status write, retried on conflict           │
//! │                                                                         │
//! │  4. FOLLOW-UP                                                          │
//! │     └── change_status(Paid / Accepted / ...) → number kept             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use homebase_core::validation::{
    validate_currency, validate_line_items, validate_new_document, validate_percentage,
    validate_year,
};
use homebase_core::{
    CoreError, Document, DocumentKind, DocumentNumber, DocumentStatus, DocumentTotals, LineItem,
    NewDocument, NumberingConfig,
};

use crate::error::{DbError, DbResult};
use crate::repository::numbering::DocumentNumberAllocator;

/// Editable non-monetary fields of a document.
#[derive(Debug, Clone)]
pub struct DocumentDetails {
    pub contact_id: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub currency: String,
    pub notes: Option<String>,
}

/// Repository for document database operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
    numbering: NumberingConfig,
    allocator: DocumentNumberAllocator,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool, numbering: NumberingConfig) -> Self {
        DocumentRepository {
            pool,
            numbering,
            allocator: DocumentNumberAllocator::new(),
        }
    }

    /// Replaces the allocator (e.g. a smaller attempt budget).
    pub fn with_allocator(mut self, allocator: DocumentNumberAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Creates a draft with computed totals and no number.
    pub async fn create_draft(&self, input: NewDocument) -> DbResult<Document> {
        validate_new_document(&input).map_err(CoreError::from)?;

        let document = Document::new_draft(Uuid::new_v4().to_string(), input, Utc::now());

        debug!(
            id = %document.id,
            owner_id = %document.owner_id,
            kind = document.kind.as_str(),
            total = %document.totals.total,
            "Creating draft document"
        );

        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, &document).await?;

        Ok(document)
    }

    /// Gets a document by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Document>> {
        let mut conn = self.pool.acquire().await?;
        fetch_document(&mut conn, id).await
    }

    /// Lists an owner's documents, newest first, optionally by kind.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        kind: Option<DocumentKind>,
    ) -> DbResult<Vec<Document>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "{SELECT_DOCUMENT} WHERE owner_id = ?1 AND (?2 IS NULL OR kind = ?2) \
             ORDER BY created_at DESC, id"
        ))
        .bind(owner_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    /// Replaces line items and document discount, recomputing totals.
    ///
    /// Allowed in every status; the number, if any, is untouched.
    pub async fn update_pricing(
        &self,
        id: &str,
        line_items: Vec<LineItem>,
        document_discount_percent: Decimal,
    ) -> DbResult<Document> {
        validate_line_items(&line_items).map_err(CoreError::from)?;
        validate_percentage("document_discount_percent", document_discount_percent)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        claim_write_lock(&mut tx, id).await?;

        let mut document = fetch_document(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        document.set_pricing(line_items, document_discount_percent, Utc::now());
        update_document(&mut tx, &document).await?;
        tx.commit().await?;

        debug!(id = %id, total = %document.totals.total, "Document pricing updated");
        Ok(document)
    }

    /// Updates contact, dates, currency and notes.
    pub async fn update_details(&self, id: &str, details: DocumentDetails) -> DbResult<Document> {
        validate_currency(&details.currency).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        claim_write_lock(&mut tx, id).await?;

        let mut document = fetch_document(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        document.contact_id = details.contact_id;
        document.issue_date = details.issue_date;
        document.due_date = details.due_date;
        document.currency = details.currency;
        document.notes = details.notes;
        document.updated_at = Utc::now();

        update_document(&mut tx, &document).await?;
        tx.commit().await?;

        Ok(document)
    }

    /// Moves a document to `status`, allocating a number in `year` if this
    /// is its first move into a finalized status.
    ///
    /// The allocation and the status write share one transaction. Unique
    /// violations and busy/locked errors rerun the whole transaction, at
    /// most as many times as the allocator's attempt budget
    /// ([`MAX_ALLOCATION_ATTEMPTS`](homebase_core::numbering::MAX_ALLOCATION_ATTEMPTS)
    /// by default).
    ///
    /// ## Example
    /// ```rust,ignore
    /// let sent = repo.change_status(&draft.id, DocumentStatus::Sent, 2025).await?;
    /// assert_eq!(sent.number.unwrap().as_str(), "INV2025-001");
    /// ```
    pub async fn change_status(
        &self,
        id: &str,
        status: DocumentStatus,
        year: i32,
    ) -> DbResult<Document> {
        validate_year(year).map_err(CoreError::from)?;

        let max_attempts = self.allocator.max_attempts();

        for attempt in 1..=max_attempts {
            match self.try_change_status(id, status, year).await {
                Ok(document) => return Ok(document),
                Err(err) if err.is_retryable() => {
                    warn!(id = %id, attempt, error = %err, "Status change conflicted, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(DbError::RetriesExhausted {
            document_id: id.to_string(),
            attempts: max_attempts,
        })
    }

    async fn try_change_status(
        &self,
        id: &str,
        status: DocumentStatus,
        year: i32,
    ) -> DbResult<Document> {
        let mut tx = self.pool.begin().await?;
        claim_write_lock(&mut tx, id).await?;

        let mut document = fetch_document(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        let change = document.apply_status(status, Utc::now())?;
        if !change.changed {
            return Ok(document);
        }

        if change.needs_number {
            let prefix = self.numbering.prefix_for(document.kind);
            let number = self
                .allocator
                .allocate_next(&mut tx, &document.owner_id, year, prefix)
                .await?;
            document.assign_number(number)?;
        }

        update_document(&mut tx, &document).await?;
        tx.commit().await?;

        info!(
            id = %id,
            status = ?document.status,
            number = document.number.as_ref().map(DocumentNumber::as_str).unwrap_or(""),
            "Document status changed"
        );

        Ok(document)
    }

    /// Deletes a document that never received a number.
    pub async fn delete_draft(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        claim_write_lock(&mut tx, id).await?;

        let document = fetch_document(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        if document.number.is_some() {
            return Err(CoreError::InvalidDocumentStatus {
                document_id: document.id,
                status: document.status,
            }
            .into());
        }

        sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(id = %id, "Draft document deleted");
        Ok(())
    }
}

// =============================================================================
// SQL Helpers
// =============================================================================

const SELECT_DOCUMENT: &str = r#"
    SELECT
        id, owner_id, kind, number, status, contact_id,
        issue_date, due_date, currency, document_discount_percent, line_items,
        subtotal, total_discount, subtotal_after_discount,
        document_discount_amount, subtotal_after_document_discount,
        total_vat, total,
        notes, created_at, updated_at, status_changed_at, paid_at
    FROM documents
"#;

/// Takes SQLite's write lock as the first statement of a transaction, so
/// the reads that follow see the latest committed numbers and concurrent
/// writers queue on the busy timeout instead of failing late.
async fn claim_write_lock(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    sqlx::query("UPDATE documents SET id = id WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn fetch_document(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Document>> {
    let row: Option<DocumentRow> = sqlx::query_as(&format!("{SELECT_DOCUMENT} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Document::try_from).transpose()
}

async fn insert_document(conn: &mut SqliteConnection, document: &Document) -> DbResult<()> {
    let line_items = serde_json::to_string(&document.line_items)?;
    let totals = &document.totals;

    sqlx::query(
        r#"
        INSERT INTO documents (
            id, owner_id, kind, number, status, contact_id,
            issue_date, due_date, currency, document_discount_percent, line_items,
            subtotal, total_discount, subtotal_after_discount,
            document_discount_amount, subtotal_after_document_discount,
            total_vat, total,
            notes, created_at, updated_at, status_changed_at, paid_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14,
            ?15, ?16,
            ?17, ?18,
            ?19, ?20, ?21, ?22, ?23
        )
        "#,
    )
    .bind(&document.id)
    .bind(&document.owner_id)
    .bind(document.kind)
    .bind(document.number.as_ref().map(DocumentNumber::as_str))
    .bind(document.status)
    .bind(&document.contact_id)
    .bind(document.issue_date)
    .bind(document.due_date)
    .bind(&document.currency)
    .bind(document.document_discount_percent.to_string())
    .bind(line_items)
    .bind(totals.subtotal.to_string())
    .bind(totals.total_discount.to_string())
    .bind(totals.subtotal_after_discount.to_string())
    .bind(totals.document_discount_amount.to_string())
    .bind(totals.subtotal_after_document_discount.to_string())
    .bind(totals.total_vat.to_string())
    .bind(totals.total.to_string())
    .bind(&document.notes)
    .bind(document.created_at)
    .bind(document.updated_at)
    .bind(document.status_changed_at)
    .bind(document.paid_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_document(conn: &mut SqliteConnection, document: &Document) -> DbResult<()> {
    let line_items = serde_json::to_string(&document.line_items)?;
    let totals = &document.totals;

    let result = sqlx::query(
        r#"
        UPDATE documents SET
            number = ?2,
            status = ?3,
            contact_id = ?4,
            issue_date = ?5,
            due_date = ?6,
            currency = ?7,
            document_discount_percent = ?8,
            line_items = ?9,
            subtotal = ?10,
            total_discount = ?11,
            subtotal_after_discount = ?12,
            document_discount_amount = ?13,
            subtotal_after_document_discount = ?14,
            total_vat = ?15,
            total = ?16,
            notes = ?17,
            updated_at = ?18,
            status_changed_at = ?19,
            paid_at = ?20
        WHERE id = ?1
        "#,
    )
    .bind(&document.id)
    .bind(document.number.as_ref().map(DocumentNumber::as_str))
    .bind(document.status)
    .bind(&document.contact_id)
    .bind(document.issue_date)
    .bind(document.due_date)
    .bind(&document.currency)
    .bind(document.document_discount_percent.to_string())
    .bind(line_items)
    .bind(totals.subtotal.to_string())
    .bind(totals.total_discount.to_string())
    .bind(totals.subtotal_after_discount.to_string())
    .bind(totals.document_discount_amount.to_string())
    .bind(totals.subtotal_after_document_discount.to_string())
    .bind(totals.total_vat.to_string())
    .bind(totals.total.to_string())
    .bind(&document.notes)
    .bind(document.updated_at)
    .bind(document.status_changed_at)
    .bind(document.paid_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Document", document.id.as_str()));
    }

    Ok(())
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `documents` row; decimals and line items are still text.
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    owner_id: String,
    kind: DocumentKind,
    number: Option<String>,
    status: DocumentStatus,
    contact_id: Option<String>,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency: String,
    document_discount_percent: String,
    line_items: String,
    subtotal: String,
    total_discount: String,
    subtotal_after_discount: String,
    document_discount_amount: String,
    subtotal_after_document_discount: String,
    total_vat: String,
    total: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    status_changed_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
}

fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DbError::invalid_stored(column, value))
}

impl TryFrom<DocumentRow> for Document {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Self> {
        let totals = DocumentTotals {
            subtotal: parse_decimal("subtotal", &row.subtotal)?,
            total_discount: parse_decimal("total_discount", &row.total_discount)?,
            subtotal_after_discount: parse_decimal(
                "subtotal_after_discount",
                &row.subtotal_after_discount,
            )?,
            document_discount_amount: parse_decimal(
                "document_discount_amount",
                &row.document_discount_amount,
            )?,
            subtotal_after_document_discount: parse_decimal(
                "subtotal_after_document_discount",
                &row.subtotal_after_document_discount,
            )?,
            total_vat: parse_decimal("total_vat", &row.total_vat)?,
            total: parse_decimal("total", &row.total)?,
        };

        Ok(Document {
            id: row.id,
            owner_id: row.owner_id,
            kind: row.kind,
            number: row.number.map(DocumentNumber::from_stored),
            status: row.status,
            contact_id: row.contact_id,
            issue_date: row.issue_date,
            due_date: row.due_date,
            currency: row.currency,
            document_discount_percent: parse_decimal(
                "document_discount_percent",
                &row.document_discount_percent,
            )?,
            line_items: serde_json::from_str(&row.line_items)?,
            totals,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            status_changed_at: row.status_changed_at,
            paid_at: row.paid_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
