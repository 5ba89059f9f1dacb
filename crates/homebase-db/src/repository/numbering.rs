//! # Document Number Allocator
//!
//! Issues the next `<prefix><year>-<NNN>` number for an owner inside the
//! caller's transaction.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 SINGLE TRANSACTION (owned by the caller)                │
//! │                                                                         │
//! │  1. SELECT number FROM documents                                       │
//! │       WHERE owner_id = ? AND number LIKE 'INV2025-%'                   │
//! │       ORDER BY number DESC                                             │
//! │       └── first parsable row = highest sequence (padding keeps         │
//! │           text order equal to numeric order)                           │
//! │                                                                         │
//! │  2. candidate = highest + 1 (or 001)                                   │
//! │                                                                         │
//! │  3. taken?  ──yes──► candidate + 1, up to MAX_ALLOCATION_ATTEMPTS      │
//! │       │                                                                 │
//! │       no                                                                │
//! │       ▼                                                                 │
//! │  4. return candidate; caller writes the document and commits           │
//! │                                                                         │
//! │  Rollback anywhere ⇒ nothing reserved. Numbers are unique and          │
//! │  increasing per owner/prefix/year, not necessarily contiguous. Kinds   │
//! │  configured with the same prefix share one counter.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use homebase_core::numbering::{like_pattern, next_sequence, MAX_ALLOCATION_ATTEMPTS};
use homebase_core::DocumentNumber;

use crate::error::{DbError, DbResult};

/// Allocates document numbers within an open transaction.
#[derive(Debug, Clone, Copy)]
pub struct DocumentNumberAllocator {
    max_attempts: u32,
}

impl Default for DocumentNumberAllocator {
    fn default() -> Self {
        DocumentNumberAllocator {
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }
}

impl DocumentNumberAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the candidate budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the next free `prefix` number for `owner_id` in `year`.
    ///
    /// `conn` must be the connection of the transaction that will also
    /// write the document, so that a rollback discards the number too.
    ///
    /// ## Errors
    /// - [`DbError::AllocationExhausted`] when every candidate in the
    ///   budget is taken
    /// - [`DbError::Core`] with `SequenceOverflow` past `999`
    pub async fn allocate_next(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        year: i32,
        prefix: &str,
    ) -> DbResult<DocumentNumber> {
        let pattern = like_pattern(prefix, year);

        let existing: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT number
            FROM documents
            WHERE owner_id = ?1 AND number LIKE ?2
            ORDER BY number DESC
            "#,
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&mut *conn)
        .await?;

        let highest = existing
            .iter()
            .find_map(|number| DocumentNumber::parse_sequence(number, prefix, year).ok());
        let mut sequence = next_sequence(highest);

        debug!(
            owner_id = %owner_id,
            pattern = %pattern,
            highest = ?highest,
            "Allocating document number"
        );

        for attempt in 1..=self.max_attempts {
            let candidate = DocumentNumber::format(prefix, year, sequence)?;

            if !is_taken(conn, owner_id, &candidate).await? {
                debug!(owner_id = %owner_id, number = %candidate, attempt, "Document number allocated");
                return Ok(candidate);
            }

            warn!(owner_id = %owner_id, number = %candidate, attempt, "Document number taken, trying next");
            sequence += 1;
        }

        Err(DbError::AllocationExhausted {
            owner_id: owner_id.to_string(),
            pattern,
            attempts: self.max_attempts,
        })
    }
}

/// Numbers differing only in letter case count as taken.
async fn is_taken(
    conn: &mut SqliteConnection,
    owner_id: &str,
    candidate: &DocumentNumber,
) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM documents
        WHERE owner_id = ?1 AND number = ?2 COLLATE NOCASE
        "#,
    )
    .bind(owner_id)
    .bind(candidate.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================
