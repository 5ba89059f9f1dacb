//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (homebase-core)           │
//! │       │                                 │                               │
//! │       └──────────────┬──────────────────┘                               │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── retryable? (UniqueViolation, Conflict) → retried in place    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP handler ← Maps to a user-facing response                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use homebase_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two transactions committing the same document number
    /// - Duplicate document id
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// SQLite reported the database busy or locked.
    ///
    /// ## When This Occurs
    /// - Another connection holds the write lock past the busy timeout
    /// - A read snapshot went stale before this transaction could write
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// No free document number was found within the attempt budget.
    #[error("No document number available for {owner_id} matching '{pattern}' after {attempts} attempts")]
    AllocationExhausted {
        owner_id: String,
        pattern: String,
        attempts: u32,
    },

    /// A transaction kept conflicting until the retry budget ran out.
    #[error("Gave up on document {document_id} after {attempts} conflicting attempts")]
    RetriesExhausted { document_id: String, attempts: u32 },

    /// A stored column could not be decoded into its domain type.
    #[error("Invalid stored value in {column}: '{value}'")]
    InvalidStoredValue { column: String, value: String },

    /// Billing rule or validation failure from homebase-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Line items could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidStoredValue error.
    pub fn invalid_stored(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::InvalidStoredValue {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether rerunning the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. } | DbError::Conflict(_))
    }
}

/// SQLite primary and extended result codes for BUSY / LOCKED.
const BUSY_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → UniqueViolation / Conflict / QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>, ..."
                if db_err.is_unique_violation() || msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err
                    .code()
                    .is_some_and(|code| BUSY_CODES.contains(&code.as_ref()))
                    || msg.contains("database is locked")
                {
                    DbError::Conflict(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
