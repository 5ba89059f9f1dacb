//! # homebase-db: Database Layer for Homebase Billing
//!
//! Persists invoices and estimates in SQLite via sqlx and allocates their
//! sequential document numbers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Homebase Billing Data Flow                         │
//! │                                                                         │
//! │  Caller (API handler, seed tool)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   homebase-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │  (document.rs) │   │  (embedded)  │   │   │
//! │  │   │               │    │                │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ DocumentRepo   │   │ 001_docs.sql │   │   │
//! │  │   │ WAL + busy    │    │ NumberAlloc    │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  homebase-core (totals, numbering format, validation)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Document repository and number allocator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use homebase_db::{Config, Database};
//!
//! let config = Config::load()?;
//! let db = Database::new(config.database).await?.with_numbering(config.numbering);
//!
//! let draft = db.documents().create_draft(input).await?;
//! let sent = db.documents().change_status(&draft.id, DocumentStatus::Sent, 2025).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{Config, ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

pub use repository::document::{DocumentDetails, DocumentRepository};
pub use repository::numbering::DocumentNumberAllocator;
