//! # Repository Module
//!
//! Database repository implementations for Homebase billing.
//!
//! ## Repository Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.documents().change_status(id, Sent, 2025)                  │
//! │       ▼                                                                 │
//! │  DocumentRepository                                                    │
//! │  ├── create_draft / get_by_id / list_by_owner                          │
//! │  ├── update_pricing / update_details                                   │
//! │  ├── change_status ───────► DocumentNumberAllocator::allocate_next     │
//! │  └── delete_draft                (same transaction)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DocumentRepository`](document::DocumentRepository) - Invoice and estimate persistence
//! - [`DocumentNumberAllocator`](numbering::DocumentNumberAllocator) - Sequential numbering

pub mod document;
pub mod numbering;
