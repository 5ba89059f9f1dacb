//! End-to-end numbering behaviour against a file-backed SQLite database.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use homebase_core::{DocumentKind, DocumentStatus, LineItem, NewDocument, NumberingConfig};
use homebase_db::{Database, DbConfig, DbError, DocumentNumberAllocator, DocumentRepository};

/// Temporary database file, removed with its WAL side files on drop.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("homebase-{}.db", uuid::Uuid::new_v4()));
        TempDb { path }
    }

    async fn open(&self, max_connections: u32) -> Database {
        self.open_with(DbConfig::new(&self.path).max_connections(max_connections))
            .await
    }

    async fn open_with(&self, config: DbConfig) -> Database {
        Database::new(config).await.unwrap()
    }

    fn config(&self) -> DbConfig {
        DbConfig::new(&self.path)
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

fn invoice(owner_id: &str) -> NewDocument {
    document(owner_id, DocumentKind::Invoice)
}

fn document(owner_id: &str, kind: DocumentKind) -> NewDocument {
    NewDocument {
        owner_id: owner_id.to_string(),
        kind,
        contact_id: None,
        issue_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        due_date: None,
        currency: "SEK".to_string(),
        document_discount_percent: Decimal::ZERO,
        line_items: vec![LineItem::new("Work", dec!(1), dec!(100))],
        notes: None,
    }
}

/// Opens a transaction that holds SQLite's write lock until dropped.
async fn hold_write_lock(db: &Database, id: &str) -> sqlx::Transaction<'static, sqlx::Sqlite> {
    let mut tx = db.pool().begin().await.unwrap();
    sqlx::query("UPDATE documents SET updated_at = updated_at WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx
}

async fn send(repo: &DocumentRepository, input: NewDocument, year: i32) -> String {
    let draft = repo.create_draft(input).await.unwrap();
    let sent = repo
        .change_status(&draft.id, DocumentStatus::Sent, year)
        .await
        .unwrap();
    sent.number.unwrap().into_string()
}

#[tokio::test]
async fn sequential_invoices_share_a_year_counter() {
    let temp = TempDb::new();
    let db = temp.open(5).await;
    let repo = db.documents();

    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-001");
    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-002");

    db.close().await;
}

#[tokio::test]
async fn each_year_starts_at_one() {
    let temp = TempDb::new();
    let db = temp.open(5).await;
    let repo = db.documents();

    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-001");
    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-002");
    assert_eq!(send(&repo, invoice("owner-1"), 2026).await, "INV2026-001");
    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-003");

    db.close().await;
}

#[tokio::test]
async fn owners_and_prefixes_have_separate_counters() {
    let temp = TempDb::new();
    let db = temp.open(5).await;
    let repo = db.documents();

    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "INV2025-001");
    assert_eq!(send(&repo, invoice("owner-2"), 2025).await, "INV2025-001");
    assert_eq!(
        send(&repo, document("owner-1", DocumentKind::Estimate), 2025).await,
        "2025-001"
    );
    assert_eq!(
        send(&repo, document("owner-1", DocumentKind::Estimate), 2025).await,
        "2025-002"
    );

    db.close().await;
}

#[tokio::test]
async fn custom_prefixes_are_used() {
    let temp = TempDb::new();
    let db = temp.open(5).await.with_numbering(NumberingConfig {
        invoice_prefix: "F".to_string(),
        estimate_prefix: "OFF".to_string(),
    });
    let repo = db.documents();

    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "F2025-001");
    assert_eq!(
        send(&repo, document("owner-1", DocumentKind::Estimate), 2025).await,
        "OFF2025-001"
    );

    db.close().await;
}

#[tokio::test]
async fn kinds_sharing_a_prefix_never_share_a_number() {
    let temp = TempDb::new();
    let db = temp.open(5).await.with_numbering(NumberingConfig {
        invoice_prefix: "F".to_string(),
        estimate_prefix: "F".to_string(),
    });
    let repo = db.documents();

    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "F2025-001");
    assert_eq!(
        send(&repo, document("owner-1", DocumentKind::Estimate), 2025).await,
        "F2025-002"
    );
    assert_eq!(send(&repo, invoice("owner-1"), 2025).await, "F2025-003");

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_change_retries_while_another_writer_holds_the_lock() {
    let temp = TempDb::new();
    let db = temp
        .open_with(
            temp.config()
                .max_connections(3)
                .busy_timeout(Duration::from_millis(20)),
        )
        .await;
    let repo = db.documents();
    let draft = repo.create_draft(invoice("owner-1")).await.unwrap();

    let holder = hold_write_lock(&db, &draft.id).await;

    let sending = {
        let repo = repo.clone();
        let id = draft.id.clone();
        tokio::spawn(async move { repo.change_status(&id, DocumentStatus::Sent, 2025).await })
    };

    // Several busy timeouts elapse before the lock is released.
    tokio::time::sleep(Duration::from_millis(200)).await;
    holder.rollback().await.unwrap();

    let sent = sending.await.unwrap().unwrap();
    assert_eq!(sent.status, DocumentStatus::Sent);
    assert_eq!(sent.number.unwrap().as_str(), "INV2025-001");

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_change_gives_up_after_the_attempt_budget() {
    let temp = TempDb::new();
    let db = temp
        .open_with(
            temp.config()
                .max_connections(3)
                .busy_timeout(Duration::from_millis(20)),
        )
        .await;
    let repo = db
        .documents()
        .with_allocator(DocumentNumberAllocator::new().with_max_attempts(3));
    let draft = repo.create_draft(invoice("owner-1")).await.unwrap();

    let holder = hold_write_lock(&db, &draft.id).await;
    let err = repo
        .change_status(&draft.id, DocumentStatus::Sent, 2025)
        .await
        .unwrap_err();
    holder.rollback().await.unwrap();

    match err {
        DbError::RetriesExhausted {
            document_id,
            attempts,
        } => {
            assert_eq!(document_id, draft.id);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }

    let loaded = repo.get_by_id(&draft.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, DocumentStatus::Draft);
    assert_eq!(loaded.number, None);

    db.close().await;
}

#[tokio::test]
async fn totals_survive_reopening_the_database() {
    let temp = TempDb::new();
    let db = temp.open(5).await;

    let mut input = invoice("owner-1");
    input.document_discount_percent = dec!(10);
    input.line_items = vec![
        LineItem::new("Flowers", dec!(3), dec!(33.33)).with_vat_rate(dec!(12)),
        LineItem::new("Delivery", dec!(1), dec!(149)).with_discount(dec!(20)),
    ];
    let created = db.documents().create_draft(input).await.unwrap();
    db.close().await;

    let reopened = temp.open(5).await;
    let loaded = reopened
        .documents()
        .get_by_id(&created.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.totals, created.totals);
    assert_eq!(loaded.line_items, created.line_items);

    reopened.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_get_unique_contiguous_numbers() {
    const DOCUMENTS: usize = 20;

    let temp = TempDb::new();
    let db = temp.open(5).await;
    let repo = db.documents();

    let mut ids = Vec::with_capacity(DOCUMENTS);
    for _ in 0..DOCUMENTS {
        ids.push(repo.create_draft(invoice("owner-1")).await.unwrap().id);
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.change_status(&id, DocumentStatus::Sent, 2025)
                    .await
                    .map(|doc| doc.number.unwrap().into_string())
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    for handle in handles {
        let number = handle.await.unwrap().unwrap();
        assert!(numbers.insert(number), "duplicate number allocated");
    }

    let expected: HashSet<String> = (1..=DOCUMENTS)
        .map(|n| format!("INV2025-{n:03}"))
        .collect();
    assert_eq!(numbers, expected);

    db.close().await;
}
