//! # Seed Data Generator
//!
//! Populates the database with sample invoices and estimates for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 25 documents (default) for owner "dev-owner"
//! cargo run -p homebase-db --bin seed
//!
//! # Custom amount, owner and numbering year
//! cargo run -p homebase-db --bin seed -- --count 100 --owner acme --year 2025
//!
//! # Specify database path (overrides HOMEBASE_DB_PATH)
//! cargo run -p homebase-db --bin seed -- --db ./data/homebase.db
//! ```
//!
//! Every third document stays a draft; the rest are sent, which allocates
//! their numbers. Every fifth invoice is then marked paid.

use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use homebase_core::{DocumentKind, DocumentStatus, LineItem, NewDocument, DEFAULT_CURRENCY};
use homebase_db::{Config, Database};

/// Services used to build line items: (description, unit price in öre).
const SERVICES: &[(&str, i64)] = &[
    ("Consulting hour", 95000),
    ("Site visit", 45000),
    ("Design workshop", 1250000),
    ("Travel allowance", 18550),
    ("Material", 3990),
    ("Support retainer", 500000),
];

/// VAT rates cycled through line items.
const VAT_RATES: &[u32] = &[25, 25, 12, 6, 0];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config = Config::load()?;
    let mut count: usize = 25;
    let mut owner_id = String::from("dev-owner");
    let mut year = Utc::now().year();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--year" | "-y" => {
                if i + 1 < args.len() {
                    year = args[i + 1].parse().unwrap_or(year);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Homebase Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of documents to generate (default: 25)");
                println!("  -d, --db <PATH>      Database file path (default: $HOMEBASE_DB_PATH)");
                println!("  -o, --owner <ID>     Owner of the documents (default: dev-owner)");
                println!("  -y, --year <YYYY>    Numbering year (default: current year)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(
        path = %config.database.database_path.display(),
        owner_id = %owner_id,
        count,
        year,
        "Seeding documents"
    );

    let db = Database::new(config.database)
        .await?
        .with_numbering(config.numbering);
    let documents = db.documents();

    let start = std::time::Instant::now();
    let mut drafts = 0;
    let mut numbered = 0;

    for seed in 0..count {
        let kind = if seed % 4 == 3 {
            DocumentKind::Estimate
        } else {
            DocumentKind::Invoice
        };

        let draft = match documents.create_draft(generate_document(&owner_id, kind, seed)).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(seed, error = %e, "Failed to create draft");
                continue;
            }
        };

        if seed % 3 == 0 {
            drafts += 1;
            continue;
        }

        let sent = documents
            .change_status(&draft.id, DocumentStatus::Sent, year)
            .await?;
        numbered += 1;

        if kind == DocumentKind::Invoice && seed % 5 == 0 {
            documents
                .change_status(&sent.id, DocumentStatus::Paid, year)
                .await?;
        }

        if let Some(number) = &sent.number {
            println!("  {number:<14} {:>12} {}", sent.totals.total, sent.currency);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Seeded {} documents ({numbered} numbered, {drafts} drafts) in {elapsed:?}",
        numbered + drafts
    );

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber (`RUST_LOG` overrides the default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,homebase=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds a deterministic document from `seed`.
fn generate_document(owner_id: &str, kind: DocumentKind, seed: usize) -> NewDocument {
    let issue_date = Utc::now().date_naive() - Duration::days((seed % 60) as i64);

    let line_count = 1 + seed % 4;
    let line_items = (0..line_count)
        .map(|n| {
            let (description, price_ore) = SERVICES[(seed + n) % SERVICES.len()];
            let quantity = Decimal::from(1 + ((seed + n * 7) % 5) as i64);
            let discount = if (seed + n) % 6 == 0 { 10 } else { 0 };

            LineItem::new(description, quantity, Decimal::new(price_ore, 2))
                .with_discount(Decimal::from(discount))
                .with_vat_rate(Decimal::from(VAT_RATES[(seed + n) % VAT_RATES.len()]))
        })
        .collect();

    NewDocument {
        owner_id: owner_id.to_string(),
        kind,
        contact_id: Some(format!("contact-{:03}", seed % 12)),
        issue_date,
        due_date: Some(issue_date + Duration::days(30)),
        currency: DEFAULT_CURRENCY.to_string(),
        document_discount_percent: if seed % 7 == 0 {
            Decimal::from(5)
        } else {
            Decimal::ZERO
        },
        line_items,
        notes: None,
    }
}
