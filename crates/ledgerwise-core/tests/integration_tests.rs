//! Integration tests for ledgerwise-core
//!
//! These tests exercise the full import → ledger → analysis → persistence workflow.

use chrono::{Duration, NaiveDate};
use ledgerwise_core::{
    import::{parse_statement, read_csv},
    models::{HealthStatus, LeakType, ManualEntry, Subscription, TransactionType},
    AnalysisConfig, FinanceStore, ImportMode, MemoryStore, RecordStore, SqliteStore,
};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

/// A month of statement data as the import collaborator returns it
/// Contains:
/// - one salary credit (integer id, numeric amount)
/// - two small coffee purchases (Small Frequent leak)
/// - a single wire fee (Hidden Fee leak)
/// - rent dominating the month's spending
fn october_statement() -> &'static str {
    r#"{
        "transactions": [
            {"id": 1001, "title": "Salary", "amount": 3000, "date": "2026-10-01", "type": "income", "category": "Income"},
            {"id": 1002, "title": "Coffee 1", "amount": "-$4.50", "date": "2026-10-02 08:15", "category": "Food"},
            {"id": 1003, "title": "Coffee 2", "amount": "-$5.50", "date": "2026-10-03 09:40", "category": "Food"},
            {"id": 1004, "title": "Rent", "amount": "-$1,200.00", "date": "2026-10-05", "type": "expense", "category": "Housing"},
            {"title": "Wire fee", "amount": "-$150.00", "date": "2026-10-06", "category": "Bank"}
        ],
        "advice": "- Make coffee at home\n- Ask the bank to waive wire fees"
    }"#
}

fn temp_store(dir: &TempDir) -> SqliteStore {
    let path = dir.path().join("ledgerwise.db");
    SqliteStore::new_unencrypted(&path.to_string_lossy()).expect("Failed to open store")
}

async fn open<S: RecordStore>(store: S) -> FinanceStore<S> {
    let mut finance = FinanceStore::new(store, AnalysisConfig::default());
    finance.set_today(Some(today()));
    finance.load().await.expect("Failed to load");
    finance
}

// =============================================================================
// Import → Analysis
// =============================================================================

#[tokio::test]
async fn test_statement_import_drives_analysis() {
    let dir = TempDir::new().unwrap();
    let mut finance = open(temp_store(&dir)).await;

    let import = parse_statement(october_statement()).expect("Failed to parse statement");
    let outcome = finance
        .import_statement(import, ImportMode::Append)
        .await
        .expect("Failed to import");

    assert_eq!(outcome.imported, 5);
    assert_eq!(outcome.advice.len(), 2);

    let analysis = finance.analysis();
    assert_eq!(analysis.summary.income, 3000.0);
    assert_eq!(analysis.summary.expense, 1360.0);
    assert_eq!(analysis.summary.balance, 1640.0);

    let leaks: Vec<(&str, LeakType)> = analysis
        .leaks
        .leaks
        .iter()
        .map(|l| (l.name.as_str(), l.kind))
        .collect();
    // Clusters follow ledger order, which is newest first
    assert_eq!(
        leaks,
        vec![("wire fee", LeakType::HiddenFee), ("coffee", LeakType::SmallFrequent)]
    );
    assert_eq!(analysis.leaks.total_leak, 160.0);

    assert_eq!(analysis.health.score, 70);
    assert_eq!(analysis.health.status, HealthStatus::Safe);

    let dominant = analysis.dominant_category.as_ref().expect("Rent should dominate");
    assert_eq!(dominant.category, "Housing");

    // Two coffees carried a time of day
    assert_eq!(analysis.heatmap.untimed, 3);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let before = {
        let mut finance = open(temp_store(&dir)).await;
        let import = parse_statement(october_statement()).unwrap();
        finance.import_statement(import, ImportMode::Append).await.unwrap();
        finance.set_starting_balance(250.0).await.unwrap();
        finance.transactions()
    };

    let finance = open(temp_store(&dir)).await;

    assert_eq!(finance.transactions(), before);
    assert_eq!(finance.settings().starting_balance, 250.0);
    assert_eq!(finance.settings().advice[0], "Make coffee at home");
    assert_eq!(finance.analysis().summary.balance, 1890.0);
}

#[tokio::test]
async fn test_ledger_is_newest_first() {
    let mut finance = open(MemoryStore::new()).await;
    let import = parse_statement(october_statement()).unwrap();
    finance.import_statement(import, ImportMode::Append).await.unwrap();

    let titles: Vec<String> = finance.transactions().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Wire fee", "Rent", "Coffee 2", "Coffee 1", "Salary"]);
}

// =============================================================================
// Replace semantics
// =============================================================================

#[tokio::test]
async fn test_replace_returns_exactly_the_replaced_set() {
    let dir = TempDir::new().unwrap();
    let mut finance = open(temp_store(&dir)).await;

    let import = parse_statement(october_statement()).unwrap();
    finance.import_statement(import, ImportMode::Append).await.unwrap();

    let keep: Vec<_> = finance
        .transactions()
        .into_iter()
        .filter(|t| t.category == "Food")
        .collect();
    finance.replace_transactions(keep.clone()).await.unwrap();

    let mut ids: Vec<String> = finance.transactions().into_iter().map(|t| t.id).collect();
    let mut expected: Vec<String> = keep.into_iter().map(|t| t.id).collect();
    ids.sort();
    expected.sort();
    assert_eq!(ids, expected);

    // And the store agrees after a reopen
    let reopened = open(temp_store(&dir)).await;
    assert_eq!(reopened.transactions().len(), 2);
}

#[tokio::test]
async fn test_replace_mode_import() {
    let mut finance = open(MemoryStore::new()).await;
    finance
        .add_manual(ManualEntry {
            title: "Old entry".to_string(),
            amount: 10.0,
            date: None,
            time: None,
            category: None,
            kind: TransactionType::Expense,
        })
        .await
        .unwrap();

    let import = parse_statement(october_statement()).unwrap();
    finance.import_statement(import, ImportMode::Replace).await.unwrap();

    assert_eq!(finance.transactions().len(), 5);
    assert!(finance.transactions().iter().all(|t| t.title != "Old entry"));
}

// =============================================================================
// Receipts, subscriptions, CSV
// =============================================================================

#[tokio::test]
async fn test_receipt_capture_persists_both_records() {
    let dir = TempDir::new().unwrap();
    let mut finance = open(temp_store(&dir)).await;

    let capture = finance
        .capture_receipt("STARBUCKS\nDate: 12/01/2025\nTotal: 4.50", Some(88.0))
        .await
        .unwrap();

    assert_eq!(capture.fields.vendor, "STARBUCKS");
    assert_eq!(capture.fields.amount, "4.50");
    assert_eq!(capture.transaction.date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());

    let reopened = open(temp_store(&dir)).await;
    assert_eq!(reopened.receipts().len(), 1);
    let tx = &reopened.transactions()[0];
    assert_eq!(tx.receipt_id.as_deref(), Some(reopened.receipts()[0].id.as_str()));
    assert_eq!(tx.display_amount, "-$4.50");
}

#[tokio::test]
async fn test_subscription_expiry_window() {
    let mut finance = open(MemoryStore::new()).await;

    for (name, offset) in [("Due", 3), ("Later", 4), ("Overdue", -1)] {
        finance
            .add_subscription(Subscription {
                id: String::new(),
                name: name.to_string(),
                amount: 9.99,
                frequency: "1 Month".to_string(),
                next_date: Some(today() + Duration::days(offset)),
            })
            .await
            .unwrap();
    }

    let notes = &finance.analysis().notifications;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Your Due subscription expires in 3 days.");
}

#[tokio::test]
async fn test_csv_export_reimports() {
    let mut source = open(MemoryStore::new()).await;
    let import = parse_statement(october_statement()).unwrap();
    source.import_statement(import, ImportMode::Append).await.unwrap();

    let mut csv = Vec::new();
    source.export_csv(&mut csv).unwrap();

    let records = read_csv(csv.as_slice()).unwrap();
    assert_eq!(records.len(), 5);

    let mut target = open(MemoryStore::new()).await;
    target.import_records(&records, ImportMode::Replace).await.unwrap();

    assert_eq!(target.transactions(), source.transactions());
    assert_eq!(target.analysis().summary, source.analysis().summary);
}

#[tokio::test]
async fn test_strict_config_rejects_malformed_statement() {
    let config = AnalysisConfig::default().with_strict(true);
    let mut finance = FinanceStore::new(MemoryStore::new(), config);

    let import = parse_statement(
        r#"{"transactions": [{"title": "Mystery", "amount": "N/A", "date": "2026-10-01"}]}"#,
    )
    .unwrap();

    assert!(finance.import_statement(import, ImportMode::Append).await.is_err());
    assert!(finance.transactions().is_empty());

    // Lenient mode books the same record at zero
    let mut lenient = open(MemoryStore::new()).await;
    let import = parse_statement(
        r#"{"transactions": [{"title": "Mystery", "amount": "N/A", "date": "2026-10-01"}]}"#,
    )
    .unwrap();
    lenient.import_statement(import, ImportMode::Append).await.unwrap();
    assert_eq!(lenient.transactions()[0].amount, 0.0);
}
