//! Ledgerwise Core Library
//!
//! Transaction normalization and spending analysis for the Ledgerwise tool:
//! - Amount and date normalization for loosely formatted records
//! - Receipt field extraction from OCR text
//! - A transaction ledger with stable newest-first ordering
//! - Summary, leak detection, health scoring and spending insights
//! - Subscription, warranty and statement-reminder notifications
//! - Duplicate/high-value alerts and a weekday by time-of-day heatmap
//! - A key/value record store with an encrypted SQLite backend
//! - Collaborator seams for statement import and receipt OCR

pub mod alerts;
pub mod amount;
pub mod analysis;
pub mod collab;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod finance;
pub mod health;
pub mod heatmap;
pub mod ids;
pub mod import;
pub mod insights;
pub mod leaks;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod privacy;
pub mod receipt;
pub mod store;
pub mod summary;

pub use amount::{display_amount, format_currency, normalize_amount, parse_amount, AmountNormalizer};
pub use analysis::{analyze, Analysis, AnalysisInputs};
pub use collab::{
    JsonStatementExtractor, MockReceiptOcr, MockStatementExtractor, OcrResult, PlainTextOcr,
    ReceiptOcr, StatementExtractor,
};
pub use config::AnalysisConfig;
pub use dates::{parse_date, DateNormalizer};
pub use db::SqliteStore;
pub use error::{Error, ParseFailure, Result};
pub use finance::{FinanceStore, ImportMode, ImportOutcome, ReceiptCapture};
pub use heatmap::Heatmap;
pub use ids::IdAllocator;
pub use import::RecordNormalizer;
pub use insights::InsightReport;
pub use ledger::Ledger;
pub use privacy::{screen_text, PrivacyReport};
pub use receipt::{ReceiptExtractor, ReceiptFields};
pub use store::{MemoryStore, RecordStore};
pub use summary::summarize;
