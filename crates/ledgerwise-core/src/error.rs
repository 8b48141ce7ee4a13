//! Error types for Ledgerwise

use thiserror::Error;

/// A malformed input that lenient parsing would have silently defaulted.
///
/// Only surfaced when `AnalysisConfig::strict` is enabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("amount has no digits: {0:?}")]
    EmptyAmount(String),

    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),

    #[error("unrecognized date: {0:?}")]
    InvalidDate(String),

    #[error("unknown transaction type: {0:?}")]
    InvalidType(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseFailure),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
