//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ledgerwise - See where your money actually goes
#[derive(Parser)]
#[command(name = "ledgerwise")]
#[command(about = "Local-first spending analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ledgerwise.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for real data)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set LEDGERWISE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Analysis config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a statement (JSON from the statement extractor, or CSV)
    Import {
        /// Statement file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Replace the ledger with this statement (monthly view)
        #[arg(long)]
        replace: bool,

        /// Refuse the import if the file contains sensitive data
        #[arg(long)]
        screen: bool,
    },

    /// Check a statement for sensitive data before sharing it
    Screen {
        /// Text or JSON file to check
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Book a receipt from its OCR text
    Receipt {
        /// Text file with the recognized receipt
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Add a transaction by hand
    Add {
        /// Description
        title: String,

        /// Amount (unsigned; the sign comes from --kind)
        amount: f64,

        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Manage transactions (list, delete, clear)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Set the starting balance
    Balance {
        /// Balance before any recorded transaction
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// Set or reset the display currency
    Currency {
        /// Symbol, e.g. €
        #[arg(long)]
        symbol: Option<String>,

        /// ISO code, e.g. EUR
        #[arg(long)]
        code: Option<String>,

        /// Go back to the configured currency
        #[arg(long)]
        reset: bool,
    },

    /// Manage subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Manage warranties
    Warranties {
        #[command(subcommand)]
        action: Option<WarrantiesAction>,
    },

    /// Show the full analysis
    Dashboard {
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show notifications
    Notifications {
        /// Acknowledge a notification by id
        #[arg(long)]
        ack: Option<String>,
    },

    /// Show or set the user profile
    Profile {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// Export transactions to CSV
    Export {
        /// Output file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the effective analysis configuration
    Config {
        /// Print the built-in default TOML instead
        #[arg(long)]
        defaults: bool,
    },

    /// Delete all data
    Reset {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Delete every transaction
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List tracked subscriptions
    List,
    /// Track a subscription
    Add {
        /// Service name
        name: String,

        /// Charge per period
        amount: f64,

        /// Period label
        #[arg(long, default_value = "1 Month")]
        frequency: String,

        /// Next charge date (YYYY-MM-DD)
        #[arg(long)]
        next: Option<String>,
    },
    /// Stop tracking a subscription
    Delete {
        /// Subscription ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum WarrantiesAction {
    /// List tracked warranties
    List,
    /// Track a warranty
    Add {
        /// Product name
        product: String,

        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires: String,

        /// Serial number
        #[arg(long)]
        serial: Option<String>,
    },
    /// Stop tracking a warranty
    Delete {
        /// Warranty ID
        id: String,
    },
}
