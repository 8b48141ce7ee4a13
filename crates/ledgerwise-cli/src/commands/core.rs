//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `open_finance` - Shared utilities to open the store
//! - `cmd_init` - Initialize the database
//! - `cmd_config` - Print the effective configuration
//! - `cmd_reset` - Delete all data

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ledgerwise_core::{dates::parse_date, AnalysisConfig, FinanceStore, SqliteStore};
use tracing::debug;

use super::confirm;

/// The finance store as the CLI uses it
pub type Finance = FinanceStore<SqliteStore>;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<SqliteStore> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        SqliteStore::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        SqliteStore::new(path_str).context("Failed to open database")
    }
}

/// Open the store, load everything and compute the first analysis
pub async fn open_finance(
    db_path: &Path,
    no_encrypt: bool,
    config_path: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<Finance> {
    debug!(db = %db_path.display(), config = ?config_path, "Opening finance store");

    let store = open_db(db_path, no_encrypt)?;
    let config = AnalysisConfig::load(config_path).context("Failed to load config")?;

    let mut finance = FinanceStore::new(store, config);
    finance.set_today(today);
    finance.load().await.context("Failed to load finance data")?;
    Ok(finance)
}

/// Parse an optional YYYY-MM-DD argument
pub fn parse_optional_date(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| parse_date(s).with_context(|| format!("Invalid {} date: {}", flag, s)))
        .transpose()
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _store = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import a statement: ledgerwise import --file statement.json");
    println!("  2. See the analysis: ledgerwise dashboard");

    Ok(())
}

pub fn cmd_config(config_path: Option<&Path>, defaults: bool) -> Result<()> {
    if defaults {
        print!("{}", AnalysisConfig::default_toml());
        return Ok(());
    }

    let config = AnalysisConfig::load(config_path).context("Failed to load config")?;

    println!();
    println!("⚙️  Effective configuration");
    println!("   ─────────────────────────────");
    println!("   Strict parsing:        {}", config.parsing.strict);
    println!("   Receipt date fallback: {}", config.parsing.receipt_date_fallback);
    println!(
        "   Currency:              {} ({})",
        config.currency.symbol, config.currency.code
    );
    println!(
        "   Leaks:                 avg < {:.2}, at least {} times",
        config.leaks.small_amount_threshold, config.leaks.min_occurrences
    );
    println!(
        "   Health tiers:          critical < {}, warning < {}",
        config.health.critical_below, config.health.warning_below
    );
    println!(
        "   Dominant share:        > {}%",
        config.insights.dominant_share
    );
    println!(
        "   Large expense:         > {:.2}",
        config.insights.large_expense
    );
    println!(
        "   Expiry windows:        subscriptions {}d, warranties {}d",
        config.notifications.expiry_window_days, config.notifications.warranty_window_days
    );
    println!("   Notification dedupe:   {}", config.notifications.dedupe);

    Ok(())
}

pub async fn cmd_reset(finance: &mut Finance, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This will delete all transactions, subscriptions, warranties,");
        println!("   receipts, settings and the profile.");
        println!();
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    finance.clear_all().await.context("Failed to clear data")?;
    println!("✅ All data deleted.");

    Ok(())
}
