//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::NaiveTime;
use ledgerwise_core::models::{ManualEntry, TransactionType};

use super::{confirm, parse_optional_date, truncate, Finance};

pub async fn cmd_add(
    finance: &mut Finance,
    title: &str,
    amount: f64,
    kind: &str,
    date: Option<&str>,
    time: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let date = parse_optional_date(date, "--date")?;
    let time = time
        .map(|t| NaiveTime::parse_from_str(t, "%H:%M"))
        .transpose()
        .context("Invalid --time format (use HH:MM)")?;

    let tx = finance
        .add_manual(ManualEntry {
            title: title.to_string(),
            amount,
            date,
            time,
            category: category.map(str::to_string),
            kind,
        })
        .await
        .context("Failed to add transaction")?;

    println!(
        "✅ Added {} {} on {} (ID: {})",
        tx.title, tx.display_amount, tx.date, tx.id
    );
    Ok(())
}

pub fn cmd_transactions_list(finance: &Finance, limit: usize) -> Result<()> {
    let transactions = finance.transactions();

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  ledgerwise import --file statement.json");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        let amount_str = if tx.is_expense() {
            format!("\x1b[31m{}\x1b[0m", tx.display_amount) // Red for expenses
        } else {
            format!("\x1b[32m{}\x1b[0m", tx.display_amount) // Green for income
        };
        let marker = if tx.is_manual { "✍️ " } else { "  " };

        println!(
            "   {} │ {:>12} │ {:16} │ {}{} ({})",
            tx.date,
            amount_str,
            truncate(&tx.category, 16),
            marker,
            truncate(&tx.title, 32),
            tx.id
        );
    }

    if transactions.len() > limit {
        println!("   ... and {} more", transactions.len() - limit);
    }

    Ok(())
}

pub async fn cmd_transactions_delete(finance: &mut Finance, id: &str) -> Result<()> {
    let removed = finance.delete_transaction(id).await?;
    println!("🗑️  Deleted {} {} ({})", removed.title, removed.display_amount, removed.id);
    Ok(())
}

pub async fn cmd_transactions_clear(finance: &mut Finance, yes: bool) -> Result<()> {
    let count = finance.transactions().len();
    if count == 0 {
        println!("No transactions to clear.");
        return Ok(());
    }

    if !yes && !confirm(&format!("⚠️  Delete all {} transactions?", count))? {
        println!("Cancelled.");
        return Ok(());
    }

    finance
        .clear_transactions()
        .await
        .context("Failed to clear transactions")?;
    println!("✅ Cleared {} transactions", count);
    Ok(())
}
