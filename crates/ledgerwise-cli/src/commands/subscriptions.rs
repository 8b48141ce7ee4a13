//! Subscription command implementations

use anyhow::{Context, Result};
use ledgerwise_core::format_currency;
use ledgerwise_core::models::Subscription;

use super::{parse_optional_date, truncate, Finance};

pub fn cmd_subscriptions_list(finance: &Finance) -> Result<()> {
    let subscriptions = finance.subscriptions();

    if subscriptions.is_empty() {
        println!("No subscriptions tracked yet. Add one with:");
        println!("  ledgerwise subscriptions add Netflix 15.49 --next 2026-11-01");
        return Ok(());
    }

    let currency = finance.currency();
    let today = finance.today();

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in subscriptions {
        let next = match sub.next_date {
            Some(date) => {
                let days = (date - today).num_days();
                let icon = if (0..=finance.config().notifications.expiry_window_days).contains(&days) {
                    "⏰"
                } else {
                    "  "
                };
                format!("{} next {}", icon, date)
            }
            None => "   next ?".to_string(),
        };

        println!(
            "   {:20} │ {:>10}/{:<8} │ {} ({})",
            truncate(&sub.name, 20),
            format_currency(sub.amount, &currency),
            truncate(&sub.frequency, 8),
            next,
            sub.id
        );
    }

    let total: f64 = subscriptions.iter().map(|s| s.amount).sum();
    println!();
    println!("   Total per period: {}", format_currency(total, &currency));

    Ok(())
}

pub async fn cmd_subscriptions_add(
    finance: &mut Finance,
    name: &str,
    amount: f64,
    frequency: &str,
    next: Option<&str>,
) -> Result<()> {
    let next_date = parse_optional_date(next, "--next")?;

    let sub = finance
        .add_subscription(Subscription {
            id: String::new(),
            name: name.trim().to_string(),
            amount,
            frequency: frequency.to_string(),
            next_date,
        })
        .await
        .context("Failed to add subscription")?;

    println!("✅ Tracking {} (ID: {})", sub.name, sub.id);
    Ok(())
}

pub async fn cmd_subscriptions_delete(finance: &mut Finance, id: &str) -> Result<()> {
    let removed = finance.delete_subscription(id).await?;
    println!("🗑️  Stopped tracking {}", removed.name);
    Ok(())
}
