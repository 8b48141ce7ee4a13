//! Warranty command implementations

use anyhow::{Context, Result};
use ledgerwise_core::dates::parse_date;
use ledgerwise_core::models::Warranty;

use super::{truncate, Finance};

pub fn cmd_warranties_list(finance: &Finance) -> Result<()> {
    let warranties = finance.warranties();

    if warranties.is_empty() {
        println!("No warranties tracked yet. Add one with:");
        println!("  ledgerwise warranties add \"Laptop\" --expires 2027-06-30");
        return Ok(());
    }

    let today = finance.today();

    println!();
    println!("🛡️  Warranties");
    println!("   ─────────────────────────────────────────────────────────────");

    for w in warranties {
        let days = (w.expiry_date - today).num_days();
        let status = if days < 0 {
            "expired".to_string()
        } else {
            format!("{} days left", days)
        };

        println!(
            "   {:24} │ {} │ {:14} │ {} ({})",
            truncate(&w.product_name, 24),
            w.expiry_date,
            status,
            w.serial_no.as_deref().unwrap_or("-"),
            w.id
        );
    }

    Ok(())
}

pub async fn cmd_warranties_add(
    finance: &mut Finance,
    product: &str,
    expires: &str,
    serial: Option<&str>,
) -> Result<()> {
    let expiry_date = parse_date(expires).context("Invalid --expires date (use YYYY-MM-DD)")?;

    let warranty = finance
        .add_warranty(Warranty {
            id: String::new(),
            product_name: product.trim().to_string(),
            expiry_date,
            serial_no: serial.map(str::to_string),
        })
        .await
        .context("Failed to add warranty")?;

    println!(
        "✅ Tracking warranty for {} until {} (ID: {})",
        warranty.product_name, warranty.expiry_date, warranty.id
    );
    Ok(())
}

pub async fn cmd_warranties_delete(finance: &mut Finance, id: &str) -> Result<()> {
    let removed = finance.delete_warranty(id).await?;
    println!("🗑️  Stopped tracking warranty for {}", removed.product_name);
    Ok(())
}
