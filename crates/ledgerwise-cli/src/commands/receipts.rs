//! Receipt command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ledgerwise_core::PlainTextOcr;

use super::Finance;

pub async fn cmd_receipt(finance: &mut Finance, file: &Path) -> Result<()> {
    println!("🧾 Reading receipt {}...", file.display());

    let image = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let capture = finance
        .scan_receipt(&PlainTextOcr, &image)
        .await
        .context("Failed to book receipt")?;

    println!("   Vendor: {}", capture.fields.vendor);
    println!("   Amount: {}", capture.transaction.display_amount);
    if capture.fields.date_detected {
        println!("   Date:   {}", capture.transaction.date);
    } else {
        println!("   Date:   {} (not found on receipt, using today)", capture.transaction.date);
    }

    println!("✅ Receipt saved (ID: {})", capture.receipt.id);
    Ok(())
}
