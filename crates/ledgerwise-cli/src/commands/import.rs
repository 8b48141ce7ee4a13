//! Import/export command implementations

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use ledgerwise_core::{
    format_currency, import::read_csv, screen_text, summary::summarize_records, ImportMode,
    JsonStatementExtractor, PrivacyReport,
};

use super::Finance;

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn print_issues(report: &PrivacyReport) {
    for issue in &report.issues {
        println!("   ⚠️  {}", issue);
    }
}

pub async fn cmd_import(finance: &mut Finance, file: &Path, replace: bool, screen: bool) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let payload =
        fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    if screen {
        let report = screen_text(&String::from_utf8_lossy(&payload));
        if !report.is_valid {
            println!("🚫 Import refused: the statement contains sensitive data");
            print_issues(&report);
            anyhow::bail!("Statement failed the privacy screen");
        }
        println!("   🔒 Privacy screen passed");
    }

    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Append
    };

    let (imported, advice, statement) = if is_csv(file) {
        let records = read_csv(payload.as_slice()).context("Failed to parse CSV")?;
        let imported = finance
            .import_records(&records, mode)
            .await
            .context("Failed to import transactions")?;
        (imported, Vec::new(), summarize_records(&records, 0.0))
    } else {
        let outcome = finance
            .import_from(&JsonStatementExtractor, &payload, mode)
            .await
            .context("Failed to import statement")?;
        (outcome.imported, outcome.advice, outcome.statement)
    };

    let currency = finance.currency();
    println!("   Imported {} transactions", imported);
    println!(
        "   Statement: {} in, {} out",
        format_currency(statement.income, &currency),
        format_currency(statement.expense, &currency)
    );
    if replace {
        println!("   Ledger replaced (monthly view)");
    }

    if !advice.is_empty() {
        println!();
        println!("💡 Advice");
        for tip in &advice {
            println!("   • {}", tip);
        }
    }

    let summary = finance.analysis().summary;
    println!();
    println!("✅ Balance is now {}", format_currency(summary.balance, &currency));

    Ok(())
}

pub fn cmd_screen(file: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let report = screen_text(&text);

    if report.is_valid {
        println!("✅ No sensitive data found in {}", file.display());
    } else {
        println!("⚠️  {} issue(s) found in {}", report.issues.len(), file.display());
        print_issues(&report);
    }

    Ok(())
}

pub fn cmd_export(finance: &Finance, file: &Path) -> Result<()> {
    let out =
        File::create(file).with_context(|| format!("Failed to create {}", file.display()))?;
    finance.export_csv(out).context("Failed to write CSV")?;

    println!(
        "✅ Exported {} transactions to {}",
        finance.transactions().len(),
        file.display()
    );
    Ok(())
}
