//! Dashboard command: the full analysis in one view

use anyhow::{Context, Result};
use ledgerwise_core::format_currency;
use ledgerwise_core::heatmap::{TIME_BLOCKS, WEEKDAYS};
use ledgerwise_core::models::{AlertKind, HealthStatus};

use super::{truncate, Finance};

fn status_icon(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Safe => "🟢",
        HealthStatus::Warning => "🟡",
        HealthStatus::Critical => "🔴",
    }
}

/// One character per heatmap cell, darker for busier cells
fn shade(intensity: f64) -> char {
    match intensity {
        i if i <= 0.0 => '·',
        i if i < 0.34 => '░',
        i if i < 0.67 => '▒',
        _ => '█',
    }
}

pub fn cmd_dashboard(finance: &Finance, json: bool) -> Result<()> {
    let analysis = finance.analysis();

    if json {
        let out = serde_json::to_string_pretty(analysis).context("Failed to serialize analysis")?;
        println!("{}", out);
        return Ok(());
    }

    let currency = finance.currency();
    let money = |v: f64| format_currency(v, &currency);
    let summary = analysis.summary;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 Ledgerwise Dashboard         │");
    println!("╰─────────────────────────────────────────╯");
    println!("  As of {}", analysis.computed_for);
    println!();
    println!("  Balance:   {}", money(summary.balance));
    println!("  Income:    {}", money(summary.income));
    println!("  Expenses:  {}", money(summary.expense));
    println!();

    let health = &analysis.health;
    println!(
        "  {} Health: {}/100 ({})",
        status_icon(health.status),
        health.score,
        health.status
    );
    for detail in &health.details {
        println!("     {}", detail);
    }

    let verdict = &analysis.verdict;
    println!(
        "  {} This month: {} - {}",
        status_icon(verdict.level),
        verdict.label,
        verdict.description
    );
    println!();

    if !analysis.top_categories.is_empty() {
        println!("  📊 Top Categories");
        for share in &analysis.top_categories {
            println!(
                "     {:20} {:>12}  {:5.1}%",
                truncate(&share.category, 20),
                money(share.amount),
                share.percentage
            );
        }
        if let Some(dominant) = &analysis.dominant_category {
            println!(
                "     ⚠️  {} is {:.0}% of this month's spending",
                dominant.category, dominant.percentage
            );
        }
        println!();
    }

    if !analysis.month_over_month.is_empty() {
        println!("  📈 Month over Month");
        for shift in &analysis.month_over_month {
            let arrow = if shift.percent_change >= 0.0 { "▲" } else { "▼" };
            println!(
                "     {:20} {} {:+.0}% ({} → {})",
                truncate(&shift.category, 20),
                arrow,
                shift.percent_change,
                money(shift.previous),
                money(shift.current)
            );
        }
        println!();
    }

    if !analysis.leaks.leaks.is_empty() {
        println!(
            "  💸 Money Leaks ({} total)",
            money(analysis.leaks.total_leak)
        );
        for leak in &analysis.leaks.leaks {
            println!(
                "     {:20} {:>3}x  {:>12}  {}",
                truncate(&leak.name, 20),
                leak.frequency,
                money(leak.total),
                leak.kind
            );
        }
        println!();
    }

    if !analysis.insights.is_empty() {
        println!("  🔎 Insights");
        for insight in &analysis.insights {
            println!("     • {}", insight);
        }
    }
    println!("  💡 {}", analysis.recommendation.message);

    let advice = &finance.settings().advice;
    if !advice.is_empty() {
        println!();
        println!("  📝 Advice from your last statement");
        for tip in advice {
            println!("     • {}", tip);
        }
    }
    println!();

    if !analysis.alerts.is_empty() {
        println!("  🛡️  Alerts");
        for alert in &analysis.alerts {
            let icon = match alert.kind {
                AlertKind::Duplicate => "👯",
                AlertKind::HighValue => "💥",
            };
            println!("     {} {}", icon, alert.message);
        }
        println!();
    }

    if !analysis.notifications.is_empty() {
        println!(
            "  🔔 {} notification(s). Run 'ledgerwise notifications' to see them.",
            analysis.notifications.len()
        );
        println!();
    }

    let heatmap = &analysis.heatmap;
    if heatmap.max_intensity > 0 {
        println!("  🗓️  When you spend");
        println!(
            "           {}",
            TIME_BLOCKS
                .iter()
                .map(|b| format!("{:^9}", b))
                .collect::<String>()
        );
        for (day, name) in WEEKDAYS.iter().enumerate() {
            let row: String = (0..TIME_BLOCKS.len())
                .map(|block| format!("{:^9}", shade(heatmap.intensity(day, block))))
                .collect();
            println!("     {:5} {}", name, row);
        }
        if heatmap.untimed > 0 {
            println!("     ({} transactions without a time of day)", heatmap.untimed);
        }
        println!();
    }

    Ok(())
}
