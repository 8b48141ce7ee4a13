//! The recompute pipeline
//!
//! Runs summary, leaks, health, insights and notifications in that order,
//! then the security alerts and heatmap, and returns one immutable snapshot.
//! Nothing here fails: malformed data degrades to neutral values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alerts::detect_alerts;
use crate::config::AnalysisConfig;
use crate::health::score_health;
use crate::heatmap::{build_heatmap, Heatmap};
use crate::insights::analyze_insights;
use crate::leaks::detect_leaks;
use crate::models::{
    CategoryShare, CategoryShift, Currency, HealthScore, LeakReport, Notification,
    Recommendation, SecurityAlert, Settings, Subscription, Summary, Transaction, Verdict, Warranty,
};
use crate::notify::{collect_notifications, NotificationSources};
use crate::summary::summarize;

/// Everything derived from the ledger at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub summary: Summary,
    pub leaks: LeakReport,
    pub health: HealthScore,
    pub top_categories: Vec<CategoryShare>,
    pub month_over_month: Vec<CategoryShift>,
    pub dominant_category: Option<CategoryShare>,
    pub verdict: Verdict,
    pub insights: Vec<String>,
    pub recommendation: Recommendation,
    pub notifications: Vec<Notification>,
    pub alerts: Vec<SecurityAlert>,
    pub heatmap: Heatmap,
    /// The date the analysis treats as today
    pub computed_for: NaiveDate,
}

/// Inputs to [`analyze`]
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInputs<'a> {
    /// Newest first, as returned by `Ledger::all`
    pub transactions: &'a [Transaction],
    pub subscriptions: &'a [Subscription],
    pub warranties: &'a [Warranty],
    pub settings: &'a Settings,
    pub today: NaiveDate,
}

/// Run the full pipeline
pub fn analyze(inputs: AnalysisInputs<'_>, config: &AnalysisConfig) -> Analysis {
    let currency: &Currency = inputs.settings.currency.as_ref().unwrap_or(&config.currency);

    let summary = summarize(inputs.transactions, inputs.settings.starting_balance);
    let leaks = detect_leaks(inputs.transactions, &config.leaks);
    let health = score_health(&summary, inputs.subscriptions, &config.health);
    let report = analyze_insights(inputs.transactions, inputs.today, &config.insights, currency);
    let notifications = collect_notifications(
        NotificationSources {
            subscriptions: inputs.subscriptions,
            warranties: inputs.warranties,
            transactions: inputs.transactions,
            acknowledged: &inputs.settings.acknowledged,
        },
        inputs.today,
        &config.notifications,
    );
    let alerts = detect_alerts(inputs.transactions, config.insights.large_expense);
    let heatmap = build_heatmap(inputs.transactions);

    info!(
        transactions = inputs.transactions.len(),
        balance = summary.balance,
        score = health.score,
        leaks = leaks.leaks.len(),
        notifications = notifications.len(),
        alerts = alerts.len(),
        "Analysis recomputed"
    );

    Analysis {
        summary,
        leaks,
        health,
        top_categories: report.top_categories,
        month_over_month: report.month_over_month,
        dominant_category: report.dominant_category,
        verdict: report.verdict,
        insights: report.insights,
        recommendation: report.recommendation,
        notifications,
        alerts,
        heatmap,
        computed_for: inputs.today,
    }
}

impl Analysis {
    /// Snapshot of an empty ledger
    pub fn empty(today: NaiveDate, config: &AnalysisConfig) -> Self {
        analyze(
            AnalysisInputs {
                transactions: &[],
                subscriptions: &[],
                warranties: &[],
                settings: &Settings::default(),
                today,
            },
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HealthStatus, TransactionType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn tx(id: &str, title: &str, amount: f64, category: &str) -> Transaction {
        let kind = TransactionType::from_amount(amount);
        Transaction {
            id: id.to_string(),
            title: title.to_string(),
            amount,
            display_amount: crate::amount::display_amount(amount, kind, &Currency::default()),
            date: today(),
            time: None,
            kind,
            category: category.to_string(),
            is_manual: false,
            receipt_id: None,
        }
    }

    #[test]
    fn test_empty_analysis_is_neutral() {
        let analysis = Analysis::empty(today(), &AnalysisConfig::default());

        assert_eq!(analysis.summary, Summary::default());
        assert_eq!(analysis.health.score, 50);
        assert_eq!(analysis.health.status, HealthStatus::Warning);
        assert!(analysis.leaks.leaks.is_empty());
        assert!(analysis.notifications.is_empty());
        assert_eq!(analysis.verdict.level, HealthStatus::Safe);
        assert_eq!(analysis.computed_for, today());
    }

    #[test]
    fn test_pipeline_feeds_summary_into_health() {
        let txs = vec![
            tx("1", "Salary", 4000.0, "Income"),
            tx("2", "Rent", -1500.0, "Housing"),
            tx("3", "Coffee 1", -4.5, "Dining"),
            tx("4", "Coffee 2", -5.5, "Dining"),
            tx("5", "Groceries", -300.0, "Food"),
        ];
        let settings = Settings {
            starting_balance: 100.0,
            ..Default::default()
        };
        let analysis = analyze(
            AnalysisInputs {
                transactions: &txs,
                subscriptions: &[],
                warranties: &[],
                settings: &settings,
                today: today(),
            },
            &AnalysisConfig::default(),
        );

        assert_eq!(analysis.summary.income, 4000.0);
        assert_eq!(analysis.summary.expense, 1810.0);
        assert_eq!(analysis.summary.balance, 2290.0);
        assert_eq!(analysis.health.score, 70);
        assert_eq!(analysis.leaks.leaks[0].name, "coffee");
        assert_eq!(analysis.dominant_category.map(|d| d.category), Some("Housing".to_string()));
        assert_eq!(analysis.recommendation.category.as_deref(), Some("Housing"));
        assert_eq!(analysis.heatmap.untimed, 5);
    }

    #[test]
    fn test_settings_currency_overrides_config() {
        let txs: Vec<Transaction> = (0..5)
            .map(|i| tx(&i.to_string(), "Rent", -1000.0, "Housing"))
            .collect();
        let settings = Settings {
            currency: Some(Currency {
                symbol: "€".to_string(),
                code: "EUR".to_string(),
            }),
            ..Default::default()
        };
        let analysis = analyze(
            AnalysisInputs {
                transactions: &txs,
                subscriptions: &[],
                warranties: &[],
                settings: &settings,
                today: today(),
            },
            &AnalysisConfig::default(),
        );

        assert!(analysis.recommendation.message.contains("€500.00"));
    }
}
