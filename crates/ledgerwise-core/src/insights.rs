//! Spending insights and category concentration
//!
//! Everything here works on expense-typed transactions and absolute amounts.
//! "Current month" means the calendar month containing the analysis date.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amount::format_currency;
use crate::config::InsightConfig;
use crate::dates::previous_month;
use crate::models::{
    CategoryShare, CategoryShift, Currency, HealthStatus, Recommendation, Transaction, Verdict,
};
use crate::summary::summarize;

pub const NOT_ENOUGH_DATA: &str = "Add more transactions to get insights.";

/// Everything the insight analyzer derives in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub top_categories: Vec<CategoryShare>,
    pub month_over_month: Vec<CategoryShift>,
    /// Current-month category whose share strictly exceeds the dominance threshold
    pub dominant_category: Option<CategoryShare>,
    pub verdict: Verdict,
    pub insights: Vec<String>,
    pub recommendation: Recommendation,
}

/// Run every insight over `transactions` (newest first) as of `today`
pub fn analyze_insights(
    transactions: &[Transaction],
    today: NaiveDate,
    config: &InsightConfig,
    currency: &Currency,
) -> InsightReport {
    let current = (today.year(), today.month());
    let this_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.month() == current)
        .collect();

    let top = top_categories(transactions, config.top_categories);
    let dominant = dominant_category(this_month.iter().copied(), config.dominant_share);
    let shifts = month_over_month(transactions, today, config.month_shift_threshold);
    let verdict = verdict(this_month.iter().copied(), config);
    let insights = textual_insights(transactions, config, currency);
    let recommendation = recommend(dominant.as_ref(), config, currency);

    debug!(
        categories = top.len(),
        shifts = shifts.len(),
        dominant = dominant.as_ref().map(|d| d.category.as_str()),
        verdict = verdict.level.as_str(),
        "Insights computed"
    );

    InsightReport {
        top_categories: top,
        month_over_month: shifts,
        dominant_category: dominant,
        verdict,
        insights,
        recommendation,
    }
}

/// Expense totals per category in first-seen order
pub fn category_totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.into_iter().filter(|t| t.is_expense()) {
        match index.get(&tx.category) {
            Some(&i) => totals[i].1 += tx.amount.abs(),
            None => {
                index.insert(tx.category.clone(), totals.len());
                totals.push((tx.category.clone(), tx.amount.abs()));
            }
        }
    }

    totals
}

fn shares(totals: Vec<(String, f64)>) -> Vec<CategoryShare> {
    let grand_total: f64 = totals.iter().map(|(_, amount)| amount).sum();

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: if grand_total > 0.0 {
                amount * 100.0 / grand_total
            } else {
                0.0
            },
        })
        .collect();

    // Stable: equal amounts keep first-seen order
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

/// The `limit` largest expense categories with their share of total expense
pub fn top_categories(transactions: &[Transaction], limit: usize) -> Vec<CategoryShare> {
    let mut all = shares(category_totals(transactions));
    all.truncate(limit);
    all
}

/// The largest category if its share strictly exceeds `threshold` percent
pub fn dominant_category<'a>(
    period: impl IntoIterator<Item = &'a Transaction>,
    threshold: f64,
) -> Option<CategoryShare> {
    shares(category_totals(period))
        .into_iter()
        .next()
        .filter(|top| top.percentage > threshold)
}

/// Categories in the current month whose total moved by at least `threshold`
/// percent against the previous calendar month.
///
/// Categories with nothing spent last month have no defined change and are
/// skipped.
pub fn month_over_month(
    transactions: &[Transaction],
    today: NaiveDate,
    threshold: f64,
) -> Vec<CategoryShift> {
    let current = (today.year(), today.month());
    let previous = previous_month(today);

    let previous_totals: HashMap<String, f64> = category_totals(
        transactions.iter().filter(|t| t.month() == previous),
    )
    .into_iter()
    .collect();

    category_totals(transactions.iter().filter(|t| t.month() == current))
        .into_iter()
        .filter_map(|(category, current)| {
            let previous = *previous_totals.get(&category)?;
            if previous <= 0.0 {
                return None;
            }
            let percent_change = (current - previous) * 100.0 / previous;
            (percent_change.abs() >= threshold).then_some(CategoryShift {
                category,
                current,
                previous,
                percent_change,
            })
        })
        .collect()
}

/// Classify a period's expense-to-income ratio
pub fn verdict<'a>(
    period: impl IntoIterator<Item = &'a Transaction>,
    config: &InsightConfig,
) -> Verdict {
    let summary = summarize(period, 0.0);

    let level = if summary.income > 0.0 {
        let ratio = summary.expense / summary.income * 100.0;
        if ratio > config.verdict_critical_ratio {
            HealthStatus::Critical
        } else if ratio > config.verdict_warning_ratio {
            HealthStatus::Warning
        } else {
            HealthStatus::Safe
        }
    } else if summary.expense > 0.0 {
        // Spending with no income at all
        HealthStatus::Critical
    } else {
        HealthStatus::Safe
    };

    let (label, description) = match level {
        HealthStatus::Critical => (
            "Overspending",
            format!(
                "Spending is above {:.0}% of income this month.",
                config.verdict_critical_ratio
            ),
        ),
        HealthStatus::Warning => (
            "Tight Budget",
            format!(
                "Spending is above {:.0}% of income this month.",
                config.verdict_warning_ratio
            ),
        ),
        HealthStatus::Safe => (
            "On Track",
            "Spending is comfortably within income this month.".to_string(),
        ),
    };

    Verdict {
        level,
        label: label.to_string(),
        description,
    }
}

/// Plain-language observations about the ledger
pub fn textual_insights(
    transactions: &[Transaction],
    config: &InsightConfig,
    currency: &Currency,
) -> Vec<String> {
    if transactions.len() < config.min_transactions {
        return vec![NOT_ENOUGH_DATA.to_string()];
    }

    let mut insights = Vec::new();

    if let Some(large) = transactions
        .iter()
        .find(|t| t.is_expense() && t.amount.abs() > config.large_expense)
    {
        insights.push(format!(
            "Large expense detected: {} ({}). Verify this was planned.",
            large.title,
            format_currency(large.amount.abs(), currency)
        ));
    }

    if let Some(top) = shares(category_totals(transactions)).first() {
        insights.push(format!(
            "Highest spending category is {}. Consider setting a budget.",
            top.category
        ));
    }

    insights
}

/// Suggest trimming the dominant category, or a generic review without one
pub fn recommend(
    dominant: Option<&CategoryShare>,
    config: &InsightConfig,
    currency: &Currency,
) -> Recommendation {
    match dominant {
        Some(share) => {
            let saving = share.amount * config.reduction_share / 100.0;
            Recommendation {
                category: Some(share.category.clone()),
                saving,
                message: format!(
                    "{} makes up {:.0}% of this month's spending. Cutting it by {:.0}% would save {}.",
                    share.category,
                    share.percentage,
                    config.reduction_share,
                    format_currency(saving, currency)
                ),
            }
        }
        None => Recommendation {
            category: None,
            saving: 0.0,
            message: "Review small recurring expenses to find easy savings.".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(id: &str, amount: f64, category: &str, date: NaiveDate) -> Transaction {
        Transaction {
            id: id.to_string(),
            title: format!("{} purchase", category),
            amount,
            display_amount: String::new(),
            date,
            time: None,
            kind: TransactionType::from_amount(amount),
            category: category.to_string(),
            is_manual: false,
            receipt_id: None,
        }
    }

    fn today() -> NaiveDate {
        ymd(2026, 10, 17)
    }

    #[test]
    fn test_top_categories_sorted_with_percentages() {
        let txs = vec![
            tx("1", -100.0, "Food", today()),
            tx("2", -300.0, "Rent", today()),
            tx("3", -50.0, "Fun", today()),
            tx("4", -50.0, "Travel", today()),
            tx("5", 2000.0, "Salary", today()),
        ];
        let top = top_categories(&txs, 3);

        let names: Vec<&str> = top.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Fun"]);
        assert_eq!(top[0].percentage, 60.0);
        assert_eq!(top[1].amount, 100.0);
    }

    #[test]
    fn test_dominant_requires_strictly_more_than_threshold() {
        let exactly_forty = vec![
            tx("1", -40.0, "Food", today()),
            tx("2", -30.0, "Rent", today()),
            tx("3", -30.0, "Fun", today()),
        ];
        assert!(dominant_category(&exactly_forty, 40.0).is_none());

        let above = vec![
            tx("1", -41.0, "Food", today()),
            tx("2", -30.0, "Rent", today()),
            tx("3", -29.0, "Fun", today()),
        ];
        let dominant = dominant_category(&above, 40.0).unwrap();
        assert_eq!(dominant.category, "Food");
        assert_eq!(dominant.percentage, 41.0);
    }

    #[test]
    fn test_month_over_month_shifts() {
        let sept = ymd(2026, 9, 10);
        let txs = vec![
            tx("1", -200.0, "Food", today()),
            tx("2", -100.0, "Food", sept),
            tx("3", -95.0, "Rent", today()),
            tx("4", -100.0, "Rent", sept),
            tx("5", -20.0, "New", today()),
            tx("6", -50.0, "Fun", today()),
            tx("7", -100.0, "Fun", sept),
        ];
        let shifts = month_over_month(&txs, today(), 10.0);

        let summary: Vec<(&str, f64)> = shifts
            .iter()
            .map(|s| (s.category.as_str(), s.percent_change))
            .collect();
        assert_eq!(summary, vec![("Food", 100.0), ("Fun", -50.0)]);
    }

    #[test]
    fn test_month_over_month_wraps_january() {
        let txs = vec![
            tx("1", -110.0, "Food", ymd(2026, 1, 5)),
            tx("2", -100.0, "Food", ymd(2025, 12, 20)),
        ];
        let shifts = month_over_month(&txs, ymd(2026, 1, 15), 10.0);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].previous, 100.0);
    }

    #[test]
    fn test_verdict_tiers() {
        let config = InsightConfig::default();
        let level = |income: f64, expense: f64| {
            let txs = vec![tx("i", income, "Salary", today()), tx("e", -expense, "Rent", today())];
            verdict(&txs, &config).level
        };

        assert_eq!(level(1000.0, 900.0), HealthStatus::Critical);
        assert_eq!(level(1000.0, 800.0), HealthStatus::Warning);
        assert_eq!(level(1000.0, 700.0), HealthStatus::Warning);
        assert_eq!(level(1000.0, 600.0), HealthStatus::Safe);
        assert_eq!(level(0.0, 10.0), HealthStatus::Critical);
        assert_eq!(level(0.0, 0.0), HealthStatus::Safe);
    }

    #[test]
    fn test_textual_insights_need_enough_data() {
        let txs = vec![tx("1", -10.0, "Food", today())];
        let insights = textual_insights(&txs, &InsightConfig::default(), &Currency::default());
        assert_eq!(insights, vec![NOT_ENOUGH_DATA]);
    }

    #[test]
    fn test_textual_insights_large_expense_and_top_category() {
        let mut laptop = tx("1", -6200.0, "Electronics", today());
        laptop.title = "Laptop".to_string();
        let txs = vec![
            laptop,
            tx("2", -40.0, "Food", today()),
            tx("3", -60.0, "Food", today()),
            tx("4", -30.0, "Fun", today()),
            tx("5", 9000.0, "Salary", today()),
        ];
        let insights = textual_insights(&txs, &InsightConfig::default(), &Currency::default());

        assert_eq!(
            insights,
            vec![
                "Large expense detected: Laptop ($6,200.00). Verify this was planned.",
                "Highest spending category is Electronics. Consider setting a budget.",
            ]
        );
    }

    #[test]
    fn test_recommendation() {
        let config = InsightConfig::default();
        let share = CategoryShare {
            category: "Dining".to_string(),
            amount: 1250.0,
            percentage: 55.0,
        };

        let rec = recommend(Some(&share), &config, &Currency::default());
        assert_eq!(rec.category.as_deref(), Some("Dining"));
        assert_eq!(rec.saving, 125.0);
        assert!(rec.message.contains("$125.00"));

        let generic = recommend(None, &config, &Currency::default());
        assert!(generic.category.is_none());
        assert!(generic.message.contains("small recurring expenses"));
    }

    #[test]
    fn test_analyze_insights_uses_current_month_for_dominance() {
        let txs = vec![
            tx("1", -500.0, "Travel", ymd(2026, 9, 2)),
            tx("2", -30.0, "Food", today()),
            tx("3", -30.0, "Fun", today()),
            tx("4", -40.0, "Rent", today()),
        ];
        let report = analyze_insights(&txs, today(), &InsightConfig::default(), &Currency::default());

        assert_eq!(report.top_categories[0].category, "Travel");
        assert_eq!(report.dominant_category.map(|d| d.category), None);
        assert_eq!(report.recommendation.category, None);
    }
}
