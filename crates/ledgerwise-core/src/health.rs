//! Financial health score
//!
//! A bounded composite of savings rate and subscription load. Every detail
//! line starts with a marker consumers key on: '+' helped the score, '-' hurt
//! it, '~' was neutral.

use tracing::debug;

use crate::config::HealthConfig;
use crate::models::{HealthScore, HealthStatus, Subscription, Summary};

pub const DETAIL_GOOD_SAVINGS: &str = "+ Good savings rate (>20%)";
pub const DETAIL_OVERSPENDING: &str = "- Spending exceeds income";
pub const DETAIL_BREAKING_EVEN: &str = "~ Breaking even";
pub const DETAIL_HIGH_SUBSCRIPTIONS: &str = "- High subscription costs";

/// Score a summary against the subscription list
pub fn score_health(
    summary: &Summary,
    subscriptions: &[Subscription],
    config: &HealthConfig,
) -> HealthScore {
    if summary.income == 0.0 {
        // No ratio can be formed without income
        return HealthScore {
            score: clamp_score(config.neutral_score),
            status: HealthStatus::Warning,
            details: Vec::new(),
        };
    }

    let mut score = config.neutral_score;
    let mut details = Vec::new();

    let savings_rate = (summary.income - summary.expense) / summary.income * 100.0;
    if savings_rate > config.good_savings_rate {
        score += config.savings_bonus;
        details.push(DETAIL_GOOD_SAVINGS.to_string());
    } else if savings_rate < 0.0 {
        score -= config.overspend_penalty;
        details.push(DETAIL_OVERSPENDING.to_string());
    } else {
        details.push(DETAIL_BREAKING_EVEN.to_string());
    }

    let subscription_total: f64 = subscriptions.iter().map(|s| s.amount.abs()).sum();
    let subscription_load = subscription_total / summary.income * 100.0;
    if subscription_load > config.subscription_load_limit {
        score -= config.subscription_penalty;
        details.push(DETAIL_HIGH_SUBSCRIPTIONS.to_string());
    }

    let score = clamp_score(score);
    let status = status_for(score, config);

    debug!(
        score,
        status = status.as_str(),
        savings_rate,
        subscription_load,
        "Health score computed"
    );

    HealthScore {
        score,
        status,
        details,
    }
}

/// Tier for a score: below `critical_below` is Critical, below `warning_below` is Warning
pub fn status_for(score: u8, config: &HealthConfig) -> HealthStatus {
    let score = i32::from(score);
    if score < config.critical_below {
        HealthStatus::Critical
    } else if score < config.warning_below {
        HealthStatus::Warning
    } else {
        HealthStatus::Safe
    }
}

fn clamp_score(score: i32) -> u8 {
    // Lossless after the clamp
    score.clamp(0, 100) as u8
}
