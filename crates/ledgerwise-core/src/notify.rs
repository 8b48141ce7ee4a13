//! Time-sensitive notifications
//!
//! Notifications are regenerated from scratch on every recompute. Ids are
//! derived from the source record and its date, so the same condition always
//! produces the same id and can be acknowledged across recomputes.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::config::NotificationConfig;
use crate::dates::previous_month;
use crate::models::{Notification, NotificationType, Subscription, Transaction, Warranty};

/// Warnings for subscriptions charging within `window_days` (inclusive).
///
/// Overdue and far-future dates produce nothing.
pub fn check_expiry(
    subscriptions: &[Subscription],
    today: NaiveDate,
    window_days: i64,
) -> Vec<Notification> {
    subscriptions
        .iter()
        .filter_map(|sub| {
            let next = sub.next_date?;
            let days = (next - today).num_days();
            if !(0..=window_days).contains(&days) {
                return None;
            }

            Some(Notification {
                id: format!("subscription:{}:{}", sub.id, next),
                kind: NotificationType::Warning,
                message: format!("Your {} subscription expires {}.", sub.name, when(days)),
            })
        })
        .collect()
}

/// Info notices for warranties expiring within `window_days` (inclusive)
pub fn check_warranties(
    warranties: &[Warranty],
    today: NaiveDate,
    window_days: i64,
) -> Vec<Notification> {
    warranties
        .iter()
        .filter_map(|w| {
            let days = (w.expiry_date - today).num_days();
            (0..=window_days).contains(&days).then(|| Notification {
                id: format!("warranty:{}:{}", w.id, w.expiry_date),
                kind: NotificationType::Info,
                message: format!(
                    "The warranty for {} expires {}.",
                    w.product_name,
                    when(days)
                ),
            })
        })
        .collect()
}

/// On the first of a month, ask for last month's statement if nothing is dated in it
pub fn missing_month_reminder(
    transactions: &[Transaction],
    today: NaiveDate,
) -> Option<Notification> {
    if today.day() != 1 {
        return None;
    }

    let (year, month) = previous_month(today);
    if transactions.iter().any(|t| t.month() == (year, month)) {
        return None;
    }

    let label = NaiveDate::from_ymd_opt(year, month, 1)?.format("%B %Y");
    Some(Notification {
        id: format!("statement:{:04}-{:02}", year, month),
        kind: NotificationType::Info,
        message: format!(
            "No transactions recorded for {}. Upload that month's statement to keep insights accurate.",
            label
        ),
    })
}

/// Inputs the notification pass reads
#[derive(Debug, Clone, Copy)]
pub struct NotificationSources<'a> {
    pub subscriptions: &'a [Subscription],
    pub warranties: &'a [Warranty],
    pub transactions: &'a [Transaction],
    /// Ids the user has dismissed
    pub acknowledged: &'a [String],
}

/// Every notification for `today`, minus acknowledged ones when dedupe is on
pub fn collect_notifications(
    sources: NotificationSources<'_>,
    today: NaiveDate,
    config: &NotificationConfig,
) -> Vec<Notification> {
    let mut notifications = check_expiry(sources.subscriptions, today, config.expiry_window_days);
    notifications.extend(check_warranties(
        sources.warranties,
        today,
        config.warranty_window_days,
    ));

    if config.missing_month_reminder {
        notifications.extend(missing_month_reminder(sources.transactions, today));
    }

    if config.dedupe {
        let before = notifications.len();
        notifications.retain(|n| !sources.acknowledged.contains(&n.id));
        debug!(
            suppressed = before - notifications.len(),
            "Acknowledged notifications suppressed"
        );
    }

    notifications
}

fn when(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        n => format!("in {} days", n),
    }
}
