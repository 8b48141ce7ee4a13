//! Security alerts: potential duplicates and unusually large expenses

use std::collections::HashSet;

use crate::models::{AlertKind, SecurityAlert, Transaction};

/// Scan `transactions` in the given order.
///
/// A record is a potential duplicate when an earlier record shares its date,
/// display amount and title. Expenses whose magnitude exceeds
/// `high_value_threshold` are flagged separately.
pub fn detect_alerts(transactions: &[Transaction], high_value_threshold: f64) -> Vec<SecurityAlert> {
    let mut alerts = Vec::new();
    let mut seen: HashSet<(chrono::NaiveDate, &str, &str)> = HashSet::new();

    for tx in transactions {
        let key = (tx.date, tx.display_amount.as_str(), tx.title.as_str());
        if !seen.insert(key) {
            alerts.push(SecurityAlert {
                kind: AlertKind::Duplicate,
                transaction_id: tx.id.clone(),
                message: format!("Potential duplicate: {} ({})", tx.title, tx.display_amount),
            });
        }

        if tx.is_expense() && tx.amount.abs() > high_value_threshold {
            alerts.push(SecurityAlert {
                kind: AlertKind::HighValue,
                transaction_id: tx.id.clone(),
                message: format!("Unusually high expense: {} ({})", tx.title, tx.display_amount),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionType, UNCATEGORIZED};
    use chrono::NaiveDate;

    fn tx(id: &str, title: &str, amount: f64, day: u32) -> Transaction {
        let kind = TransactionType::from_amount(amount);
        Transaction {
            id: id.to_string(),
            title: title.to_string(),
            amount,
            display_amount: crate::amount::display_amount(amount, kind, &Default::default()),
            date: NaiveDate::from_ymd_opt(2025, 12, day).unwrap(),
            time: None,
            kind,
            category: UNCATEGORIZED.to_string(),
            is_manual: false,
            receipt_id: None,
        }
    }

    #[test]
    fn test_duplicate_flags_second_occurrence_only() {
        let txs = vec![
            tx("1", "Coffee", -4.5, 1),
            tx("2", "Coffee", -4.5, 1),
            tx("3", "Coffee", -4.5, 2),
            tx("4", "Coffee", -5.0, 1),
        ];
        let alerts = detect_alerts(&txs, 5000.0);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Duplicate);
        assert_eq!(alerts[0].transaction_id, "2");
        assert_eq!(alerts[0].message, "Potential duplicate: Coffee (-$4.50)");
    }

    #[test]
    fn test_high_value_expenses_only() {
        let txs = vec![
            tx("1", "Salary", 9000.0, 1),
            tx("2", "Laptop", -5000.0, 1),
            tx("3", "Car repair", -5000.01, 1),
        ];
        let alerts = detect_alerts(&txs, 5000.0);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::HighValue);
        assert_eq!(alerts[0].transaction_id, "3");
    }
}
