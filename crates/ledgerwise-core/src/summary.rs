//! Income/expense/balance aggregation
//!
//! Classification follows the sign of the amount, not the record's type, so a
//! record whose type disagrees with its sign is still counted once.

use crate::amount::normalize_amount;
use crate::models::{Summary, Transaction, TransactionRecord};

/// Summarize canonical transactions
pub fn summarize<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    starting_balance: f64,
) -> Summary {
    totals(transactions.into_iter().map(|t| t.amount), starting_balance)
}

/// Summarize wire records directly; malformed amounts contribute zero
pub fn summarize_records<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
    starting_balance: f64,
) -> Summary {
    totals(
        records.into_iter().map(|r| normalize_amount(&r.amount)),
        starting_balance,
    )
}

fn totals(amounts: impl Iterator<Item = f64>, starting_balance: f64) -> Summary {
    let (income, expense) = amounts.fold((0.0, 0.0), |(income, expense), amount| {
        if amount > 0.0 {
            (income + amount, expense)
        } else {
            (income, expense + amount.abs())
        }
    });

    Summary {
        income,
        expense,
        balance: starting_balance + income - expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionType, UNCATEGORIZED};
    use chrono::NaiveDate;

    fn tx(amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: format!("{}", amount),
            title: "t".to_string(),
            amount,
            display_amount: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            time: None,
            kind,
            category: UNCATEGORIZED.to_string(),
            is_manual: false,
            receipt_id: None,
        }
    }

    #[test]
    fn test_summarize_basic() {
        let txs = vec![
            tx(3000.0, TransactionType::Income),
            tx(-120.5, TransactionType::Expense),
            tx(-79.5, TransactionType::Expense),
        ];
        let summary = summarize(&txs, 500.0);

        assert_eq!(summary.income, 3000.0);
        assert_eq!(summary.expense, 200.0);
        assert_eq!(summary.balance, 3300.0);
    }

    #[test]
    fn test_sign_wins_over_type() {
        // Mislabelled record: positive amount tagged as expense
        let txs = vec![tx(40.0, TransactionType::Expense)];
        let summary = summarize(&txs, 0.0);
        assert_eq!(summary.income, 40.0);
        assert_eq!(summary.expense, 0.0);
    }

    #[test]
    fn test_empty_ledger() {
        let summary = summarize(Vec::<Transaction>::new().iter(), 250.0);
        assert_eq!(summary, Summary { income: 0.0, expense: 0.0, balance: 250.0 });
    }

    #[test]
    fn test_records_with_malformed_amounts_contribute_zero() {
        let records = vec![
            TransactionRecord {
                amount: "+$1,000.00".to_string(),
                ..Default::default()
            },
            TransactionRecord {
                amount: "-$250.25".to_string(),
                ..Default::default()
            },
            TransactionRecord {
                amount: "N/A".to_string(),
                ..Default::default()
            },
        ];
        let summary = summarize_records(&records, 0.0);

        assert_eq!(summary.income, 1000.0);
        assert_eq!(summary.expense, 250.25);
        assert_eq!(summary.balance, 749.75);
    }

    #[test]
    fn test_balance_identity() {
        let amounts = [12.34, -0.01, -999.99, 5000.0, -4321.09, 0.0, 17.5];
        let txs: Vec<Transaction> = amounts
            .iter()
            .map(|a| tx(*a, TransactionType::from_amount(*a)))
            .collect();

        for start in [0.0, -100.0, 1234.56] {
            let s = summarize(&txs, start);
            assert_eq!(s.balance, start + s.income - s.expense);
        }
    }
}
