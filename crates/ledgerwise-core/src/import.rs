//! Record normalization, statement import and CSV exchange
//!
//! Wire records arrive with string amounts, free-form dates and optional
//! types. [`RecordNormalizer`] turns them into canonical transactions using
//! the shared amount and date normalizers, so every entry point (statement
//! import, CSV, stored documents) agrees on what a record means.

use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::amount::{display_amount, AmountNormalizer};
use crate::config::ParsingConfig;
use crate::dates::{format_wire_date, DateNormalizer};
use crate::error::{Error, ParseFailure, Result};
use crate::ids::{derive_id, IdAllocator};
use crate::models::{
    Currency, StatementImport, Subscription, SubscriptionRecord, Transaction, TransactionRecord,
    TransactionType, UNCATEGORIZED,
};

/// CSV header, in wire order
pub const CSV_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "amount",
    "date",
    "type",
    "category",
    "is_manual",
    "receipt_id",
];

/// Converts wire records into canonical values
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    amounts: AmountNormalizer,
    dates: DateNormalizer,
    currency: Currency,
}

impl RecordNormalizer {
    pub fn new(parsing: &ParsingConfig, currency: Currency) -> Self {
        Self {
            amounts: AmountNormalizer::new(parsing.strict),
            dates: DateNormalizer::new(parsing.strict),
            currency,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.amounts.strict
    }

    /// Normalize a transaction record under the given id
    ///
    /// A missing type is derived from the sign. A type that contradicts the
    /// sign is kept as given and logged.
    pub fn transaction(
        &self,
        record: &TransactionRecord,
        id: String,
        today: NaiveDate,
    ) -> std::result::Result<Transaction, ParseFailure> {
        let amount = self.amounts.normalize(&record.amount)?;
        let (date, time) = self.dates.normalize(&record.date, today)?;
        let kind = self.transaction_type(record.kind.as_deref(), amount)?;

        let tx = Transaction {
            display_amount: if record.amount.trim().is_empty() {
                display_amount(amount, kind, &self.currency)
            } else {
                record.amount.trim().to_string()
            },
            id,
            title: record.title.trim().to_string(),
            amount,
            date,
            time,
            kind,
            category: normalize_category(record.category.as_deref()),
            is_manual: record.is_manual.unwrap_or(false),
            receipt_id: record.receipt_id.clone(),
        };

        if !tx.sign_agrees() {
            warn!(
                id = tx.id.as_str(),
                amount = tx.amount,
                kind = tx.kind.as_str(),
                "Transaction type disagrees with amount sign"
            );
        }

        Ok(tx)
    }

    fn transaction_type(
        &self,
        raw: Option<&str>,
        amount: f64,
    ) -> std::result::Result<TransactionType, ParseFailure> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(TransactionType::from_amount(amount)),
            Some(s) => match s.parse::<TransactionType>() {
                Ok(kind) => Ok(kind),
                Err(_) if self.is_strict() => Err(ParseFailure::InvalidType(s.to_string())),
                Err(_) => {
                    warn!(kind = s, "Unknown transaction type, deriving from sign");
                    Ok(TransactionType::from_amount(amount))
                }
            },
        }
    }

    /// Normalize a subscription record under the given id
    ///
    /// An unparseable next date is dropped in lenient mode rather than
    /// defaulted, so it cannot raise a spurious due-today warning.
    pub fn subscription(
        &self,
        record: &SubscriptionRecord,
        id: String,
    ) -> std::result::Result<Subscription, ParseFailure> {
        let amount = self.amounts.normalize(&record.amount)?.abs();

        let next_date = match record.next_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match crate::dates::parse_date(raw) {
                Ok(date) => Some(date),
                Err(e) if self.is_strict() => return Err(e),
                Err(_) => {
                    warn!(subscription = record.name.as_str(), date = raw, "Dropping unparseable next date");
                    None
                }
            },
        };

        Ok(Subscription {
            id,
            name: record.name.trim().to_string(),
            amount,
            frequency: record.frequency.trim().to_string(),
            next_date,
        })
    }

    /// Normalize a batch, giving every record an id unique within `ids`
    pub fn transactions(
        &self,
        records: &[TransactionRecord],
        ids: &mut IdAllocator,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let id = ids.allocate(record.id.as_deref(), || {
                derive_id(&record.date, &record.title, &record.amount, position)
            });
            transactions.push(self.transaction(record, id, today)?);
        }

        Ok(transactions)
    }

    /// Normalize a batch of subscriptions, deriving missing or repeated ids
    pub fn subscriptions(
        &self,
        records: &[SubscriptionRecord],
        ids: &mut IdAllocator,
    ) -> Result<Vec<Subscription>> {
        records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let id = ids.allocate(record.id.as_deref(), || {
                    derive_id(
                        record.next_date.as_deref().unwrap_or(""),
                        &record.name,
                        &record.amount,
                        position,
                    )
                });
                Ok(self.subscription(record, id)?)
            })
            .collect()
    }
}

fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Wire shape of a canonical transaction
pub fn transaction_record(tx: &Transaction) -> TransactionRecord {
    TransactionRecord {
        id: Some(tx.id.clone()),
        title: tx.title.clone(),
        amount: tx.display_amount.clone(),
        date: format_wire_date(tx.date, tx.time),
        kind: Some(tx.kind.as_str().to_string()),
        category: Some(tx.category.clone()),
        is_manual: tx.is_manual.then_some(true),
        receipt_id: tx.receipt_id.clone(),
    }
}

/// Wire shape of a subscription
pub fn subscription_record(sub: &Subscription) -> SubscriptionRecord {
    SubscriptionRecord {
        id: Some(sub.id.clone()),
        name: sub.name.clone(),
        amount: format!("{:.2}", sub.amount),
        frequency: sub.frequency.clone(),
        next_date: sub.next_date.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

/// Parse the statement extractor's JSON output
pub fn parse_statement(json: &str) -> Result<StatementImport> {
    Ok(serde_json::from_str(json)?)
}

/// Split collaborator advice into individual tips (one per non-empty line,
/// bullet markers removed)
pub fn split_advice(advice: &str) -> Vec<String> {
    advice
        .lines()
        .map(|l| l.trim().trim_start_matches(&['-', '*', '•'][..]).trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read transaction records from CSV with a header row.
///
/// Columns are matched by header name, so order does not matter and
/// `isManual`/`receiptId` spellings are accepted. `title`, `amount` and
/// `date` are required.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| {
            h.replace('_', "").eq_ignore_ascii_case(&name.replace('_', ""))
        })
    };

    let title_col = column("title").ok_or_else(|| missing_column("title"))?;
    let amount_col = column("amount").ok_or_else(|| missing_column("amount"))?;
    let date_col = column("date").ok_or_else(|| missing_column("date"))?;
    let id_col = column("id");
    let type_col = column("type");
    let category_col = column("category");
    let manual_col = column("is_manual");
    let receipt_col = column("receipt_id");

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        records.push(TransactionRecord {
            id: field(&row, id_col),
            title: field(&row, Some(title_col)).unwrap_or_default(),
            amount: field(&row, Some(amount_col)).unwrap_or_default(),
            date: field(&row, Some(date_col)).unwrap_or_default(),
            kind: field(&row, type_col),
            category: field(&row, category_col),
            is_manual: field(&row, manual_col).map(|v| v.eq_ignore_ascii_case("true") || v == "1"),
            receipt_id: field(&row, receipt_col),
        });
    }

    debug!(count = records.len(), "Parsed CSV transaction records");
    Ok(records)
}

fn missing_column(name: &str) -> Error {
    Error::InvalidData(format!("CSV is missing the '{}' column", name))
}

fn field(row: &StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|c| row.get(c))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Write transactions as CSV with a header row
pub fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;

    for tx in transactions {
        let record = transaction_record(tx);
        wtr.write_record([
            record.id.as_deref().unwrap_or(""),
            record.title.as_str(),
            record.amount.as_str(),
            record.date.as_str(),
            record.kind.as_deref().unwrap_or(""),
            record.category.as_deref().unwrap_or(""),
            if tx.is_manual { "true" } else { "false" },
            record.receipt_id.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn lenient() -> RecordNormalizer {
        RecordNormalizer::new(&ParsingConfig::default(), Currency::default())
    }

    fn strict() -> RecordNormalizer {
        let parsing = ParsingConfig {
            strict: true,
            ..Default::default()
        };
        RecordNormalizer::new(&parsing, Currency::default())
    }

    fn record(amount: &str, date: &str, kind: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            id: None,
            title: " Coffee ".to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
            kind: kind.map(str::to_string),
            category: Some("  ".to_string()),
            is_manual: None,
            receipt_id: None,
        }
    }

    #[test]
    fn test_normalize_transaction() {
        let tx = lenient()
            .transaction(&record("-$4.50", "2025-12-01T08:15:00", Some("expense")), "t1".into(), today())
            .unwrap();

        assert_eq!(tx.title, "Coffee");
        assert_eq!(tx.amount, -4.5);
        assert_eq!(tx.display_amount, "-$4.50");
        assert_eq!(tx.time, NaiveTime::from_hms_opt(8, 15, 0));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category, UNCATEGORIZED);
    }

    #[test]
    fn test_type_derived_from_sign_when_missing() {
        let n = lenient();
        let income = n.transaction(&record("+$10.00", "2025-12-01", None), "a".into(), today()).unwrap();
        let expense = n.transaction(&record("-$10.00", "2025-12-01", None), "b".into(), today()).unwrap();

        assert_eq!(income.kind, TransactionType::Income);
        assert_eq!(expense.kind, TransactionType::Expense);
    }

    #[test]
    fn test_mismatched_type_is_kept() {
        let tx = lenient()
            .transaction(&record("+$10.00", "2025-12-01", Some("expense")), "a".into(), today())
            .unwrap();
        assert_eq!(tx.kind, TransactionType::Expense);
        assert!(!tx.sign_agrees());
    }

    #[test]
    fn test_lenient_defaults_and_strict_failures() {
        let tx = lenient()
            .transaction(&record("N/A", "someday", Some("transfer")), "a".into(), today())
            .unwrap();
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.date, today());
        assert_eq!(tx.kind, TransactionType::Expense);

        let s = strict();
        assert!(matches!(
            s.transaction(&record("N/A", "2025-12-01", None), "a".into(), today()),
            Err(ParseFailure::EmptyAmount(_))
        ));
        assert!(matches!(
            s.transaction(&record("-$1.00", "someday", None), "a".into(), today()),
            Err(ParseFailure::InvalidDate(_))
        ));
        assert!(matches!(
            s.transaction(&record("-$1.00", "2025-12-01", Some("transfer")), "a".into(), today()),
            Err(ParseFailure::InvalidType(_))
        ));
    }

    #[test]
    fn test_batch_assigns_unique_ids() {
        let mut first = record("-$4.50", "2025-12-01", None);
        first.id = Some("dup".to_string());
        let mut second = first.clone();
        second.title = "Tea".to_string();
        let third = record("-$4.50", "2025-12-01", None);
        let fourth = third.clone();

        let mut ids = IdAllocator::new();
        let txs = lenient()
            .transactions(&[first, second, third, fourth], &mut ids, today())
            .unwrap();

        assert_eq!(txs[0].id, "dup");
        let mut unique: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_subscription_normalization() {
        let rec = SubscriptionRecord {
            id: None,
            name: "Netflix".to_string(),
            amount: "$15.49".to_string(),
            frequency: "1 Month".to_string(),
            next_date: Some("garbage".to_string()),
        };

        let sub = lenient().subscription(&rec, "s1".into()).unwrap();
        assert_eq!(sub.amount, 15.49);
        assert_eq!(sub.next_date, None);

        assert!(strict().subscription(&rec, "s1".into()).is_err());
    }

    #[test]
    fn test_wire_record_round_trip() {
        let tx = lenient()
            .transaction(&record("-$4.50", "2025-12-01T08:15:00", None), "t1".into(), today())
            .unwrap();
        let wire = transaction_record(&tx);

        assert_eq!(wire.amount, "-$4.50");
        assert_eq!(wire.date, "2025-12-01T08:15:00");
        assert_eq!(wire.kind.as_deref(), Some("expense"));

        let back = lenient().transaction(&wire, "t1".into(), today()).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn test_split_advice() {
        let tips = split_advice("- Cook at home\n\n* Cancel unused apps\nSave 10%");
        assert_eq!(tips, vec!["Cook at home", "Cancel unused apps", "Save 10%"]);
    }

    #[test]
    fn test_csv_round_trip() {
        let n = lenient();
        let mut ids = IdAllocator::new();
        let txs = n
            .transactions(
                &[
                    record("-$4.50", "2025-12-01", None),
                    TransactionRecord {
                        title: "Salary, December".to_string(),
                        is_manual: Some(true),
                        ..record("+$3,000.00", "2025-12-01", Some("income"))
                    },
                ],
                &mut ids,
                today(),
            )
            .unwrap();

        let mut buf = Vec::new();
        write_csv(&mut buf, &txs).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id,title,amount,date,type,category,is_manual,receipt_id\n"));

        let records = read_csv(text.as_bytes()).unwrap();
        let mut ids = IdAllocator::new();
        let back = n.transactions(&records, &mut ids, today()).unwrap();
        assert_eq!(back, txs);
    }

    #[test]
    fn test_csv_header_matching() {
        let csv = "Date,Amount,Title,isManual\n2025-12-02,-$12.00,Lunch,true\n";
        let records = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Lunch");
        assert_eq!(records[0].is_manual, Some(true));
        assert_eq!(records[0].id, None);

        let missing = read_csv("title,date\nLunch,2025-12-02\n".as_bytes());
        assert!(matches!(missing, Err(Error::InvalidData(_))));
    }
}
