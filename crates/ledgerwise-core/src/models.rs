//! Domain models for Ledgerwise
//!
//! Two families of types live here:
//! - wire records (`TransactionRecord`, `SubscriptionRecord`) in the loose shape
//!   collaborators and the record store exchange, with string amounts and dates
//! - canonical types (`Transaction`, `Subscription`) the analysis works on

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category assigned when a record carries none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The type implied by the sign of an amount (zero counts as expense)
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-assigned id, unique within the ledger
    pub id: String,
    pub title: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    /// Display form of the amount, e.g. "-$50.00"
    pub display_amount: String,
    pub date: NaiveDate,
    /// Time of day, when the source carried one
    pub time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub is_manual: bool,
    pub receipt_id: Option<String>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// `amount < 0 ⇔ type == expense`; zero amounts agree with either type
    pub fn sign_agrees(&self) -> bool {
        match self.kind {
            TransactionType::Expense => self.amount <= 0.0,
            TransactionType::Income => self.amount >= 0.0,
        }
    }

    /// Calendar month as (year, month)
    pub fn month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }
}

/// Transaction in its wire/storage shape
///
/// ```json
/// {"id": 1712, "title": "Coffee", "amount": "-$4.50", "date": "2025-12-01",
///  "type": "expense", "category": "Food", "isManual": true}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// String or integer on the wire; absent when the collaborator gives none
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_manual: Option<bool>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
}

/// A tracked recurring charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Unsigned charge per period
    pub amount: f64,
    /// Free-text period label, e.g. "1 Month"
    pub frequency: String,
    pub next_date: Option<NaiveDate>,
}

/// Subscription in its wire/storage shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_date: Option<String>,
}

/// A product warranty being tracked for expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
    pub id: String,
    pub product_name: String,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_no: Option<String>,
}

/// A scanned receipt kept alongside the transaction it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub vendor: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub raw_text: String,
    /// OCR engine confidence, when known
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Display-only currency (no conversion is ever performed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub code: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            code: "USD".to_string(),
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub starting_balance: f64,
    /// Overrides the configured currency when set
    pub currency: Option<Currency>,
    /// Cached advice from the statement-import collaborator
    pub advice: Vec<String>,
    /// Notification ids the user has acknowledged
    pub acknowledged: Vec<String>,
}

/// Opaque user profile; no authentication happens in the core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Income, expense and resulting balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income: f64,
    pub expense: f64,
    /// starting balance + income - expense
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeakType {
    #[serde(rename = "Small Frequent")]
    SmallFrequent,
    #[serde(rename = "Hidden Fee")]
    HiddenFee,
}

impl LeakType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmallFrequent => "Small Frequent",
            Self::HiddenFee => "Hidden Fee",
        }
    }
}

impl std::fmt::Display for LeakType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cluster of expenses sharing a normalized description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leak {
    /// Normalized cluster key
    pub name: String,
    /// Number of expenses in the cluster
    pub frequency: usize,
    pub total: f64,
    #[serde(rename = "type")]
    pub kind: LeakType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakReport {
    pub total_leak: f64,
    /// In order of first appearance in the ledger
    pub leaks: Vec<Leak>,
}

/// Three-tier status shared by the health score and the spending verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Safe,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Always within 0..=100
    pub score: u8,
    pub status: HealthStatus,
    /// Each entry starts with '+', '-' or '~'
    pub details: Vec<String>,
}

/// A category's slice of total expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Share of total expense, 0..=100
    pub percentage: f64,
}

/// A category's change against the previous calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShift {
    pub category: String,
    pub current: f64,
    pub previous: f64,
    pub percent_change: f64,
}

/// Coarse classification of the current month's spending-to-income ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub level: HealthStatus,
    pub label: String,
    pub description: String,
}

/// Suggested next step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The dominant category targeted, if any
    pub category: Option<String>,
    /// Projected saving from following the recommendation
    pub saving: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Warning,
    Info,
}

/// A time-sensitive notice regenerated on every recompute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Deterministic for the same source and date
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Duplicate,
    HighValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub kind: AlertKind,
    pub transaction_id: String,
    pub message: String,
}

/// A hand-entered transaction before it gets an id
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    pub title: String,
    /// Unsigned; the sign comes from `kind`
    pub amount: f64,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub category: Option<String>,
    pub kind: TransactionType,
}

/// Output of the statement-import collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementImport {
    /// Missing is treated as empty
    #[serde(default)]
    pub transactions: Option<Vec<TransactionRecord>>,
    #[serde(default)]
    pub advice: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_numeric_id_and_amount() {
        let record: TransactionRecord = serde_json::from_str(
            r#"{"id": 1712000000001, "title": "Salary", "amount": 2500, "date": "2025-12-01", "type": "income"}"#,
        )
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("1712000000001"));
        assert_eq!(record.amount, "2500");
        assert_eq!(record.kind.as_deref(), Some("income"));
        assert_eq!(record.category, None);
    }

    #[test]
    fn test_record_wire_names() {
        let record = TransactionRecord {
            id: Some("t1".to_string()),
            title: "Coffee".to_string(),
            amount: "-$4.50".to_string(),
            date: "2025-12-01".to_string(),
            kind: Some("expense".to_string()),
            category: Some("Food".to_string()),
            is_manual: Some(true),
            receipt_id: Some("r1".to_string()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["isManual"], true);
        assert_eq!(json["receiptId"], "r1");
    }

    #[test]
    fn test_statement_import_missing_transactions() {
        let import: StatementImport = serde_json::from_str(r#"{"advice": "Spend less"}"#).unwrap();
        assert!(import.transactions.is_none());
        assert_eq!(import.advice.as_deref(), Some("Spend less"));
    }

    #[test]
    fn test_leak_type_serialization() {
        let leak = Leak {
            name: "atm fee".to_string(),
            frequency: 2,
            total: 6.0,
            kind: LeakType::HiddenFee,
        };
        let json = serde_json::to_value(&leak).unwrap();
        assert_eq!(json["type"], "Hidden Fee");
    }

    #[test]
    fn test_sign_agreement() {
        let mut tx = Transaction {
            id: "1".to_string(),
            title: "Refund".to_string(),
            amount: 20.0,
            display_amount: "+$20.00".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            time: None,
            kind: TransactionType::Income,
            category: UNCATEGORIZED.to_string(),
            is_manual: false,
            receipt_id: None,
        };
        assert!(tx.sign_agrees());

        tx.kind = TransactionType::Expense;
        assert!(!tx.sign_agrees());
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("Income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("debit".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
