//! Amount normalization and currency formatting
//!
//! Every consumer of an amount string goes through [`AmountNormalizer`] so
//! summary, leak and insight figures can never disagree about what a record
//! is worth.

use tracing::debug;

use crate::error::ParseFailure;
use crate::models::{Currency, TransactionType};

/// Parses display amounts such as `"-$1,234.50"` into signed values
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountNormalizer {
    /// Return typed failures instead of defaulting to zero
    pub strict: bool,
}

impl AmountNormalizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Normalize an amount string.
    ///
    /// Lenient mode never fails: a string with no usable number yields `0.0`.
    /// Strict mode reports the defect instead.
    pub fn normalize(&self, raw: &str) -> Result<f64, ParseFailure> {
        if self.strict {
            return parse_amount(raw);
        }

        Ok(normalize_amount(raw))
    }
}

/// Keep only digits, minus signs and decimal points
fn strip_to_numeric(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect()
}

/// Longest prefix of `s` that reads as a decimal number
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    (digits > 0).then(|| &s[..end])
}

/// Lenient normalization: strip everything but digits, `-` and `.`, then read
/// the leading number. Strings with no number yield `0.0`.
pub fn normalize_amount(raw: &str) -> f64 {
    let cleaned = strip_to_numeric(raw);
    match leading_number(&cleaned).and_then(|n| n.parse::<f64>().ok()) {
        Some(value) => value,
        None => {
            debug!(amount = raw, "Unparseable amount defaulted to 0");
            0.0
        }
    }
}

/// Strict normalization: the stripped string must be exactly one number
pub fn parse_amount(raw: &str) -> Result<f64, ParseFailure> {
    let cleaned = strip_to_numeric(raw);
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseFailure::EmptyAmount(raw.to_string()));
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseFailure::InvalidAmount(raw.to_string()))
}

/// Signed display form used on the wire, e.g. `"-$50.00"` / `"+$50.00"`
pub fn display_amount(magnitude: f64, kind: TransactionType, currency: &Currency) -> String {
    let sign = match kind {
        TransactionType::Expense => '-',
        TransactionType::Income => '+',
    };
    format!("{}{}{:.2}", sign, currency.symbol, magnitude.abs())
}

/// Human-facing currency with thousands separators, e.g. `"$1,234.50"`
pub fn format_currency(value: f64, currency: &Currency) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, currency.symbol, grouped, frac)
}
