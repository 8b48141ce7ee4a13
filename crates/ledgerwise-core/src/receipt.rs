//! Receipt field extraction from raw OCR text
//!
//! OCR output carries no layout, so extraction is line scanning with
//! keyword-guided passes first and blind full-text passes as the fallback.
//! Extraction never fails: a field that cannot be found degrades to its
//! default (empty amount, fallback date, "Unknown Merchant").

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParsingConfig;

/// Vendor used when no line qualifies
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*\.\d{2}").expect("amount pattern"));

static TOTAL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)total|amount|net|payable").expect("total pattern"));

static VENDOR_STOPLIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)date|time|phone|gst|total|invoice").expect("stoplist pattern")
});

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-./](\d{1,2})[-./](\d{1,2})\b").expect("iso date pattern")
});

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})([-./])(\d{1,2})[-./](\d{2,4})").expect("numeric date pattern")
});

static NAMED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{2,4})")
        .expect("named date pattern")
});

/// Fields pulled out of a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFields {
    /// Two-decimal amount such as "4.50", or empty when none was found
    pub amount: String,
    pub amount_value: Option<f64>,
    /// Detected date, or the fallback date when fallback is enabled
    pub date: Option<NaiveDate>,
    /// Whether `date` came from the text rather than the fallback
    pub date_detected: bool,
    pub vendor: String,
    pub raw_text: String,
}

/// Ways a captured date can be read, in the order they are tried
#[derive(Debug, Clone, Copy)]
enum DateTemplate {
    MonthDayYear,
    DayMonthYear,
}

/// Heuristic amount/date/vendor extractor
#[derive(Debug, Clone)]
pub struct ReceiptExtractor {
    /// Values at or above this are treated as OCR noise
    amount_ceiling: f64,
    /// Fill in `today` when no date is recognized
    date_fallback: bool,
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

impl ReceiptExtractor {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            amount_ceiling: config.receipt_amount_ceiling,
            date_fallback: config.receipt_date_fallback,
        }
    }

    /// Extract vendor, date and amount from OCR text
    pub fn extract(&self, text: &str, today: NaiveDate) -> ReceiptFields {
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let amount_value = self.extract_amount(&lines);
        let detected_date = extract_date(&lines);
        let vendor = extract_vendor(&lines);

        debug!(
            vendor = vendor.as_str(),
            amount = ?amount_value,
            date = ?detected_date,
            "Extracted receipt fields"
        );

        let date = detected_date.or_else(|| self.date_fallback.then_some(today));

        ReceiptFields {
            amount: amount_value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            amount_value,
            date,
            date_detected: detected_date.is_some(),
            vendor,
            raw_text: text.to_string(),
        }
    }

    /// Largest plausible amount on total-like lines, else anywhere
    fn extract_amount(&self, lines: &[&str]) -> Option<f64> {
        let total_lines = lines.iter().filter(|l| TOTAL_LINE_RE.is_match(l));

        self.largest_amount(total_lines)
            .or_else(|| self.largest_amount(lines.iter()))
    }

    fn largest_amount<'a>(&self, lines: impl Iterator<Item = &'a &'a str>) -> Option<f64> {
        lines
            .flat_map(|line| AMOUNT_RE.find_iter(*line))
            .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .filter(|v| *v > 0.0 && *v < self.amount_ceiling)
            .fold(None, |best: Option<f64>, v| match best {
                Some(b) if b >= v => Some(b),
                _ => Some(v),
            })
    }
}

/// First line that yields a valid date under any template
fn extract_date(lines: &[&str]) -> Option<NaiveDate> {
    lines.iter().find_map(|line| date_in_line(line))
}

fn date_in_line(line: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_RE.captures(line) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if date.is_some() {
            return date;
        }
    }

    if let Some(caps) = NUMERIC_DATE_RE.captures(line) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[3].parse().ok()?;
        let year = expand_year(&caps[4])?;

        // Slashes read month-first; dashes and dots read day-first
        let templates: &[DateTemplate] = if &caps[2] == "/" {
            &[DateTemplate::MonthDayYear, DateTemplate::DayMonthYear]
        } else {
            &[DateTemplate::DayMonthYear, DateTemplate::MonthDayYear]
        };

        let date = templates.iter().find_map(|t| match t {
            DateTemplate::MonthDayYear => NaiveDate::from_ymd_opt(year, first, second),
            DateTemplate::DayMonthYear => NaiveDate::from_ymd_opt(year, second, first),
        });
        if date.is_some() {
            return date;
        }
    }

    if let Some(caps) = NAMED_DATE_RE.captures(line) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = expand_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Two-digit years pivot like strftime's %y; three-digit years are rejected
fn expand_year(raw: &str) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if value < 70 => Some(2000 + value),
        2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// First line longer than 3 characters that isn't a structural label
fn extract_vendor(lines: &[&str]) -> String {
    lines
        .iter()
        .find(|l| l.chars().count() > 3 && !VENDOR_STOPLIST_RE.is_match(l))
        .map(|l| l.to_string())
        .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_simple_receipt() {
        let fields = ReceiptExtractor::default()
            .extract("STARBUCKS\nDate: 12/01/2025\nTotal: 4.50", today());

        assert_eq!(fields.vendor, "STARBUCKS");
        assert_eq!(fields.date, Some(ymd(2025, 12, 1)));
        assert!(fields.date_detected);
        assert_eq!(fields.amount, "4.50");
        assert_eq!(fields.amount_value, Some(4.5));
    }

    #[test]
    fn test_total_lines_win_over_larger_item_lines() {
        let text = "CORNER MART\nTV remote 25.00\nGift card 100.00\nSubtotal 125.00\nTotal 131.25\n";
        let fields = ReceiptExtractor::default().extract(text, today());
        assert_eq!(fields.amount, "131.25");
    }

    #[test]
    fn test_largest_keyword_amount_below_ceiling() {
        let text = "MEGA STORE\nNet 1,250.00\nAmount Payable 1,312.50\nRef 4,000,000.00 total";
        let fields = ReceiptExtractor::default().extract(text, today());
        assert_eq!(fields.amount, "1312.50");
    }

    #[test]
    fn test_fallback_scans_all_lines() {
        let text = "BAKERY\nCroissant 3.20\nLatte 4.80\n";
        let fields = ReceiptExtractor::default().extract(text, today());
        assert_eq!(fields.amount, "4.80");
    }

    #[test]
    fn test_no_amount_is_empty() {
        let fields = ReceiptExtractor::default().extract("THANK YOU\nCOME AGAIN", today());
        assert_eq!(fields.amount, "");
        assert_eq!(fields.amount_value, None);
    }

    #[test]
    fn test_vendor_skips_structural_lines() {
        let text = "GST INVOICE\nTel\nPhone: 555-0100\nBlue Door Cafe\nTotal 12.00";
        let fields = ReceiptExtractor::default().extract(text, today());
        assert_eq!(fields.vendor, "Blue Door Cafe");
    }

    #[test]
    fn test_vendor_defaults_to_unknown() {
        let fields = ReceiptExtractor::default().extract("abc\nTotal 5.00", today());
        assert_eq!(fields.vendor, UNKNOWN_MERCHANT);
    }

    #[test]
    fn test_date_shapes() {
        let extractor = ReceiptExtractor::default();
        let cases = [
            ("SHOP\n25/12/2025\nTotal 1.00", ymd(2025, 12, 25)),
            ("SHOP\n05-03-2025\nTotal 1.00", ymd(2025, 3, 5)),
            ("SHOP\n05.03.25\nTotal 1.00", ymd(2025, 3, 5)),
            ("SHOP\n7 March 2025\nTotal 1.00", ymd(2025, 3, 7)),
            ("SHOP\n07 Sep 24\nTotal 1.00", ymd(2024, 9, 7)),
            ("SHOP\nBilled 2025-11-30 10:22\nTotal 1.00", ymd(2025, 11, 30)),
        ];

        for (text, expected) in cases {
            assert_eq!(extractor.extract(text, today()).date, Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_invalid_date_line_is_skipped() {
        let text = "SHOP\nRef 99/99/2025\nDate 02/03/2025\nTotal 1.00";
        let fields = ReceiptExtractor::default().extract(text, today());
        assert_eq!(fields.date, Some(ymd(2025, 2, 3)));
    }

    #[test]
    fn test_date_fallback_is_configurable() {
        let fields = ReceiptExtractor::default().extract("SHOP\nTotal 1.00", today());
        assert_eq!(fields.date, Some(today()));
        assert!(!fields.date_detected);

        let config = ParsingConfig {
            receipt_date_fallback: false,
            ..Default::default()
        };
        let fields = ReceiptExtractor::new(&config).extract("SHOP\nTotal 1.00", today());
        assert_eq!(fields.date, None);
    }
}
