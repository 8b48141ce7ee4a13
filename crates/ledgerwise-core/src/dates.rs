//! Date normalization for wire records

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::error::ParseFailure;

/// Date-with-time layouts, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",   // 2025-12-01
    "%m/%d/%y",   // 12/01/25 (before %Y, which also accepts two digits)
    "%m/%d/%Y",   // 12/01/2025
    "%d %b %Y",   // 01 Dec 2025
    "%b %d, %Y",  // Dec 01, 2025
    "%B %d, %Y",  // December 01, 2025
    "%d-%m-%Y",   // 01-12-2025
    "%d.%m.%Y",   // 01.12.2025
];

/// Parse a wire date, keeping the time of day when one is present
pub fn parse_date_time(raw: &str) -> Result<(NaiveDate, Option<NaiveTime>), ParseFailure> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        let local = dt.naive_local();
        return Ok((local.date(), Some(local.time())));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok((dt.date(), Some(dt.time())));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok((date, None));
        }
    }

    Err(ParseFailure::InvalidDate(raw.to_string()))
}

/// Parse a date-only value such as a subscription's next charge date
pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseFailure> {
    parse_date_time(raw).map(|(date, _)| date)
}

/// Wire form of a date: `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS` with a time
pub fn format_wire_date(date: NaiveDate, time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => date.and_time(t).format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => date.format("%Y-%m-%d").to_string(),
    }
}

/// The calendar month before the one containing `date`, as (year, month)
pub fn previous_month(date: NaiveDate) -> (i32, u32) {
    match date.month() {
        1 => (date.year() - 1, 12),
        m => (date.year(), m - 1),
    }
}

/// Applies lenient or strict handling to [`parse_date_time`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    pub strict: bool,
}

impl DateNormalizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Lenient mode substitutes `today` (without a time) for unparseable input
    pub fn normalize(
        &self,
        raw: &str,
        today: NaiveDate,
    ) -> Result<(NaiveDate, Option<NaiveTime>), ParseFailure> {
        match parse_date_time(raw) {
            Ok(parsed) => Ok(parsed),
            Err(e) if self.strict => Err(e),
            Err(_) => {
                warn!(date = raw, fallback = %today, "Unparseable date defaulted to today");
                Ok((today, None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_timestamp_keeps_time() {
        let (date, time) = parse_date_time("2025-12-01T18:45:00.000Z").unwrap();
        assert_eq!(date, ymd(2025, 12, 1));
        assert_eq!(time, NaiveTime::from_hms_opt(18, 45, 0));

        let (_, time) = parse_date_time("2025-12-01 07:15").unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(7, 15, 0));
    }

    #[test]
    fn test_parse_date_only_formats() {
        assert_eq!(parse_date("2025-12-01").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date("12/01/2025").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date("12/01/25").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date("Dec 01, 2025").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date("01 Dec 2025").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date("01.12.2025").unwrap(), ymd(2025, 12, 1));
        assert_eq!(parse_date_time("2025-12-01").unwrap().1, None);
    }

    #[test]
    fn test_wire_date_reparses() {
        let date = ymd(2025, 12, 1);
        let time = NaiveTime::from_hms_opt(18, 45, 0);

        assert_eq!(format_wire_date(date, None), "2025-12-01");
        assert_eq!(format_wire_date(date, time), "2025-12-01T18:45:00");
        assert_eq!(parse_date_time(&format_wire_date(date, time)).unwrap(), (date, time));
    }

    #[test]
    fn test_previous_month_wraps_year() {
        assert_eq!(previous_month(ymd(2026, 1, 1)), (2025, 12));
        assert_eq!(previous_month(ymd(2026, 10, 17)), (2026, 9));
    }

    #[test]
    fn test_normalizer_lenient_and_strict() {
        let today = ymd(2026, 10, 17);

        let lenient = DateNormalizer::new(false);
        assert_eq!(lenient.normalize("yesterday", today).unwrap(), (today, None));

        let strict = DateNormalizer::new(true);
        assert_eq!(
            strict.normalize("yesterday", today),
            Err(ParseFailure::InvalidDate("yesterday".to_string()))
        );
    }
}
