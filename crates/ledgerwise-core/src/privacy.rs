//! Sensitive-data screen for statement text
//!
//! Statement text is checked before it is handed to the import collaborator.
//! Keywords match on word boundaries so "pan" does not fire inside "company".

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Labels that indicate identifying account details
pub const SENSITIVE_KEYWORDS: &[&str] = &[
    "account no",
    "account number",
    "ac no",
    "ifsc",
    "cif",
    "customer id",
    "micr",
    "branch code",
    "mobile no",
    "phone no",
    "pan",
    "aadhaar",
    "ssn",
];

/// 10-16 digit runs look like account or card numbers
static SENSITIVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{10,16}\b").expect("number pattern"));

static KEYWORD_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SENSITIVE_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(kw));
            (*kw, Regex::new(&pattern).expect("keyword pattern"))
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Screen text for restricted keywords and long digit sequences
pub fn screen_text(text: &str) -> PrivacyReport {
    let mut issues: Vec<String> = KEYWORD_RES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(kw, _)| format!("Found restricted keyword: \"{}\"", kw))
        .collect();

    let numbers = SENSITIVE_NUMBER_RE.find_iter(text).count();
    if numbers > 0 {
        issues.push(format!(
            "Found potential sensitive number sequence ({} detected)",
            numbers
        ));
    }

    if !issues.is_empty() {
        warn!(issues = issues.len(), "Statement text failed privacy screen");
    }

    PrivacyReport {
        is_valid: issues.is_empty(),
        issues,
    }
}
