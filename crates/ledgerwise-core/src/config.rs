//! Analysis configuration
//!
//! Every threshold used by the analysis pipeline lives here so that product
//! decisions (strict parsing, receipt date fallback, notification dedupe) are
//! switches rather than hardcoded behavior.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config` on the CLI), if it exists
//! 2. The override in the data dir (~/.local/share/ledgerwise/config/ledgerwise.toml)
//! 3. The embedded defaults (compiled into the binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Currency;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ledgerwise.toml");

/// Parsing behavior for amounts, dates and receipts
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingConfig {
    /// Return typed errors instead of defaulting malformed values
    pub strict: bool,
    /// Use today when a receipt has no recognizable date
    pub receipt_date_fallback: bool,
    /// Receipt amounts at or above this are rejected as OCR noise
    pub receipt_amount_ceiling: f64,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            strict: false,
            receipt_date_fallback: true,
            receipt_amount_ceiling: 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeakConfig {
    /// Groups averaging below this are "small"
    pub small_amount_threshold: f64,
    /// Minimum group size for a small recurring leak
    pub min_occurrences: usize,
}

impl Default for LeakConfig {
    fn default() -> Self {
        Self {
            small_amount_threshold: 100.0,
            min_occurrences: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthConfig {
    pub neutral_score: i32,
    /// Savings rate (percent) above which the bonus applies
    pub good_savings_rate: f64,
    pub savings_bonus: i32,
    pub overspend_penalty: i32,
    /// Subscription cost as a percent of income above which the penalty applies
    pub subscription_load_limit: f64,
    pub subscription_penalty: i32,
    pub critical_below: i32,
    pub warning_below: i32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            neutral_score: 50,
            good_savings_rate: 20.0,
            savings_bonus: 20,
            overspend_penalty: 20,
            subscription_load_limit: 5.0,
            subscription_penalty: 10,
            critical_below: 40,
            warning_below: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    pub top_categories: usize,
    /// Percent share of a period's expense that makes a category dominant
    pub dominant_share: f64,
    /// Minimum absolute percent change reported month over month
    pub month_shift_threshold: f64,
    /// Expense/income percent above which the verdict is critical
    pub verdict_critical_ratio: f64,
    /// Expense/income percent above which the verdict is a warning
    pub verdict_warning_ratio: f64,
    /// Single expenses above this are called out
    pub large_expense: f64,
    /// Percent of the dominant category recommended as a cut
    pub reduction_share: f64,
    /// Below this many transactions no textual insights are produced
    pub min_transactions: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            top_categories: 3,
            dominant_share: 40.0,
            month_shift_threshold: 10.0,
            verdict_critical_ratio: 80.0,
            verdict_warning_ratio: 60.0,
            large_expense: 5000.0,
            reduction_share: 10.0,
            min_transactions: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Subscriptions due within this many days (inclusive) raise a warning
    pub expiry_window_days: i64,
    /// Warranties expiring within this many days (inclusive) raise an info notice
    pub warranty_window_days: i64,
    /// On the 1st of a month, remind when the previous month has no data
    pub missing_month_reminder: bool,
    /// Suppress notifications the user has acknowledged
    pub dedupe: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            expiry_window_days: 3,
            warranty_window_days: 30,
            missing_month_reminder: true,
            dedupe: false,
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub parsing: ParsingConfig,
    pub currency: Currency,
    pub leaks: LeakConfig,
    pub health: HealthConfig,
    pub insights: InsightConfig,
    pub notifications: NotificationConfig,
}

impl AnalysisConfig {
    /// Load configuration, preferring `path`, then the data-dir override,
    /// then the embedded defaults
    ///
    /// An explicit `path` must exist; only the data-dir override is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(p) if !p.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => read_config(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => read_config(&p)?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Parse configuration from TOML text, applying it over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Embedded default configuration text
    pub fn default_toml() -> &'static str {
        DEFAULT_CONFIG
    }

    /// Shorthand for a config with strict parsing toggled
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.parsing.strict = strict;
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledgerwise").join("config").join("ledgerwise.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    parsing: Option<RawParsing>,
    currency: Option<RawCurrency>,
    leaks: Option<RawLeaks>,
    health: Option<RawHealth>,
    insights: Option<RawInsights>,
    notifications: Option<RawNotifications>,
}

#[derive(Debug, Deserialize)]
struct RawParsing {
    strict: Option<bool>,
    receipt_date_fallback: Option<bool>,
    receipt_amount_ceiling: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    symbol: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLeaks {
    small_amount_threshold: Option<f64>,
    min_occurrences: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    neutral_score: Option<i32>,
    good_savings_rate: Option<f64>,
    savings_bonus: Option<i32>,
    overspend_penalty: Option<i32>,
    subscription_load_limit: Option<f64>,
    subscription_penalty: Option<i32>,
    critical_below: Option<i32>,
    warning_below: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    top_categories: Option<usize>,
    dominant_share: Option<f64>,
    month_shift_threshold: Option<f64>,
    verdict_critical_ratio: Option<f64>,
    verdict_warning_ratio: Option<f64>,
    large_expense: Option<f64>,
    reduction_share: Option<f64>,
    min_transactions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawNotifications {
    expiry_window_days: Option<i64>,
    warranty_window_days: Option<i64>,
    missing_month_reminder: Option<bool>,
    dedupe: Option<bool>,
}

/// Overwrite `$target` with `$value` when the raw field is present
macro_rules! apply {
    ($target:expr, $value:expr) => {
        if let Some(v) = $value {
            $target = v;
        }
    };
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(p) = raw.parsing {
        apply!(config.parsing.strict, p.strict);
        apply!(config.parsing.receipt_date_fallback, p.receipt_date_fallback);
        apply!(config.parsing.receipt_amount_ceiling, p.receipt_amount_ceiling);
    }

    if let Some(c) = raw.currency {
        apply!(config.currency.symbol, c.symbol);
        apply!(config.currency.code, c.code);
    }

    if let Some(l) = raw.leaks {
        apply!(config.leaks.small_amount_threshold, l.small_amount_threshold);
        apply!(config.leaks.min_occurrences, l.min_occurrences);
    }

    if let Some(h) = raw.health {
        apply!(config.health.neutral_score, h.neutral_score);
        apply!(config.health.good_savings_rate, h.good_savings_rate);
        apply!(config.health.savings_bonus, h.savings_bonus);
        apply!(config.health.overspend_penalty, h.overspend_penalty);
        apply!(config.health.subscription_load_limit, h.subscription_load_limit);
        apply!(config.health.subscription_penalty, h.subscription_penalty);
        apply!(config.health.critical_below, h.critical_below);
        apply!(config.health.warning_below, h.warning_below);
    }

    if let Some(i) = raw.insights {
        apply!(config.insights.top_categories, i.top_categories);
        apply!(config.insights.dominant_share, i.dominant_share);
        apply!(config.insights.month_shift_threshold, i.month_shift_threshold);
        apply!(config.insights.verdict_critical_ratio, i.verdict_critical_ratio);
        apply!(config.insights.verdict_warning_ratio, i.verdict_warning_ratio);
        apply!(config.insights.large_expense, i.large_expense);
        apply!(config.insights.reduction_share, i.reduction_share);
        apply!(config.insights.min_transactions, i.min_transactions);
    }

    if let Some(n) = raw.notifications {
        apply!(config.notifications.expiry_window_days, n.expiry_window_days);
        apply!(config.notifications.warranty_window_days, n.warranty_window_days);
        apply!(config.notifications.missing_month_reminder, n.missing_month_reminder);
        apply!(config.notifications.dedupe, n.dedupe);
    }

    if config.health.critical_below > config.health.warning_below {
        return Err(Error::Config(
            "health.critical_below must not exceed health.warning_below".to_string(),
        ));
    }

    Ok(config)
}
