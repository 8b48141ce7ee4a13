//! Money-leak detection
//!
//! Expenses are clustered by a digit-free description key, so reference
//! numbers ("Fee #3821", "Fee #1220") collapse into one cluster. Clusters are
//! reported in the order their key first appears.

use std::collections::HashMap;

use tracing::debug;

use crate::config::LeakConfig;
use crate::models::{Leak, LeakReport, LeakType, Transaction};

/// Substrings that mark a cluster as a fee regardless of size
const FEE_MARKERS: &[&str] = &["fee", "charge"];

/// Cluster key for a description: lowercase, digits removed, trimmed
pub fn leak_key(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .trim()
        .to_string()
}

struct Cluster {
    key: String,
    count: usize,
    total: f64,
}

/// Detect leaks among the expense transactions of `transactions`
pub fn detect_leaks<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    config: &LeakConfig,
) -> LeakReport {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.into_iter().filter(|t| t.is_expense()) {
        let key = leak_key(&tx.title);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), clusters.len());
                clusters.push(Cluster {
                    key,
                    count: 0,
                    total: 0.0,
                });
                clusters.len() - 1
            }
        };

        let cluster = &mut clusters[slot];
        cluster.count += 1;
        cluster.total += tx.amount.abs();
    }

    let leaks: Vec<Leak> = clusters
        .into_iter()
        .filter_map(|c| {
            let kind = classify(&c, config)?;
            Some(Leak {
                name: c.key,
                frequency: c.count,
                total: c.total,
                kind,
            })
        })
        .collect();

    let total_leak: f64 = leaks.iter().map(|l| l.total).sum();
    debug!(leaks = leaks.len(), total_leak, "Leak detection complete");

    LeakReport { total_leak, leaks }
}

fn classify(cluster: &Cluster, config: &LeakConfig) -> Option<LeakType> {
    let avg = cluster.total / cluster.count as f64;

    // Small Frequent takes precedence over Hidden Fee
    if avg < config.small_amount_threshold && cluster.count >= config.min_occurrences {
        Some(LeakType::SmallFrequent)
    } else if FEE_MARKERS.iter().any(|m| cluster.key.contains(*m)) {
        Some(LeakType::HiddenFee)
    } else {
        None
    }
}
