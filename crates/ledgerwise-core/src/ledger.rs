//! The transaction ledger
//!
//! Records are held in insertion order. [`Ledger::all`] presents them newest
//! first: date descending, then time of day descending with untimed records
//! after timed ones on the same day, then insertion order (earliest first).

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// In-memory collection of transactions with unique ids
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger, rejecting duplicate ids
    pub fn from_transactions(transactions: Vec<Transaction>) -> Result<Self> {
        let mut ledger = Self::new();
        ledger.replace_all(transactions)?;
        Ok(ledger)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|t| t.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.entries.iter().find(|t| t.id == id)
    }

    /// Add one transaction
    pub fn add(&mut self, tx: Transaction) -> Result<()> {
        if self.contains(&tx.id) {
            return Err(Error::DuplicateId(tx.id));
        }
        self.entries.push(tx);
        Ok(())
    }

    /// Add several transactions; nothing is added if any id collides
    pub fn add_many(&mut self, transactions: Vec<Transaction>) -> Result<usize> {
        let mut seen: HashSet<&str> = self.entries.iter().map(|t| t.id.as_str()).collect();
        for tx in &transactions {
            if !seen.insert(tx.id.as_str()) {
                return Err(Error::DuplicateId(tx.id.clone()));
            }
        }

        let count = transactions.len();
        self.entries.extend(transactions);
        debug!(count, total = self.entries.len(), "Added transactions to ledger");
        Ok(count)
    }

    /// Swap the entire contents in one step
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        let mut seen = HashSet::new();
        for tx in &transactions {
            if !seen.insert(tx.id.as_str()) {
                return Err(Error::DuplicateId(tx.id.clone()));
            }
        }

        debug!(
            previous = self.entries.len(),
            replacement = transactions.len(),
            "Replacing ledger contents"
        );
        self.entries = transactions;
        Ok(())
    }

    /// Remove by id, returning the removed transaction
    pub fn delete(&mut self, id: &str) -> Option<Transaction> {
        let pos = self.entries.iter().position(|t| t.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All transactions, newest first
    pub fn all(&self) -> Vec<Transaction> {
        let mut sorted = self.entries.clone();
        // sort_by is stable, so insertion order breaks remaining ties
        sorted.sort_by(newest_first);
        sorted
    }

    /// Transactions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter(|t| t.is_expense())
    }

    /// Transactions dated in the given calendar month
    pub fn in_month(&self, year: i32, month: u32) -> impl Iterator<Item = &Transaction> {
        self.entries
            .iter()
            .filter(move |t| t.month() == (year, month))
    }

    /// Consume the ledger, yielding transactions in insertion order
    pub fn into_vec(self) -> Vec<Transaction> {
        self.entries
    }
}

fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date.cmp(&a.date).then_with(|| match (a.time, b.time) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}
