//! Record id derivation
//!
//! Collaborator output does not guarantee unique ids. Missing or colliding
//! ids are replaced with a SHA-256 digest of the record's content and
//! position, suffixed with a counter if even that collides.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
const ID_LEN: usize = 16;

/// Content-derived id for a record at `position` in its batch
pub fn derive_id(date: &str, title: &str, amount: &str, position: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(b"|");
    hasher.update(title.as_bytes());
    hasher.update(b"|");
    hasher.update(amount.as_bytes());
    hasher.update(b"|");
    hasher.update(position.to_string().as_bytes());

    let digest = hex::encode(hasher.finalize());
    digest[..ID_LEN].to_string()
}

/// Hands out ids that are unique against everything already allocated
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from ids already present (e.g. the current ledger)
    pub fn with_existing<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep `preferred` if it is present and unused, otherwise use `fallback`
    /// (suffixed `-1`, `-2`, ... until unused)
    pub fn allocate(&mut self, preferred: Option<&str>, fallback: impl FnOnce() -> String) -> String {
        if let Some(id) = preferred.map(str::trim).filter(|id| !id.is_empty()) {
            if self.used.insert(id.to_string()) {
                return id.to_string();
            }
        }

        let base = fallback();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        candidate
    }

    /// Allocate a derived id with no preferred value
    pub fn fresh(&mut self, seed: impl FnOnce() -> String) -> String {
        self.allocate(None, seed)
    }
}
