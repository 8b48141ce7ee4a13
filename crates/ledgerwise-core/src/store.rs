//! Persistence collaborator
//!
//! The core persists a handful of keyed JSON documents. [`RecordStore`] is the
//! seam; [`MemoryStore`] backs tests and ephemeral sessions and
//! [`crate::db::SqliteStore`] backs the CLI.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Keys of the persisted collections
pub mod keys {
    pub const TRANSACTIONS: &str = "transactions";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const WARRANTIES: &str = "warranties";
    pub const RECEIPTS: &str = "receipts";
    pub const SETTINGS: &str = "settings";
    pub const USER_PROFILE: &str = "user_profile";

    pub const ALL: &[&str] = &[
        TRANSACTIONS,
        SUBSCRIPTIONS,
        WARRANTIES,
        RECEIPTS,
        SETTINGS,
        USER_PROFILE,
    ];
}

/// Key/value persistence for JSON documents
///
/// Implementations must be Send + Sync so a store can be shared across tasks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn put(&self, key: &str, value: Value) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn clear_all(&self) -> Result<()>;

    /// Replace the value under `key`.
    ///
    /// The default is delete-then-put and is NOT atomic: a failure between
    /// the two steps leaves the key empty. Stores that can do better override it.
    async fn replace(&self, key: &str, value: Value) -> Result<()> {
        self.delete(key).await?;
        self.put(key, value).await
    }
}

/// Read and deserialize a document
pub async fn load<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and write a document
pub async fn save<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: RecordStore + ?Sized,
{
    store.put(key, serde_json::to_value(value)?).await
}

/// Serialize and replace a document
pub async fn swap<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: RecordStore + ?Sized,
{
    store.replace(key, serde_json::to_value(value)?).await
}

/// In-memory store
///
/// Writes can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (reads keep working)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Keys currently holding a value
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        // A panic mid-write cannot leave a HashMap half-updated
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("memory store writes disabled")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.check_writable()?;
        self.lock().clear();
        Ok(())
    }

    async fn replace(&self, key: &str, value: Value) -> Result<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Store relying on the default delete-then-put replace
    #[derive(Default)]
    struct TwoPhaseStore {
        inner: MemoryStore,
        fail_puts: AtomicBool,
    }

    #[async_trait]
    impl RecordStore for TwoPhaseStore {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: Value) -> Result<()> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(Error::Io(std::io::Error::other("put failed")));
            }
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.inner.delete(key).await
        }

        async fn clear_all(&self) -> Result<()> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        save(&store, keys::SETTINGS, &json!({"startingBalance": 100.0})).await.unwrap();

        let value: Option<Value> = load(&store, keys::SETTINGS).await.unwrap();
        assert_eq!(value, Some(json!({"startingBalance": 100.0})));
        assert_eq!(store.keys(), vec!["settings".to_string()]);

        store.delete(keys::SETTINGS).await.unwrap();
        assert!(store.get(keys::SETTINGS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryStore::new();
        for key in keys::ALL {
            store.put(key, json!([])).await.unwrap();
        }
        store.clear_all().await.unwrap();
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_failing_writes_leave_values() {
        let store = MemoryStore::new();
        store.put(keys::TRANSACTIONS, json!([1])).await.unwrap();
        store.set_fail_writes(true);

        assert!(store.replace(keys::TRANSACTIONS, json!([2])).await.is_err());
        assert_eq!(store.get(keys::TRANSACTIONS).await.unwrap(), Some(json!([1])));
    }

    #[tokio::test]
    async fn test_default_replace_is_two_phase() {
        let store = TwoPhaseStore::default();
        store.put(keys::TRANSACTIONS, json!(["old"])).await.unwrap();

        store.replace(keys::TRANSACTIONS, json!(["new"])).await.unwrap();
        assert_eq!(store.get(keys::TRANSACTIONS).await.unwrap(), Some(json!(["new"])));

        // A failure after the delete phase leaves the key empty
        store.fail_puts.store(true, Ordering::SeqCst);
        assert!(store.replace(keys::TRANSACTIONS, json!(["newer"])).await.is_err());
        assert!(store.get(keys::TRANSACTIONS).await.unwrap().is_none());
    }
}
