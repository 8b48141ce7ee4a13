//! SQLite-backed record store with connection pooling
//!
//! Documents live in a single key/value table. The database is encrypted
//! with SQLCipher when a passphrase is supplied.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::RecordStore;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "LEDGERWISE_DB_KEY";

/// Argon2 salt for record-store keys; bump the version to rekey every store
const KEY_SALT: &[u8] = b"ledgerwise:record-store:v1";

/// Raw SQLCipher key length in bytes
const KEY_LEN: usize = 32;

/// Derive a raw SQLCipher key from a passphrase using Argon2id
///
/// The salt is fixed so the same passphrase opens the database wherever it
/// is moved. The result is hex, ready for a `PRAGMA key = 'x"..."'` blob.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::Argon2;

    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), KEY_SALT, &mut key)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    Ok(hex::encode(key))
}

/// Record store over a pooled SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    db_path: String,
    encrypted: bool,
}

impl SqliteStore {
    /// Open an encrypted database
    ///
    /// Requires `LEDGERWISE_DB_KEY` to be set. Use `new_unencrypted()` for
    /// development without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for an unencrypted database.",
                DB_KEY_ENV
            ))),
        }
    }

    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection must be keyed before first use
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(4).build(manager)?
        } else {
            Pool::builder().max_size(4).build(manager)?
        };

        let store = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
        };
        store.run_migrations()?;

        info!(path, encrypted = store.encrypted, "Opened record store");
        Ok(store)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because each pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "ledgerwise_test_{}_{}.db",
            std::process::id(),
            id
        ));

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Self::new_unencrypted(&path.to_string_lossy())
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Keys that currently hold a document, with their last write time
    pub fn stored_keys(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, updated_at FROM records ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(rows)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- One JSON document per collection
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        Ok(())
    }

    fn get_sync(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn put_sync(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO records (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, serde_json::to_string(value)?],
        )?;
        debug!(key, "Stored document");
        Ok(())
    }

    fn delete_sync(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM records WHERE key = ?", params![key])?;
        Ok(())
    }

    fn clear_sync(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM records", [])?;
        info!("Record store cleared");
        Ok(())
    }

    /// Delete and insert inside one SQL transaction
    fn replace_sync(&self, key: &str, value: &Value) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM records WHERE key = ?", params![key])?;
        tx.execute(
            "INSERT INTO records (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![key, serde_json::to_string(value)?],
        )?;
        tx.commit()?;
        debug!(key, "Replaced document");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_sync(key)
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        self.put_sync(key, &value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_sync(key)
    }

    async fn clear_all(&self) -> Result<()> {
        self.clear_sync()
    }

    async fn replace(&self, key: &str, value: Value) -> Result<()> {
        self.replace_sync(key, &value)
    }
}
