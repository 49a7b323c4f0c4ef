//! Key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Provide the `get/set/remove` string slot API the note store persists to.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set_item` replaces any prior value for the key atomically.
//! - `get_item` on a missing key is `Ok(None)`, not an error.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Key-value persistence error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Schema is missing pieces the store depends on.
    InvalidSchema(String),
    /// Backend refused the read without a transport error.
    ReadRejected(String),
    /// Backend refused the write without a transport error.
    WriteRejected(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidSchema(message) => write!(f, "invalid storage schema: {message}"),
            Self::ReadRejected(message) => write!(f, "read rejected: {message}"),
            Self::WriteRejected(message) => write!(f, "write rejected: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidSchema(_) | Self::ReadRejected(_) | Self::WriteRejected(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String slot storage keyed by name.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> RepoResult<()>;
    fn remove_item(&mut self, key: &str) -> RepoResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> RepoResult<()> {
        (**self).remove_item(key)
    }
}

/// SQLite-backed slot store over the `kv_store` table.
///
/// Owns its connection so it can move to the save worker thread.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `InvalidSchema` when `kv_store` is missing (connection not opened
    ///   through `open_db`).
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'
            );",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::InvalidSchema(
                "table `kv_store` does not exist".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=repo status=ok key={key} bytes={}",
            value.len()
        );
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// In-process slot store.
///
/// Clones share one map, so a test can keep a handle while the store itself
/// moves to the save worker. Reads and writes can be switched off to
/// simulate a damaged or full device.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    items: Arc<Mutex<HashMap<String, String>>>,
    reject_reads: Arc<AtomicBool>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with one slot value.
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().insert(key.to_string(), value.to_string());
        store
    }

    /// Makes every subsequent `get_item` fail when `true`.
    pub fn reject_reads(&self, reject: bool) {
        self.reject_reads.store(reject, Ordering::SeqCst);
    }

    /// Makes every subsequent `set_item`/`remove_item` fail when `true`.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Current value without going through the trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings.
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self, key: &str) -> RepoResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RepoError::WriteRejected(format!(
                "memory store is read-only (key `{key}`)"
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        if self.reject_reads.load(Ordering::SeqCst) {
            return Err(RepoError::ReadRejected(format!(
                "memory store is unreadable (key `{key}`)"
            )));
        }
        Ok(self.peek(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.check_writable(key)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> RepoResult<()> {
        self.check_writable(key)?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, RepoError, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn sqlite_store_upserts_and_removes() {
        let mut store = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();
        assert_eq!(store.get_item("notes").unwrap(), None);

        store.set_item("notes", "[]").unwrap();
        store.set_item("notes", "[1]").unwrap();
        assert_eq!(store.get_item("notes").unwrap().as_deref(), Some("[1]"));

        store.remove_item("notes").unwrap();
        assert_eq!(store.get_item("notes").unwrap(), None);
    }

    #[test]
    fn sqlite_store_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKeyValueStore::try_new(conn).err().unwrap();
        assert!(matches!(err, RepoError::InvalidSchema(_)));
    }

    #[test]
    fn memory_store_clones_share_items_and_write_switch() {
        let handle = MemoryKeyValueStore::new();
        let mut store = handle.clone();

        store.set_item("k", "v").unwrap();
        assert_eq!(handle.peek("k").as_deref(), Some("v"));

        handle.reject_writes(true);
        let err = store.set_item("k", "w").unwrap_err();
        assert!(matches!(err, RepoError::WriteRejected(_)));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));

        handle.reject_reads(true);
        let err = store.get_item("k").unwrap_err();
        assert!(matches!(err, RepoError::ReadRejected(_)));
        assert_eq!(handle.peek("k").as_deref(), Some("v"));
    }
}
