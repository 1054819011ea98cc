//! Persistent store trait and its SQLite implementation.
//!
//! The store is a durable key/value surface holding one
//! `"<kind>-value"` / `"<kind>-timestamp"` pair per resource kind. Every
//! operation is infallible from the caller's point of view: an unavailable
//! or failing backend degrades to a cache miss, never an error - the
//! in-memory cache cell stays authoritative for the process.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Durable key/value surface backing the cache.
///
/// Implementations must swallow (and log) backend failures; callers invoke
/// these unconditionally and never see storage errors.
pub trait PersistentStore: Send + Sync {
  /// Read a value, `None` on miss or backend failure.
  fn read(&self, key: &str) -> Option<String>;

  /// Write a value, silently dropped on backend failure.
  fn write(&self, key: &str, value: &str);

  /// Remove a key if present.
  fn remove(&self, key: &str);
}

/// Store implementation that persists nothing.
/// Used when durable storage is unavailable or disabled - all operations are no-ops.
pub struct NoopStore;

impl PersistentStore for NoopStore {
  fn read(&self, _key: &str) -> Option<String> {
    None // Always miss
  }

  fn write(&self, _key: &str, _value: &str) {
    // Discard
  }

  fn remove(&self, _key: &str) {
    // Discard
  }
}

/// In-memory store backed by a `HashMap`. Shareable between cache instances
/// in tests to simulate separate processes over one durable surface.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<std::collections::HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl PersistentStore for MemoryStore {
  fn read(&self, key: &str) -> Option<String> {
    self.entries.lock().ok()?.get(key).cloned()
  }

  fn write(&self, key: &str, value: &str) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.insert(key.to_string(), value.to_string());
    }
  }

  fn remove(&self, key: &str) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.remove(key);
    }
  }
}

/// SQLite-backed store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

/// Schema for the key/value table.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Open an in-memory database (tests, ephemeral runs).
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("langcache").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

impl PersistentStore for SqliteStore {
  fn read(&self, key: &str) -> Option<String> {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("cache store lock poisoned on read: {}", e);
        return None;
      }
    };

    match conn.query_row(
      "SELECT value FROM cache_entries WHERE key = ?",
      params![key],
      |row| row.get::<_, String>(0),
    ) {
      Ok(value) => Some(value),
      Err(rusqlite::Error::QueryReturnedNoRows) => None,
      Err(e) => {
        warn!("cache store read failed for {}: {}", key, e);
        None
      }
    }
  }

  fn write(&self, key: &str, value: &str) {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("cache store lock poisoned on write: {}", e);
        return;
      }
    };

    if let Err(e) = conn.execute(
      "INSERT OR REPLACE INTO cache_entries (key, value, written_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    ) {
      warn!("cache store write failed for {}: {}", key, e);
    }
  }

  fn remove(&self, key: &str) {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("cache store lock poisoned on remove: {}", e);
        return;
      }
    };

    if let Err(e) = conn.execute("DELETE FROM cache_entries WHERE key = ?", params![key]) {
      warn!("cache store remove failed for {}: {}", key, e);
    }
  }
}
