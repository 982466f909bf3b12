pub mod progress_store;
pub mod transfer;

use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// Re-export the public persistence surface
pub use progress_store::ProgressStore;
pub use transfer::{export_progress, parse_progress_file, ImportError};

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error from the underlying blob store
#[derive(Debug)]
pub struct StorageError {
  message: String,
}

impl StorageError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

impl fmt::Display for StorageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Storage unavailable: {}", self.message)
  }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
  fn from(e: rusqlite::Error) -> Self {
    Self::new(e.to_string())
  }
}

/// Key-value blob store the progress state persists through.
///
/// The engine only ever reads and writes whole serialized blobs under a
/// fixed key; anything that can do that (embedded SQLite, a browser's
/// local storage, a test map) is a valid backend.
pub trait Storage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
  fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed blob store: one `blobs` key/value table
pub struct SqliteStorage {
  conn: Connection,
}

impl SqliteStorage {
  pub fn open(path: &Path) -> Result<Self, StorageError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).ok();
    }

    let conn = Connection::open(path).map_err(StorageError::from)?;
    conn
      .execute(
        "CREATE TABLE IF NOT EXISTS blobs (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
      )
      .map_err(StorageError::from)?;
    Ok(Self { conn })
  }

  /// Open the store at the configured path (config.toml > env > default)
  pub fn open_default() -> Result<Self, StorageError> {
    Self::open(&crate::config::load_storage_path())
  }
}

impl Storage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let result: Result<String, _> = self.conn.query_row(
      "SELECT value FROM blobs WHERE key = ?1",
      params![key],
      |row| row.get(0),
    );

    match result {
      Ok(value) => Ok(Some(value)),
      Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    // Try to update the existing row first
    let updated = self.conn.execute(
      "UPDATE blobs SET value = ?1 WHERE key = ?2",
      params![value, key],
    )?;

    if updated == 0 {
      self.conn.execute(
        "INSERT INTO blobs (key, value) VALUES (?1, ?2)",
        params![key, value],
      )?;
    }
    Ok(())
  }

  fn delete(&mut self, key: &str) -> Result<(), StorageError> {
    self
      .conn
      .execute("DELETE FROM blobs WHERE key = ?1", params![key])?;
    Ok(())
  }
}

/// In-memory blob store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
  blobs: HashMap<String, String>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.blobs.get(key).cloned())
  }

  fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    self.blobs.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn delete(&mut self, key: &str) -> Result<(), StorageError> {
    self.blobs.remove(key);
    Ok(())
  }
}
