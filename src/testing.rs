//! Test utilities for storage setup.
//!
//! Provides a helper that initializes a SQLite-backed blob store in a
//! temporary directory, eliminating setup duplication in test code.

use std::path::Path;
use tempfile::TempDir;

use crate::db::{SqliteStorage, StorageError};

/// Test environment with an initialized blob store.
///
/// The temporary directory is kept alive alongside the storage so files
/// persist for the duration of the test and are cleaned up on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for storage file persistence)
    pub temp: TempDir,
    /// Blob store backed by a database file inside `temp`
    pub storage: SqliteStorage,
}

impl TestEnv {
    pub fn new() -> Result<Self, StorageError> {
        let temp = TempDir::new().map_err(|e| StorageError::new(e.to_string()))?;
        let storage = SqliteStorage::open(&temp.path().join("test.db"))?;
        Ok(Self { temp, storage })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

/// Install a test subscriber once so `RUST_LOG` controls test log output.
/// Safe to call from every test; later calls are no-ops.
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conjcoach=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
