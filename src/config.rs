//! Application configuration constants.
//!
//! This module centralizes all tunable values so the scheduling heuristics
//! are adjusted in one place rather than scattered through the codebase.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Storage Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    storage: Option<StorageConfig>,
}

#[derive(Debug, Deserialize)]
struct StorageConfig {
    path: Option<String>,
    data_dir: Option<String>,
}

/// Load storage path with priority: config.toml > .env > default
pub fn load_storage_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(storage) = config.storage {
                if let Some(path) = storage.path {
                    tracing::info!("Using storage from config.toml: {}", path);
                    return PathBuf::from(path);
                }
            }
        }
    }

    // Priority 2: .env CONJCOACH_DB
    if let Ok(path) = std::env::var("CONJCOACH_DB") {
        tracing::info!("Using storage from CONJCOACH_DB env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/progress.db");
    tracing::info!("Using default storage path: {}", default.display());
    default
}

/// Load catalog data directory with priority: config.toml > .env > default.
/// The built-in catalog is used when the directory has no data files.
pub fn load_data_dir() -> PathBuf {
    let _ = dotenvy::dotenv();

    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(storage) = config.storage {
                if let Some(dir) = storage.data_dir {
                    return PathBuf::from(dir);
                }
            }
        }
    }

    if let Ok(dir) = std::env::var("CONJCOACH_DATA_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from("data")
}

// ==================== Progress Schema ====================

/// Schema version embedded in the persisted progress blob.
/// A mismatch on load is a hard reset, not a migration.
pub const PROGRESS_VERSION: u32 = 1;

/// Fixed key the progress blob is stored under
pub const STORAGE_KEY: &str = "conjcoach-progress";

// ==================== Mastery Thresholds ====================

/// Minimum correct answers before a combo can count as mastered
pub const MASTERY_CORRECT_THRESHOLD: u32 = 3;

/// Minimum lifetime accuracy (correct / total) for mastery
pub const MASTERY_ACCURACY_THRESHOLD: f64 = 0.66;

// ==================== Practice Selection ====================

/// Width of the priority tolerance band: combos within
/// `min_priority + PRACTICE_PRIORITY_BAND` are shuffled together instead of
/// drilled in a fixed order
pub const PRACTICE_PRIORITY_BAND: u32 = 1;

/// Priority assigned to already-mastered combos (deprioritized, never excluded)
pub const MASTERED_PRIORITY: u32 = 100;

// ==================== Review Scheduling ====================

/// Hours since the last correct answer before a combo is due for review
pub const REVIEW_STALENESS_HOURS: i64 = 48;

/// Default number of items in a review session
pub const REVIEW_SESSION_SIZE: usize = 20;
