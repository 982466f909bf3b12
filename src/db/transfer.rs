//! Progress export and import.
//!
//! Export is a pass-through of the persisted JSON shape. Import is gated
//! by a structural validator that names the exact missing or invalid
//! field, because the user can fix the source file — unlike the silent
//! reset the store applies to its own corrupt blob.

use std::fmt;

use serde_json::Value;

use crate::config;
use crate::domain::{LevelId, UserProgress};

/// Why an imported progress file was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The file is not JSON at all
    NotJson(String),
    /// Top-level `version` is absent or not an integer
    MissingVersion,
    /// The file has a different schema version
    WrongVersion { found: u64, expected: u32 },
    /// Top-level `levels` is absent or not an object
    MissingLevels,
    /// One of the four level keys is absent
    MissingLevel(LevelId),
    /// A level field is absent or has the wrong type
    InvalidLevelField { level: LevelId, field: &'static str },
    /// Structure passed but typed decoding still failed
    Deserialize(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::NotJson(e) => write!(f, "File is not valid JSON: {}", e),
            ImportError::MissingVersion => {
                write!(f, "File has no integer \"version\" field")
            }
            ImportError::WrongVersion { found, expected } => write!(
                f,
                "File is progress version {} but this app expects version {}",
                found, expected
            ),
            ImportError::MissingLevels => {
                write!(f, "File has no \"levels\" object")
            }
            ImportError::MissingLevel(level) => {
                write!(f, "File is missing the \"{}\" level", level.as_str())
            }
            ImportError::InvalidLevelField { level, field } => write!(
                f,
                "Level \"{}\" is missing or has an invalid \"{}\" field",
                level.as_str(),
                field
            ),
            ImportError::Deserialize(e) => {
                write!(f, "File structure is invalid: {}", e)
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Serialize the progress state for download/backup
pub fn export_progress(progress: &UserProgress) -> String {
    serde_json::to_string_pretty(progress).expect("UserProgress serializes to JSON")
}

/// Parse an externally supplied progress file.
///
/// Checks, in order: well-formed JSON, expected version, a `levels`
/// object containing all four level keys, and per level a boolean
/// `unlocked`, object `verbMastery`, array `testAttempts` and boolean
/// `testPassed`. Only then is the value decoded into `UserProgress`, so
/// deeper shape errors (e.g. negative counters) surface through serde.
pub fn parse_progress_file(raw: &str) -> Result<UserProgress, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::NotJson(e.to_string()))?;

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(ImportError::MissingVersion)?;
    if version != config::PROGRESS_VERSION as u64 {
        return Err(ImportError::WrongVersion {
            found: version,
            expected: config::PROGRESS_VERSION,
        });
    }

    let levels = value
        .get("levels")
        .and_then(Value::as_object)
        .ok_or(ImportError::MissingLevels)?;

    for id in LevelId::ALL {
        let level = levels
            .get(id.as_str())
            .ok_or(ImportError::MissingLevel(id))?;

        let field_checks: [(&'static str, fn(&Value) -> bool); 4] = [
            ("unlocked", Value::is_boolean),
            ("verbMastery", Value::is_object),
            ("testAttempts", Value::is_array),
            ("testPassed", Value::is_boolean),
        ];
        for (field, is_valid) in field_checks {
            if !level.get(field).is_some_and(is_valid) {
                return Err(ImportError::InvalidLevelField { level: id, field });
            }
        }
    }

    serde_json::from_value(value).map_err(|e| ImportError::Deserialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStorage, ProgressStore};
    use crate::domain::TestAttempt;
    use chrono::DateTime;

    fn populated_progress() -> UserProgress {
        let mut store = ProgressStore::open(MemoryStorage::new());
        // Millisecond precision, matching what the wire format carries
        let now = DateTime::from_timestamp_millis(1_722_000_000_000).unwrap();
        store.record_combo_attempt(LevelId::A1, "etre", "présent:je", true, now);
        store.record_combo_attempt(LevelId::A1, "etre", "présent:je", false, now);
        store.record_combo_attempt(LevelId::A1, "aller", "passé_composé:vous", true, now);
        store.record_test_attempt(
            LevelId::A1,
            TestAttempt { date: now, score: 36, total: 40, passed: true },
        );
        store.unlock_level(LevelId::A2);
        store.snapshot()
    }

    #[test]
    fn test_roundtrip_reconstructs_state() {
        let progress = populated_progress();
        let exported = export_progress(&progress);
        let imported = parse_progress_file(&exported).unwrap();
        assert_eq!(imported, progress);
    }

    #[test]
    fn test_export_of_default_is_importable() {
        let exported = export_progress(&UserProgress::new());
        assert!(parse_progress_file(&exported).is_ok());
    }

    #[test]
    fn test_not_json_rejected() {
        let err = parse_progress_file("definitely not json").unwrap_err();
        assert!(matches!(err, ImportError::NotJson(_)));
    }

    #[test]
    fn test_missing_version_rejected() {
        let err = parse_progress_file("{\"levels\": {}}").unwrap_err();
        assert_eq!(err, ImportError::MissingVersion);
    }

    #[test]
    fn test_non_integer_version_rejected() {
        let err = parse_progress_file("{\"version\": \"1\", \"levels\": {}}").unwrap_err();
        assert_eq!(err, ImportError::MissingVersion);
    }

    #[test]
    fn test_wrong_version_rejected_with_both_versions() {
        let err = parse_progress_file("{\"version\": 99, \"levels\": {}}").unwrap_err();
        assert_eq!(
            err,
            ImportError::WrongVersion { found: 99, expected: config::PROGRESS_VERSION }
        );
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_missing_levels_rejected() {
        let err = parse_progress_file("{\"version\": 1}").unwrap_err();
        assert_eq!(err, ImportError::MissingLevels);
    }

    #[test]
    fn test_missing_level_key_rejected() {
        let mut value: Value =
            serde_json::from_str(&export_progress(&UserProgress::new())).unwrap();
        value["levels"].as_object_mut().unwrap().remove("b2");

        let err = parse_progress_file(&value.to_string()).unwrap_err();
        assert_eq!(err, ImportError::MissingLevel(LevelId::B2));
        assert!(err.to_string().contains("b2"));
    }

    #[test]
    fn test_invalid_level_field_names_the_field() {
        let mut value: Value =
            serde_json::from_str(&export_progress(&UserProgress::new())).unwrap();
        value["levels"]["a2"]["testAttempts"] = Value::from("oops");

        let err = parse_progress_file(&value.to_string()).unwrap_err();
        assert_eq!(
            err,
            ImportError::InvalidLevelField { level: LevelId::A2, field: "testAttempts" }
        );
        assert!(err.to_string().contains("testAttempts"));
    }

    #[test]
    fn test_negative_counters_rejected_by_decode() {
        let mut value: Value =
            serde_json::from_str(&export_progress(&populated_progress())).unwrap();
        value["levels"]["a1"]["verbMastery"]["etre"]["présent:je"]["correctCount"] =
            Value::from(-1);

        let err = parse_progress_file(&value.to_string()).unwrap_err();
        assert!(matches!(err, ImportError::Deserialize(_)));
    }
}
