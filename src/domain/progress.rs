use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config;
use crate::domain::LevelId;

/// Attempt counters for one `tense:pronoun` combo. Created lazily on the
/// first attempt, never deleted.
///
/// `last_practiced` records the most recent *correct* answer; the epoch-0
/// default means "attempted but never answered correctly", which makes the
/// combo maximally stale for review purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboMastery {
  pub correct_count: u32,
  pub total_attempts: u32,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_practiced: DateTime<Utc>,
}

impl ComboMastery {
  pub fn new() -> Self {
    Self {
      correct_count: 0,
      total_attempts: 0,
      last_practiced: DateTime::UNIX_EPOCH,
    }
  }
}

impl Default for ComboMastery {
  fn default() -> Self {
    Self::new()
  }
}

/// Combo key → counters, for one verb within one level
pub type VerbMasteryData = HashMap<String, ComboMastery>;

/// One finished test run on a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAttempt {
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub date: DateTime<Utc>,
  pub score: usize,
  pub total: usize,
  pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
  pub unlocked: bool,
  pub verb_mastery: HashMap<String, VerbMasteryData>,
  pub test_attempts: Vec<TestAttempt>,
  pub test_passed: bool,
}

impl LevelProgress {
  pub fn new(unlocked: bool) -> Self {
    Self {
      unlocked,
      verb_mastery: HashMap::new(),
      test_attempts: Vec::new(),
      test_passed: false,
    }
  }
}

/// The entire persisted learner state. One instance per user; a1 is
/// unlocked by construction, everything else via passed tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
  pub version: u32,
  pub levels: BTreeMap<LevelId, LevelProgress>,
}

impl UserProgress {
  pub fn new() -> Self {
    let mut levels = BTreeMap::new();
    for id in LevelId::ALL {
      levels.insert(id, LevelProgress::new(id == LevelId::A1));
    }
    Self {
      version: config::PROGRESS_VERSION,
      levels,
    }
  }

  pub fn level(&self, id: LevelId) -> Option<&LevelProgress> {
    self.levels.get(&id)
  }

  pub fn level_mut(&mut self, id: LevelId) -> Option<&mut LevelProgress> {
    self.levels.get_mut(&id)
  }

  /// Counters for one combo, if it has ever been attempted
  pub fn combo(&self, level: LevelId, verb_id: &str, combo_key: &str) -> Option<&ComboMastery> {
    self
      .level(level)?
      .verb_mastery
      .get(verb_id)?
      .get(combo_key)
  }
}

impl Default for UserProgress {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_progress_has_all_levels() {
    let progress = UserProgress::new();
    assert_eq!(progress.version, config::PROGRESS_VERSION);
    assert_eq!(progress.levels.len(), 4);
    for id in LevelId::ALL {
      assert!(progress.level(id).is_some());
    }
  }

  #[test]
  fn test_only_a1_unlocked_by_default() {
    let progress = UserProgress::new();
    assert!(progress.level(LevelId::A1).unwrap().unlocked);
    assert!(!progress.level(LevelId::A2).unwrap().unlocked);
    assert!(!progress.level(LevelId::B1).unwrap().unlocked);
    assert!(!progress.level(LevelId::B2).unwrap().unlocked);
  }

  #[test]
  fn test_combo_lookup_missing() {
    let progress = UserProgress::new();
    assert!(progress.combo(LevelId::A1, "etre", "présent:je").is_none());
  }

  #[test]
  fn test_combo_mastery_serializes_camel_case_with_epoch_ms() {
    let combo = ComboMastery::new();
    let json = serde_json::to_value(&combo).unwrap();
    assert_eq!(json["correctCount"], 0);
    assert_eq!(json["totalAttempts"], 0);
    assert_eq!(json["lastPracticed"], 0);
  }

  #[test]
  fn test_progress_json_roundtrip() {
    let mut progress = UserProgress::new();
    progress
      .level_mut(LevelId::A1)
      .unwrap()
      .verb_mastery
      .entry("etre".to_string())
      .or_default()
      .insert("présent:je".to_string(), ComboMastery {
        correct_count: 2,
        total_attempts: 3,
        last_practiced: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
      });

    let json = serde_json::to_string(&progress).unwrap();
    let back: UserProgress = serde_json::from_str(&json).unwrap();
    assert_eq!(back, progress);
  }
}
