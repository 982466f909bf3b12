//! The canonical progress store.
//!
//! Owns the persisted `UserProgress` and is the only writer. Every
//! mutation clones the live state, applies the change, persists the clone
//! and swaps it in, so snapshots handed to callers are never mutated
//! underneath them. Persistence failures degrade to in-memory operation
//! rather than interrupting the learner (the state is retried on the next
//! save).

use chrono::{DateTime, Utc};

use crate::config;
use crate::db::{LogOnError, Storage};
use crate::domain::{LevelId, TestAttempt, UserProgress};

pub struct ProgressStore<S: Storage> {
  storage: S,
  current: UserProgress,
}

impl<S: Storage> ProgressStore<S> {
  /// Load the persisted state, falling back to a structurally complete
  /// default when the blob is absent, unreadable, corrupt, or carries a
  /// different schema version. A version mismatch is a hard reset, not a
  /// migration.
  pub fn open(storage: S) -> Self {
    let current = Self::load_or_default(&storage);
    Self { storage, current }
  }

  fn load_or_default(storage: &S) -> UserProgress {
    let raw = match storage.get(config::STORAGE_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return UserProgress::new(),
      Err(e) => {
        tracing::warn!("Failed to load progress, starting fresh: {}", e);
        return UserProgress::new();
      }
    };

    match serde_json::from_str::<UserProgress>(&raw) {
      Ok(progress) if progress.version == config::PROGRESS_VERSION => progress,
      Ok(progress) => {
        tracing::warn!(
          "Progress version {} does not match {}, resetting",
          progress.version,
          config::PROGRESS_VERSION
        );
        UserProgress::new()
      }
      Err(e) => {
        tracing::warn!("Stored progress is corrupt, resetting: {}", e);
        UserProgress::new()
      }
    }
  }

  /// The live state. Borrows are cheap; clones via `snapshot` are stable
  /// across later mutations.
  pub fn progress(&self) -> &UserProgress {
    &self.current
  }

  pub fn snapshot(&self) -> UserProgress {
    self.current.clone()
  }

  /// Persist a fully-built next state and make it live
  fn persist(&mut self, next: UserProgress) {
    match serde_json::to_string(&next) {
      Ok(raw) => {
        self
          .storage
          .put(config::STORAGE_KEY, &raw)
          .log_warn("Failed to save progress");
      }
      Err(e) => tracing::warn!("Failed to serialize progress: {}", e),
    }
    self.current = next;
  }

  /// Record one answered question for a combo. The attempt counter always
  /// moves; the correct counter and `last_practiced` move only on a
  /// correct answer, so failed attempts never push a combo out of the
  /// review window.
  pub fn record_combo_attempt(
    &mut self,
    level: LevelId,
    verb_id: &str,
    combo_key: &str,
    correct: bool,
    now: DateTime<Utc>,
  ) {
    let mut next = self.current.clone();
    let Some(level_progress) = next.level_mut(level) else {
      return;
    };

    let combo = level_progress
      .verb_mastery
      .entry(verb_id.to_string())
      .or_default()
      .entry(combo_key.to_string())
      .or_default();

    combo.total_attempts += 1;
    if correct {
      combo.correct_count += 1;
      combo.last_practiced = now;
    }

    self.persist(next);
  }

  /// Append a finished test attempt; `test_passed` is sticky once any
  /// attempt passes
  pub fn record_test_attempt(&mut self, level: LevelId, attempt: TestAttempt) {
    let mut next = self.current.clone();
    let Some(level_progress) = next.level_mut(level) else {
      return;
    };

    if attempt.passed {
      level_progress.test_passed = true;
    }
    level_progress.test_attempts.push(attempt);

    self.persist(next);
  }

  /// Idempotent unlock; already-unlocked levels are left untouched
  pub fn unlock_level(&mut self, level: LevelId) {
    if self
      .current
      .level(level)
      .is_none_or(|progress| progress.unlocked)
    {
      return;
    }

    let mut next = self.current.clone();
    if let Some(level_progress) = next.level_mut(level) {
      level_progress.unlocked = true;
      tracing::info!("Level {} unlocked", level.as_str());
    }
    self.persist(next);
  }

  /// Discard everything and recreate the default state
  pub fn reset_all(&mut self) {
    self
      .storage
      .delete(config::STORAGE_KEY)
      .log_warn("Failed to clear stored progress");
    self.current = UserProgress::new();
  }
}
