//! Spaced review scheduling.
//!
//! Scans every recorded combo across all levels for staleness (time since
//! the last correct answer), assembles a diversity-capped session out of
//! the stale ones, and tracks an in-flight session including the
//! retry-failures restart flow.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;
use crate::config;
use crate::db::{ProgressStore, Storage};
use crate::domain::{parse_combo_key, LevelId, Pronoun, Tense, UserProgress};
use crate::validation::{validate_answer, ValidationResult};

/// One stale combo due for review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
  pub level_id: LevelId,
  pub verb_id: String,
  pub combo_key: String,
  pub tense: Tense,
  pub pronoun: Pronoun,
  pub accepted_answers: Vec<String>,
  pub last_practiced: DateTime<Utc>,
  pub staleness: Duration,
  pub correct_count: u32,
}

/// Informational counts for the review landing view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSummary {
  /// Distinct (level, verb) entries with at least one stale combo
  pub due_verb_count: usize,
  /// Distinct (level, verb) entries with at least one attempted combo
  pub practiced_verb_count: usize,
  /// Largest staleness seen, zero when nothing is due
  pub oldest_staleness: Duration,
}

fn staleness_threshold() -> Duration {
  Duration::hours(config::REVIEW_STALENESS_HOURS)
}

/// Collect every combo due for review, most stale first.
///
/// Only attempted combos are eligible: a combo never practiced cannot be
/// stale. A combo attempted but never answered correctly keeps the epoch-0
/// `last_practiced` sentinel and therefore sorts ahead of everything.
/// Ties break toward fewer correct answers, then by verb and combo key so
/// the order is fully deterministic.
pub fn collect_review_items(
  progress: &UserProgress,
  catalog: &Catalog,
  now: DateTime<Utc>,
) -> Vec<ReviewItem> {
  let mut items = Vec::new();

  for level_id in LevelId::ALL {
    let Some(level_progress) = progress.level(level_id) else {
      continue;
    };

    for (verb_id, verb_mastery) in &level_progress.verb_mastery {
      let Some(verb) = catalog.verb(verb_id) else {
        continue;
      };

      for (key, combo) in verb_mastery {
        if combo.total_attempts == 0 {
          continue;
        }
        let Some((tense, pronoun)) = parse_combo_key(key) else {
          continue;
        };
        let Some(answers) = verb.accepted_answers(tense, pronoun) else {
          continue;
        };

        let staleness = now.signed_duration_since(combo.last_practiced);
        if staleness < staleness_threshold() {
          continue;
        }

        items.push(ReviewItem {
          level_id,
          verb_id: verb_id.clone(),
          combo_key: key.clone(),
          tense,
          pronoun,
          accepted_answers: answers.to_vec(),
          last_practiced: combo.last_practiced,
          staleness,
          correct_count: combo.correct_count,
        });
      }
    }
  }

  items.sort_by(|a, b| {
    b.staleness
      .cmp(&a.staleness)
      .then(a.correct_count.cmp(&b.correct_count))
      .then_with(|| a.verb_id.cmp(&b.verb_id))
      .then_with(|| a.combo_key.cmp(&b.combo_key))
  });

  items
}

/// Assemble a review session from the staleness-ordered item list.
///
/// A per-verb cap of `ceil(size / distinct verbs) + 1` keeps one verb from
/// monopolizing the session; the selected subset is then shuffled so
/// presentation order does not telegraph staleness.
pub fn select_review_session<R: Rng + ?Sized>(
  items: &[ReviewItem],
  size: usize,
  rng: &mut R,
) -> Vec<ReviewItem> {
  if items.is_empty() || size == 0 {
    return Vec::new();
  }

  let distinct_verbs = items
    .iter()
    .map(|i| i.verb_id.as_str())
    .collect::<HashSet<_>>()
    .len();
  let cap = size.div_ceil(distinct_verbs) + 1;

  let mut verb_counts: HashMap<&str, usize> = HashMap::new();
  let mut selected = Vec::new();

  for item in items {
    let count = verb_counts.entry(item.verb_id.as_str()).or_insert(0);
    if *count >= cap {
      continue;
    }
    *count += 1;
    selected.push(item.clone());
    if selected.len() >= size {
      break;
    }
  }

  selected.shuffle(rng);
  selected
}

/// Aggregate counts for display; never drives scheduling decisions
pub fn review_summary(progress: &UserProgress, now: DateTime<Utc>) -> ReviewSummary {
  let mut due_verb_count = 0;
  let mut practiced_verb_count = 0;
  let mut oldest_staleness = Duration::zero();

  for level_id in LevelId::ALL {
    let Some(level_progress) = progress.level(level_id) else {
      continue;
    };

    for verb_mastery in level_progress.verb_mastery.values() {
      let mut has_practiced = false;
      let mut has_due = false;

      for combo in verb_mastery.values() {
        if combo.total_attempts == 0 {
          continue;
        }
        has_practiced = true;

        let staleness = now.signed_duration_since(combo.last_practiced);
        if staleness >= staleness_threshold() {
          has_due = true;
          if staleness > oldest_staleness {
            oldest_staleness = staleness;
          }
        }
      }

      if !has_practiced {
        continue;
      }
      practiced_verb_count += 1;
      if has_due {
        due_verb_count += 1;
      }
    }
  }

  ReviewSummary {
    due_verb_count,
    practiced_verb_count,
    oldest_staleness,
  }
}

/// A submitted answer within a review session
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAnswer {
  pub item: ReviewItem,
  pub user_answer: String,
  pub result: ValidationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewScore {
  pub correct: usize,
  pub incorrect: usize,
  pub total: usize,
}

/// An in-flight review session: a fixed item list walked front to back
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
  items: Vec<ReviewItem>,
  index: usize,
  answers: Vec<ReviewAnswer>,
}

impl ReviewSession {
  pub fn new(items: Vec<ReviewItem>) -> Self {
    Self {
      items,
      index: 0,
      answers: Vec::new(),
    }
  }

  /// Collect everything due and assemble a default-size session
  pub fn start<R: Rng + ?Sized>(
    progress: &UserProgress,
    catalog: &Catalog,
    now: DateTime<Utc>,
    rng: &mut R,
  ) -> ReviewSession {
    let items = collect_review_items(progress, catalog, now);
    ReviewSession::new(select_review_session(&items, config::REVIEW_SESSION_SIZE, rng))
  }

  pub fn current(&self) -> Option<&ReviewItem> {
    self.items.get(self.index)
  }

  pub fn is_finished(&self) -> bool {
    self.index >= self.items.len()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn answers(&self) -> &[ReviewAnswer] {
    &self.answers
  }

  /// Validate and record the answer for the current item, then advance.
  /// Returns None once the session is finished.
  pub fn submit_answer<S: Storage>(
    &mut self,
    answer: &str,
    store: &mut ProgressStore<S>,
    now: DateTime<Utc>,
  ) -> Option<ValidationResult> {
    let item = self.items.get(self.index)?.clone();
    let result = validate_answer(answer, &item.accepted_answers);

    store.record_combo_attempt(
      item.level_id,
      &item.verb_id,
      &item.combo_key,
      result.correct,
      now,
    );

    self.answers.push(ReviewAnswer {
      item,
      user_answer: answer.to_string(),
      result: result.clone(),
    });
    self.index += 1;

    Some(result)
  }

  pub fn score(&self) -> ReviewScore {
    let correct = self.answers.iter().filter(|a| a.result.correct).count();
    ReviewScore {
      correct,
      incorrect: self.answers.len() - correct,
      total: self.answers.len(),
    }
  }

  /// Build a follow-up session scoped to the combos answered incorrectly
  /// in this one, re-running the collect → cap → shuffle pipeline against
  /// that narrowed set. Empty when everything was answered correctly.
  pub fn restart_with_failures<R: Rng + ?Sized>(
    &self,
    progress: &UserProgress,
    catalog: &Catalog,
    now: DateTime<Utc>,
    size: usize,
    rng: &mut R,
  ) -> ReviewSession {
    let wrong: HashSet<(LevelId, &str, &str)> = self
      .answers
      .iter()
      .filter(|a| !a.result.correct)
      .map(|a| {
        (
          a.item.level_id,
          a.item.verb_id.as_str(),
          a.item.combo_key.as_str(),
        )
      })
      .collect();

    if wrong.is_empty() {
      return ReviewSession::default();
    }

    let items: Vec<ReviewItem> = collect_review_items(progress, catalog, now)
      .into_iter()
      .filter(|item| {
        wrong.contains(&(item.level_id, item.verb_id.as_str(), item.combo_key.as_str()))
      })
      .collect();

    ReviewSession::new(select_review_session(&items, size, rng))
  }
}
