//! Mastery model: pure functions deriving combo/verb/level mastery state
//! from the raw attempt counters.
//!
//! Nothing here is cached or persisted; every call recomputes from the
//! counters so the store stays the single source of truth.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::{combo_key, pronouns_for, ComboMastery, LevelProgress, Tense, VerbEntry, VerbMasteryData};

/// Mastered/total combo counts for one verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbProgress {
  pub mastered: usize,
  pub total: usize,
}

/// Verb progress plus display totals: per-combo correct answers capped at
/// the mastery threshold, against the threshold-weighted combo count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedVerbProgress {
  pub mastered: usize,
  pub total: usize,
  pub total_correct: u32,
  pub total_needed: u32,
}

/// A combo is mastered once it has enough correct answers and the lifetime
/// accuracy clears the threshold
pub fn is_combo_mastered(combo: Option<&ComboMastery>) -> bool {
  let Some(combo) = combo else {
    return false;
  };
  if combo.correct_count < config::MASTERY_CORRECT_THRESHOLD {
    return false;
  }
  if combo.total_attempts == 0 {
    return false;
  }
  combo.correct_count as f64 / combo.total_attempts as f64 >= config::MASTERY_ACCURACY_THRESHOLD
}

/// All combo keys applicable to a verb under a tense list: tense-major in
/// the given tense order, pronoun-minor in declaration order, imperative
/// pronoun subset, combos without accepted answers skipped
pub fn combos_for_verb(verb: &VerbEntry, tenses: &[Tense]) -> Vec<String> {
  let mut combos = Vec::new();
  for &tense in tenses {
    if !verb.conjugations.contains_key(&tense) {
      continue;
    }
    for &pronoun in pronouns_for(tense) {
      if verb.accepted_answers(tense, pronoun).is_some() {
        combos.push(combo_key(tense, pronoun));
      }
    }
  }
  combos
}

/// A verb is dominated when every applicable combo is mastered
pub fn is_verb_dominated(
  verb_mastery: Option<&VerbMasteryData>,
  verb: &VerbEntry,
  tenses: &[Tense],
) -> bool {
  let Some(mastery) = verb_mastery else {
    return false;
  };
  combos_for_verb(verb, tenses)
    .iter()
    .all(|key| is_combo_mastered(mastery.get(key)))
}

pub fn verb_progress(
  verb_mastery: Option<&VerbMasteryData>,
  verb: &VerbEntry,
  tenses: &[Tense],
) -> VerbProgress {
  let combos = combos_for_verb(verb, tenses);
  let mastered = combos
    .iter()
    .filter(|key| is_combo_mastered(verb_mastery.and_then(|m| m.get(*key))))
    .count();
  VerbProgress {
    mastered,
    total: combos.len(),
  }
}

/// Progress including capped correct-answer totals for display
pub fn detailed_verb_progress(
  verb_mastery: Option<&VerbMasteryData>,
  verb: &VerbEntry,
  tenses: &[Tense],
) -> DetailedVerbProgress {
  let combos = combos_for_verb(verb, tenses);
  let base = verb_progress(verb_mastery, verb, tenses);
  let total_correct = combos
    .iter()
    .filter_map(|key| verb_mastery.and_then(|m| m.get(key)))
    .map(|combo| combo.correct_count.min(config::MASTERY_CORRECT_THRESHOLD))
    .sum();
  DetailedVerbProgress {
    mastered: base.mastered,
    total: base.total,
    total_correct,
    total_needed: combos.len() as u32 * config::MASTERY_CORRECT_THRESHOLD,
  }
}

/// Mastered share of all combos across a level's verbs, rounded to the
/// nearest integer percent. 0 when the level has no combos.
pub fn level_completion_percent(
  level_progress: &LevelProgress,
  verbs: &[&VerbEntry],
  tenses: &[Tense],
) -> u32 {
  let mut total_mastered = 0usize;
  let mut total_combos = 0usize;

  for verb in verbs {
    let progress = verb_progress(level_progress.verb_mastery.get(&verb.id), verb, tenses);
    total_mastered += progress.mastered;
    total_combos += progress.total;
  }

  if total_combos == 0 {
    return 0;
  }
  ((total_mastered as f64 / total_combos as f64) * 100.0).round() as u32
}

pub fn all_verbs_dominated(
  level_progress: &LevelProgress,
  verbs: &[&VerbEntry],
  tenses: &[Tense],
) -> bool {
  verbs
    .iter()
    .all(|verb| is_verb_dominated(level_progress.verb_mastery.get(&verb.id), verb, tenses))
}
