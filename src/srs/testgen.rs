//! Level test generation and grading.
//!
//! A test is a fixed-size random draw over every (verb, tense, pronoun)
//! triple in scope, constrained so every in-scope tense appears at least
//! once and no single verb dominates. Content varies between runs by
//! design; structural properties (coverage, caps, count) are what tests
//! assert, with a seeded generator.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::db::{ProgressStore, Storage};
use crate::domain::{pronouns_for, LevelDefinition, LevelId, Pronoun, Tense, TestAttempt, VerbEntry};
use crate::validation::{validate_answer, ValidationResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TestQuestion {
  pub verb_id: String,
  pub infinitive: String,
  pub tense: Tense,
  pub pronoun: Pronoun,
  pub accepted_answers: Vec<String>,
}

/// Generate the question list for a level test.
///
/// Passes, in order: tense coverage (one random pick per in-scope tense),
/// diversity fill under a per-verb cap of `ceil(count / verbs) + 1`, an
/// uncapped fallback when the cap left the test short, and a final
/// shuffle so the coverage picks do not cluster at the front. Produces
/// fewer than `count` questions only when the pool itself is too small.
pub fn generate_test_questions<R: Rng + ?Sized>(
  level: &LevelDefinition,
  verbs: &[&VerbEntry],
  rng: &mut R,
) -> Vec<TestQuestion> {
  // Full candidate pool over the level's tense/pronoun space
  let mut pool = Vec::new();
  for verb in verbs {
    for &tense in &level.tenses {
      if !verb.conjugations.contains_key(&tense) {
        continue;
      }
      for &pronoun in pronouns_for(tense) {
        if let Some(answers) = verb.accepted_answers(tense, pronoun) {
          pool.push(TestQuestion {
            verb_id: verb.id.clone(),
            infinitive: verb.infinitive.clone(),
            tense,
            pronoun,
            accepted_answers: answers.to_vec(),
          });
        }
      }
    }
  }

  if pool.is_empty() {
    return Vec::new();
  }

  let count = level.test_question_count;
  let mut picked: HashSet<usize> = HashSet::new();

  // Tense coverage: one question per tense that has any candidates
  for &tense in &level.tenses {
    let tense_pool: Vec<usize> = (0..pool.len())
      .filter(|&i| pool[i].tense == tense)
      .collect();
    if tense_pool.is_empty() {
      continue;
    }
    picked.insert(tense_pool[rng.random_range(0..tense_pool.len())]);
  }

  // Diversity fill under the per-verb cap
  let max_per_verb = count.div_ceil(verbs.len()) + 1;
  let mut verb_counts: HashMap<&str, usize> = HashMap::new();
  for &i in &picked {
    *verb_counts.entry(pool[i].verb_id.as_str()).or_insert(0) += 1;
  }

  let mut remaining: Vec<usize> = (0..pool.len()).filter(|i| !picked.contains(i)).collect();
  remaining.shuffle(rng);

  for &i in &remaining {
    if picked.len() >= count {
      break;
    }
    let current = verb_counts.entry(pool[i].verb_id.as_str()).or_insert(0);
    if *current >= max_per_verb {
      continue;
    }
    *current += 1;
    picked.insert(i);
  }

  // Fallback: the cap was too restrictive, fill from whatever is left
  if picked.len() < count {
    for &i in &remaining {
      if picked.len() >= count {
        break;
      }
      picked.insert(i);
    }
  }

  let mut selected: Vec<TestQuestion> = picked.into_iter().map(|i| pool[i].clone()).collect();
  selected.shuffle(rng);
  selected
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestAnswer {
  pub question: TestQuestion,
  pub user_answer: String,
  pub result: ValidationResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestScore {
  pub correct: usize,
  pub total: usize,
}

/// An in-flight test: fixed question list, one answer per question.
/// Unlike practice and review, test answers do not feed combo counters.
#[derive(Debug, Clone)]
pub struct TestSession {
  level_id: LevelId,
  pass_threshold: f64,
  questions: Vec<TestQuestion>,
  index: usize,
  answers: Vec<TestAnswer>,
}

impl TestSession {
  pub fn start<R: Rng + ?Sized>(
    level: &LevelDefinition,
    verbs: &[&VerbEntry],
    rng: &mut R,
  ) -> Self {
    Self {
      level_id: level.id,
      pass_threshold: level.pass_threshold,
      questions: generate_test_questions(level, verbs, rng),
      index: 0,
      answers: Vec::new(),
    }
  }

  pub fn level_id(&self) -> LevelId {
    self.level_id
  }

  pub fn current(&self) -> Option<&TestQuestion> {
    self.questions.get(self.index)
  }

  pub fn is_finished(&self) -> bool {
    self.index >= self.questions.len()
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }

  pub fn answers(&self) -> &[TestAnswer] {
    &self.answers
  }

  /// Grade the current question and advance. None once finished.
  pub fn submit_answer(&mut self, answer: &str) -> Option<ValidationResult> {
    let question = self.questions.get(self.index)?.clone();
    let result = validate_answer(answer, &question.accepted_answers);

    self.answers.push(TestAnswer {
      question,
      user_answer: answer.to_string(),
      result: result.clone(),
    });
    self.index += 1;

    Some(result)
  }

  pub fn score(&self) -> TestScore {
    TestScore {
      correct: self.answers.iter().filter(|a| a.result.correct).count(),
      total: self.answers.len(),
    }
  }

  /// The attempt record for a completed test. None while questions remain.
  pub fn finish(&self, now: DateTime<Utc>) -> Option<TestAttempt> {
    if !self.is_finished() {
      return None;
    }
    let score = self.score();
    let passed =
      score.total > 0 && score.correct as f64 / score.total as f64 >= self.pass_threshold;
    Some(TestAttempt {
      date: now,
      score: score.correct,
      total: score.total,
      passed,
    })
  }
}

/// Record a finished attempt and, on a pass, unlock the next level.
/// This is the only path that flips a level's `unlocked` gate.
pub fn apply_test_result<S: Storage>(
  store: &mut ProgressStore<S>,
  level_id: LevelId,
  attempt: &TestAttempt,
) {
  store.record_test_attempt(level_id, attempt.clone());
  if attempt.passed {
    if let Some(next) = level_id.next() {
      store.unlock_level(next);
    }
  }
}
