//! Practice question selection biased toward weak and unseen combos.
//!
//! Every applicable combo gets a priority score (lower = more urgent):
//! never attempted beats everything, then fewest correct answers first,
//! with mastered combos kept at the back of the queue but never excluded
//! so a learner can still drill a finished verb on demand.

use rand::Rng;

use crate::config;
use crate::domain::{parse_combo_key, ComboMastery, Pronoun, Tense, VerbEntry, VerbMasteryData};
use crate::mastery::{combos_for_verb, is_combo_mastered};

/// The next question to ask for a verb
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeQuestion {
  pub tense: Tense,
  pub pronoun: Pronoun,
  pub accepted_answers: Vec<String>,
}

/// Priority score for one combo, lower = more urgent
fn combo_priority(combo: Option<&ComboMastery>) -> u32 {
  match combo {
    None => 0,
    Some(c) if c.total_attempts == 0 => 0,
    Some(c) if !is_combo_mastered(Some(c)) => 1 + c.correct_count,
    Some(_) => config::MASTERED_PRIORITY,
  }
}

/// Pick the next practice question for a verb under a tense list.
///
/// Combos within `PRACTICE_PRIORITY_BAND` of the minimum priority form the
/// top bucket and one is drawn uniformly at random, so near-tied items are
/// shuffled together instead of drilled in a fixed order. Returns None only
/// when the verb yields no combos for these tenses.
pub fn select_practice_question<R: Rng + ?Sized>(
  verb: &VerbEntry,
  tenses: &[Tense],
  verb_mastery: Option<&VerbMasteryData>,
  rng: &mut R,
) -> Option<PracticeQuestion> {
  let combos = combos_for_verb(verb, tenses);
  if combos.is_empty() {
    return None;
  }

  let scored: Vec<(String, u32)> = combos
    .into_iter()
    .map(|key| {
      let priority = combo_priority(verb_mastery.and_then(|m| m.get(&key)));
      (key, priority)
    })
    .collect();

  let min_priority = scored.iter().map(|(_, p)| *p).min()?;
  let bucket: Vec<&String> = scored
    .iter()
    .filter(|(_, p)| *p <= min_priority.saturating_add(config::PRACTICE_PRIORITY_BAND))
    .map(|(key, _)| key)
    .collect();

  let chosen = bucket[rng.random_range(0..bucket.len())];
  let (tense, pronoun) = parse_combo_key(chosen)?;
  let accepted = verb.accepted_answers(tense, pronoun)?;

  Some(PracticeQuestion {
    tense,
    pronoun,
    accepted_answers: accepted.to_vec(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::domain::combo_key;
  use chrono::Utc;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn combo(correct: u32, total: u32) -> ComboMastery {
    ComboMastery {
      correct_count: correct,
      total_attempts: total,
      last_practiced: Utc::now(),
    }
  }

  // Priority scoring

  #[test]
  fn test_priority_never_attempted() {
    assert_eq!(combo_priority(None), 0);
    assert_eq!(combo_priority(Some(&combo(0, 0))), 0);
  }

  #[test]
  fn test_priority_unmastered_tracks_correct_count() {
    assert_eq!(combo_priority(Some(&combo(0, 2))), 1);
    assert_eq!(combo_priority(Some(&combo(2, 4))), 3);
  }

  #[test]
  fn test_priority_mastered_deprioritized() {
    assert_eq!(combo_priority(Some(&combo(5, 5))), config::MASTERED_PRIORITY);
  }

  // Selection

  #[test]
  fn test_single_unseen_combo_always_selected() {
    let catalog = Catalog::builtin();
    let etre = catalog.verb("etre").unwrap();
    let tenses = [Tense::Present];

    // Master everything except présent:nous, which stays unseen
    let mut mastery = VerbMasteryData::new();
    for key in combos_for_verb(etre, &tenses) {
      if key != combo_key(Tense::Present, Pronoun::Nous) {
        mastery.insert(key, combo(5, 5));
      }
    }

    // Unseen priority 0 vs mastered 100: the band never bridges that gap
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
      let question =
        select_practice_question(etre, &tenses, Some(&mastery), &mut rng).unwrap();
      assert_eq!(question.tense, Tense::Present);
      assert_eq!(question.pronoun, Pronoun::Nous);
    }
  }

  #[test]
  fn test_fresh_verb_selects_from_all_combos() {
    let catalog = Catalog::builtin();
    let etre = catalog.verb("etre").unwrap();
    let tenses = [Tense::Present];

    let mut rng = StdRng::seed_from_u64(42);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
      let question = select_practice_question(etre, &tenses, None, &mut rng).unwrap();
      seen.insert(combo_key(question.tense, question.pronoun));
    }
    // All six présent combos share priority 0 and should all surface
    assert_eq!(seen.len(), 6);
  }

  #[test]
  fn test_band_groups_near_tied_priorities() {
    let catalog = Catalog::builtin();
    let etre = catalog.verb("etre").unwrap();
    let tenses = [Tense::Present];

    // je at priority 2, tu at priority 3 (inside the band of 1),
    // everything else mastered at 100
    let mut mastery = VerbMasteryData::new();
    for key in combos_for_verb(etre, &tenses) {
      mastery.insert(key, combo(5, 5));
    }
    mastery.insert(combo_key(Tense::Present, Pronoun::Je), combo(1, 3));
    mastery.insert(combo_key(Tense::Present, Pronoun::Tu), combo(2, 8));

    let mut rng = StdRng::seed_from_u64(3);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
      let question =
        select_practice_question(etre, &tenses, Some(&mastery), &mut rng).unwrap();
      seen.insert(question.pronoun);
    }
    assert!(seen.contains(&Pronoun::Je));
    assert!(seen.contains(&Pronoun::Tu));
    assert_eq!(seen.len(), 2);
  }

  #[test]
  fn test_question_carries_accepted_answers() {
    let catalog = Catalog::builtin();
    let avoir = catalog.verb("avoir").unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let question =
      select_practice_question(avoir, &[Tense::Present], None, &mut rng).unwrap();
    assert!(!question.accepted_answers.is_empty());
    let expected = avoir
      .accepted_answers(question.tense, question.pronoun)
      .unwrap();
    assert_eq!(question.accepted_answers, expected);
  }

  #[test]
  fn test_no_combos_returns_none() {
    let catalog = Catalog::builtin();
    let etre = catalog.verb("etre").unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    // Seed data has no subjonctif for être
    let question =
      select_practice_question(etre, &[Tense::SubjonctifPresent], None, &mut rng);
    assert!(question.is_none());
  }
}
