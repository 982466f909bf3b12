//! Answer validation for conjugated French forms.
//!
//! Classifies a free-text answer against the ordered accepted-form list as
//! one of three outcomes: correct, accent-only error (letters right,
//! diacritics wrong), or plain wrong. Always returns a result.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Result of checking one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub correct: bool,
  pub accent_error: bool,
  /// The accepted form to show the learner: the matched form on a full or
  /// accent-only match, otherwise the canonical (first) form
  pub expected: String,
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize an answer for comparison:
/// - trims and lowercases
/// - collapses internal whitespace runs to a single space
/// - unifies typographic apostrophes to the ASCII apostrophe
fn normalize(input: &str) -> String {
  input
    .trim()
    .to_lowercase()
    .replace(['\u{2018}', '\u{2019}', '\u{02BC}'], "'")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Drop diacritics: canonical decomposition, then filter combining marks
fn strip_accents(input: &str) -> String {
  input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

// ============================================================================
// Validation
// ============================================================================

/// Validate a user's answer against the accepted forms for a combo.
///
/// Matching is case-, whitespace-, and apostrophe-insensitive. Accepted
/// forms are tried in list order so the first match wins when several
/// forms normalize identically.
pub fn validate_answer(user_answer: &str, accepted_answers: &[String]) -> ValidationResult {
  let normalized_user = normalize(user_answer);

  // Full match against any accepted form
  for accepted in accepted_answers {
    if normalized_user == normalize(accepted) {
      return ValidationResult {
        correct: true,
        accent_error: false,
        expected: accepted.clone(),
      };
    }
  }

  // Accent-only mismatch: letters right once diacritics are dropped
  let stripped_user = strip_accents(&normalized_user);
  for accepted in accepted_answers {
    if stripped_user == strip_accents(&normalize(accepted)) {
      return ValidationResult {
        correct: false,
        accent_error: true,
        expected: accepted.clone(),
      };
    }
  }

  ValidationResult {
    correct: false,
    accent_error: false,
    expected: accepted_answers.first().cloned().unwrap_or_default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn accepted(forms: &[&str]) -> Vec<String> {
    forms.iter().map(|s| s.to_string()).collect()
  }

  // Exact matching

  #[test]
  fn test_exact_match() {
    let result = validate_answer("je suis", &accepted(&["je suis"]));
    assert!(result.correct);
    assert!(!result.accent_error);
    assert_eq!(result.expected, "je suis");
  }

  #[test]
  fn test_case_insensitive() {
    let result = validate_answer("JE SUIS", &accepted(&["je suis"]));
    assert!(result.correct);
  }

  #[test]
  fn test_whitespace_collapsed() {
    let result = validate_answer("  nous   allons  être ", &accepted(&["nous allons être"]));
    assert!(result.correct);
  }

  #[test]
  fn test_typographic_apostrophe_accepted() {
    let result = validate_answer("j\u{2019}ai été", &accepted(&["j'ai été"]));
    assert!(result.correct);
  }

  #[test]
  fn test_modifier_apostrophe_accepted() {
    let result = validate_answer("j\u{02BC}ai", &accepted(&["j'ai"]));
    assert!(result.correct);
  }

  #[test]
  fn test_first_matching_form_wins() {
    let forms = accepted(&["vous êtes allé", "vous êtes allés"]);
    let result = validate_answer("vous êtes allés", &forms);
    assert!(result.correct);
    assert_eq!(result.expected, "vous êtes allés");
  }

  // Accent errors

  #[test]
  fn test_accent_error() {
    let result = validate_answer("vous etes", &accepted(&["vous êtes"]));
    assert!(!result.correct);
    assert!(result.accent_error);
    assert_eq!(result.expected, "vous êtes");
  }

  #[test]
  fn test_accent_error_extra_accent() {
    // Wrong accents in the user answer also count as an accent error
    let result = validate_answer("je suîs", &accepted(&["je suis"]));
    assert!(!result.correct);
    assert!(result.accent_error);
  }

  #[test]
  fn test_accent_error_against_variant_list() {
    let forms = accepted(&["je suis allé", "je suis allée"]);
    let result = validate_answer("je suis alle", &forms);
    assert!(!result.correct);
    assert!(result.accent_error);
    assert_eq!(result.expected, "je suis allé");
  }

  // Wrong answers

  #[test]
  fn test_wrong_answer() {
    let result = validate_answer("xyz", &accepted(&["je suis"]));
    assert!(!result.correct);
    assert!(!result.accent_error);
    assert_eq!(result.expected, "je suis");
  }

  #[test]
  fn test_wrong_answer_expected_is_canonical_form() {
    let forms = accepted(&["vous êtes allé", "vous êtes allés"]);
    let result = validate_answer("vous allez", &forms);
    assert!(!result.correct);
    assert_eq!(result.expected, "vous êtes allé");
  }

  #[test]
  fn test_empty_input_is_wrong() {
    let result = validate_answer("", &accepted(&["je suis"]));
    assert!(!result.correct);
    assert!(!result.accent_error);
  }

  #[test]
  fn test_empty_accepted_list_total() {
    // Degenerate input still produces a result, never a panic
    let result = validate_answer("je suis", &[]);
    assert!(!result.correct);
    assert_eq!(result.expected, "");
  }

  // Normalization internals

  #[test]
  fn test_strip_accents_covers_french_diacritics() {
    assert_eq!(strip_accents("été à l'âge où ça gêne"), "ete a l'age ou ca gene");
  }

  #[test]
  fn test_normalize_idempotent() {
    let once = normalize("  J\u{2019}AI   été ");
    assert_eq!(normalize(&once), once);
  }
}
