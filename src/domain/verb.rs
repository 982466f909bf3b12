use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tenses covered by the trainer. Serialized names double as the
/// tense half of a combo key, so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tense {
  #[serde(rename = "présent")]
  Present,
  #[serde(rename = "futur_proche")]
  FuturProche,
  #[serde(rename = "passé_composé")]
  PasseCompose,
  #[serde(rename = "imparfait")]
  Imparfait,
  #[serde(rename = "conditionnel_présent")]
  ConditionnelPresent,
  #[serde(rename = "impératif")]
  Imperatif,
  #[serde(rename = "subjonctif_présent")]
  SubjonctifPresent,
  #[serde(rename = "plus_que_parfait")]
  PlusQueParfait,
}

impl Tense {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Present => "présent",
      Self::FuturProche => "futur_proche",
      Self::PasseCompose => "passé_composé",
      Self::Imparfait => "imparfait",
      Self::ConditionnelPresent => "conditionnel_présent",
      Self::Imperatif => "impératif",
      Self::SubjonctifPresent => "subjonctif_présent",
      Self::PlusQueParfait => "plus_que_parfait",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "présent" => Some(Self::Present),
      "futur_proche" => Some(Self::FuturProche),
      "passé_composé" => Some(Self::PasseCompose),
      "imparfait" => Some(Self::Imparfait),
      "conditionnel_présent" => Some(Self::ConditionnelPresent),
      "impératif" => Some(Self::Imperatif),
      "subjonctif_présent" => Some(Self::SubjonctifPresent),
      "plus_que_parfait" => Some(Self::PlusQueParfait),
      _ => None,
    }
  }

  /// Human-readable label for display
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Present => "Présent",
      Self::FuturProche => "Futur proche",
      Self::PasseCompose => "Passé composé",
      Self::Imparfait => "Imparfait",
      Self::ConditionnelPresent => "Conditionnel présent",
      Self::Imperatif => "Impératif",
      Self::SubjonctifPresent => "Subjonctif présent",
      Self::PlusQueParfait => "Plus-que-parfait",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pronoun {
  Je,
  Tu,
  Il,
  Nous,
  Vous,
  Ils,
}

impl Pronoun {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Je => "je",
      Self::Tu => "tu",
      Self::Il => "il",
      Self::Nous => "nous",
      Self::Vous => "vous",
      Self::Ils => "ils",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "je" => Some(Self::Je),
      "tu" => Some(Self::Tu),
      "il" => Some(Self::Il),
      "nous" => Some(Self::Nous),
      "vous" => Some(Self::Vous),
      "ils" => Some(Self::Ils),
      _ => None,
    }
  }

  /// Display form ("il" stands for il/elle/on, "ils" for ils/elles)
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Je => "je",
      Self::Tu => "tu",
      Self::Il => "il/elle/on",
      Self::Nous => "nous",
      Self::Vous => "vous",
      Self::Ils => "ils/elles",
    }
  }
}

/// Pronoun order used everywhere combos are derived
pub const ALL_PRONOUNS: [Pronoun; 6] = [
  Pronoun::Je,
  Pronoun::Tu,
  Pronoun::Il,
  Pronoun::Nous,
  Pronoun::Vous,
  Pronoun::Ils,
];

/// The imperative only conjugates for tu/nous/vous
pub const IMPERATIVE_PRONOUNS: [Pronoun; 3] = [Pronoun::Tu, Pronoun::Nous, Pronoun::Vous];

/// Pronoun set applicable to a tense
pub fn pronouns_for(tense: Tense) -> &'static [Pronoun] {
  if tense == Tense::Imperatif {
    &IMPERATIVE_PRONOUNS
  } else {
    &ALL_PRONOUNS
  }
}

/// Build the `tense:pronoun` combo key
pub fn combo_key(tense: Tense, pronoun: Pronoun) -> String {
  format!("{}:{}", tense.as_str(), pronoun.as_str())
}

/// Split a combo key back into its parts. Returns None for malformed keys.
pub fn parse_combo_key(key: &str) -> Option<(Tense, Pronoun)> {
  let (tense, pronoun) = key.split_once(':')?;
  Some((Tense::from_str(tense)?, Pronoun::from_str(pronoun)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Auxiliary {
  #[serde(rename = "avoir")]
  Avoir,
  #[serde(rename = "être")]
  Etre,
}

/// Conjugation table: tense → pronoun → ordered accepted surface forms.
/// The first form is the canonical one shown to the learner.
pub type ConjugationTable = HashMap<Tense, HashMap<Pronoun, Vec<String>>>;

/// Immutable catalog record for one verb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerbEntry {
  pub id: String,
  pub infinitive: String,
  pub translation: String,
  pub auxiliary: Auxiliary,
  pub conjugations: ConjugationTable,
}

impl VerbEntry {
  /// Accepted answers for a combo, if the verb's table has a non-empty
  /// entry for it
  pub fn accepted_answers(&self, tense: Tense, pronoun: Pronoun) -> Option<&[String]> {
    self
      .conjugations
      .get(&tense)
      .and_then(|by_pronoun| by_pronoun.get(&pronoun))
      .filter(|forms| !forms.is_empty())
      .map(|forms| forms.as_slice())
  }
}

/// CEFR-aligned level identifiers, in unlock order
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LevelId {
  A1,
  A2,
  B1,
  B2,
}

impl LevelId {
  pub const ALL: [LevelId; 4] = [LevelId::A1, LevelId::A2, LevelId::B1, LevelId::B2];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::A1 => "a1",
      Self::A2 => "a2",
      Self::B1 => "b1",
      Self::B2 => "b2",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "a1" => Some(Self::A1),
      "a2" => Some(Self::A2),
      "b1" => Some(Self::B1),
      "b2" => Some(Self::B2),
      _ => None,
    }
  }

  /// The level unlocked by passing this one's test
  pub fn next(&self) -> Option<LevelId> {
    match self {
      Self::A1 => Some(Self::A2),
      Self::A2 => Some(Self::B1),
      Self::B1 => Some(Self::B2),
      Self::B2 => None,
    }
  }
}

/// Immutable catalog record for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
  pub id: LevelId,
  pub label: String,
  pub description: String,
  pub tenses: Vec<Tense>,
  pub verb_ids: Vec<String>,
  pub test_question_count: usize,
  pub pass_threshold: f64,
}
