pub mod progress;
pub mod verb;

pub use progress::{ComboMastery, LevelProgress, TestAttempt, UserProgress, VerbMasteryData};
pub use verb::{
  combo_key, parse_combo_key, pronouns_for, Auxiliary, ConjugationTable, LevelDefinition,
  LevelId, Pronoun, Tense, VerbEntry, ALL_PRONOUNS, IMPERATIVE_PRONOUNS,
};
