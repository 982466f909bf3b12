//! Verb and level catalog.
//!
//! Static reference data: verbs with their accepted conjugated forms, and
//! the CEFR level definitions that scope tenses and verbs. Lookups by
//! unknown id return nothing rather than failing. Catalog files are plain
//! JSON validated through serde; a built-in dataset is embedded so the
//! engine works without any external data directory.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::domain::{LevelDefinition, LevelId, VerbEntry};

const BUILTIN_LEVELS: &str = include_str!("../data/levels.json");
const BUILTIN_VERBS: &str = include_str!("../data/verbs.json");

/// Error loading catalog data files
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "Failed to read catalog file: {}", e),
            CatalogError::Parse(msg) => write!(f, "Invalid catalog data: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

/// Read-only verb/level reference data
#[derive(Debug, Clone)]
pub struct Catalog {
    verbs: HashMap<String, VerbEntry>,
    levels: Vec<LevelDefinition>,
}

impl Catalog {
    /// The embedded baseline dataset
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_LEVELS, BUILTIN_VERBS)
            .expect("embedded catalog data is valid JSON")
    }

    /// Parse a catalog from levels/verbs JSON documents
    pub fn from_json(levels_json: &str, verbs_json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<LevelDefinition> = serde_json::from_str(levels_json)
            .map_err(|e| CatalogError::Parse(format!("levels: {}", e)))?;
        let verb_list: Vec<VerbEntry> = serde_json::from_str(verbs_json)
            .map_err(|e| CatalogError::Parse(format!("verbs: {}", e)))?;

        let mut verbs = HashMap::with_capacity(verb_list.len());
        for verb in verb_list {
            if verbs.insert(verb.id.clone(), verb).is_some() {
                tracing::warn!("Duplicate verb id in catalog data, keeping the later entry");
            }
        }

        Ok(Self { verbs, levels })
    }

    /// Load from the configured data directory, falling back to the
    /// embedded dataset when the directory has no catalog files
    pub fn load_default() -> Self {
        let dir = crate::config::load_data_dir();
        match Self::load_dir(&dir) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::debug!("Falling back to built-in catalog: {}", e);
                Self::builtin()
            }
        }
    }

    /// Load `levels.json` and `verbs.json` from a data directory
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let levels_json = fs::read_to_string(dir.join("levels.json"))?;
        let verbs_json = fs::read_to_string(dir.join("verbs.json"))?;
        let catalog = Self::from_json(&levels_json, &verbs_json)?;
        tracing::info!(
            "Loaded catalog from {}: {} verbs, {} levels",
            dir.display(),
            catalog.verbs.len(),
            catalog.levels.len()
        );
        Ok(catalog)
    }

    pub fn verb(&self, id: &str) -> Option<&VerbEntry> {
        self.verbs.get(id)
    }

    /// Resolve an id list, silently dropping unknown ids
    pub fn verbs_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&VerbEntry> {
        ids.iter()
            .filter_map(|id| self.verbs.get(id.as_ref()))
            .collect()
    }

    pub fn level(&self, id: LevelId) -> Option<&LevelDefinition> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    /// The catalog verbs in scope for a level, in the level's declared order
    pub fn level_verbs(&self, level: &LevelDefinition) -> Vec<&VerbEntry> {
        self.verbs_by_ids(&level.verb_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pronoun, Tense};

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.levels().len(), 4);
        assert!(catalog.verb("etre").is_some());
        assert!(catalog.verb("nonexistent").is_none());
    }

    #[test]
    fn test_builtin_levels_cover_all_ids() {
        let catalog = Catalog::builtin();
        for id in LevelId::ALL {
            let level = catalog.level(id).expect("level present");
            assert!(!level.tenses.is_empty());
            assert!(!level.verb_ids.is_empty());
            assert!(level.test_question_count > 0);
            assert!(level.pass_threshold > 0.0 && level.pass_threshold <= 1.0);
        }
    }

    #[test]
    fn test_verbs_by_ids_filters_unknown() {
        let catalog = Catalog::builtin();
        let verbs = catalog.verbs_by_ids(&["etre", "ghost", "avoir"]);
        assert_eq!(verbs.len(), 2);
        assert_eq!(verbs[0].id, "etre");
        assert_eq!(verbs[1].id, "avoir");
    }

    #[test]
    fn test_level_verbs_subset_of_catalog() {
        // The a1 level lists more verbs than the seed data conjugates;
        // missing ones are filtered out, not errors
        let catalog = Catalog::builtin();
        let a1 = catalog.level(LevelId::A1).unwrap();
        let verbs = catalog.level_verbs(a1);
        assert!(!verbs.is_empty());
        assert!(verbs.len() <= a1.verb_ids.len());
    }

    #[test]
    fn test_builtin_gender_variants_present() {
        let catalog = Catalog::builtin();
        let aller = catalog.verb("aller").unwrap();
        let forms = aller
            .accepted_answers(Tense::PasseCompose, Pronoun::Vous)
            .unwrap();
        assert!(forms.len() > 1);
        assert_eq!(forms[0], "vous êtes allé");
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = Catalog::from_json("[{\"id\": 42}]", "[]").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_load_dir_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
