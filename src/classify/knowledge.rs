//! Static knowledge tables: drug-class associations and symptom indicator
//! words. Loaded once at startup and shared read-only.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use thiserror::Error;

/// Terms shorter than this never match by containment in the other
/// direction (key inside term, or term inside a drug name).
pub const MIN_PARTIAL_MATCH_LEN: usize = 3;

const BUILTIN_KNOWLEDGE_JSON: &str = include_str!("../../resources/knowledge.json");

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("failed to load knowledge tables from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("invalid knowledge tables: {0}")]
    Invalid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One drug class: the allergy terms that name it and the drug names
/// that belong to it. All strings are case-folded on load.
#[derive(Debug, Clone, Deserialize)]
pub struct DrugClass {
    pub key: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub members: Vec<String>,
}

impl DrugClass {
    /// Whether a (case-folded) allergy term refers to this class: it
    /// mentions the key, an alias or a member, or is a fragment of the key.
    pub fn named_by(&self, term: &str) -> bool {
        term.contains(&self.key)
            || (term.len() >= MIN_PARTIAL_MATCH_LEN && self.key.contains(term))
            || self.aliases.iter().any(|a| term.contains(a.as_str()))
            || self.members.iter().any(|m| term.contains(m.as_str()))
    }

    /// Whether a (case-folded) drug name belongs to this class.
    pub fn includes_drug(&self, drug: &str) -> bool {
        self.members.iter().any(|m| drug.contains(m.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBase {
    pub drug_classes: Vec<DrugClass>,
    pub allergic_indicators: Vec<String>,
    pub side_effect_indicators: Vec<String>,
}

static BUILTIN: LazyLock<Result<Arc<KnowledgeBase>, String>> = LazyLock::new(|| {
    KnowledgeBase::parse(BUILTIN_KNOWLEDGE_JSON)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

impl KnowledgeBase {
    /// The tables bundled with the binary.
    pub fn builtin() -> Result<Arc<Self>, KnowledgeError> {
        (*BUILTIN).clone().map_err(KnowledgeError::Invalid)
    }

    /// Load tables from a JSON file, replacing the bundled ones.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| KnowledgeError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse, normalise and validate tables from a JSON string.
    pub fn parse(json: &str) -> Result<Self, KnowledgeError> {
        let mut kb: KnowledgeBase = serde_json::from_str(json)?;
        kb.normalise();
        kb.validate()?;
        Ok(kb)
    }

    fn normalise(&mut self) {
        fn fold(values: &mut Vec<String>) {
            for v in values.iter_mut() {
                *v = v.trim().to_lowercase();
            }
            values.retain(|v| !v.is_empty());
        }
        for class in &mut self.drug_classes {
            class.key = class.key.trim().to_lowercase();
            fold(&mut class.aliases);
            fold(&mut class.members);
        }
        fold(&mut self.allergic_indicators);
        fold(&mut self.side_effect_indicators);
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        if self.drug_classes.is_empty() {
            return Err(KnowledgeError::Invalid("drug_classes must not be empty".into()));
        }
        for class in &self.drug_classes {
            if class.key.is_empty() {
                return Err(KnowledgeError::Invalid("drug class key must not be empty".into()));
            }
            if class.members.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "drug class '{}' has no members",
                    class.key
                )));
            }
        }
        if self.allergic_indicators.is_empty() || self.side_effect_indicators.is_empty() {
            return Err(KnowledgeError::Invalid(
                "indicator lists must not be empty".into(),
            ));
        }
        Ok(())
    }
}
