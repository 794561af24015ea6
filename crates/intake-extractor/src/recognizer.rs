//! Entity-recognition capability
//!
//! The engine either has a loaded recognizer (`Active`) or it does not
//! (`Absent`). Call sites branch on the capability, never on errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use intake_core::{NlpConfig, Result};

use crate::ner::LexiconRecognizer;

// ============================================================================
// Entities and Tokens
// ============================================================================

/// Semantic category of a recognized span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    /// People, including fictional
    Person,
    /// Geopolitical entities: countries, cities, states
    Gpe,
    /// Companies, agencies, institutions
    Org,
    /// Absolute or relative dates and periods
    Date,
    /// Any other label a model declares
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::Gpe => "GPE",
            Self::Org => "ORG",
            Self::Date => "DATE",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for EntityLabel {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "PERSON" => Self::Person,
            "GPE" => Self::Gpe,
            "ORG" => Self::Org,
            "DATE" => Self::Date,
            _ => Self::Other(s),
        }
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

/// A labeled span of the input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offset of the span start
    pub start: usize,
    /// Byte offset one past the span end
    pub end: usize,
}

/// Universal part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token with its part-of-speech tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PartOfSpeech,
}

// ============================================================================
// Recognizer Trait and Capability
// ============================================================================

/// Trait for entity-recognition backends.
///
/// Implementations are shared read-only across concurrent calls.
pub trait EntityRecognizer: Send + Sync {
    /// Labeled entity spans in document order
    fn recognize(&self, text: &str) -> Vec<Entity>;

    /// Tokens with part-of-speech tags in document order
    fn tag_parts_of_speech(&self, text: &str) -> Vec<TaggedToken>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Recognition capability, fixed once at startup
#[derive(Clone, Default)]
pub enum Recognizer {
    Active(Arc<dyn EntityRecognizer>),
    #[default]
    Absent,
}

impl Recognizer {
    /// Wrap a backend as the active capability
    pub fn active(recognizer: impl EntityRecognizer + 'static) -> Self {
        Self::Active(Arc::new(recognizer))
    }

    /// Try to load the configured model.
    ///
    /// A disabled config yields `Absent`; a load failure yields
    /// `IntakeError::ModelUnavailable` for the caller to downgrade.
    pub fn try_load(config: &NlpConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::Absent);
        }

        let recognizer = LexiconRecognizer::load(&config.model, config.model_dir.as_deref())?;
        Ok(Self::active(recognizer))
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The backend, if one is loaded
    pub fn get(&self) -> Option<&dyn EntityRecognizer> {
        match self {
            Self::Active(recognizer) => Some(recognizer.as_ref()),
            Self::Absent => None,
        }
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(recognizer) => f.debug_tuple("Active").field(&recognizer.name()).finish(),
            Self::Absent => f.write_str("Absent"),
        }
    }
}
