//! Lexicon-driven Named Entity Recognition (NER)
//!
//! The active recognition backend. A model is a declarative JSON document:
//! - Entity patterns: regex + label + confidence
//! - Gazetteers: term lists matched on word boundaries
//! - A part-of-speech lexicon with suffix fallback rules
//!
//! Models are compiled once at load time; the compiled recognizer holds
//! only immutable data and is shared across threads without locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recognizer::{Entity, EntityLabel, EntityRecognizer, PartOfSpeech, TaggedToken};
use intake_core::config::DEFAULT_MODEL;
use intake_core::{IntakeError, Result};

/// Model format this crate understands
pub const MODEL_FORMAT_VERSION: u32 = 1;

const BUILTIN_MODEL_JSON: &str = include_str!("models/en_lexicon_sm.json");

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("valid token regex"));

// ============================================================================
// Model Definition
// ============================================================================

/// Regex rule producing entities of one label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub label: EntityLabel,
    pub pattern: String,
    /// Capture group holding the entity span (0 = whole match)
    #[serde(default)]
    pub group: usize,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

/// Term list matched on word boundaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gazetteer {
    pub label: EntityLabel,
    pub terms: Vec<String>,
    #[serde(default)]
    pub case_insensitive: bool,
    /// Extend a match with one following capitalized word (surnames)
    #[serde(default)]
    pub extend_capitalized: bool,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

/// Suffix-based tag used when a word is not in the lexicon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub pos: PartOfSpeech,
    /// Minimum number of characters before the suffix
    #[serde(default = "default_min_stem")]
    pub min_stem: usize,
}

fn default_confidence() -> f32 {
    0.8
}

fn default_min_stem() -> usize {
    3
}

/// Declarative recognition model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconModel {
    pub name: String,
    pub format_version: u32,
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
    #[serde(default)]
    pub gazetteers: Vec<Gazetteer>,
    /// Tag -> lower-case words carrying that tag
    #[serde(default)]
    pub pos_lexicon: HashMap<PartOfSpeech, Vec<String>>,
    #[serde(default)]
    pub suffix_rules: Vec<SuffixRule>,
}

impl LexiconModel {
    /// The model compiled into this crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(DEFAULT_MODEL, BUILTIN_MODEL_JSON)
    }

    /// Parse a model document, checking its format version
    pub fn from_json(identifier: &str, json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json).map_err(|e| unavailable(identifier, e))?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(unavailable(
                identifier,
                format!(
                    "format version {} is not supported (expected {})",
                    model.format_version, MODEL_FORMAT_VERSION
                ),
            ));
        }

        Ok(model)
    }

    /// Resolve a model identifier.
    ///
    /// Lookup order: built-in name, `<model_dir>/<identifier>.json`, then
    /// the identifier as a file path.
    pub fn resolve(identifier: &str, model_dir: Option<&Path>) -> Result<Self> {
        if identifier == DEFAULT_MODEL {
            return Self::builtin();
        }

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(dir) = model_dir {
            candidates.push(dir.join(format!("{identifier}.json")));
        }
        candidates.push(PathBuf::from(identifier));

        for path in candidates {
            if path.is_file() {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| unavailable(identifier, format!("{}: {e}", path.display())))?;
                return Self::from_json(identifier, &json);
            }
        }

        Err(unavailable(
            identifier,
            "not a built-in model and no model file was found",
        ))
    }
}

fn unavailable(model: &str, reason: impl ToString) -> IntakeError {
    IntakeError::ModelUnavailable {
        model: model.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// Compiled Recognizer
// ============================================================================

struct EntityRule {
    regex: Regex,
    label: EntityLabel,
    group: usize,
    confidence: f32,
}

/// Entity candidate before overlap resolution
struct Candidate {
    label: EntityLabel,
    start: usize,
    end: usize,
    confidence: f32,
}

/// Recognizer compiled from a [`LexiconModel`]
pub struct LexiconRecognizer {
    name: String,
    rules: Vec<EntityRule>,
    pos_lookup: HashMap<String, PartOfSpeech>,
    suffix_rules: Vec<SuffixRule>,
}

impl LexiconRecognizer {
    /// Resolve and compile a model by identifier
    pub fn load(identifier: &str, model_dir: Option<&Path>) -> Result<Self> {
        Self::from_model(LexiconModel::resolve(identifier, model_dir)?)
    }

    /// Compile the built-in model
    pub fn builtin() -> Result<Self> {
        Self::from_model(LexiconModel::builtin()?)
    }

    /// Compile a model; any invalid regex fails the whole load
    pub fn from_model(model: LexiconModel) -> Result<Self> {
        let mut rules = Vec::with_capacity(model.patterns.len() + model.gazetteers.len());

        for rule in &model.patterns {
            let regex = Regex::new(&rule.pattern).map_err(|e| unavailable(&model.name, e))?;
            if rule.group >= regex.captures_len() {
                return Err(unavailable(
                    &model.name,
                    format!("pattern '{}' has no group {}", rule.pattern, rule.group),
                ));
            }
            rules.push(EntityRule {
                regex,
                label: rule.label.clone(),
                group: rule.group,
                confidence: rule.confidence,
            });
        }

        for gazetteer in &model.gazetteers {
            if gazetteer.terms.is_empty() {
                continue;
            }
            let regex = Regex::new(&gazetteer_pattern(gazetteer))
                .map_err(|e| unavailable(&model.name, e))?;
            rules.push(EntityRule {
                regex,
                label: gazetteer.label.clone(),
                group: 0,
                confidence: gazetteer.confidence,
            });
        }

        let mut pos_lookup = HashMap::new();
        for (pos, words) in &model.pos_lexicon {
            for word in words {
                pos_lookup.insert(word.to_lowercase(), *pos);
            }
        }

        let recognizer = Self {
            name: model.name,
            rules,
            pos_lookup,
            suffix_rules: model.suffix_rules,
        };
        debug!(
            model = %recognizer.name,
            rules = recognizer.rule_count(),
            "Compiled lexicon model"
        );
        Ok(recognizer)
    }

    /// Number of compiled entity rules (patterns + gazetteers)
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Collect every rule match
    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                let Some(mat) = caps.get(rule.group) else {
                    continue;
                };
                if mat.as_str().trim().is_empty() {
                    continue;
                }
                candidates.push(Candidate {
                    label: rule.label.clone(),
                    start: mat.start(),
                    end: mat.end(),
                    confidence: rule.confidence,
                });
            }
        }

        candidates
    }

    /// Remove overlapping candidates, keeping the earliest start and then
    /// the highest confidence; ties keep the longer span, then rule order
    fn resolve_overlaps(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.confidence.total_cmp(&a.confidence))
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut result: Vec<Candidate> = Vec::new();
        let mut covered_until = 0;

        for candidate in candidates {
            if result.is_empty() || candidate.start >= covered_until {
                covered_until = candidate.end;
                result.push(candidate);
            }
        }

        result
    }

    fn tag_token(&self, token: &str, sentence_start: bool) -> PartOfSpeech {
        let lower = token.to_lowercase();

        if let Some(pos) = self.pos_lookup.get(&lower) {
            return *pos;
        }

        if token.chars().all(char::is_numeric) {
            return PartOfSpeech::Num;
        }

        let Some(first) = token.chars().next() else {
            return PartOfSpeech::X;
        };

        if !first.is_alphanumeric() && first != '_' {
            return match first {
                '$' | '%' | '&' | '+' | '<' | '=' | '>' | '@' | '#' | '^' | '|' | '~' | '€' | '£'
                | '₹' => PartOfSpeech::Sym,
                _ => PartOfSpeech::Punct,
            };
        }

        let length = lower.chars().count();
        for rule in &self.suffix_rules {
            if lower.ends_with(&rule.suffix) && length >= rule.suffix.chars().count() + rule.min_stem
            {
                return rule.pos;
            }
        }

        if !sentence_start && first.is_uppercase() {
            PartOfSpeech::Propn
        } else {
            PartOfSpeech::Noun
        }
    }
}

/// Build one alternation regex for a gazetteer, longest terms first
fn gazetteer_pattern(gazetteer: &Gazetteer) -> String {
    let mut terms: Vec<&str> = gazetteer.terms.iter().map(String::as_str).collect();
    terms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    terms.dedup();

    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    let flags = if gazetteer.case_insensitive { "(?i)" } else { "" };
    let extension = if gazetteer.extend_capitalized {
        r"(?-i:[ \t]+\p{Lu}\p{Ll}+)?"
    } else {
        ""
    };

    format!(r"{flags}\b(?:{alternation}){extension}\b")
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let candidates = self.candidates(text);

        self.resolve_overlaps(candidates)
            .into_iter()
            .map(|c| Entity {
                text: text[c.start..c.end].to_string(),
                label: c.label,
                start: c.start,
                end: c.end,
            })
            .collect()
    }

    fn tag_parts_of_speech(&self, text: &str) -> Vec<TaggedToken> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for mat in TOKEN_RE.find_iter(text) {
            let token = mat.as_str();
            let pos = self.tag_token(token, sentence_start);
            sentence_start = matches!(token, "." | "!" | "?");
            tokens.push(TaggedToken {
                text: token.to_string(),
                pos,
            });
        }

        tokens
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> LexiconRecognizer {
        LexiconRecognizer::builtin().unwrap()
    }

    fn first(entities: &[Entity], label: EntityLabel) -> Option<&str> {
        entities
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.text.as_str())
    }

    #[test]
    fn test_builtin_model_compiles() {
        let ner = recognizer();
        assert_eq!(ner.name(), DEFAULT_MODEL);
        assert!(ner.rule_count() > 5);
    }

    #[test]
    fn test_person_from_introduction() {
        let ner = recognizer();
        let entities = ner.recognize("Hi, my name is Priya Sharma and I live in Pune.");

        assert_eq!(first(&entities, EntityLabel::Person), Some("Priya Sharma"));
        assert_eq!(first(&entities, EntityLabel::Gpe), Some("Pune"));
    }

    #[test]
    fn test_person_from_first_name_gazetteer() {
        let ner = recognizer();
        let entities = ner.recognize("You can reach out to David Miller about it.");
        assert_eq!(first(&entities, EntityLabel::Person), Some("David Miller"));
    }

    #[test]
    fn test_location_case_insensitive() {
        let ner = recognizer();
        let entities = ner.recognize("i moved to san francisco last year");

        assert_eq!(first(&entities, EntityLabel::Gpe), Some("san francisco"));
        assert_eq!(first(&entities, EntityLabel::Date), Some("last year"));
    }

    #[test]
    fn test_organization_gazetteer_and_suffix() {
        let ner = recognizer();

        let entities = ner.recognize("I spent three years at Infosys before this.");
        assert_eq!(first(&entities, EntityLabel::Org), Some("Infosys"));

        let entities = ner.recognize("Currently I work for Bluefin Analytics Pvt Ltd in Chennai.");
        assert_eq!(first(&entities, EntityLabel::Org), Some("Bluefin Analytics Pvt Ltd"));
        assert_eq!(first(&entities, EntityLabel::Gpe), Some("Chennai"));
    }

    #[test]
    fn test_dates() {
        let ner = recognizer();

        let entities = ner.recognize("I can join on March 15, 2025 at the earliest.");
        assert_eq!(first(&entities, EntityLabel::Date), Some("March 15, 2025"));

        let entities = ner.recognize("Available from 2025-04-01");
        assert_eq!(first(&entities, EntityLabel::Date), Some("2025-04-01"));

        let entities = ner.recognize("I may be free tomorrow");
        assert_eq!(first(&entities, EntityLabel::Date), Some("tomorrow"));
    }

    #[test]
    fn test_entities_in_document_order_without_overlap() {
        let ner = recognizer();
        let entities = ner.recognize("Rahul joined Google in London on 2020-01-06.");

        let starts: Vec<usize> = entities.iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);

        for pair in entities.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_pos_tagging() {
        let ner = recognizer();
        let tokens = ner.tag_parts_of_speech("The team was great, but the commute was terrible.");

        let adjectives: Vec<&str> = tokens
            .iter()
            .filter(|t| t.pos == PartOfSpeech::Adj)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(adjectives, vec!["great", "terrible"]);

        assert_eq!(tokens[0].pos, PartOfSpeech::Det);
        assert_eq!(tokens.last().unwrap().pos, PartOfSpeech::Punct);
    }

    #[test]
    fn test_pos_fallback_rules() {
        let ner = recognizer();
        let tokens = ner.tag_parts_of_speech("Honestly it felt stressful in Seattle 42");
        let tags: Vec<PartOfSpeech> = tokens.iter().map(|t| t.pos).collect();

        assert_eq!(tags[0], PartOfSpeech::Adv);
        assert_eq!(tags[3], PartOfSpeech::Adj);
        assert_eq!(tags[5], PartOfSpeech::Propn);
        assert_eq!(tags[6], PartOfSpeech::Num);
    }

    #[test]
    fn test_version_mismatch_is_unavailable() {
        let json = r#"{"name": "future", "format_version": 2}"#;
        let err = LexiconModel::from_json("future", json).unwrap_err();
        assert!(matches!(err, IntakeError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("format version 2"));
    }

    #[test]
    fn test_invalid_regex_is_unavailable() {
        let json = r#"{
            "name": "broken",
            "format_version": 1,
            "patterns": [{"label": "DATE", "pattern": "(unclosed"}]
        }"#;
        let model = LexiconModel::from_json("broken", json).unwrap();
        assert!(LexiconRecognizer::from_model(model).is_err());
    }

    #[test]
    fn test_load_from_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "name": "tiny",
            "format_version": 1,
            "gazetteers": [{"label": "GPE", "terms": ["Atlantis"], "confidence": 0.9}],
            "pos_lexicon": {"ADJ": ["Shiny"]}
        }"#;
        std::fs::write(dir.path().join("tiny.json"), json).unwrap();

        let ner = LexiconRecognizer::load("tiny", Some(dir.path())).unwrap();
        let entities = ner.recognize("Greetings from Atlantis");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].label, EntityLabel::Gpe);

        let tokens = ner.tag_parts_of_speech("shiny");
        assert_eq!(tokens[0].pos, PartOfSpeech::Adj);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LexiconRecognizer::load("absent", Some(dir.path())).err().unwrap();
        assert!(matches!(err, IntakeError::ModelUnavailable { .. }));
    }
}
