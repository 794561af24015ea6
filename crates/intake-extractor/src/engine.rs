//! Extraction engine
//!
//! Owns the recognition capability for the life of the process and
//! exposes the three operations the conversation orchestrator calls.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use intake_core::{
    parse_descriptors, ExtractionResult, FieldDescriptor, NlpConfig, Result,
    SentimentDistribution, SkillList,
};

use crate::fields::FieldExtractor;
use crate::recognizer::Recognizer;
use crate::sentiment::SentimentAnalyzer;
use crate::skills::SkillExtractor;
use crate::ConversationAnalyzer;

/// Extraction engine shared by all conversations
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    recognizer: Recognizer,
    fields: FieldExtractor,
    sentiment: SentimentAnalyzer,
    skills: SkillExtractor,
}

impl ExtractionEngine {
    /// Load the configured recognizer and build the engine.
    ///
    /// Never fails: a model that cannot be loaded is reported once as a
    /// warning and the engine runs in pattern mode.
    pub fn from_config(config: &NlpConfig) -> Self {
        let recognizer = match Recognizer::try_load(config) {
            Ok(Recognizer::Absent) => {
                info!("Entity recognition disabled, using pattern extraction");
                Recognizer::Absent
            }
            Ok(recognizer) => {
                info!(
                    model = %config.model,
                    backend = ?recognizer,
                    "Entity recognizer loaded"
                );
                recognizer
            }
            Err(e) => {
                warn!(
                    model = %config.model,
                    error = %e,
                    "Could not load entity recognizer, falling back to pattern extraction"
                );
                Recognizer::Absent
            }
        };

        Self::with_recognizer(recognizer)
    }

    /// Build the engine around an already-selected capability
    pub fn with_recognizer(recognizer: Recognizer) -> Self {
        Self {
            fields: FieldExtractor::new(recognizer.clone()),
            sentiment: SentimentAnalyzer::new(recognizer.clone()),
            skills: SkillExtractor::new(recognizer.clone()),
            recognizer,
        }
    }

    /// Engine without a recognizer (pattern and word-lexicon mode)
    pub fn pattern_only() -> Self {
        Self::with_recognizer(Recognizer::Absent)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.recognizer.is_active()
    }

    /// Extract one value per descriptor from an utterance
    pub async fn extract_information(
        &self,
        text: &str,
        descriptors: &[FieldDescriptor],
    ) -> Result<ExtractionResult> {
        self.fields.extract(text, descriptors)
    }

    /// Same as [`extract_information`](Self::extract_information), for a raw
    /// JSON descriptor array; malformed descriptors fail before extraction
    pub async fn extract_information_json(
        &self,
        text: &str,
        descriptors: &Value,
    ) -> Result<ExtractionResult> {
        let descriptors = parse_descriptors(descriptors)?;
        self.fields.extract(text, &descriptors)
    }

    /// Three-way sentiment estimate for an utterance
    pub async fn analyze_sentiment(&self, text: &str) -> SentimentDistribution {
        self.sentiment.analyze(text)
    }

    /// Technology skills mentioned in an utterance
    pub async fn extract_skills(&self, text: &str) -> SkillList {
        self.skills.extract(text)
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::from_config(&NlpConfig::default())
    }
}

#[async_trait]
impl ConversationAnalyzer for ExtractionEngine {
    async fn extract_information(
        &self,
        text: &str,
        descriptors: &[FieldDescriptor],
    ) -> Result<ExtractionResult> {
        ExtractionEngine::extract_information(self, text, descriptors).await
    }

    async fn analyze_sentiment(&self, text: &str) -> SentimentDistribution {
        ExtractionEngine::analyze_sentiment(self, text).await
    }

    async fn extract_skills(&self, text: &str) -> SkillList {
        ExtractionEngine::extract_skills(self, text).await
    }

    fn is_model_loaded(&self) -> bool {
        ExtractionEngine::is_model_loaded(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::FieldType;

    #[test]
    fn test_default_engine_loads_builtin_model() {
        let engine = ExtractionEngine::default();
        assert!(engine.is_model_loaded());
    }

    #[test]
    fn test_missing_model_degrades_to_patterns() {
        let engine = ExtractionEngine::from_config(&NlpConfig::with_model("missing_model_xyz"));
        assert!(!engine.is_model_loaded());
    }

    #[test]
    fn test_disabled_config() {
        let engine = ExtractionEngine::from_config(&NlpConfig::disabled());
        assert!(!engine.is_model_loaded());
    }

    #[test]
    fn test_operations_block_on() {
        let engine = ExtractionEngine::pattern_only();
        let descriptors = vec![FieldDescriptor::new("years", FieldType::Number)];

        let result =
            tokio_test::block_on(engine.extract_information("about 6 years", &descriptors)).unwrap();
        assert_eq!(result.get("years").and_then(|v| v.as_i64()), Some(6));

        let skills = tokio_test::block_on(engine.extract_skills("python"));
        assert!(skills.is_empty());
    }
}
