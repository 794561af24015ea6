//! Intake Extractor - Information extraction for interview conversations
//!
//! Turns a free-form candidate utterance into typed field values, a
//! sentiment estimate, and a skill list. An optional entity recognizer is
//! loaded once at startup; without it every operation falls back to
//! deterministic pattern and lexicon rules.

use async_trait::async_trait;

use intake_core::{ExtractionResult, FieldDescriptor, Result, SentimentDistribution, SkillList};

pub mod engine;
pub mod fields;
pub mod ner;
pub mod patterns;
pub mod recognizer;
pub mod sentiment;
pub mod skills;

pub use engine::ExtractionEngine;
pub use fields::FieldExtractor;
pub use ner::{LexiconModel, LexiconRecognizer};
pub use recognizer::{Entity, EntityLabel, EntityRecognizer, PartOfSpeech, Recognizer, TaggedToken};
pub use sentiment::SentimentAnalyzer;
pub use skills::SkillExtractor;

/// Operations the conversation orchestrator calls on each utterance
#[async_trait]
pub trait ConversationAnalyzer: Send + Sync {
    /// One value per descriptor id; fails only on malformed descriptors
    async fn extract_information(
        &self,
        text: &str,
        descriptors: &[FieldDescriptor],
    ) -> Result<ExtractionResult>;

    /// Sentiment distribution summing to 1
    async fn analyze_sentiment(&self, text: &str) -> SentimentDistribution;

    /// Skills in vocabulary order, deduplicated
    async fn extract_skills(&self, text: &str) -> SkillList;

    /// Whether an entity recognizer is active
    fn is_model_loaded(&self) -> bool;
}
