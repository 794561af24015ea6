//! Lexicon-based sentiment scoring
//!
//! Two independent algorithms with deliberately different shapes:
//! - With a recognizer: only adjectives are scored, and the distribution
//!   is the positive/negative split among matched adjectives (neutral is 0
//!   as soon as one matches).
//! - Without: every whitespace-separated word counts, and each polarity is
//!   its share of all words.

use intake_core::SentimentDistribution;

use crate::patterns;
use crate::recognizer::{EntityRecognizer, PartOfSpeech, Recognizer};

/// Positive adjectives scored on the tagged path
pub const POSITIVE_ADJECTIVES: [&str; 6] =
    ["good", "great", "excellent", "amazing", "wonderful", "fantastic"];

/// Negative adjectives scored on the tagged path
pub const NEGATIVE_ADJECTIVES: [&str; 6] = ["bad", "terrible", "awful", "horrible", "poor", "worst"];

/// Positive words scored on the word-ratio path
pub const POSITIVE_WORDS: [&str; 7] = ["good", "great", "excellent", "happy", "love", "best", "amazing"];

/// Negative words scored on the word-ratio path
pub const NEGATIVE_WORDS: [&str; 6] = ["bad", "worst", "terrible", "hate", "awful", "poor"];

/// Sentiment analyzer bound to the engine's recognition capability
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer {
    recognizer: Recognizer,
}

impl SentimentAnalyzer {
    pub fn new(recognizer: Recognizer) -> Self {
        Self { recognizer }
    }

    pub fn analyze(&self, text: &str) -> SentimentDistribution {
        match self.recognizer.get() {
            Some(recognizer) => adjective_sentiment(recognizer, text),
            None => word_ratio_sentiment(text),
        }
    }
}

/// Score tagged adjectives against the adjective lexicons
pub fn adjective_sentiment(recognizer: &dyn EntityRecognizer, text: &str) -> SentimentDistribution {
    let mut positive = 0usize;
    let mut negative = 0usize;

    for token in recognizer.tag_parts_of_speech(text) {
        if token.pos != PartOfSpeech::Adj {
            continue;
        }
        let word = token.text.to_lowercase();
        if POSITIVE_ADJECTIVES.contains(&word.as_str()) {
            positive += 1;
        } else if NEGATIVE_ADJECTIVES.contains(&word.as_str()) {
            negative += 1;
        }
    }

    let total = positive + negative;
    if total == 0 {
        return SentimentDistribution::neutral();
    }

    SentimentDistribution {
        positive: positive as f64 / total as f64,
        negative: negative as f64 / total as f64,
        neutral: 0.0,
    }
}

/// Score exact lower-cased words against the word lexicons
pub fn word_ratio_sentiment(text: &str) -> SentimentDistribution {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = patterns::split_words(&lowered).collect();

    if words.is_empty() {
        return SentimentDistribution::neutral();
    }

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();
    let total = words.len() as f64;

    SentimentDistribution {
        positive: positive as f64 / total,
        negative: negative as f64 / total,
        neutral: 1.0 - ((positive + negative) as f64 / total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::LexiconRecognizer;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_word_ratio_example() {
        let s = word_ratio_sentiment("this is good and bad");
        assert_close(s.positive, 0.2);
        assert_close(s.negative, 0.2);
        assert_close(s.neutral, 0.6);
    }

    #[test]
    fn test_word_ratio_exact_words_only() {
        // punctuation attached to a word prevents the match
        let s = word_ratio_sentiment("Good, goodness GREAT");
        assert_close(s.positive, 1.0 / 3.0);
        assert_close(s.negative, 0.0);
        assert!(s.is_normalized(1e-9));
    }

    #[test]
    fn test_word_ratio_empty_is_neutral() {
        assert_eq!(word_ratio_sentiment(""), SentimentDistribution::neutral());
        assert_eq!(word_ratio_sentiment(" \t\n"), SentimentDistribution::neutral());
    }

    #[test]
    fn test_word_ratio_splits_on_information_separators() {
        let s = word_ratio_sentiment("good\u{1f}bad");
        assert_close(s.positive, 0.5);
        assert_close(s.negative, 0.5);
        assert_close(s.neutral, 0.0);
    }

    #[test]
    fn test_word_ratio_counts_verbs() {
        let s = word_ratio_sentiment("i love it but hate mondays");
        assert_close(s.positive, 1.0 / 6.0);
        assert_close(s.negative, 1.0 / 6.0);
    }

    #[test]
    fn test_adjective_split() {
        let ner = LexiconRecognizer::builtin().unwrap();
        let s = adjective_sentiment(&ner, "The team was great but the commute was terrible");
        assert_close(s.positive, 0.5);
        assert_close(s.negative, 0.5);
        assert_close(s.neutral, 0.0);
    }

    #[test]
    fn test_adjective_path_ignores_non_lexicon_words() {
        let ner = LexiconRecognizer::builtin().unwrap();
        // "love" is a verb and "happy" is not in the adjective lexicon
        let s = adjective_sentiment(&ner, "I love this job and I am happy");
        assert_eq!(s, SentimentDistribution::neutral());
    }

    #[test]
    fn test_adjective_path_all_positive() {
        let ner = LexiconRecognizer::builtin().unwrap();
        let s = adjective_sentiment(&ner, "An excellent, amazing and wonderful experience!");
        assert_close(s.positive, 1.0);
        assert_close(s.neutral, 0.0);
    }

    #[test]
    fn test_analyzer_dispatches_on_capability() {
        let text = "good work";
        let absent = SentimentAnalyzer::new(Recognizer::Absent).analyze(text);
        assert_close(absent.positive, 0.5);
        assert_close(absent.neutral, 0.5);

        let active = SentimentAnalyzer::new(Recognizer::active(LexiconRecognizer::builtin().unwrap()))
            .analyze(text);
        assert_close(active.positive, 1.0);
        assert_close(active.neutral, 0.0);
    }
}
