//! Skill tagging against a fixed technology vocabulary

use intake_core::SkillList;

use crate::recognizer::Recognizer;

/// Recognized skills, in output order
pub const TECH_SKILLS: [&str; 21] = [
    "python",
    "java",
    "javascript",
    "react",
    "angular",
    "vue",
    "sql",
    "mongodb",
    "postgresql",
    "mysql",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "jenkins",
    "git",
    "machine learning",
    "data science",
    "ai",
    "artificial intelligence",
    "deep learning",
];

/// Vocabulary scan over the lower-cased text.
///
/// Matching is plain substring containment, so "java" is also found in
/// "javascript" and "ai" in "maintain".
pub fn scan_skills(text: &str) -> SkillList {
    let lowered = text.to_lowercase();
    let mut skills = SkillList::new();

    for skill in TECH_SKILLS {
        if lowered.contains(skill) && !skills.iter().any(|s| s == skill) {
            skills.push(skill.to_string());
        }
    }

    skills
}

/// Skill extractor bound to the engine's recognition capability.
///
/// Skills are only reported when a recognizer is loaded.
#[derive(Debug, Clone, Default)]
pub struct SkillExtractor {
    recognizer: Recognizer,
}

impl SkillExtractor {
    pub fn new(recognizer: Recognizer) -> Self {
        Self { recognizer }
    }

    pub fn extract(&self, text: &str) -> SkillList {
        if self.recognizer.is_active() {
            scan_skills(text)
        } else {
            SkillList::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::LexiconRecognizer;

    #[test]
    fn test_dedup_and_vocabulary_order() {
        assert_eq!(
            scan_skills("I know Python, python, and also Docker"),
            vec!["python", "docker"]
        );
        assert_eq!(
            scan_skills("Kubernetes first, then AWS and SQL"),
            vec!["sql", "aws", "kubernetes"]
        );
    }

    #[test]
    fn test_substring_containment() {
        assert_eq!(scan_skills("JavaScript developer"), vec!["java", "javascript"]);
        assert_eq!(
            scan_skills("I did some Machine Learning with PostgreSQL"),
            vec!["sql", "postgresql", "machine learning"]
        );
        assert_eq!(scan_skills("maintenance"), vec!["ai"]);
    }

    #[test]
    fn test_no_skills() {
        assert!(scan_skills("I enjoy hiking").is_empty());
        assert!(scan_skills("").is_empty());
    }

    #[test]
    fn test_extractor_requires_recognizer() {
        let text = "Python and Docker";
        assert!(SkillExtractor::new(Recognizer::Absent).extract(text).is_empty());

        let active = SkillExtractor::new(Recognizer::active(LexiconRecognizer::builtin().unwrap()));
        assert_eq!(active.extract(text), vec!["python", "docker"]);
    }
}
