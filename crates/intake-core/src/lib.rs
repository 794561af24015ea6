//! Intake Core - Value types, errors, and configuration
//!
//! This crate defines the shapes exchanged between the extraction engine
//! and the conversation orchestrator that drives it:
//! - Field descriptors and the closed set of field types
//! - Extraction results (field id -> string | integer | null)
//! - Sentiment distributions and skill lists
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{ConfigError, EngineConfig, LoggingConfig, NlpConfig};

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Intake operations
#[derive(Error, Debug)]
pub enum IntakeError {
    /// A field descriptor (or descriptor payload) is malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The entity-recognition model could not be loaded
    #[error("Model '{model}' unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;

// ============================================================================
// Field Descriptors
// ============================================================================

/// Expected type of a field to extract from an utterance
///
/// Parsing from the wire is lenient: unknown type strings become [`FieldType::Text`],
/// which extracts the whole trimmed utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Name,
    Email,
    Phone,
    Location,
    Date,
    Organization,
    Number,
    #[default]
    Text,
}

impl FieldType {
    /// All field types, in declaration order
    pub const ALL: [FieldType; 8] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Location,
        Self::Date,
        Self::Organization,
        Self::Number,
        Self::Text,
    ];

    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Location => "location",
            Self::Date => "date",
            Self::Organization => "organization",
            Self::Number => "number",
            Self::Text => "text",
        }
    }

    /// Parse a wire type string, falling back to `Text` for unknown values
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "name" => Self::Name,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "location" => Self::Location,
            "date" => Self::Date,
            "organization" => Self::Organization,
            "number" => Self::Number,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

/// Caller-supplied description of one field to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field id, unique within one extraction call
    pub id: String,

    /// Expected value type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Any other keys the orchestrator attaches (question text, weights, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl FieldDescriptor {
    /// Create a descriptor without metadata
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            metadata: Map::new(),
        }
    }

    /// Attach an opaque metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build a descriptor from a raw JSON object.
    ///
    /// Both `id` and `type` are required strings; everything else is kept
    /// as metadata.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            IntakeError::Configuration("field descriptor must be a JSON object".to_string())
        })?;

        let id = match obj.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(Value::String(_)) => {
                return Err(IntakeError::Configuration(
                    "field descriptor has an empty id".to_string(),
                ))
            }
            Some(other) => {
                return Err(IntakeError::Configuration(format!(
                    "field descriptor id must be a string, got {other}"
                )))
            }
            None => {
                return Err(IntakeError::Configuration(
                    "field descriptor is missing required key 'id'".to_string(),
                ))
            }
        };

        let field_type = match obj.get("type") {
            Some(Value::String(t)) => FieldType::parse_lenient(t),
            Some(other) => {
                return Err(IntakeError::Configuration(format!(
                    "field descriptor '{id}' type must be a string, got {other}"
                )))
            }
            None => {
                return Err(IntakeError::Configuration(format!(
                    "field descriptor '{id}' is missing required key 'type'"
                )))
            }
        };

        let metadata = obj
            .iter()
            .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            field_type,
            metadata,
        })
    }
}

/// Parse a JSON array of descriptors, failing on the first malformed entry
pub fn parse_descriptors(value: &Value) -> Result<Vec<FieldDescriptor>> {
    let items = value.as_array().ok_or_else(|| {
        IntakeError::Configuration("field descriptors must be a JSON array".to_string())
    })?;

    items.iter().map(FieldDescriptor::from_json).collect()
}

/// Check the per-call descriptor invariants: non-empty, unique ids
pub fn validate_descriptors(descriptors: &[FieldDescriptor]) -> Result<()> {
    let mut seen = HashSet::with_capacity(descriptors.len());

    for descriptor in descriptors {
        if descriptor.id.trim().is_empty() {
            return Err(IntakeError::Configuration(
                "field descriptor has an empty id".to_string(),
            ));
        }
        if !seen.insert(descriptor.id.as_str()) {
            return Err(IntakeError::Configuration(format!(
                "duplicate field descriptor id '{}'",
                descriptor.id
            )));
        }
    }

    Ok(())
}

// ============================================================================
// Extraction Results
// ============================================================================

/// A single extracted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Mapping from field id to extracted value.
///
/// Keys are exactly the ids of the descriptors passed in; entries are
/// ordered by id so serialized output is stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: BTreeMap<String, FieldValue>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value for a field id
    pub fn insert(&mut self, id: impl Into<String>, value: FieldValue) {
        self.fields.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.fields.get(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field ids present in the result
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a JSON object for the persistence layer
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

// ============================================================================
// Sentiment and Skills
// ============================================================================

/// Three-way sentiment estimate; components are in `[0, 1]` and sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentDistribution {
    /// Distribution returned when nothing scorable was found
    pub fn neutral() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
        }
    }

    /// Sum of the three components
    pub fn total(&self) -> f64 {
        self.positive + self.negative + self.neutral
    }

    /// Whether the components sum to 1 within `tolerance`
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total() - 1.0).abs() <= tolerance
    }
}

impl Default for SentimentDistribution {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Skills found in an utterance, in vocabulary order, without duplicates
pub type SkillList = Vec<String>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_parse_lenient() {
        assert_eq!(FieldType::parse_lenient("email"), FieldType::Email);
        assert_eq!(FieldType::parse_lenient("Organization"), FieldType::Organization);
        assert_eq!(FieldType::parse_lenient("salary_band"), FieldType::Text);
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse_lenient(t.as_str()), t);
        }
    }

    #[test]
    fn test_descriptor_from_json_keeps_metadata() {
        let raw = json!({"id": "city", "type": "location", "question": "Where do you live?"});
        let descriptor = FieldDescriptor::from_json(&raw).unwrap();

        assert_eq!(descriptor.id, "city");
        assert_eq!(descriptor.field_type, FieldType::Location);
        assert_eq!(
            descriptor.metadata.get("question"),
            Some(&json!("Where do you live?"))
        );
    }

    #[test]
    fn test_descriptor_missing_id_is_configuration_error() {
        let err = FieldDescriptor::from_json(&json!({"type": "email"})).unwrap_err();
        assert!(matches!(err, IntakeError::Configuration(_)));
    }

    #[test]
    fn test_descriptor_missing_type_is_configuration_error() {
        let err = FieldDescriptor::from_json(&json!({"id": "e"})).unwrap_err();
        assert!(matches!(err, IntakeError::Configuration(_)));
        assert!(err.to_string().contains("'type'"));
    }

    #[test]
    fn test_descriptor_non_string_id_rejected() {
        assert!(FieldDescriptor::from_json(&json!({"id": 7, "type": "number"})).is_err());
        assert!(FieldDescriptor::from_json(&json!({"id": "  ", "type": "number"})).is_err());
        assert!(FieldDescriptor::from_json(&json!("email")).is_err());
    }

    #[test]
    fn test_parse_descriptors() {
        let raw = json!([
            {"id": "name", "type": "name"},
            {"id": "years", "type": "number"}
        ]);
        let descriptors = parse_descriptors(&raw).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].field_type, FieldType::Number);

        assert!(parse_descriptors(&json!({"id": "name"})).is_err());
    }

    #[test]
    fn test_validate_descriptors_rejects_duplicates() {
        let descriptors = vec![
            FieldDescriptor::new("a", FieldType::Text),
            FieldDescriptor::new("a", FieldType::Email),
        ];
        let err = validate_descriptors(&descriptors).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        assert!(validate_descriptors(&[FieldDescriptor::new("a", FieldType::Text)]).is_ok());
    }

    #[test]
    fn test_descriptor_serde_shape() {
        let descriptor =
            FieldDescriptor::new("phone", FieldType::Phone).with_metadata("required", true);
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value, json!({"id": "phone", "type": "phone", "required": true}));

        let back: FieldDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(back, descriptor);
    }

    #[test]
    fn test_extraction_result_json() {
        let mut result = ExtractionResult::new();
        result.insert("email", FieldValue::from("a@b.io"));
        result.insert("years", FieldValue::Integer(5));
        result.insert("city", FieldValue::Null);

        let value = result.to_json().unwrap();
        assert_eq!(value, json!({"city": null, "email": "a@b.io", "years": 5}));
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["city", "email", "years"]);
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::from(Some(3i64)).as_i64(), Some(3));
        assert!(FieldValue::from(None::<String>).is_null());
        assert_eq!(FieldValue::from("x").as_str(), Some("x"));
    }

    #[test]
    fn test_sentiment_default_is_neutral() {
        let s = SentimentDistribution::default();
        assert_eq!(s, SentimentDistribution::neutral());
        assert!(s.is_normalized(1e-12));
    }
}
