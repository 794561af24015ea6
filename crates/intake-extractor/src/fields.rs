//! Field extraction
//!
//! Dispatches each field descriptor to an extraction strategy chosen by
//! field type and by whether a recognizer is loaded:
//!
//! | type         | recognizer loaded     | no recognizer        |
//! |--------------|-----------------------|----------------------|
//! | name         | first PERSON entity   | whole trimmed text   |
//! | email        | email regex           | email regex          |
//! | phone        | phone regex           | phone regex          |
//! | location     | first GPE entity      | whole trimmed text   |
//! | date         | first DATE entity     | ISO date regex       |
//! | organization | first ORG entity      | whole trimmed text   |
//! | number       | first digit run       | first digit run      |
//! | text         | whole trimmed text    | whole trimmed text   |
//!
//! The pattern path has no name/location/organization support and
//! degrades those types to the whole trimmed text instead of failing.

use tracing::{debug, trace};

use intake_core::{
    validate_descriptors, ExtractionResult, FieldDescriptor, FieldType, FieldValue, Result,
};

use crate::patterns;
use crate::recognizer::{Entity, EntityLabel, EntityRecognizer, Recognizer};

/// Whether a field type is resolved from recognized entities
fn uses_entities(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::Name | FieldType::Location | FieldType::Date | FieldType::Organization
    )
}

/// Whole input, leading/trailing whitespace removed; never null
fn whole_text(text: &str) -> FieldValue {
    FieldValue::Text(patterns::trim_text(text).to_string())
}

fn first_entity(entities: &[Entity], label: &EntityLabel) -> FieldValue {
    entities
        .iter()
        .find(|e| &e.label == label)
        .map_or(FieldValue::Null, |e| FieldValue::Text(e.text.clone()))
}

fn text_match(found: Option<&str>) -> FieldValue {
    found.map_or(FieldValue::Null, FieldValue::from)
}

/// Extraction strategy when a recognizer is loaded
fn extract_with_entities(entities: &[Entity], text: &str, field_type: FieldType) -> FieldValue {
    match field_type {
        FieldType::Name => first_entity(entities, &EntityLabel::Person),
        FieldType::Email => text_match(patterns::find_email(text)),
        FieldType::Phone => text_match(patterns::find_phone(text)),
        FieldType::Location => first_entity(entities, &EntityLabel::Gpe),
        FieldType::Date => first_entity(entities, &EntityLabel::Date),
        FieldType::Organization => first_entity(entities, &EntityLabel::Org),
        FieldType::Number => patterns::find_integer(text).into(),
        FieldType::Text => whole_text(text),
    }
}

/// Extraction strategy without a recognizer
fn extract_with_patterns(text: &str, field_type: FieldType) -> FieldValue {
    match field_type {
        FieldType::Email => text_match(patterns::find_email(text)),
        FieldType::Phone => text_match(patterns::find_phone(text)),
        FieldType::Date => text_match(patterns::find_iso_date(text)),
        FieldType::Number => patterns::find_integer(text).into(),
        FieldType::Name | FieldType::Location | FieldType::Organization => {
            trace!(field_type = %field_type, "No pattern strategy, using whole text");
            whole_text(text)
        }
        FieldType::Text => whole_text(text),
    }
}

/// Per-descriptor field extraction over one utterance
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    recognizer: Recognizer,
}

impl FieldExtractor {
    pub fn new(recognizer: Recognizer) -> Self {
        Self { recognizer }
    }

    /// Extract one value per descriptor.
    ///
    /// The result holds exactly the descriptor ids. The only error is a
    /// malformed descriptor list (empty or duplicate ids).
    pub fn extract(&self, text: &str, descriptors: &[FieldDescriptor]) -> Result<ExtractionResult> {
        validate_descriptors(descriptors)?;

        let mut result = ExtractionResult::new();

        match self.recognizer.get() {
            Some(recognizer) => {
                let entities = self.entities_for(recognizer, text, descriptors);
                debug!(
                    fields = descriptors.len(),
                    entities = entities.len(),
                    "Extracting fields with entity recognizer"
                );
                for descriptor in descriptors {
                    let value = extract_with_entities(&entities, text, descriptor.field_type);
                    result.insert(descriptor.id.clone(), value);
                }
            }
            None => {
                debug!(fields = descriptors.len(), "Extracting fields with patterns");
                for descriptor in descriptors {
                    let value = extract_with_patterns(text, descriptor.field_type);
                    result.insert(descriptor.id.clone(), value);
                }
            }
        }

        Ok(result)
    }

    /// Run recognition once per call, and only when some field needs it
    fn entities_for(
        &self,
        recognizer: &dyn EntityRecognizer,
        text: &str,
        descriptors: &[FieldDescriptor],
    ) -> Vec<Entity> {
        if descriptors.iter().any(|d| uses_entities(d.field_type)) {
            recognizer.recognize(text)
        } else {
            Vec::new()
        }
    }
}
