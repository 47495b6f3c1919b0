use std::collections::BTreeMap;

use blueprint_field::FieldDefinition;
use blueprint_schema::ResolvedSchema;
use serde_json::{Map, Value};
use tracing::debug;

/// Field key → every error message for that field. Valid fields are absent.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Run each field's own validation against `data[key]` (missing → null).
/// Fields carrying the `hidden` attribute are not part of any form and are
/// skipped, matching the client rule set.
pub fn validate_collection(fields: &[FieldDefinition], data: &Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in fields.iter().filter(|f| !f.is_hidden()) {
        let value = data.get(field.key()).unwrap_or(&Value::Null);
        let messages = field.validate(value);
        if !messages.is_empty() {
            errors.insert(field.key().to_string(), messages);
        }
    }
    if !errors.is_empty() {
        debug!(failed = errors.len(), "submission rejected");
    }
    errors
}

pub fn validate_schema(schema: &ResolvedSchema, data: &Map<String, Value>) -> FieldErrors {
    validate_collection(&schema.resolved_fields, data)
}
