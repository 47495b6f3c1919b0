use std::collections::BTreeMap;

use blueprint_field::rules::{self, RuleFailure, ValueType};
use blueprint_field::{FieldDefinition, ValidationRules};
use blueprint_schema::ResolvedSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// How a raw input value is converted once it passes validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Coercion {
    Boolean,
    Integer,
    Float,
    Date,
    Enum(Vec<String>),
    String,
}

impl Coercion {
    fn for_rules(rules: &ValidationRules) -> Self {
        match (rules.value_type, &rules.options) {
            (Some(ValueType::Boolean), _) => Coercion::Boolean,
            (Some(ValueType::Integer), _) => Coercion::Integer,
            (Some(ValueType::Number), _) => Coercion::Float,
            (Some(ValueType::Date), _) => Coercion::Date,
            (None, Some(options)) => Coercion::Enum(options.clone()),
            (None, None) => Coercion::String,
        }
    }

    /// Convert a value that already passed the rules.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Coercion::Boolean => Value::Bool(rules::as_bool(value).unwrap_or(false)),
            _ if rules::is_empty(value) => Value::Null,
            Coercion::Integer => rules::as_number(value)
                .map(|n| Value::from(n as i64))
                .unwrap_or(Value::Null),
            Coercion::Float => rules::as_number(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Coercion::Date | Coercion::String => match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other.clone(),
            },
            Coercion::Enum(_) => value.clone(),
        }
    }
}

/// One field of the client rule set: what the vanilla controller receives
/// per field and what the dynamic form validates against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub label: String,
    pub required: bool,
    #[serde(default)]
    pub validation: ValidationRules,
}

impl FieldRule {
    pub fn for_field(field: &FieldDefinition) -> Self {
        Self {
            name: field.key().to_string(),
            type_name: field.type_name().to_string(),
            label: field.display_label(),
            required: field.is_required(),
            validation: field.validation_rules(),
        }
    }

    pub fn coercion(&self) -> Coercion {
        Coercion::for_rules(&self.validation)
    }

    /// The first failing rule, if any.
    pub fn check(&self, value: &Value) -> Option<RuleFailure> {
        rules::first_failure(&self.label, self.required, &self.validation, value)
    }
}

/// Client-side rule set built from a resolved field list before the user
/// interacts with the form. Hidden and virtual fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSchema {
    fields: Vec<FieldRule>,
}

/// Field key → the single message surfaced inline.
pub type FirstErrors = BTreeMap<String, String>;

impl ValidationSchema {
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a FieldDefinition>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .filter(|f| !f.is_hidden() && !f.kind().is_virtual())
                .map(FieldRule::for_field)
                .collect(),
        }
    }

    pub fn from_schema(schema: &ResolvedSchema) -> Self {
        Self::from_fields(&schema.resolved_fields)
    }

    pub fn from_rules(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == key)
    }

    /// Blur-time check of one field. Unknown keys are valid.
    pub fn validate_field(&self, key: &str, value: &Value) -> Option<RuleFailure> {
        self.field(key).and_then(|rule| rule.check(value))
    }

    /// Check every field, then coerce. Keys outside the schema are dropped.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<Map<String, Value>, FirstErrors> {
        let mut errors = FirstErrors::new();
        let mut out = Map::new();
        for rule in &self.fields {
            let value = data.get(&rule.name).unwrap_or(&Value::Null);
            match rule.check(value) {
                Some(failure) => {
                    errors.insert(rule.name.clone(), failure.message);
                }
                None => {
                    out.insert(rule.name.clone(), rule.coercion().apply(value));
                }
            }
        }
        if errors.is_empty() { Ok(out) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn coercion_follows_field_kind() {
        let fields = [
            FieldDefinition::new("checkbox", "urgent"),
            FieldDefinition::new("integer", "count"),
            FieldDefinition::new("decimal", "price"),
            FieldDefinition::new("datetime", "due_at"),
            FieldDefinition::new("select", "priority").options(["low", "high"]),
            FieldDefinition::new("textarea", "notes"),
        ];
        let schema = ValidationSchema::from_fields(&fields);
        let coercions: Vec<_> = schema.fields().iter().map(FieldRule::coercion).collect();
        assert_eq!(
            coercions,
            vec![
                Coercion::Boolean,
                Coercion::Integer,
                Coercion::Float,
                Coercion::Date,
                Coercion::Enum(vec!["low".into(), "high".into()]),
                Coercion::String,
            ]
        );

        let data = schema
            .validate(&object(json!({
                "urgent": "on",
                "count": "12",
                "price": "9.5",
                "due_at": "2025-01-02T09:00",
                "priority": "high",
                "notes": "  spaced  "
            })))
            .unwrap();
        assert_eq!(
            Value::Object(data),
            json!({
                "urgent": true,
                "count": 12,
                "price": 9.5,
                "due_at": "2025-01-02T09:00",
                "priority": "high",
                "notes": "spaced"
            })
        );
    }

    #[test]
    fn empty_optional_values_become_null() {
        let fields = [
            FieldDefinition::new("number", "count"),
            FieldDefinition::new("checkbox", "urgent"),
        ];
        let data = ValidationSchema::from_fields(&fields)
            .validate(&object(json!({ "count": "" })))
            .unwrap();
        assert_eq!(Value::Object(data), json!({ "count": null, "urgent": false }));
    }

    #[test]
    fn only_the_first_failure_is_kept() {
        let fields = [FieldDefinition::new("email", "contact_email").max_length(5)];
        let errors = ValidationSchema::from_fields(&fields)
            .validate(&object(json!({ "contact_email": "not-an-email" })))
            .unwrap_err();
        assert_eq!(
            errors["contact_email"],
            "Contact Email must be no more than 5 characters"
        );
    }

    #[test]
    fn hidden_and_virtual_fields_are_skipped() {
        let fields = [
            FieldDefinition::new("text", "title"),
            FieldDefinition::new("text", "secret").hidden(true).required(true),
            FieldDefinition::new("sortable_children", "replies"),
        ];
        let schema = ValidationSchema::from_fields(&fields);
        assert_eq!(schema.fields().len(), 1);
        assert!(schema.validate(&Map::new()).is_ok());
        assert!(schema.validate_field("secret", &Value::Null).is_none());
    }

    #[test]
    fn rules_serialize_for_controllers() {
        let fields = [FieldDefinition::new("text", "title").label("Title").required(true).max_length(50)];
        let value = serde_json::to_value(ValidationSchema::from_fields(&fields)).unwrap();
        assert_eq!(
            value,
            json!({ "fields": [{
                "name": "title",
                "type": "text",
                "label": "Title",
                "required": true,
                "validation": { "max_length": 50 }
            }]})
        );
    }
}
