use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use crate::attributes::{FieldAttributes, FieldOption, SortableChildrenConfig};
use crate::column::ColumnDefinition;
use crate::kind::FieldKind;
use crate::registry::{FieldBehavior, SortableChildrenBehavior, StandardBehavior};
use crate::rules::{Format, ValidationRules, ValueType};

/// A single field: its type, key and attributes, bound to the behavior that
/// renders, validates and maps it to a storage column.
///
/// The key is fixed at construction. Attribute setters consume and return
/// the definition so declarations read as one chain:
///
/// ```
/// use blueprint_field::FieldDefinition;
///
/// let title = FieldDefinition::new("text", "title")
///     .label("Title")
///     .required(true)
///     .max_length(120);
/// assert!(title.is_required());
/// ```
#[derive(Clone)]
pub struct FieldDefinition {
    type_name: String,
    kind: FieldKind,
    key: String,
    attributes: FieldAttributes,
    behavior: Arc<dyn FieldBehavior>,
}

impl FieldDefinition {
    /// A field bound to the built-in behavior for `type_name`.
    pub fn new(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let behavior: Arc<dyn FieldBehavior> = match FieldKind::from_name(&type_name) {
            FieldKind::SortableChildren => Arc::new(SortableChildrenBehavior),
            _ => Arc::new(StandardBehavior),
        };
        Self::with_behavior(type_name, key, behavior)
    }

    pub fn with_behavior(
        type_name: impl Into<String>,
        key: impl Into<String>,
        behavior: Arc<dyn FieldBehavior>,
    ) -> Self {
        let type_name = type_name.into();
        Self {
            kind: FieldKind::from_name(&type_name),
            type_name,
            key: key.into(),
            attributes: FieldAttributes::default(),
            behavior,
        }
    }

    pub fn attributes_from(mut self, attributes: FieldAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.attributes.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.attributes.required = Some(required);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.attributes.default = Some(value.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.attributes.placeholder = Some(text.into());
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.attributes.help_text = Some(text.into());
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.attributes.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.attributes.max_length = Some(len);
        self
    }

    pub fn options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<FieldOption>,
    {
        self.attributes.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn min(mut self, value: f64) -> Self {
        self.attributes.min = Some(value);
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        self.attributes.max = Some(value);
        self
    }

    pub fn step(mut self, value: f64) -> Self {
        self.attributes.step = Some(value);
        self
    }

    pub fn append(mut self, text: impl Into<String>) -> Self {
        self.attributes.append = Some(text.into());
        self
    }

    pub fn prepend(mut self, text: impl Into<String>) -> Self {
        self.attributes.prepend = Some(text.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>, message: Option<String>) -> Self {
        self.attributes.pattern = Some(pattern.into());
        self.attributes.pattern_message = message;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.attributes.hidden = Some(hidden);
        self
    }

    pub fn sortable_children(mut self, config: SortableChildrenConfig) -> Self {
        self.attributes.sortable_children = Some(config);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attributes(&self) -> &FieldAttributes {
        &self.attributes
    }

    /// The declared label, or the key humanized (`contact_email` → `Contact Email`).
    pub fn display_label(&self) -> String {
        self.attributes
            .label
            .clone()
            .unwrap_or_else(|| humanize(&self.key))
    }

    pub fn is_required(&self) -> bool {
        self.attributes.is_required()
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.is_hidden()
    }

    /// The rule set both server and client evaluate for this field.
    pub fn validation_rules(&self) -> ValidationRules {
        let attrs = &self.attributes;
        ValidationRules {
            value_type: match self.kind {
                FieldKind::Integer => Some(ValueType::Integer),
                FieldKind::Number | FieldKind::Decimal | FieldKind::Range => Some(ValueType::Number),
                FieldKind::Checkbox | FieldKind::Boolean => Some(ValueType::Boolean),
                FieldKind::Date | FieldKind::DateTime => Some(ValueType::Date),
                _ => None,
            },
            min_length: attrs.min_length,
            max_length: attrs.max_length,
            min: attrs.min,
            max: attrs.max,
            pattern: attrs.pattern.clone(),
            pattern_message: attrs.pattern_message.clone(),
            format: match self.kind {
                FieldKind::Email => Some(Format::Email),
                FieldKind::Url => Some(Format::Url),
                _ => None,
            },
            options: if self.kind.has_choices() {
                attrs.option_values()
            } else {
                None
            },
        }
    }

    pub fn render(&self, value: Option<&Value>) -> String {
        self.behavior.render(self, value)
    }

    pub fn validate(&self, value: &Value) -> Vec<String> {
        self.behavior.validate(self, value)
    }

    pub fn column_definition(&self) -> Option<ColumnDefinition> {
        self.behavior.column_definition(self)
    }

    /// `{ type, key, attributes }` export used by APIs.
    pub fn to_export(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for FieldDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldDefinition", 3)?;
        state.serialize_field("type", &self.type_name)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// `contact_email` → `Contact Email`.
pub fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
