use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::attributes::FieldAttributes;
use crate::column::ColumnDefinition;
use crate::definition::FieldDefinition;
use crate::markup;
use crate::rules;

/// What a field kind does: render itself, validate a submitted value and
/// describe its storage column.
///
/// Built-in kinds share [`StandardBehavior`]. Applications register their own
/// implementations in a [`FieldTypeRegistry`] under a new type name.
pub trait FieldBehavior: Send + Sync {
    fn render(&self, field: &FieldDefinition, value: Option<&Value>) -> String;

    /// Every failing rule's message, in rule order. Empty means valid.
    fn validate(&self, field: &FieldDefinition, value: &Value) -> Vec<String>;

    fn column_definition(&self, field: &FieldDefinition) -> Option<ColumnDefinition>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBehavior;

impl FieldBehavior for StandardBehavior {
    fn render(&self, field: &FieldDefinition, value: Option<&Value>) -> String {
        markup::render_field(field, value)
    }

    fn validate(&self, field: &FieldDefinition, value: &Value) -> Vec<String> {
        rules::check(
            &field.display_label(),
            field.is_required(),
            &field.validation_rules(),
            value,
        )
        .into_iter()
        .map(|failure| failure.message)
        .collect()
    }

    fn column_definition(&self, field: &FieldDefinition) -> Option<ColumnDefinition> {
        ColumnDefinition::for_field(field)
    }
}

/// Child lists live in their own collection: nothing to store, nothing to
/// validate on the parent record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortableChildrenBehavior;

impl FieldBehavior for SortableChildrenBehavior {
    fn render(&self, field: &FieldDefinition, _value: Option<&Value>) -> String {
        markup::render_sortable_children(field)
    }

    fn validate(&self, _field: &FieldDefinition, _value: &Value) -> Vec<String> {
        Vec::new()
    }

    fn column_definition(&self, _field: &FieldDefinition) -> Option<ColumnDefinition> {
        None
    }
}

/// Maps type names to behaviors.
///
/// Populated at startup, then shared read-only (typically behind an `Arc`).
/// Unknown type names create text fields.
#[derive(Clone)]
pub struct FieldTypeRegistry {
    types: BTreeMap<String, Arc<dyn FieldBehavior>>,
}

impl FieldTypeRegistry {
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Every built-in kind, keyed by its canonical name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        let standard: Arc<dyn FieldBehavior> = Arc::new(StandardBehavior);
        for kind in crate::kind::FieldKind::ALL {
            let behavior = if kind.is_virtual() {
                Arc::new(SortableChildrenBehavior) as Arc<dyn FieldBehavior>
            } else {
                standard.clone()
            };
            registry.types.insert(kind.as_str().to_string(), behavior);
        }
        registry
    }

    /// Register (or replace) a type. Returns the behavior previously bound
    /// to the name, if any.
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        behavior: Arc<dyn FieldBehavior>,
    ) -> Option<Arc<dyn FieldBehavior>> {
        let name = name.into();
        debug!(type_name = %name, "registering field type");
        self.types.insert(name, behavior)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn create(&self, type_name: &str, key: &str) -> FieldDefinition {
        match self.types.get(type_name) {
            Some(behavior) => FieldDefinition::with_behavior(type_name, key, behavior.clone()),
            None => {
                debug!(type_name, key, "unknown field type, using text");
                FieldDefinition::new("text", key)
            }
        }
    }

    pub fn create_with(
        &self,
        type_name: &str,
        key: &str,
        attributes: FieldAttributes,
    ) -> FieldDefinition {
        self.create(type_name, key).attributes_from(attributes)
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}
