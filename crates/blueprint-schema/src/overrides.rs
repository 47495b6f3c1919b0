use std::fmt;

use blueprint_field::FieldAttributes;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A sparse per-field override: an optional type plus any attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(flatten)]
    pub attributes: FieldAttributes,
}

impl FieldSpec {
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            attributes: FieldAttributes::default(),
        }
    }

    pub fn with(mut self, edit: impl FnOnce(&mut FieldAttributes)) -> Self {
        edit(&mut self.attributes);
        self
    }
}

impl From<FieldAttributes> for FieldSpec {
    fn from(attributes: FieldAttributes) -> Self {
        Self {
            type_name: None,
            attributes,
        }
    }
}

/// Field overrides keyed by field key, kept in declaration order.
///
/// Serializes as a JSON object. Deserializing keeps document order; a
/// repeated key replaces the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOverrides {
    entries: Vec<(String, FieldSpec)>,
}

impl FieldOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert.
    pub fn field(mut self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.insert(key, spec);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, spec: FieldSpec) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = spec,
            None => self.entries.push((key, spec)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldOverrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, spec) in &self.entries {
            map.serialize_entry(key, spec)?;
        }
        map.end()
    }
}

struct OverridesVisitor;

impl<'de> Visitor<'de> for OverridesVisitor {
    type Value = FieldOverrides;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field key to field override")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut overrides = FieldOverrides::new();
        while let Some((key, spec)) = access.next_entry::<String, FieldSpec>()? {
            overrides.insert(key, spec);
        }
        Ok(overrides)
    }
}

impl<'de> Deserialize<'de> for FieldOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OverridesVisitor)
    }
}
