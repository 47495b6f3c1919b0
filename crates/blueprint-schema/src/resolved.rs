use blueprint_field::FieldDefinition;
use serde::Serialize;

use crate::contract::ModelMetadata;
use crate::overrides::FieldOverrides;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub namespace: String,
    pub route: String,
    pub endpoint: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionMetadata {
    pub class: String,
    /// `None` when the collection's model could not be loaded.
    pub model: Option<ModelMetadata>,
    pub routes: RouteInfo,
}

/// A schema merged with its collection's metadata. Built fresh on every
/// resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSchema {
    pub key: String,
    pub class: String,
    pub name: String,
    pub collection: Option<CollectionMetadata>,
    /// The schema's declared overrides, as written.
    pub fields: FieldOverrides,
    /// One field per fillable key in fillable order, or the raw overrides
    /// when the collection's model is unavailable.
    pub resolved_fields: Vec<FieldDefinition>,
}

impl ResolvedSchema {
    /// True when no model metadata backed the resolution.
    pub fn is_degraded(&self) -> bool {
        self.collection
            .as_ref()
            .and_then(|c| c.model.as_ref())
            .is_none()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.collection.as_ref().map(|c| c.routes.endpoint.as_str())
    }

    pub fn table(&self) -> Option<&str> {
        self.model().map(|m| m.table.as_str())
    }

    pub fn model(&self) -> Option<&ModelMetadata> {
        self.collection.as_ref().and_then(|c| c.model.as_ref())
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.resolved_fields.iter().find(|f| f.key() == key)
    }

    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.resolved_fields.iter().map(FieldDefinition::key)
    }

    /// Fields a form shows: everything not marked hidden.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.resolved_fields.iter().filter(|f| !f.is_hidden())
    }
}

/// Listing entry for `GET /schemas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub key: String,
    pub class: String,
    pub name: String,
    pub collection: Option<CollectionSummary>,
    pub field_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub class: String,
    pub table: Option<String>,
    pub endpoint: String,
}

impl From<&ResolvedSchema> for SchemaSummary {
    fn from(schema: &ResolvedSchema) -> Self {
        Self {
            key: schema.key.clone(),
            class: schema.class.clone(),
            name: schema.name.clone(),
            collection: schema.collection.as_ref().map(|c| CollectionSummary {
                class: c.class.clone(),
                table: c.model.as_ref().map(|m| m.table.clone()),
                endpoint: c.routes.endpoint.clone(),
            }),
            field_count: schema.resolved_fields.len(),
        }
    }
}
