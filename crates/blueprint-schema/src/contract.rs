use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::overrides::FieldOverrides;

pub const DEFAULT_NAMESPACE: &str = "blueprint/v1";

/// A declared schema: which collection it wraps and how its fields differ
/// from what the collection's model implies.
pub trait Schema: Send + Sync {
    /// Class name of the wrapped collection, looked up in the catalog.
    fn collection_ref(&self) -> Option<&str>;

    fn field_overrides(&self) -> FieldOverrides;
}

/// Model metadata a collection exposes: fillable keys in form order, cast
/// kinds and the backing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    pub class: String,
    pub table: String,
    pub fillable: Vec<String>,
    pub casts: BTreeMap<String, String>,
}

/// The external CRUD resource a schema wraps.
pub trait Collection: Send + Sync {
    /// `None` when the collection's model class cannot be loaded.
    fn model(&self) -> Option<ModelMetadata>;

    fn rest_namespace(&self) -> &str {
        DEFAULT_NAMESPACE
    }

    fn route(&self) -> &str;

    fn methods(&self) -> Vec<String> {
        default_methods()
    }
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Data-only collection, as declared in manifests and fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDescriptor {
    pub class: String,
    #[serde(default)]
    pub model: Option<ModelMetadata>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub route: String,
    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl CollectionDescriptor {
    pub fn new(class: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            model: None,
            namespace: default_namespace(),
            route: route.into(),
            methods: None,
        }
    }

    pub fn with_model(mut self, model: ModelMetadata) -> Self {
        self.model = Some(model);
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

impl Collection for CollectionDescriptor {
    fn model(&self) -> Option<ModelMetadata> {
        self.model.clone()
    }

    fn rest_namespace(&self) -> &str {
        &self.namespace
    }

    fn route(&self) -> &str {
        &self.route
    }

    fn methods(&self) -> Vec<String> {
        self.methods.clone().unwrap_or_else(default_methods)
    }
}

/// Data-only schema, as declared in manifests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredSchema {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub fields: FieldOverrides,
}

impl Schema for DeclaredSchema {
    fn collection_ref(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    fn field_overrides(&self) -> FieldOverrides {
        self.fields.clone()
    }
}
