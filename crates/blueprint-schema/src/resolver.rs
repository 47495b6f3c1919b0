use std::sync::Arc;

use blueprint_field::{FieldAttributes, FieldDefinition, FieldTypeRegistry};
use tracing::{debug, warn};

use crate::catalog::{Catalog, short_name};
use crate::contract::Collection;
use crate::error::ResolveError;
use crate::overrides::{FieldOverrides, FieldSpec};
use crate::registry::SchemaRegistry;
use crate::resolved::{CollectionMetadata, ResolvedSchema, RouteInfo, SchemaSummary};

/// Type a fillable key gets before overrides apply: from its cast when it
/// has one, otherwise from its name.
pub fn infer_type(key: &str, cast: Option<&str>) -> &'static str {
    match cast {
        Some("boolean" | "bool") => return "checkbox",
        Some("integer" | "int") => return "number",
        Some("float" | "double" | "decimal") => return "decimal",
        Some("datetime" | "date") => return "date",
        _ => {}
    }
    if key.contains("email") {
        "email"
    } else if key.contains("url") || key.contains("website") || key.contains("link") {
        "url"
    } else if key.contains("password") {
        "password"
    } else {
        "text"
    }
}

/// Merges registered schemas with their collections' metadata.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<SchemaRegistry>,
    catalog: Arc<Catalog>,
    field_types: Arc<FieldTypeRegistry>,
    rest_base: String,
}

impl Resolver {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        catalog: Arc<Catalog>,
        field_types: Arc<FieldTypeRegistry>,
        rest_base: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            catalog,
            field_types,
            rest_base: rest_base.into(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn field_types(&self) -> &FieldTypeRegistry {
        &self.field_types
    }

    pub fn resolve(&self, key: &str) -> Result<ResolvedSchema, ResolveError> {
        let class = self
            .registry
            .get(key)
            .ok_or_else(|| ResolveError::SchemaNotFound(key.to_string()))?;
        let schema = self
            .catalog
            .load_schema(&class)
            .ok_or_else(|| ResolveError::SchemaClassMissing {
                key: key.to_string(),
                class: class.clone(),
            })?;

        let overrides = schema.field_overrides();
        let collection = match schema.collection_ref() {
            Some(collection_class) => match self.catalog.load_collection(collection_class) {
                Some(collection) => {
                    Some(self.collection_metadata(collection_class, collection.as_ref()))
                }
                None => {
                    warn!(
                        key,
                        collection = collection_class,
                        "collection class missing, resolving degraded"
                    );
                    None
                }
            },
            None => {
                debug!(key, "schema has no collection");
                None
            }
        };

        let resolved_fields = match collection.as_ref().and_then(|c| c.model.as_ref()) {
            Some(model) => model
                .fillable
                .iter()
                .map(|field_key| {
                    let cast = model.casts.get(field_key).map(String::as_str);
                    self.build_field(field_key, cast, overrides.get(field_key))
                })
                .collect(),
            None => self.raw_fields(&overrides),
        };

        Ok(ResolvedSchema {
            key: key.to_string(),
            name: short_name(&class).to_string(),
            class,
            collection,
            fields: overrides,
            resolved_fields,
        })
    }

    /// Summaries of every registered schema in key order. Schemas whose
    /// class cannot be loaded are left out.
    pub fn summaries(&self) -> Vec<SchemaSummary> {
        self.registry
            .all()
            .into_iter()
            .filter_map(|(key, _)| match self.resolve(&key) {
                Ok(schema) => Some(SchemaSummary::from(&schema)),
                Err(e) => {
                    warn!(%key, error = %e, "skipping schema in listing");
                    None
                }
            })
            .collect()
    }

    /// `{rest_base}{namespace}/{route}`.
    pub fn endpoint_for(&self, namespace: &str, route: &str) -> String {
        let base = self.rest_base.trim_end_matches('/');
        let namespace = namespace.trim_matches('/');
        let route = route.trim_matches('/');
        format!("{base}/{namespace}/{route}")
    }

    fn collection_metadata(&self, class: &str, collection: &dyn Collection) -> CollectionMetadata {
        let model = collection.model();
        if model.is_none() {
            warn!(collection = class, "model metadata unavailable, resolving degraded");
        }
        let namespace = collection.rest_namespace().to_string();
        let route = collection.route().to_string();
        CollectionMetadata {
            class: class.to_string(),
            model,
            routes: RouteInfo {
                endpoint: self.endpoint_for(&namespace, &route),
                namespace,
                route,
                methods: collection.methods(),
            },
        }
    }

    fn build_field(&self, key: &str, cast: Option<&str>, spec: Option<&FieldSpec>) -> FieldDefinition {
        let inferred = infer_type(key, cast);
        let type_name = spec
            .and_then(|s| s.type_name.as_deref())
            .unwrap_or(inferred);
        let mut attributes = FieldAttributes::default();
        if let Some(spec) = spec {
            attributes.merge(&spec.attributes);
        }
        self.field_types.create_with(type_name, key, attributes)
    }

    fn raw_fields(&self, overrides: &FieldOverrides) -> Vec<FieldDefinition> {
        overrides
            .iter()
            .map(|(key, spec)| self.build_field(key, None, Some(spec)))
            .collect()
    }
}
