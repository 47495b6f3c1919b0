use std::path::Path;

use blueprint_field::{FieldError, FieldKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::contract::{CollectionDescriptor, DeclaredSchema, Schema};
use crate::error::ManifestError;
use crate::overrides::FieldOverrides;
use crate::registry::SchemaRegistry;

/// Collections and schemas declared as JSON:
///
/// ```json
/// {
///   "collections": [{ "class": "Tickets", "route": "tickets",
///                     "model": { "class": "Ticket", "table": "tickets",
///                                "fillable": ["title"], "casts": {} } }],
///   "schemas": [{ "key": "ticket", "class": "TicketSchema",
///                 "collection": "Tickets",
///                 "fields": { "title": { "required": true } } }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub collections: Vec<CollectionDescriptor>,
    pub schemas: Vec<SchemaDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub key: String,
    pub class: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub fields: FieldOverrides,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(text)?;
        manifest.check()?;
        Ok(manifest)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Declaration-time checks serde cannot express.
    fn check(&self) -> Result<(), ManifestError> {
        for schema in &self.schemas {
            for (key, spec) in schema.fields.iter() {
                let is_children = spec
                    .type_name
                    .as_deref()
                    .map(FieldKind::from_name)
                    == Some(FieldKind::SortableChildren);
                if is_children && spec.attributes.sortable_children.is_none() {
                    return Err(ManifestError::Field {
                        schema: schema.key.clone(),
                        field: key.to_string(),
                        source: FieldError::InvalidSortableChildren("an endpoint"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Add every class to `catalog` and register every schema.
    pub fn install(self, catalog: &mut Catalog, registry: &SchemaRegistry) -> Result<(), ManifestError> {
        for collection in self.collections {
            catalog.add_collection(collection.class.clone(), collection);
        }
        for declaration in self.schemas {
            let schema = DeclaredSchema {
                collection: declaration.collection,
                fields: declaration.fields,
            };
            catalog.add_schema_with(declaration.class.clone(), move || {
                Box::new(schema.clone()) as Box<dyn Schema>
            });
            registry.register(&declaration.key, declaration.class)?;
        }
        info!(schemas = registry.len(), "manifest installed");
        Ok(())
    }
}
