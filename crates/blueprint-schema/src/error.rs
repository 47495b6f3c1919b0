use blueprint_field::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("schema key must be lowercase letters and underscores only, got {0:?}")]
    InvalidKey(String),
    #[error("schema registry is sealed, cannot register {0:?}")]
    Sealed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("schema not found: {0}")]
    SchemaNotFound(String),
    #[error("schema class {class} for {key} cannot be loaded")]
    SchemaClassMissing { key: String, class: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema {schema}, field {field}: {source}")]
    Field {
        schema: String,
        field: String,
        #[source]
        source: FieldError,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
