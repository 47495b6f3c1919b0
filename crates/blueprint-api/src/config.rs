use std::path::PathBuf;
use std::sync::Arc;

use blueprint_field::FieldTypeRegistry;
use blueprint_schema::{Catalog, Manifest, ManifestError, RegistryError, Resolver, SchemaRegistry};
use tracing::info;

pub const DEFAULT_ADDR: &str = "0.0.0.0:9700";
pub const DEFAULT_REST_BASE: &str = "http://localhost:9700/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub addr: String,
    /// Prefix of every collection endpoint URL.
    pub rest_base: String,
    /// JSON manifest declaring collections and schemas. Without one the
    /// bundled ticket fixtures are served.
    pub manifest: Option<PathBuf>,
    pub nonce: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.into(),
            rest_base: DEFAULT_REST_BASE.into(),
            manifest: None,
            nonce: String::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: lookup("BLUEPRINT_API_ADDR").unwrap_or(defaults.addr),
            rest_base: lookup("BLUEPRINT_REST_BASE").unwrap_or(defaults.rest_base),
            manifest: lookup("BLUEPRINT_MANIFEST")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            nonce: lookup("BLUEPRINT_NONCE").unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Load schema declarations, then seal the registry.
pub fn build_resolver(config: &ApiConfig) -> Result<Resolver, StartupError> {
    let registry = SchemaRegistry::new();
    let catalog = match &config.manifest {
        Some(path) => {
            let mut catalog = Catalog::new();
            Manifest::from_path(path)?.install(&mut catalog, &registry)?;
            info!(manifest = %path.display(), schemas = registry.len(), "manifest loaded");
            catalog
        }
        None => {
            blueprint_fixtures::register(&registry)?;
            blueprint_fixtures::catalog()
        }
    };
    registry.seal();
    Ok(Resolver::new(
        Arc::new(registry),
        Arc::new(catalog),
        Arc::new(FieldTypeRegistry::with_builtins()),
        config.rest_base.clone(),
    ))
}
