mod catalog;
mod contract;
mod error;
mod manifest;
mod overrides;
mod registry;
mod resolved;
mod resolver;

pub use catalog::{Catalog, short_name};
pub use contract::{
    Collection, CollectionDescriptor, DEFAULT_NAMESPACE, DeclaredSchema, ModelMetadata, Schema,
};
pub use error::{ManifestError, RegistryError, ResolveError};
pub use manifest::{Manifest, SchemaDeclaration};
pub use overrides::{FieldOverrides, FieldSpec};
pub use registry::{SchemaRegistry, is_valid_key};
pub use resolved::{CollectionMetadata, CollectionSummary, ResolvedSchema, RouteInfo, SchemaSummary};
pub use resolver::{Resolver, infer_type};
