use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::contract::{Collection, Schema};

type SchemaFactory = Arc<dyn Fn() -> Box<dyn Schema> + Send + Sync>;

/// Class-name lookup for schemas and collections.
///
/// The registry only stores class names; the resolver turns them into
/// instances here. A name with no entry is a class that cannot be loaded.
#[derive(Clone, Default)]
pub struct Catalog {
    schemas: BTreeMap<String, SchemaFactory>,
    collections: BTreeMap<String, Arc<dyn Collection>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schema<S>(&mut self, class: impl Into<String>)
    where
        S: Schema + Default + 'static,
    {
        self.add_schema_with(class, || Box::new(S::default()) as Box<dyn Schema>);
    }

    pub fn add_schema_with<F>(&mut self, class: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Schema> + Send + Sync + 'static,
    {
        self.schemas.insert(class.into(), Arc::new(factory));
    }

    pub fn add_collection(&mut self, class: impl Into<String>, collection: impl Collection + 'static) {
        self.collections.insert(class.into(), Arc::new(collection));
    }

    pub fn load_schema(&self, class: &str) -> Option<Box<dyn Schema>> {
        self.schemas.get(class).map(|factory| factory())
    }

    pub fn load_collection(&self, class: &str) -> Option<Arc<dyn Collection>> {
        self.collections.get(class).cloned()
    }

    pub fn has_schema(&self, class: &str) -> bool {
        self.schemas.contains_key(class)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("collections", &self.collections.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Short class name: the segment after the last `\`, `/` or `::`.
pub fn short_name(class: &str) -> &str {
    let tail = class.rsplit("::").next().unwrap_or(class);
    tail.rsplit(['\\', '/']).next().unwrap_or(tail)
}
