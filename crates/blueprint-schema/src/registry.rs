use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use arc_swap::ArcSwap;
use regex::Regex;
use tracing::{info, warn};

use crate::error::RegistryError;

static KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-z_]+$").expect("key regex"));

pub fn is_valid_key(key: &str) -> bool {
    KEY.is_match(key)
}

type Entries = BTreeMap<String, String>;

/// Schema key → schema class name.
///
/// Readers load a snapshot without locking. Writers copy the current map,
/// edit it and swap it in under a mutex. After [`seal`](Self::seal) new
/// registrations fail; removal stays possible.
pub struct SchemaRegistry {
    entries: ArcSwap<Entries>,
    write_lock: Mutex<()>,
    sealed: AtomicBool,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(BTreeMap::new()),
            write_lock: Mutex::new(()),
            sealed: AtomicBool::new(false),
        }
    }

    /// Register `key`. Re-registering a key replaces its class.
    pub fn register(&self, key: &str, class: impl Into<String>) -> Result<(), RegistryError> {
        if !is_valid_key(key) {
            return Err(RegistryError::InvalidKey(key.to_string()));
        }
        let class = class.into();
        self.update(|entries| {
            if self.is_sealed() {
                return Err(RegistryError::Sealed(key.to_string()));
            }
            if let Some(previous) = entries.insert(key.to_string(), class.clone()) {
                warn!(key, %previous, %class, "schema re-registered");
            } else {
                info!(key, %class, "schema registered");
            }
            Ok(())
        })
    }

    pub fn unregister(&self, key: &str) -> Option<String> {
        self.update(|entries| {
            let removed = entries.remove(key);
            if removed.is_some() {
                info!(key, "schema unregistered");
            }
            Ok::<_, RegistryError>(removed)
        })
        .ok()
        .flatten()
    }

    /// End of the startup phase.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::SeqCst) {
            info!(count = self.entries.load().len(), "schema registry sealed");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.load().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.load().contains_key(key)
    }

    /// `(key, class)` pairs in key order.
    pub fn all(&self) -> Vec<(String, String)> {
        self.entries
            .load()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn snapshot(&self) -> Arc<BTreeMap<String, String>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Drops every entry and unseals. Only built for tests and under the
    /// `test-util` feature.
    #[cfg(any(test, feature = "test-util"))]
    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.entries.store(Arc::new(BTreeMap::new()));
        self.sealed.store(false, Ordering::SeqCst);
    }

    fn update<T, E>(&self, edit: impl FnOnce(&mut Entries) -> Result<T, E>) -> Result<T, E> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = (**self.entries.load()).clone();
        let out = edit(&mut next)?;
        self.entries.store(Arc::new(next));
        Ok(out)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("entries", &self.entries.load())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
