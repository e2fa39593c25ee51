//! Shared registry of loaded module namespaces.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Mapping from module name to its loaded namespace.
///
/// Cloning is cheap and shares the underlying map. Writes are
/// last-write-wins; concurrent resolution of the same name is not
/// de-duplicated here, that is a caller responsibility.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    entries: Arc<DashMap<String, Value>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a loaded namespace by module name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Register a namespace under a module name.
    pub fn insert(&self, name: &str, namespace: Value) {
        self.entries.insert(name.to_string(), namespace);
    }

    /// Whether a module has been registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
