//! Tracks the namespaces a route has registered receive callbacks for.

use std::collections::BTreeSet;

/// Set of namespaces with a live message-received callback.
///
/// Iteration order is sorted, which keeps session snapshots stable.
#[derive(Debug, Default)]
pub(crate) struct NamespaceRegistry {
    namespaces: BTreeSet<String>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Records a successful registration.
    ///
    /// A namespace is registered at most once; callers check [`contains`](Self::contains) first.
    pub fn insert(&mut self, namespace: &str) {
        let inserted = self.namespaces.insert(namespace.to_string());
        debug_assert!(inserted, "namespace {namespace} registered twice");
    }

    /// Copy of the registered namespaces.
    pub fn snapshot(&self) -> Vec<String> {
        self.namespaces.iter().cloned().collect()
    }

    /// Empties the registry, returning what was registered.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.namespaces).into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_sorted() {
        let mut registry = NamespaceRegistry::new();
        registry.insert("urn:x-cast:b");
        registry.insert("urn:x-cast:a");

        assert_eq!(registry.snapshot(), vec!["urn:x-cast:a", "urn:x-cast:b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn drain_empties_registry() {
        let mut registry = NamespaceRegistry::new();
        registry.insert("urn:x-cast:a");

        assert_eq!(registry.drain(), vec!["urn:x-cast:a"]);
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("urn:x-cast:a"));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    #[cfg(debug_assertions)]
    fn duplicate_insert_is_a_contract_violation() {
        let mut registry = NamespaceRegistry::new();
        registry.insert("urn:x-cast:a");
        registry.insert("urn:x-cast:a");
    }
}
