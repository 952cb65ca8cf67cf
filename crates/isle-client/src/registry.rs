//! Island component registry

use indexmap::IndexMap;
use isle_core::{Component, IslandId};

/// Island components the client can revive, by island name and export
#[derive(Debug, Clone, Default)]
pub struct IslandRegistry {
    components: IndexMap<IslandId, Component>,
}

impl IslandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register an island component
    pub fn with(mut self, component: Component) -> Self {
        self.register(component);
        self
    }

    /// Register an island component under its own island id.
    ///
    /// Plain components are registered under their name and the
    /// `default` export.
    pub fn register(&mut self, component: Component) {
        let id = component.island_id()
            .cloned()
            .unwrap_or_else(|| IslandId::new(component.name(), "default"));
        self.insert(id, component);
    }

    pub fn insert(&mut self, id: IslandId, component: Component) {
        tracing::trace!(island = %id.id, export = %id.export, "Registered island");
        self.components.insert(id, component);
    }

    pub fn get(&self, island: &str, export: &str) -> Option<&Component> {
        self.components.get(&IslandId::new(island, export))
    }

    pub fn contains(&self, island: &str, export: &str) -> bool {
        self.get(island, export).is_some()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_core::VNode;

    #[test]
    fn test_lookup_by_island_and_export() {
        let counter = Component::island("counter", "Counter", |_, _| VNode::text("c"));
        let registry = IslandRegistry::new().with(counter.clone());

        assert!(registry.get("counter", "Counter").is_some_and(|c| c.ptr_eq(&counter)));
        assert!(!registry.contains("counter", "default"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_plain_component_uses_default_export() {
        let mut registry = IslandRegistry::new();
        registry.register(Component::new("card", |_, _| VNode::text("c")));
        assert!(registry.contains("card", "default"));
    }
}
