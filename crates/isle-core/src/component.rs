//! Components

use crate::{Props, VNode};
use isle_serial::Object;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Island identity carried by island markers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IslandId {
    /// Island name (usually the module name)
    pub id: String,
    /// Export of the island module holding the component
    pub export: String,
}

impl IslandId {
    pub fn new(id: &str, export: &str) -> Self {
        Self {
            id: id.to_string(),
            export: export.to_string(),
        }
    }
}

/// Entry of the island registry block embedded in pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandSpec {
    pub island: String,
    /// Export name inside the module
    pub export: String,
    /// Module URL
    pub url: String,
}

impl IslandSpec {
    pub fn id(&self) -> IslandId {
        IslandId::new(&self.island, &self.export)
    }
}

/// Per-instance state handed to render functions
#[derive(Debug, Clone, Default)]
pub struct Scope {
    state: Object,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance-local state, kept across re-renders
    pub fn state(&self) -> &Object {
        &self.state
    }
}

type RenderFn = dyn Fn(&Props, &Scope) -> VNode;

struct ComponentDef {
    name: String,
    island: Option<IslandId>,
    render: Box<RenderFn>,
}

/// A render function with an identity.
///
/// Cloning shares the definition; two handles are the same component iff
/// they come from the same constructor call.
#[derive(Clone)]
pub struct Component(Rc<ComponentDef>);

impl Component {
    /// Plain component, rendered inline
    pub fn new(name: &str, render: impl Fn(&Props, &Scope) -> VNode + 'static) -> Self {
        Self(Rc::new(ComponentDef {
            name: name.to_string(),
            island: None,
            render: Box::new(render),
        }))
    }

    /// Island component: server output is marked and revived on the client
    pub fn island(id: &str, export: &str, render: impl Fn(&Props, &Scope) -> VNode + 'static) -> Self {
        Self(Rc::new(ComponentDef {
            name: id.to_string(),
            island: Some(IslandId::new(id, export)),
            render: Box::new(render),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn island_id(&self) -> Option<&IslandId> {
        self.0.island.as_ref()
    }

    #[inline]
    pub fn is_island(&self) -> bool {
        self.0.island.is_some()
    }

    pub fn render(&self, props: &Props, scope: &Scope) -> VNode {
        (self.0.render)(props, scope)
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.0.name)
            .field("island", &self.0.island)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_identity() {
        let a = Component::new("a", |_, _| VNode::text("a"));
        let b = Component::new("a", |_, _| VNode::text("a"));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_island_render_reads_scope() {
        let island = Component::island("counter", "default", |props, scope| {
            let count = props.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let clicks = scope.state().get("clicks").and_then(|v| v.as_f64()).unwrap_or(0.0);
            VNode::text(format!("{}", count + clicks))
        });
        assert_eq!(island.island_id(), Some(&IslandId::new("counter", "default")));

        let scope = Scope::new();
        scope.state().insert("clicks", 2);
        let VNode::Text(text) = island.render(&Props::new().with("count", 3), &scope) else {
            panic!("expected text");
        };
        assert_eq!(text, "5");
    }

    #[test]
    fn test_island_spec_json() {
        let spec = IslandSpec {
            island: "counter".to_string(),
            export: "default".to_string(),
            url: "/islands/counter.js".to_string(),
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"island":"counter","export":"default","url":"/islands/counter.js"}"#);
        assert_eq!(spec.id(), IslandId::new("counter", "default"));
    }
}
