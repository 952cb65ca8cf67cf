//! Virtual nodes

use crate::{Component, MergeMode, Props};

/// A node of a component's render output
#[derive(Debug, Clone)]
pub enum VNode {
    Element(ElementNode),
    Text(String),
    Fragment(Fragment),
    Component(ComponentNode),
    /// Named partial region
    Partial(PartialNode),
    /// Forwarded children of an island, wrapped in slot markers on the server
    Slot(SlotNode),
    /// Nodes hoisted into the document `<head>`
    Head(Vec<VNode>),
}

#[derive(Debug, Clone, Default)]
pub struct ElementNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub key: Option<String>,
    pub children: Vec<VNode>,
}

#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub key: Option<String>,
    pub children: Vec<VNode>,
}

#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component: Component,
    pub props: Props,
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PartialNode {
    pub name: String,
    pub mode: MergeMode,
    pub key: Option<String>,
    pub children: Vec<VNode>,
}

#[derive(Debug, Clone)]
pub struct SlotNode {
    /// Props index of the island the slot belongs to
    pub props_index: usize,
    /// Prop the content was passed as
    pub name: String,
    pub content: Box<VNode>,
}

impl VNode {
    /// Start building an element
    pub fn element(tag: &str) -> ElementNode {
        ElementNode {
            tag: tag.to_string(),
            ..ElementNode::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    pub fn fragment(children: Vec<VNode>) -> Self {
        VNode::Fragment(Fragment { key: None, children })
    }

    /// Fragment reconciled by `key` instead of position
    pub fn keyed_fragment(key: impl Into<String>, children: Vec<VNode>) -> Self {
        VNode::Fragment(Fragment { key: Some(key.into()), children })
    }

    pub fn component(component: &Component, props: Props) -> Self {
        VNode::Component(ComponentNode {
            component: component.clone(),
            props,
            key: None,
        })
    }

    pub fn partial(name: &str, mode: MergeMode, children: Vec<VNode>) -> Self {
        VNode::Partial(PartialNode {
            name: name.to_string(),
            mode,
            key: None,
            children,
        })
    }

    pub fn head(children: Vec<VNode>) -> Self {
        VNode::Head(children)
    }

    /// Reconciliation key, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            VNode::Element(node) => node.key.as_deref(),
            VNode::Fragment(node) => node.key.as_deref(),
            VNode::Component(node) => node.key.as_deref(),
            VNode::Partial(node) => node.key.as_deref(),
            VNode::Text(_) | VNode::Slot(_) | VNode::Head(_) => None,
        }
    }

    /// Set the reconciliation key; returns false for nodes that cannot carry one
    pub fn set_key(&mut self, key: impl Into<String>) -> bool {
        let slot = match self {
            VNode::Element(node) => &mut node.key,
            VNode::Fragment(node) => &mut node.key,
            VNode::Component(node) => &mut node.key,
            VNode::Partial(node) => &mut node.key,
            VNode::Text(_) | VNode::Slot(_) | VNode::Head(_) => return false,
        };
        *slot = Some(key.into());
        true
    }

    /// Builder form of [`VNode::set_key`]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.set_key(key);
        self
    }

    /// Normalize to a child list: unkeyed fragments flatten one level
    pub fn into_children(self) -> Vec<VNode> {
        match self {
            VNode::Fragment(Fragment { key: None, children }) => children,
            other => vec![other],
        }
    }
}

impl ElementNode {
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<ElementNode> for VNode {
    fn from(node: ElementNode) -> Self {
        VNode::Element(node)
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

impl From<Vec<VNode>> for VNode {
    fn from(children: Vec<VNode>) -> Self {
        VNode::fragment(children)
    }
}
