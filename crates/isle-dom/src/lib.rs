//! isle DOM - Document Object Model
//!
//! Arena-backed DOM tree. The client keeps its live document in one of these,
//! and partial responses are parsed into a detached one before merging.

mod node;
mod tree;
mod document;
mod operations;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use operations::{DomError, DomResult};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for a missing link
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert a link into an `Option`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
