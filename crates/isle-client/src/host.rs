//! Component host interface

use crate::HostError;
use isle_core::VNode;
use isle_dom::{Document, NodeId};
use std::fmt;

/// Live component instance handle.
///
/// Slots are reused once an instance is torn down; the generation tells a
/// stale handle apart from the slot's current occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}.{}", self.index, self.generation)
    }
}

/// What revival and partial merging need from the component library.
///
/// A host mounts component and partial nodes into the document, keeps
/// their instances alive across re-renders, and tracks which instance
/// currently owns each named partial.
pub trait Host {
    /// Mount a component or partial node as a root, inserted into `parent`
    /// before `before` (or last)
    fn mount(
        &mut self,
        document: &mut Document,
        node: VNode,
        parent: NodeId,
        before: Option<NodeId>,
    ) -> Result<InstanceId, HostError>;

    /// Remove a root instance and everything it rendered
    fn unmount(&mut self, document: &mut Document, id: InstanceId) -> Result<(), HostError>;

    /// Live instance owning the partial `name`
    fn partial_owner(&self, name: &str) -> Option<InstanceId>;

    /// Current children of a partial owner
    fn partial_children(&self, id: InstanceId) -> Result<&[VNode], HostError>;

    /// Replace the children of a partial owner without rendering
    fn set_partial_children(&mut self, id: InstanceId, children: Vec<VNode>) -> Result<(), HostError>;

    /// Render an instance again, reconciling its child instances
    fn rerender(&mut self, document: &mut Document, id: InstanceId) -> Result<(), HostError>;
}
