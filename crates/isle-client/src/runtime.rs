//! Retained-mode component runtime
//!
//! Every instance renders between two empty text anchors. A render drops
//! the DOM between the anchors and builds it again from the render output;
//! child instances are matched against the previous render by their
//! position (index or key path) and component identity, and matched
//! instances keep their identity and state while their anchored range is
//! moved into the new output.

use crate::{Host, HostError, InstanceId};
use isle_core::{Component, MergeMode, Props, Scope, VNode};
use isle_dom::{Attribute, Document, NodeId};
use isle_html::outer_html;
use isle_serial::Object;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Index(usize),
    Key(String),
}

#[derive(Debug, Clone)]
enum Identity {
    Component(Component),
    Partial(String),
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Identity::Component(a), Identity::Component(b)) => a.ptr_eq(b),
            (Identity::Partial(a), Identity::Partial(b)) => a == b,
            _ => false,
        }
    }
}

/// Where a child instance sits in its parent's output
#[derive(Debug, Clone, PartialEq)]
struct ChildSlot {
    path: Vec<Segment>,
    identity: Identity,
}

#[derive(Debug)]
enum InstanceKind {
    Component { component: Component, props: Props },
    Partial { name: String, mode: MergeMode, children: Vec<VNode> },
}

#[derive(Debug)]
struct Instance {
    kind: InstanceKind,
    key: Option<String>,
    scope: Scope,
    start: NodeId,
    end: NodeId,
    children: Vec<(ChildSlot, InstanceId)>,
    parent: Option<InstanceId>,
    renders: usize,
}

/// Arena slot; `instance` is `None` while the slot sits on the free list
#[derive(Debug)]
struct Slot {
    generation: u32,
    instance: Option<Instance>,
}

/// Child of the previous render, with its anchored range captured
/// before the parent's DOM was dropped
struct PreviousChild {
    slot: ChildSlot,
    id: InstanceId,
    nodes: Vec<NodeId>,
}

#[derive(Default)]
struct Reconcile {
    previous: Vec<PreviousChild>,
    next: Vec<(ChildSlot, InstanceId)>,
}

/// Component runtime owning every live instance and the partial registry
#[derive(Debug, Default)]
pub struct Runtime {
    slots: Vec<Slot>,
    free: Vec<u32>,
    partials: HashMap<String, InstanceId>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instance(id).is_ok()
    }

    /// Props of a component instance
    pub fn props(&self, id: InstanceId) -> Option<&Props> {
        match &self.instance(id).ok()?.kind {
            InstanceKind::Component { props, .. } => Some(props),
            InstanceKind::Partial { .. } => None,
        }
    }

    /// Instance-local state
    pub fn state(&self, id: InstanceId) -> Option<&Object> {
        self.instance(id).ok().map(|inst| inst.scope.state())
    }

    /// How many times an instance has rendered
    pub fn render_count(&self, id: InstanceId) -> Option<usize> {
        self.instance(id).ok().map(|inst| inst.renders)
    }

    /// Component name, or partial name for partial owners
    pub fn name(&self, id: InstanceId) -> Option<&str> {
        Some(match &self.instance(id).ok()?.kind {
            InstanceKind::Component { component, .. } => component.name(),
            InstanceKind::Partial { name, .. } => name,
        })
    }

    /// Merge mode a partial owner was rendered with
    pub fn partial_mode(&self, id: InstanceId) -> Option<MergeMode> {
        match &self.instance(id).ok()?.kind {
            InstanceKind::Partial { mode, .. } => Some(*mode),
            InstanceKind::Component { .. } => None,
        }
    }

    pub fn key(&self, id: InstanceId) -> Option<&str> {
        self.instance(id).ok()?.key.as_deref()
    }

    pub fn parent(&self, id: InstanceId) -> Option<InstanceId> {
        self.instance(id).ok()?.parent
    }

    /// Child instances in render order
    pub fn children(&self, id: InstanceId) -> Vec<InstanceId> {
        self.instance(id)
            .map(|inst| inst.children.iter().map(|(_, child)| *child).collect())
            .unwrap_or_default()
    }

    /// Mounted instances of the component called `name`
    pub fn find(&self, name: &str) -> Vec<InstanceId> {
        self.live()
            .filter(|(_, inst)| {
                matches!(&inst.kind, InstanceKind::Component { component, .. } if component.name() == name)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Every mounted instance, in slot order
    pub fn mounted(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.live().map(|(id, _)| id)
    }

    fn live(&self) -> impl Iterator<Item = (InstanceId, &Instance)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let id = InstanceId { index: index as u32, generation: slot.generation };
            slot.instance.as_ref().map(|inst| (id, inst))
        })
    }

    /// HTML currently rendered by an instance
    pub fn html(&self, document: &Document, id: InstanceId) -> Result<String, HostError> {
        Ok(self.range(document, id)?
            .into_iter()
            .map(|node| outer_html(document.tree(), node))
            .collect())
    }

    fn instance(&self, id: InstanceId) -> Result<&Instance, HostError> {
        let slot = self.slots.get(id.index as usize).ok_or(HostError::UnknownInstance(id))?;
        slot.instance.as_ref()
            .filter(|_| slot.generation == id.generation)
            .ok_or(HostError::Unmounted(id))
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Instance, HostError> {
        let slot = self.slots.get_mut(id.index as usize).ok_or(HostError::UnknownInstance(id))?;
        let current = slot.generation == id.generation;
        slot.instance.as_mut()
            .filter(|_| current)
            .ok_or(HostError::Unmounted(id))
    }

    /// Store an instance in a free slot, or a new one
    fn insert(&mut self, instance: Instance) -> InstanceId {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.instance = Some(instance);
                return InstanceId { index, generation: slot.generation };
            }
        }
        self.slots.push(Slot { generation: 0, instance: Some(instance) });
        InstanceId { index: (self.slots.len() - 1) as u32, generation: 0 }
    }

    /// Anchors and everything between them
    fn range(&self, document: &Document, id: InstanceId) -> Result<Vec<NodeId>, HostError> {
        let inst = self.instance(id)?;
        let tree = document.tree();
        let mut nodes = vec![inst.start];
        let mut cursor = inst.start;
        while cursor != inst.end {
            cursor = tree.next_sibling(cursor).ok_or(HostError::Detached(id))?;
            nodes.push(cursor);
        }
        Ok(nodes)
    }

    fn create(
        &mut self,
        document: &mut Document,
        kind: InstanceKind,
        key: Option<String>,
        parent_instance: Option<InstanceId>,
        parent: NodeId,
        before: Option<NodeId>,
    ) -> Result<InstanceId, HostError> {
        let tree = document.tree_mut();
        let start = tree.create_text("");
        let end = tree.create_text("");
        tree.insert_before(parent, start, before)?;
        tree.insert_before(parent, end, before)?;

        let partial = match &kind {
            InstanceKind::Partial { name, .. } => Some(name.clone()),
            InstanceKind::Component { .. } => None,
        };
        let id = self.insert(Instance {
            kind,
            key,
            scope: Scope::new(),
            start,
            end,
            children: Vec::new(),
            parent: parent_instance,
            renders: 0,
        });
        if let Some(name) = partial {
            tracing::debug!(partial = %name, instance = %id, "Registered partial owner");
            self.partials.insert(name, id);
        }

        self.render(document, id)?;
        Ok(id)
    }

    fn render(&mut self, document: &mut Document, id: InstanceId) -> Result<(), HostError> {
        let (output, start, end, previous) = {
            let inst = self.instance_mut(id)?;
            inst.renders += 1;
            let output = match &inst.kind {
                InstanceKind::Component { component, props } => component.render(props, &inst.scope),
                InstanceKind::Partial { children, .. } => VNode::fragment(children.clone()),
            };
            (output, inst.start, inst.end, std::mem::take(&mut inst.children))
        };

        let mut reconcile = Reconcile::default();
        for (slot, child) in previous {
            let nodes = self.range(document, child)?;
            reconcile.previous.push(PreviousChild { slot, id: child, nodes });
        }

        let tree = document.tree_mut();
        let parent = tree.parent(end).ok_or(HostError::Detached(id))?;
        let mut cursor = tree.next_sibling(start);
        while let Some(node) = cursor {
            if node == end {
                break;
            }
            cursor = tree.next_sibling(node);
            tree.remove(node)?;
        }

        let mut path = Vec::new();
        self.build_list(document, id, &output.into_children(), parent, Some(end), &mut path, &mut reconcile)?;

        for stale in reconcile.previous {
            tracing::trace!(instance = %stale.id, "Dropping unmatched child");
            self.teardown(stale.id);
        }
        self.instance_mut(id)?.children = reconcile.next;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_list(
        &mut self,
        document: &mut Document,
        owner: InstanceId,
        nodes: &[VNode],
        parent: NodeId,
        before: Option<NodeId>,
        path: &mut Vec<Segment>,
        reconcile: &mut Reconcile,
    ) -> Result<(), HostError> {
        for (index, node) in nodes.iter().enumerate() {
            path.push(match node.key() {
                Some(key) => Segment::Key(key.to_string()),
                None => Segment::Index(index),
            });
            let result = self.build(document, owner, node, parent, before, path, reconcile);
            path.pop();
            result?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &mut self,
        document: &mut Document,
        owner: InstanceId,
        node: &VNode,
        parent: NodeId,
        before: Option<NodeId>,
        path: &mut Vec<Segment>,
        reconcile: &mut Reconcile,
    ) -> Result<(), HostError> {
        match node {
            VNode::Text(text) => {
                let tree = document.tree_mut();
                let id = tree.create_text(text);
                tree.insert_before(parent, id, before)?;
            }
            VNode::Element(element) => {
                let tree = document.tree_mut();
                let attrs = element.attrs.iter()
                    .map(|(name, value)| Attribute::new(name, value))
                    .collect();
                let id = tree.create_element_with(&element.tag, attrs);
                tree.insert_before(parent, id, before)?;
                self.build_list(document, owner, &element.children, id, None, path, reconcile)?;
            }
            VNode::Fragment(fragment) => {
                self.build_list(document, owner, &fragment.children, parent, before, path, reconcile)?;
            }
            VNode::Slot(slot) => self.build(document, owner, &slot.content, parent, before, path, reconcile)?,
            VNode::Head(_) => {}
            VNode::Component(node) => {
                let slot = ChildSlot {
                    path: path.clone(),
                    identity: Identity::Component(node.component.clone()),
                };
                let kind = InstanceKind::Component {
                    component: node.component.clone(),
                    props: node.props.clone(),
                };
                self.place(document, owner, slot, kind, node.key.clone(), parent, before, reconcile)?;
            }
            VNode::Partial(node) => {
                let slot = ChildSlot {
                    path: path.clone(),
                    identity: Identity::Partial(node.name.clone()),
                };
                let kind = InstanceKind::Partial {
                    name: node.name.clone(),
                    mode: node.mode,
                    children: node.children.clone(),
                };
                self.place(document, owner, slot, kind, node.key.clone(), parent, before, reconcile)?;
            }
        }
        Ok(())
    }

    /// Reuse the matching previous child or create a new instance.
    ///
    /// A reused partial owner keeps its current children: merged content
    /// belongs to the owner, not to whoever renders it.
    #[allow(clippy::too_many_arguments)]
    fn place(
        &mut self,
        document: &mut Document,
        owner: InstanceId,
        slot: ChildSlot,
        kind: InstanceKind,
        key: Option<String>,
        parent: NodeId,
        before: Option<NodeId>,
        reconcile: &mut Reconcile,
    ) -> Result<(), HostError> {
        let id = match reconcile.previous.iter().position(|previous| previous.slot == slot) {
            Some(position) => {
                let previous = reconcile.previous.remove(position);
                let tree = document.tree_mut();
                for &node in &previous.nodes {
                    tree.insert_before(parent, node, before)?;
                }

                let inst = self.instance_mut(previous.id)?;
                inst.key = key;
                if let (InstanceKind::Component { props, .. }, InstanceKind::Component { props: next, .. }) =
                    (&mut inst.kind, kind)
                {
                    *props = next;
                }
                self.render(document, previous.id)?;
                previous.id
            }
            None => self.create(document, kind, key, Some(owner), parent, before)?,
        };
        reconcile.next.push((slot, id));
        Ok(())
    }

    /// Free an instance and its descendants and drop their partial
    /// registrations
    fn teardown(&mut self, id: InstanceId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else { continue };
            if slot.generation != id.generation {
                continue;
            }
            let Some(inst) = slot.instance.take() else { continue };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);

            stack.extend(inst.children.into_iter().map(|(_, child)| child));
            if let InstanceKind::Partial { name, .. } = &inst.kind {
                if self.partials.get(name) == Some(&id) {
                    tracing::debug!(partial = %name, instance = %id, "Unregistered partial owner");
                    self.partials.remove(name);
                }
            }
        }
    }
}

fn node_kind(node: &VNode) -> &'static str {
    match node {
        VNode::Element(_) => "element",
        VNode::Text(_) => "text",
        VNode::Fragment(_) => "fragment",
        VNode::Component(_) => "component",
        VNode::Partial(_) => "partial",
        VNode::Slot(_) => "slot",
        VNode::Head(_) => "head",
    }
}

impl Host for Runtime {
    fn mount(
        &mut self,
        document: &mut Document,
        node: VNode,
        parent: NodeId,
        before: Option<NodeId>,
    ) -> Result<InstanceId, HostError> {
        let (kind, key) = match node {
            VNode::Component(node) => (
                InstanceKind::Component { component: node.component, props: node.props },
                node.key,
            ),
            VNode::Partial(node) => (
                InstanceKind::Partial { name: node.name, mode: node.mode, children: node.children },
                node.key,
            ),
            other => return Err(HostError::NotMountable(node_kind(&other))),
        };
        let id = self.create(document, kind, key, None, parent, before)?;
        tracing::debug!(instance = %id, name = ?self.name(id), "Mounted root instance");
        Ok(id)
    }

    fn unmount(&mut self, document: &mut Document, id: InstanceId) -> Result<(), HostError> {
        let nodes = self.range(document, id)?;
        let tree = document.tree_mut();
        for node in nodes {
            tree.remove(node)?;
        }
        self.teardown(id);
        Ok(())
    }

    fn partial_owner(&self, name: &str) -> Option<InstanceId> {
        self.partials.get(name).copied()
    }

    fn partial_children(&self, id: InstanceId) -> Result<&[VNode], HostError> {
        match &self.instance(id)?.kind {
            InstanceKind::Partial { children, .. } => Ok(children),
            InstanceKind::Component { .. } => Err(HostError::NotAPartial(id)),
        }
    }

    fn set_partial_children(&mut self, id: InstanceId, children: Vec<VNode>) -> Result<(), HostError> {
        match &mut self.instance_mut(id)?.kind {
            InstanceKind::Partial { children: current, .. } => {
                *current = children;
                Ok(())
            }
            InstanceKind::Component { .. } => Err(HostError::NotAPartial(id)),
        }
    }

    fn rerender(&mut self, document: &mut Document, id: InstanceId) -> Result<(), HostError> {
        self.render(document, id)
    }
}
