//! Marker-driven DOM walk
//!
//! Walks a document body looking for boundary markers. Island regions at
//! the top level become pending mounts (revival of a full page) and
//! partial regions at the top level become [`PartialUpdate`]s (a fetched
//! partial response). Content between slot and partial markers is turned
//! back into virtual nodes so the live instance can render it.
//!
//! The walk is iterative: one level per open container, each holding the
//! next sibling to visit.

use crate::{ClientError, IslandRegistry, MountQueue, PendingMount};
use isle_core::{Component, ElementNode, Marker, MarkerKind, MergeMode, Object, PartialNode, Props, VNode};
use isle_dom::{Document, NodeData, NodeId};
use isle_serial::Value;

/// Top-level partial region of a partial response
#[derive(Debug, Clone)]
pub struct PartialUpdate {
    pub name: String,
    pub mode: MergeMode,
    pub key: Option<String>,
    pub content: Vec<VNode>,
}

/// Walk the body of a server-rendered page and queue a mount for every
/// top-level island and partial region.
///
/// Nothing is mounted here, and nothing is queued unless the whole walk
/// succeeds; run the queue afterwards.
pub fn revive(
    document: &Document,
    registry: &IslandRegistry,
    props: &[Value],
    queue: &mut MountQueue,
) -> Result<(), ClientError> {
    let mut found = MountQueue::new();
    Walker::new(document, registry, props, Sink::Mount(&mut found)).run()?;
    tracing::debug!(scheduled = found.len(), "Revival walk complete");
    queue.append(&mut found);
    Ok(())
}

/// Walk the body of a partial response and collect its top-level partial
/// regions
pub fn collect_partials(
    document: &Document,
    registry: &IslandRegistry,
    props: &[Value],
) -> Result<Vec<PartialUpdate>, ClientError> {
    let mut updates = Vec::new();
    Walker::new(document, registry, props, Sink::Collect(&mut updates)).run()?;
    tracing::debug!(partials = updates.len(), "Collected partial regions");
    Ok(updates)
}

enum Sink<'a> {
    Mount(&'a mut MountQueue),
    Collect(&'a mut Vec<PartialUpdate>),
}

enum Frame {
    Island {
        marker: Marker,
        component: Component,
        data: Object,
        slots: Vec<(String, VNode)>,
        key: Option<String>,
        open: NodeId,
    },
    Slot {
        marker: Marker,
        prop: String,
        children: Vec<VNode>,
    },
    Partial {
        marker: Marker,
        name: String,
        mode: MergeMode,
        key: Option<String>,
        open: NodeId,
        children: Vec<VNode>,
    },
    Element(ElementNode),
}

impl Frame {
    fn marker(&self) -> Option<&Marker> {
        match self {
            Frame::Island { marker, .. } | Frame::Slot { marker, .. } | Frame::Partial { marker, .. } => Some(marker),
            Frame::Element(_) => None,
        }
    }

    /// Children under construction, for frames that build virtual nodes
    fn children_mut(&mut self) -> Option<&mut Vec<VNode>> {
        match self {
            Frame::Slot { children, .. } | Frame::Partial { children, .. } => Some(children),
            Frame::Element(element) => Some(&mut element.children),
            Frame::Island { .. } => None,
        }
    }
}

/// One container being iterated
struct Level {
    cursor: Option<NodeId>,
    /// Frame count when the container was entered
    depth: usize,
    /// Whether the container pushed an element frame
    element: bool,
}

struct Walker<'a> {
    document: &'a Document,
    registry: &'a IslandRegistry,
    props: &'a [Value],
    sink: Sink<'a>,
    frames: Vec<Frame>,
}

impl<'a> Walker<'a> {
    fn new(document: &'a Document, registry: &'a IslandRegistry, props: &'a [Value], sink: Sink<'a>) -> Self {
        Self {
            document,
            registry,
            props,
            sink,
            frames: Vec::new(),
        }
    }

    fn run(mut self) -> Result<(), ClientError> {
        let document = self.document;
        let tree = document.tree();
        let body = document.body();
        let root = if body.is_valid() { body } else { tree.root() };

        let mut levels = vec![Level { cursor: tree.first_child(root), depth: 0, element: false }];
        while let Some(level) = levels.last_mut() {
            let Some(node) = level.cursor else {
                let (depth, element) = (level.depth, level.element);
                levels.pop();
                if self.frames.len() > depth {
                    return Err(ClientError::UnbalancedMarker(self.open_marker()));
                }
                if element {
                    if let Some(Frame::Element(element)) = self.frames.pop() {
                        self.emit(element.into());
                    }
                }
                continue;
            };
            level.cursor = tree.next_sibling(node);
            let floor = level.depth;

            let Some(data) = tree.get(node) else { continue };
            match &data.data {
                NodeData::Element(element) => {
                    let building = self.building();
                    if building {
                        self.frames.push(Frame::Element(ElementNode {
                            tag: element.name.clone(),
                            attrs: element.attrs.iter()
                                .map(|attr| (attr.name.clone(), attr.value.clone()))
                                .collect(),
                            key: None,
                            children: Vec::new(),
                        }));
                    }
                    levels.push(Level {
                        cursor: tree.first_child(node),
                        depth: self.frames.len(),
                        element: building,
                    });
                }
                NodeData::Text(text) => {
                    if self.building() {
                        self.emit(VNode::text(text.clone()));
                    }
                }
                NodeData::Comment(comment) => {
                    let Some(marker) = Marker::parse(comment)? else { continue };
                    tracing::trace!(marker = %marker, "Marker");
                    if marker.is_open() {
                        self.open(marker, node)?;
                    } else {
                        self.close(marker, node, floor)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Whether content is currently being turned into virtual nodes
    fn building(&self) -> bool {
        self.frames.last().is_some_and(|frame| !matches!(frame, Frame::Island { .. }))
    }

    fn emit(&mut self, node: VNode) {
        if let Some(children) = self.frames.last_mut().and_then(Frame::children_mut) {
            children.push(node);
        }
    }

    /// Text of the innermost open marker
    fn open_marker(&self) -> String {
        self.frames.iter()
            .rev()
            .find_map(Frame::marker)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn open(&mut self, marker: Marker, node: NodeId) -> Result<(), ClientError> {
        let frame = match marker.kind.clone() {
            MarkerKind::Island { island, export, props_index, key } => {
                let component = self.registry.get(&island, &export)
                    .cloned()
                    .ok_or(ClientError::UnknownIsland { island, export })?;
                let data = self.props.get(props_index)
                    .ok_or(ClientError::MissingProps(props_index))?
                    .as_object()
                    .cloned()
                    .ok_or(ClientError::InvalidProps(props_index))?;
                Frame::Island { marker, component, data, slots: Vec::new(), key, open: node }
            }
            MarkerKind::Slot { props_index, prop } => {
                let owned = matches!(
                    self.frames.last(),
                    Some(Frame::Island { marker: Marker { kind: MarkerKind::Island { props_index: owner, .. }, .. }, .. })
                        if *owner == props_index
                );
                if !owned {
                    return Err(ClientError::MismatchedMarker {
                        expected: self.frames.last().and_then(Frame::marker).map(ToString::to_string),
                        found: marker.to_string(),
                    });
                }
                Frame::Slot { marker, prop, children: Vec::new() }
            }
            MarkerKind::Partial { name, mode, key } => {
                Frame::Partial { marker, name, mode, key, open: node, children: Vec::new() }
            }
        };
        self.frames.push(frame);
        Ok(())
    }

    fn close(&mut self, marker: Marker, node: NodeId, floor: usize) -> Result<(), ClientError> {
        // The open marker must live in the same container
        if self.frames.len() <= floor {
            return Err(ClientError::MismatchedMarker { expected: None, found: marker.to_string() });
        }
        let Some(frame) = self.frames.pop() else {
            return Err(ClientError::MismatchedMarker { expected: None, found: marker.to_string() });
        };
        let open = frame.marker();
        if !open.is_some_and(|open| marker.closes(open)) {
            return Err(ClientError::MismatchedMarker {
                expected: open.map(ToString::to_string),
                found: marker.to_string(),
            });
        }

        match frame {
            Frame::Island { component, data, slots, key, open, .. } => {
                let mut props = Props::from_object(data);
                for (name, content) in slots {
                    props.set_slot(&name, content);
                }
                let mut vnode = VNode::component(&component, props);
                if let Some(key) = key {
                    vnode.set_key(key);
                }
                self.finish(vnode, open, node);
            }
            Frame::Slot { prop, children, .. } => {
                if let Some(Frame::Island { slots, .. }) = self.frames.last_mut() {
                    slots.push((prop, VNode::fragment(children)));
                }
            }
            Frame::Partial { name, mode, key, open, children, .. } => {
                let vnode = VNode::Partial(PartialNode { name, mode, key, children });
                self.finish(vnode, open, node);
            }
            Frame::Element(_) => {}
        }
        Ok(())
    }

    /// Route a closed island or partial region
    fn finish(&mut self, vnode: VNode, open: NodeId, close: NodeId) {
        if self.building() {
            self.emit(vnode);
            return;
        }
        if !self.frames.is_empty() {
            // Inside island output; the island renders it again itself
            tracing::trace!("Dropping region nested in island output");
            return;
        }

        match (&mut self.sink, vnode) {
            (Sink::Mount(queue), node) => queue.push(PendingMount { node, open, close }),
            (Sink::Collect(updates), VNode::Partial(partial)) => updates.push(PartialUpdate {
                name: partial.name,
                mode: partial.mode,
                key: partial.key,
                content: partial.children,
            }),
            (Sink::Collect(_), node) => {
                tracing::warn!(
                    component = ?node_name(&node),
                    "Ignoring top-level island outside any partial region"
                );
            }
        }
    }
}

fn node_name(node: &VNode) -> Option<&str> {
    match node {
        VNode::Component(component) => Some(component.component.name()),
        _ => None,
    }
}
