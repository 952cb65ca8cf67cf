//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: removing a node only unlinks it. Detached subtrees
//! stay valid and can be re-inserted elsewhere.

use crate::{Attribute, DomError, DomResult, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node
    pub fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name).data)
    }

    /// Create a detached element with attributes
    pub fn create_element_with(&mut self, name: &str, attrs: Vec<Attribute>) -> NodeId {
        let id = self.create_element(name);
        if let Some(elem) = self.nodes[id.index()].as_element_mut() {
            elem.attrs = attrs;
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Text(content.to_string()))
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    /// First child of a node
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.to_option()
    }

    /// Last child of a node
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.to_option()
    }

    /// Next sibling of a node
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.to_option()
    }

    /// Previous sibling of a node
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.to_option()
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id).unwrap_or(NodeId::NONE),
        }
    }

    /// Iterate over all descendants of a node in document order (excluding itself)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id).unwrap_or(NodeId::NONE),
        }
    }

    /// Whether `node` is `ancestor` or lies inside it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// Append a child node, moving it out of its current parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or last if `None`)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<NodeId> {
        self.node(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild(reference));
            }
            if reference == child {
                return Ok(child);
            }
        }

        self.detach(child);

        let (prev, next) = match reference {
            Some(reference) => (self.nodes[reference.index()].prev_sibling, reference),
            None => (self.nodes[parent.index()].last_child, NodeId::NONE),
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        Ok(child)
    }

    /// Detach a node (and its subtree) from its parent
    pub fn remove(&mut self, id: NodeId) -> DomResult<NodeId> {
        self.node(id)?;
        self.detach(id);
        Ok(id)
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        while let Some(child) = self.first_child(id) {
            self.detach(child);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Deep-copy a subtree of another tree into this one (detached)
    pub fn import(&mut self, source: &DomTree, id: NodeId) -> DomResult<NodeId> {
        let copy = self.push(source.node(id)?.data.clone());
        let mut stack = vec![(id, copy)];
        while let Some((from, to)) = stack.pop() {
            for child in source.children(from) {
                let child_copy = self.push(source.nodes[child.index()].data.clone());
                self.append_child(to, child_copy)?;
                stack.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.nodes[node.index()].as_text() {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children of a node with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.clear_children(id)?;
        let text = self.create_text(text);
        self.append_child(id, text)?;
        Ok(())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.to_option()?;
        self.next = self.tree.nodes[current.index()].next_sibling;
        Some(current)
    }
}

/// Pre-order iterator over a subtree, driven by sibling/parent links
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.to_option()?;
        let node = &self.tree.nodes[current.index()];

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let n = &self.tree.nodes[cursor.index()];
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_text("a");
        let b = tree.create_element("b");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        (tree, div, a, b)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, div, a, b) = sample();
        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.parent(a), Some(div));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
    }

    #[test]
    fn test_insert_before_moves_node() {
        let (mut tree, div, a, b) = sample();
        tree.insert_before(div, b, Some(a)).unwrap();
        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(tree.first_child(div), Some(b));
        assert_eq!(tree.last_child(div), Some(a));
    }

    #[test]
    fn test_remove_unlinks() {
        let (mut tree, div, a, b) = sample();
        tree.remove(a).unwrap();
        assert_eq!(tree.children(div).collect::<Vec<_>>(), vec![b]);
        assert!(!tree.is_connected(a));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_hierarchy_request() {
        let (mut tree, div, _, b) = sample();
        assert_eq!(tree.append_child(b, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(div, div), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_reference_must_be_child() {
        let (mut tree, div, _, _) = sample();
        let stray = tree.create_text("stray");
        let other = tree.create_text("other");
        assert_eq!(tree.insert_before(div, other, Some(stray)), Err(DomError::NotAChild(stray)));
    }

    #[test]
    fn test_descendants_preorder() {
        let (mut tree, div, a, b) = sample();
        let inner = tree.create_text("inner");
        tree.append_child(b, inner).unwrap();
        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![div, a, b, inner]);
        assert_eq!(tree.descendants(b).collect::<Vec<_>>(), vec![inner]);
        assert_eq!(tree.text_content(div), "ainner");
    }

    #[test]
    fn test_import_deep_copy() {
        let (source, div, _, _) = sample();
        let mut target = DomTree::new();
        let copy = target.import(&source, div).unwrap();
        assert!(!target.is_connected(copy));
        assert_eq!(target.children(copy).count(), 2);
        assert_eq!(target.text_content(copy), "a");
    }
}
