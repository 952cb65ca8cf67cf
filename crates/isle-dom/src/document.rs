//! Document - High-level document API

use crate::{DomResult, DomTree, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an empty `<html><head><body>` skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate `<html>`, `<head>` and `<body>` after the tree was built externally
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self.tree.children(root)
            .find(|&id| self.tree.get(id).is_some_and(|n| n.has_tag("html")))
            .unwrap_or(NodeId::NONE);

        if self.html_element.is_valid() {
            for id in self.tree.children(self.html_element) {
                let Some(node) = self.tree.get(id) else { continue };
                if node.has_tag("head") && !self.head_element.is_valid() {
                    self.head_element = id;
                } else if node.has_tag("body") && !self.body_element.is_valid() {
                    self.body_element = id;
                }
            }
        }

        tracing::trace!(
            html = %self.html_element,
            head = %self.head_element,
            body = %self.body_element,
            "Document finalized"
        );
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// First `<title>` element in `<head>`
    pub fn title_element(&self) -> Option<NodeId> {
        self.head_element.to_option()?;
        self.tree.children(self.head_element)
            .find(|&id| self.tree.get(id).is_some_and(|n| n.has_tag("title")))
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.title_element()
            .map(|id| self.tree.text_content(id))
            .unwrap_or_default()
    }

    /// Set the document title, creating `<title>` if needed
    pub fn set_title(&mut self, title: &str) -> DomResult<()> {
        let id = match self.title_element() {
            Some(id) => id,
            None => {
                let id = self.tree.create_element("title");
                self.tree.append_child(self.head_element, id)?;
                id
            }
        };
        self.tree.set_text_content(id, title)
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .find(|&node| {
                self.tree.get(node)
                    .and_then(|n| n.as_element())
                    .is_some_and(|e| e.id() == Some(id))
            })
    }

    /// Elements with the given tag name under `root`, in document order
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.tree.descendants(root)
            .filter(|&node| self.tree.get(node).is_some_and(|n| n.has_tag(tag)))
            .collect()
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    #[test]
    fn test_skeleton() {
        let doc = Document::new("https://example.com/");
        assert!(doc.head().is_valid());
        assert!(doc.body().is_valid());
        assert_eq!(doc.tree().parent(doc.body()), Some(doc.document_element()));
    }

    #[test]
    fn test_title_roundtrip() {
        let mut doc = Document::default();
        assert_eq!(doc.title(), "");
        doc.set_title("First").unwrap();
        doc.set_title("Second").unwrap();
        assert_eq!(doc.title(), "Second");
        assert_eq!(doc.elements_by_tag(doc.head(), "title").len(), 1);
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::default();
        let div = doc.tree.create_element_with("div", vec![Attribute::new("id", "main")]);
        let body = doc.body();
        doc.tree.append_child(body, div).unwrap();
        assert_eq!(doc.get_element_by_id("main"), Some(div));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }

    #[test]
    fn test_finalize_finds_structure() {
        let mut doc = Document::empty("about:blank");
        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");
        let root = doc.tree.root();
        doc.tree.append_child(root, html).unwrap();
        doc.tree.append_child(html, head).unwrap();
        doc.tree.append_child(html, body).unwrap();
        doc.finalize();
        assert_eq!(doc.head(), head);
        assert_eq!(doc.body(), body);
    }
}
