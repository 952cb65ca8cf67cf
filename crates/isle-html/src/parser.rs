//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the arena DOM. Comments are
//! kept: the island and partial boundary markers travel as comments.

use crate::ParseError;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use isle_dom::{Attribute, Document, ElementData, NodeData, NodeId};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        self.convert(&dom.document, &mut document)?;
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom tree into the arena, children in source order
    fn convert(&self, document: &Handle, target: &mut Document) -> Result<(), ParseError> {
        let tree = target.tree_mut();
        let root = tree.root();

        let mut stack: Vec<(Handle, NodeId)> = document.children.borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), root))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            let data = match &handle.data {
                RcNodeData::Document => continue,
                RcNodeData::Doctype { name, .. } => NodeData::Doctype { name: name.to_string() },
                RcNodeData::Text { contents } => NodeData::Text(contents.borrow().to_string()),
                RcNodeData::Comment { contents } => NodeData::Comment(contents.to_string()),
                RcNodeData::Element { name, attrs, .. } => {
                    let mut elem = ElementData::new(&name.local);
                    elem.attrs = attrs.borrow()
                        .iter()
                        .map(|attr| Attribute::new(&attr.name.local, &attr.value))
                        .collect();
                    NodeData::Element(elem)
                }
                RcNodeData::ProcessingInstruction { .. } => continue,
            };

            let id = tree.push(data);
            tree.append_child(parent, id)?;

            for child in handle.children.borrow().iter().rev() {
                stack.push((child.clone(), id));
            }
        }

        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
