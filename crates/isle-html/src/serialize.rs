//! HTML serialization of arena subtrees

use isle_dom::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

/// Elements that never get end tags
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Elements whose text content is emitted verbatim
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

enum Step {
    Enter(NodeId),
    Close(String),
}

/// Serialize the children of a node
pub fn inner_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let children: Vec<_> = tree.children(id).collect();
    let raw = tree.get(id)
        .and_then(|n| n.as_element())
        .is_some_and(|e| is_raw_text_element(&e.name));
    write_nodes(tree, children, raw, &mut out);
    out
}

/// Serialize a node including itself
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_nodes(tree, vec![id], false, &mut out);
    out
}

fn write_nodes(tree: &DomTree, roots: Vec<NodeId>, raw_roots: bool, out: &mut String) {
    let mut stack: Vec<(Step, bool)> = roots.into_iter().rev().map(|id| (Step::Enter(id), raw_roots)).collect();

    while let Some((step, raw)) = stack.pop() {
        let id = match step {
            Step::Close(tag) => {
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
                continue;
            }
            Step::Enter(id) => id,
        };
        let Some(node) = tree.get(id) else { continue };

        match &node.data {
            NodeData::Document => {
                for child in tree.children(id).collect::<Vec<_>>().into_iter().rev() {
                    stack.push((Step::Enter(child), false));
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text(text) if raw => out.push_str(text),
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.name);
                for attr in &elem.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&elem.name) {
                    continue;
                }
                let child_raw = is_raw_text_element(&elem.name);
                stack.push((Step::Close(elem.name.clone()), false));
                for child in tree.children(id).collect::<Vec<_>>().into_iter().rev() {
                    stack.push((Step::Enter(child), child_raw));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlParser;

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_inner_html_roundtrip() {
        let html = r#"<ul class="list"><li>one</li><li>two &amp; three</li></ul><br><!--note-->"#;
        let doc = HtmlParser::new().parse(html).unwrap();
        assert_eq!(inner_html(doc.tree(), doc.body()), html);
    }

    #[test]
    fn test_script_is_raw() {
        let doc = HtmlParser::new().parse("<script>if (a < b) {}</script>").unwrap();
        let script = doc.elements_by_tag(doc.tree().root(), "script")[0];
        assert_eq!(outer_html(doc.tree(), script), "<script>if (a < b) {}</script>");
    }
}
