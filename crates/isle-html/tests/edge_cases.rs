//! Edge case tests for isle-html
//!
//! Malformed content, escaping, and marker comments in awkward places.

use isle_html::{escape_attr, escape_text, inner_html, is_void_element, parse};

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_only_whitespace() {
    let doc = parse("   \t\n\r\n   ").unwrap();
    assert!(doc.body().is_valid());
}

#[test]
fn test_parse_only_doctype() {
    let doc = parse("<!DOCTYPE html>").unwrap();
    assert!(doc.document_element().is_valid());
}

#[test]
fn test_parse_fragment_without_body_tag() {
    let doc = parse("<ul><!--isl-partial:list:append:--><li>x</li><!--/isl-partial:list:append:--></ul>").unwrap();
    let tree = doc.tree();
    let comments = tree.descendants(doc.body())
        .filter(|&id| tree.get(id).is_some_and(|n| n.is_comment()))
        .count();
    assert_eq!(comments, 2);
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let doc = parse("<div><p><span>text").unwrap();
    assert_eq!(doc.tree().text_content(doc.body()), "text");
}

#[test]
fn test_parse_mismatched_tags() {
    let doc = parse("<div><p></div></p>").unwrap();
    assert!(!doc.elements_by_tag(doc.body(), "div").is_empty());
}

#[test]
fn test_comment_before_html_stays_outside_body() {
    let doc = parse("<!-- leading --><html><body><p>x</p></body></html>").unwrap();
    let tree = doc.tree();
    let first = tree.first_child(tree.root()).unwrap();
    assert_eq!(tree.get(first).and_then(|n| n.as_comment()), Some(" leading "));
}

// ============================================================================
// ESCAPING
// ============================================================================

#[test]
fn test_escape_text() {
    assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    assert_eq!(escape_text("plain"), "plain");
}

#[test]
fn test_escape_attr() {
    assert_eq!(escape_attr(r#"say "hi" & <go>"#), "say &quot;hi&quot; &amp; &lt;go>");
}

#[test]
fn test_void_elements() {
    for tag in ["br", "img", "input", "meta", "link"] {
        assert!(is_void_element(tag), "{tag} should be void");
    }
    assert!(!is_void_element("div"));
}

#[test]
fn test_text_reescaped_on_output() {
    let doc = parse("<p>&lt;script&gt;</p>").unwrap();
    assert_eq!(inner_html(doc.tree(), doc.body()), "<p>&lt;script&gt;</p>");
}
