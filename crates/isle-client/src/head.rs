//! Head merging for partial responses

use crate::ClientError;
use isle_core::Config;
use isle_dom::{Document, ElementData, NodeId};
use url::Url;

/// Copy head content of a partial response into the live document.
///
/// The title text is replaced; `<meta name|property>`, stylesheets and
/// external scripts are appended when the document does not have them
/// yet. The dev reload script is never merged. Returns the number of
/// appended elements.
pub fn merge_head(document: &mut Document, incoming: &Document, config: &Config) -> Result<usize, ClientError> {
    let source = incoming.head();
    let target = document.head();
    if !source.is_valid() || !target.is_valid() {
        return Ok(0);
    }

    if incoming.title_element().is_some() {
        document.set_title(&incoming.title())?;
    }

    let base = Url::parse(document.url()).ok();
    let resolve = |href: &str| match &base {
        Some(base) => base.join(href).map(String::from).unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    };
    let dev_script = config.dev_reload_script.as_deref().map(&resolve);

    let mut wanted: Vec<NodeId> = Vec::new();
    for child in incoming.tree().children(source) {
        let Some(element) = incoming.tree().get(child).and_then(|node| node.as_element()) else { continue };
        let append = match element.name.as_str() {
            "meta" => match meta_identity(element) {
                Some((attr, value)) => !has_element(document, "meta", |existing| {
                    existing.get_attr(attr) == Some(value)
                }),
                None => false,
            },
            "link" if is_stylesheet(element) => match element.get_attr("href") {
                Some(href) => {
                    let href = resolve(href);
                    !has_element(document, "link", |existing| {
                        is_stylesheet(existing) && existing.get_attr("href").map(&resolve).as_deref() == Some(href.as_str())
                    })
                }
                None => false,
            },
            "script" => match element.get_attr("src") {
                Some(src) => {
                    let src = resolve(src);
                    dev_script.as_deref() != Some(src.as_str())
                        && !has_element(document, "script", |existing| {
                            existing.get_attr("src").map(&resolve).as_deref() == Some(src.as_str())
                        })
                }
                None => false,
            },
            _ => false,
        };
        if append {
            wanted.push(child);
        }
    }

    for &child in &wanted {
        let tree = document.tree_mut();
        let copy = tree.import(incoming.tree(), child)?;
        tree.append_child(target, copy)?;
    }

    tracing::debug!(appended = wanted.len(), "Merged head");
    Ok(wanted.len())
}

fn meta_identity(element: &ElementData) -> Option<(&'static str, &str)> {
    if let Some(name) = element.get_attr("name") {
        return Some(("name", name));
    }
    element.get_attr("property").map(|property| ("property", property))
}

fn is_stylesheet(element: &ElementData) -> bool {
    element.get_attr("rel")
        .is_some_and(|rel| rel.split_ascii_whitespace().any(|token| token.eq_ignore_ascii_case("stylesheet")))
}

fn has_element(document: &Document, tag: &str, matches: impl Fn(&ElementData) -> bool) -> bool {
    document.elements_by_tag(document.tree().root(), tag)
        .into_iter()
        .filter_map(|id| document.tree().get(id).and_then(|node| node.as_element()))
        .any(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_html::{inner_html, HtmlParser};

    fn document(head: &str) -> Document {
        HtmlParser::new()
            .parse_with_url(&format!("<html><head>{head}</head><body></body></html>"), "http://site.test/feed/")
            .unwrap()
    }

    #[test]
    fn test_title_and_meta() {
        let mut live = document(r#"<title>Old</title><meta name="a" content="1">"#);
        let incoming = document(r#"<title>New</title><meta name="a" content="2"><meta property="og:x" content="3">"#);

        assert_eq!(merge_head(&mut live, &incoming, &Config::default()).unwrap(), 1);
        assert_eq!(live.title(), "New");
        assert_eq!(
            inner_html(live.tree(), live.head()),
            r#"<title>New</title><meta name="a" content="1"><meta property="og:x" content="3">"#
        );
    }

    #[test]
    fn test_stylesheet_resolved_against_document() {
        let mut live = document(r#"<link rel="stylesheet" href="/feed/app.css">"#);
        let incoming = document(r#"<link rel="stylesheet" href="app.css"><link rel="stylesheet" href="other.css">"#);

        assert_eq!(merge_head(&mut live, &incoming, &Config::default()).unwrap(), 1);
        assert!(inner_html(live.tree(), live.head()).ends_with(r#"<link rel="stylesheet" href="other.css">"#));
    }

    #[test]
    fn test_scripts_skip_dev_reload() {
        let mut live = document(r#"<script src="/a.js"></script>"#);
        let incoming = document(
            r#"<script src="/_isl/refresh.js"></script><script src="/a.js"></script><script src="/b.js"></script><script>inline()</script>"#,
        );

        assert_eq!(merge_head(&mut live, &incoming, &Config::default()).unwrap(), 1);
        assert_eq!(
            inner_html(live.tree(), live.head()),
            r#"<script src="/a.js"></script><script src="/b.js"></script>"#
        );
    }
}
