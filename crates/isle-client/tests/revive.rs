//! Revival tests for isle-client
//!
//! Pages are rendered by isle-server and booted against a `Runtime`.

use isle_client::{ClientError, Host, Page, Runtime};
use isle_core::{Component, Config, Marker, MergeMode, Props, VNode};
use isle_dom::{Document, NodeId};
use isle_html::inner_html;
use isle_server::{render_page, IslandManifest};

fn counter() -> Component {
    Component::island("counter", "default", |props, scope| {
        let base = props.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let clicks = scope.state().get("clicks").and_then(|v| v.as_f64()).unwrap_or(0.0);
        VNode::element("button").child(format!("{}", base + clicks)).into()
    })
}

fn inner() -> Component {
    Component::island("inner", "default", |props, _| {
        let n = props.get("n").and_then(|v| v.as_f64()).unwrap_or(0.0);
        VNode::element("b").child(format!("{n}")).into()
    })
}

fn outer() -> Component {
    Component::island("outer", "default", |props, _| {
        VNode::element("section")
            .child(props.slot("children").cloned().unwrap_or_else(|| VNode::fragment(vec![])))
            .into()
    })
}

fn manifest() -> IslandManifest {
    IslandManifest::new()
        .with("counter", "/islands/counter.js")
        .with("inner", "/islands/inner.js")
        .with("outer", "/islands/outer.js")
}

fn boot(root: &VNode, islands: &[Component]) -> Result<Page<Runtime>, ClientError> {
    let html = render_page(root, &manifest(), &Config::default()).unwrap();
    let mut page = Page::parse(&html, "http://site.test/", Runtime::new(), Config::default())?;
    for island in islands {
        page.islands_mut().register(island.clone());
    }
    page.start()?;
    Ok(page)
}

fn markers(document: &Document) -> Vec<String> {
    let tree = document.tree();
    tree.descendants(tree.root())
        .filter_map(|id| tree.get(id).and_then(|node| node.as_comment()))
        .filter_map(|text| Marker::parse(text).ok().flatten())
        .map(|marker| marker.to_string())
        .collect()
}

fn first(document: &Document, tag: &str) -> NodeId {
    document.elements_by_tag(document.body(), tag)[0]
}

// ============================================================================
// ISLANDS
// ============================================================================

#[test]
fn test_counter_revived_once() {
    let root: VNode = VNode::element("main")
        .child(VNode::component(&counter(), Props::new().with("count", 3)))
        .into();
    let page = boot(&root, &[counter()]).unwrap();

    let runtime = page.host();
    let instances = runtime.find("counter");
    assert_eq!(instances.len(), 1);
    assert_eq!(page.roots(), &instances[..]);

    let count = runtime.props(instances[0]).and_then(|p| p.get("count")).and_then(|v| v.as_f64());
    assert_eq!(count, Some(3.0));
    assert_eq!(inner_html(page.document().tree(), first(page.document(), "main")), "<button>3</button>");
}

#[test]
fn test_no_markers_remain() {
    let root = VNode::fragment(vec![
        VNode::element("main")
            .child(VNode::component(&counter(), Props::new().with("count", 1)))
            .into(),
        VNode::element("ul")
            .child(VNode::partial("list", MergeMode::Append, vec![VNode::element("li").child("a").into()]))
            .into(),
    ]);
    let page = boot(&root, &[counter()]).unwrap();

    assert!(markers(page.document()).is_empty());
    assert_eq!(page.roots().len(), 2);
    assert!(page.host().partial_owner("list").is_some());
    assert_eq!(inner_html(page.document().tree(), first(page.document(), "ul")), "<li>a</li>");
}

#[test]
fn test_instance_state_survives_rerender() {
    let root: VNode = VNode::element("main")
        .child(VNode::component(&counter(), Props::new().with("count", 3)))
        .into();
    let mut page = boot(&root, &[counter()]).unwrap();
    let id = page.roots()[0];

    page.host().state(id).unwrap().insert("clicks", 2);
    page.rerender(id).unwrap();

    assert_eq!(page.host().render_count(id), Some(2));
    assert_eq!(page.host().find("counter"), [id]);
    assert_eq!(inner_html(page.document().tree(), first(page.document(), "main")), "<button>5</button>");
}

#[test]
fn test_slot_children_revived_inside_island() {
    let props = Props::new().with_slot("children", VNode::component(&inner(), Props::new().with("n", 1)));
    let root = VNode::component(&outer(), props);
    let page = boot(&root, &[outer(), inner()]).unwrap();

    let runtime = page.host();
    let outer_id = runtime.find("outer")[0];
    let inner_id = runtime.find("inner")[0];
    assert_eq!(page.roots(), [outer_id]);
    assert_eq!(runtime.parent(inner_id), Some(outer_id));
    assert_eq!(runtime.props(inner_id).and_then(|p| p.get("n")).and_then(|v| v.as_f64()), Some(1.0));
    assert_eq!(inner_html(page.document().tree(), first(page.document(), "section")), "<b>1</b>");
    assert!(markers(page.document()).is_empty());
}

#[test]
fn test_shared_props_stay_aliased() {
    let shared = isle_core::Object::new().with("count", 5);
    let root = VNode::fragment(vec![
        VNode::component(&counter(), Props::from_object(shared.clone())),
        VNode::component(&counter(), Props::from_object(shared)),
    ]);
    let page = boot(&root, &[counter()]).unwrap();

    let runtime = page.host();
    let ids = runtime.find("counter");
    assert_eq!(ids.len(), 2);
    let a = runtime.props(ids[0]).unwrap().data();
    let b = runtime.props(ids[1]).unwrap().data();
    assert!(a.ptr_eq(b));
}

#[test]
fn test_two_exports_of_one_module() {
    let alert = Component::island("ui", "Alert", |_, _| VNode::element("p").child("alert").into());
    let banner = Component::island("ui", "Banner", |_, _| VNode::element("p").child("banner").into());
    let root = VNode::fragment(vec![
        VNode::component(&alert, Props::new()),
        VNode::component(&banner, Props::new()),
    ]);
    let manifest = IslandManifest::new().with("ui", "/islands/ui.js");
    let html = render_page(&root, &manifest, &Config::default()).unwrap();

    let mut page = Page::parse(&html, "http://site.test/", Runtime::new(), Config::default())
        .unwrap()
        .with_island(alert)
        .with_island(banner);
    page.start().unwrap();

    assert_eq!(page.host().find("ui").len(), 2);
    let body = inner_html(page.document().tree(), page.document().body());
    assert!(body.starts_with("<p>alert</p><p>banner</p>"));
    assert!(markers(page.document()).is_empty());
}

// ============================================================================
// PROTOCOL ERRORS
// ============================================================================

fn parse_page(body: &str) -> Page<Runtime> {
    let html = format!(
        r#"<!DOCTYPE html><html><head></head><body>{body}<script type="application/json" id="__ISL_STATE">{{"v":[{{"count":1}}]}}</script></body></html>"#
    );
    Page::parse(&html, "http://site.test/", Runtime::new(), Config::default())
        .unwrap()
        .with_island(counter())
}

#[test]
fn test_unknown_island_is_fatal() {
    let mut page = parse_page("<!--isl:chart:default:0:--><div></div><!--/isl:chart:default:0:-->");
    let err = page.boot().unwrap_err();
    assert!(matches!(err, ClientError::UnknownIsland { island, export } if island == "chart" && export == "default"));
}

#[test]
fn test_unbalanced_marker_mounts_nothing() {
    let mut page = parse_page(
        "<!--isl:counter:default:0:--><button>1</button><!--/isl:counter:default:0:-->\
         <div><!--isl:counter:default:0:--></div>",
    );
    assert!(matches!(page.boot(), Err(ClientError::UnbalancedMarker(_))));
    assert!(page.run_scheduled().unwrap().is_empty());
    assert!(page.host().find("counter").is_empty());
}

#[test]
fn test_mismatched_marker() {
    let mut page = parse_page("<!--isl:counter:default:0:--><!--/isl-partial:list:replace:-->");
    assert!(matches!(page.boot(), Err(ClientError::MismatchedMarker { .. })));
}

#[test]
fn test_malformed_marker() {
    let mut page = parse_page("<!--isl:counter:default:zero:--><!--/isl:counter:default:zero:-->");
    assert!(matches!(page.boot(), Err(ClientError::Marker(_))));
}
