//! Partial merge tests for isle-client
//!
//! A page is rendered and booted, then partial responses rendered by
//! isle-server are merged into it with `apply_partials`.

use isle_client::{apply_partials, ClientError, Host, Page, PartialPhase, Runtime, StaticModules};
use isle_core::{Component, Config, MergeMode, Props, Response, VNode};
use isle_dom::NodeId;
use isle_html::inner_html;
use isle_server::{respond, IslandManifest};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn counter() -> Component {
    Component::island("counter", "default", |props, scope| {
        let base = props.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let clicks = scope.state().get("clicks").and_then(|v| v.as_f64()).unwrap_or(0.0);
        VNode::element("button").child(format!("{}", base + clicks)).into()
    })
}

fn badge() -> Component {
    Component::island("badge", "Badge", |props, _| {
        let label = props.get("label").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
        VNode::element("em").child(label).into()
    })
}

fn manifest() -> IslandManifest {
    IslandManifest::new()
        .with("counter", "/islands/counter.js")
        .with("badge", "/islands/badge.js")
}

fn li(text: &str) -> VNode {
    VNode::element("li").child(text).into()
}

/// Page with a counter island and a `list` partial in `mode`
fn feed(mode: MergeMode, items: Vec<VNode>) -> VNode {
    VNode::fragment(vec![
        VNode::element("header")
            .child(VNode::component(&counter(), Props::new().with("count", 1)))
            .into(),
        VNode::element("ul").child(VNode::partial("list", mode, items)).into(),
    ])
}

fn boot(root: &VNode) -> Page<Runtime> {
    init_tracing();
    let response = respond("/feed", root, &manifest(), &Config::default()).unwrap();
    let mut page = Page::parse(response.text().unwrap(), "http://site.test/feed", Runtime::new(), Config::default())
        .unwrap()
        .with_island(counter());
    page.start().unwrap();
    page
}

fn partial_response(root: &VNode) -> Response {
    respond("/feed?isl-partial=1", root, &manifest(), &Config::default()).unwrap()
}

fn list_html(page: &Page<Runtime>) -> String {
    let ul: NodeId = page.document().elements_by_tag(page.document().body(), "ul")[0];
    inner_html(page.document().tree(), ul)
}

// ============================================================================
// MERGE MODES
// ============================================================================

#[test]
fn test_append_keeps_existing_instances() {
    let mut page = boot(&feed(
        MergeMode::Append,
        vec![VNode::component(&counter(), Props::new().with("count", 7))],
    ));
    let runtime = page.host();
    let owner = runtime.partial_owner("list").unwrap();
    let existing = runtime.children(owner)[0];
    runtime.state(existing).unwrap().insert("clicks", 1);

    let response = partial_response(&VNode::partial("list", MergeMode::Append, vec![li("b")]));
    let report = smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();

    assert_eq!(report.updated, ["list"]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.phase, PartialPhase::Done);

    let runtime = page.host();
    assert_eq!(runtime.partial_owner("list"), Some(owner));
    assert!(runtime.is_mounted(existing));
    assert_eq!(runtime.children(owner)[0], existing);
    assert_eq!(list_html(&page), "<button>8</button><li>b</li>");
}

#[test]
fn test_replace_swaps_children() {
    let mut page = boot(&feed(MergeMode::Replace, vec![li("a"), li("b")]));
    let response = partial_response(&VNode::partial("list", MergeMode::Replace, vec![li("c")]));
    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();
    assert_eq!(list_html(&page), "<li>c</li>");
}

#[test]
fn test_prepend_inserts_first() {
    let mut page = boot(&feed(MergeMode::Prepend, vec![li("a")]));

    let response = partial_response(&VNode::partial("list", MergeMode::Prepend, vec![li("b")]));
    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();
    assert_eq!(list_html(&page), "<li>b</li><li>a</li>");

    let response = partial_response(&VNode::partial("list", MergeMode::Prepend, vec![li("c"), li("d")]));
    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();
    assert_eq!(list_html(&page), "<li>c</li><li>d</li><li>b</li><li>a</li>");

    let owner = page.host().partial_owner("list").unwrap();
    let keys: Vec<_> = page.host().partial_children(owner).unwrap().iter().map(|n| n.key().map(str::to_string)).collect();
    assert_eq!(keys, [Some("--isl-2".to_string()), Some("--isl-1".to_string()), Some("--0".to_string())]);
}

// ============================================================================
// ISOLATION
// ============================================================================

#[test]
fn test_other_instances_untouched() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let counter_id = page.host().find("counter")[0];
    page.host().state(counter_id).unwrap().insert("clicks", 4);

    let response = partial_response(&VNode::partial("list", MergeMode::Append, vec![li("b")]));
    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();

    let runtime = page.host();
    assert_eq!(runtime.find("counter"), [counter_id]);
    assert_eq!(runtime.render_count(counter_id), Some(1));
    assert_eq!(runtime.state(counter_id).unwrap().get("clicks").and_then(|v| v.as_f64()), Some(4.0));
    assert_eq!(list_html(&page), "<li>a</li><li>b</li>");
}

#[test]
fn test_islands_in_response_are_loaded() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = partial_response(&VNode::partial(
        "list",
        MergeMode::Append,
        vec![VNode::component(&badge(), Props::new().with("label", "new"))],
    ));
    let modules = StaticModules::new().with("/islands/badge.js", "Badge", badge());

    smol::block_on(apply_partials(&mut page, &response, &modules)).unwrap();

    assert!(page.islands().contains("badge", "Badge"));
    assert_eq!(page.host().find("badge").len(), 1);
    assert_eq!(list_html(&page), "<li>a</li><em>new</em>");
}

#[test]
fn test_every_export_of_a_module_is_loaded() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let alert = Component::island("ui", "Alert", |_, _| VNode::element("p").child("alert").into());
    let banner = Component::island("ui", "Banner", |_, _| VNode::element("p").child("banner").into());
    let response = respond(
        "/feed?isl-partial=1",
        &VNode::partial(
            "list",
            MergeMode::Append,
            vec![VNode::component(&alert, Props::new()), VNode::component(&banner, Props::new())],
        ),
        &IslandManifest::new().with("ui", "/islands/ui.js"),
        &Config::default(),
    )
    .unwrap();
    let modules = StaticModules::new()
        .with("/islands/ui.js", "Alert", alert)
        .with("/islands/ui.js", "Banner", banner);

    smol::block_on(apply_partials(&mut page, &response, &modules)).unwrap();

    assert!(page.islands().contains("ui", "Alert"));
    assert!(page.islands().contains("ui", "Banner"));
    assert_eq!(page.host().find("ui").len(), 2);
    assert_eq!(list_html(&page), "<li>a</li><p>alert</p><p>banner</p>");
}

#[test]
fn test_missing_module_fails_before_merge() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = partial_response(&VNode::partial(
        "list",
        MergeMode::Append,
        vec![VNode::component(&badge(), Props::new())],
    ));

    let err = smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap_err();
    assert!(matches!(err, ClientError::ModuleLoad { url, .. } if url == "/islands/badge.js"));
    assert_eq!(list_html(&page), "<li>a</li>");
}

// ============================================================================
// RESPONSES
// ============================================================================

#[test]
fn test_json_response_rejected() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = Response {
        status: 200,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: br#"{"ok":true}"#.to_vec(),
    };

    let err = smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap_err();
    assert!(matches!(err, ClientError::NotAPartialResponse(Some(ct)) if ct == "application/json"));
    assert_eq!(list_html(&page), "<li>a</li>");
}

#[test]
fn test_content_type_spacing_and_case() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let mut response = partial_response(&VNode::partial("list", MergeMode::Append, vec![li("b")]));
    response.headers = vec![("content-type".to_string(), "Text/HTML;Charset=UTF-8".to_string())];

    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();
    assert_eq!(list_html(&page), "<li>a</li><li>b</li>");
}

#[test]
fn test_response_without_partials() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = partial_response(&VNode::element("p").child("nothing").into());

    let err = smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap_err();
    assert!(matches!(err, ClientError::NoPartialsFound));
}

#[test]
fn test_unknown_partial_skipped() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = partial_response(&VNode::fragment(vec![
        VNode::partial("ghost", MergeMode::Replace, vec![li("x")]),
        VNode::partial("list", MergeMode::Append, vec![li("b")]),
    ]));

    let report = smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();
    assert_eq!(report.updated, ["list"]);
    assert_eq!(report.skipped, ["ghost"]);
    assert_eq!(list_html(&page), "<li>a</li><li>b</li>");
}

#[test]
fn test_head_merged_from_response() {
    let mut page = boot(&feed(MergeMode::Append, vec![li("a")]));
    let response = partial_response(&VNode::partial(
        "list",
        MergeMode::Append,
        vec![
            VNode::head(vec![
                VNode::element("title").child("Page 2").into(),
                VNode::element("link").attr("rel", "stylesheet").attr("href", "/feed.css").into(),
            ]),
            li("b"),
        ],
    ));

    smol::block_on(apply_partials(&mut page, &response, &StaticModules::new())).unwrap();

    let document = page.document();
    assert_eq!(document.title(), "Page 2");
    let head = inner_html(document.tree(), document.head());
    assert!(head.contains(r#"<link rel="stylesheet" href="/feed.css">"#));
    assert_eq!(head.matches("refresh.js").count(), 1);
    assert_eq!(list_html(&page), "<li>a</li><li>b</li>");
}
