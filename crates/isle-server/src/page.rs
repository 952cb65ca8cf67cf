//! Response assembly

use crate::{RenderError, RenderState, Renderer};
use indexmap::IndexMap;
use isle_core::{Config, IslandSpec, Response, VNode};
use isle_html::escape_attr;
use isle_serial::{serialize, Array, Value};
use url::Url;

/// Island name to module URL, supplied by the build layer
#[derive(Debug, Clone, Default)]
pub struct IslandManifest {
    modules: IndexMap<String, String>,
}

impl IslandManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a module for an island
    pub fn with(mut self, island: &str, url: &str) -> Self {
        self.insert(island, url);
        self
    }

    pub fn insert(&mut self, island: &str, url: &str) {
        self.modules.insert(island.to_string(), url.to_string());
    }

    pub fn get(&self, island: &str) -> Option<&str> {
        self.modules.get(island).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Whether a request URL (absolute or path-relative) asks for partials only
pub fn is_partial_request(request_url: &str, config: &Config) -> Result<bool, RenderError> {
    let base = Url::parse("http://localhost/")?;
    let url = base.join(request_url)?;
    Ok(url.query_pairs().any(|(name, _)| name == config.partial_query_param.as_str()))
}

/// Render a full HTML document
pub fn render_page(root: &VNode, manifest: &IslandManifest, config: &Config) -> Result<String, RenderError> {
    let (body, state) = Renderer::render_to_string(root)?;
    tracing::debug!(
        islands = state.islands.len(),
        props = state.props.len(),
        "Rendered page"
    );
    assemble(&body, state, manifest, config)
}

/// Render the tree but emit only its top-level partial regions as the body
pub fn render_partial(root: &VNode, manifest: &IslandManifest, config: &Config) -> Result<String, RenderError> {
    let (_, state) = Renderer::render_to_string(root)?;
    let body: String = state.partials.values().map(String::as_str).collect();
    tracing::debug!(
        partials = state.partials.len(),
        islands = state.islands.len(),
        "Rendered partial response"
    );
    assemble(&body, state, manifest, config)
}

/// Answer a request: a partial response if the URL carries the partial
/// query parameter, a full page otherwise
pub fn respond(
    request_url: &str,
    root: &VNode,
    manifest: &IslandManifest,
    config: &Config,
) -> Result<Response, RenderError> {
    let html = if is_partial_request(request_url, config)? {
        render_partial(root, manifest, config)?
    } else {
        render_page(root, manifest, config)?
    };
    Ok(Response::html(html))
}

fn assemble(body: &str, state: RenderState, manifest: &IslandManifest, config: &Config) -> Result<String, RenderError> {
    let head = Renderer::render_nodes(&state.head)?;
    let scripts = if state.islands.is_empty() {
        String::new()
    } else {
        island_scripts(state, manifest, config)?
    };

    let mut html = String::with_capacity(body.len() + head.len() + scripts.len() + 128);
    html.push_str("<!DOCTYPE html><html><head>");
    html.push_str(&head);
    if let Some(src) = &config.dev_reload_script {
        html.push_str(&format!(r#"<script src="{}"></script>"#, escape_attr(src)));
    }
    html.push_str("</head><body>");
    html.push_str(body);
    html.push_str(&scripts);
    html.push_str("</body></html>");
    Ok(html)
}

/// State payload, island registry block and the module script that revives
fn island_scripts(state: RenderState, manifest: &IslandManifest, config: &Config) -> Result<String, RenderError> {
    let registry = state.islands
        .iter()
        .map(|island| {
            let url = manifest.get(&island.id)
                .ok_or_else(|| RenderError::MissingIsland(island.id.clone()))?;
            Ok(IslandSpec {
                island: island.id.clone(),
                export: island.export.clone(),
                url: url.to_string(),
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let payload = serialize(&Value::Array(Array::from_vec(state.props)));
    let registry_json = serde_json::to_string(&registry)?;

    let mut module = format!(
        "import {{ revive }} from {};",
        serde_json::to_string(&config.runtime_module_url)?
    );
    let mut exports: IndexMap<&str, Vec<String>> = IndexMap::new();
    for (i, spec) in registry.iter().enumerate() {
        module.push_str(&format!(
            "import {{ {} as island_{i} }} from {};",
            spec.export,
            serde_json::to_string(&spec.url)?
        ));
        exports.entry(spec.island.as_str())
            .or_default()
            .push(format!("{}:island_{i}", serde_json::to_string(&spec.export)?));
    }
    let entries = exports.iter()
        .map(|(island, bindings)| Ok(format!("{}:{{{}}}", serde_json::to_string(island)?, bindings.join(","))))
        .collect::<Result<Vec<_>, RenderError>>()?;
    module.push_str(&format!(
        "revive({{{}}},{});",
        entries.join(","),
        serde_json::to_string(&config.state_element_id)?
    ));

    Ok(format!(
        r#"<script type="application/json" id="{}">{}</script><script type="application/json" id="{}">{}</script><script type="module">{}</script>"#,
        escape_attr(&config.state_element_id),
        escape_script(&payload.serialized),
        escape_attr(&config.islands_element_id),
        escape_script(&registry_json),
        escape_script(&module),
    ))
}

/// Keep script content from closing its element early
fn escape_script(text: &str) -> String {
    text.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_request_detection() {
        let config = Config::default();
        assert!(is_partial_request("/feed?isl-partial=1", &config).unwrap());
        assert!(is_partial_request("https://example.com/feed?page=2&isl-partial", &config).unwrap());
        assert!(!is_partial_request("/feed?page=2", &config).unwrap());
        assert!(!is_partial_request("/isl-partial", &config).unwrap());
    }

    #[test]
    fn test_escape_script() {
        assert_eq!(escape_script(r#"{"v":"</script>"}"#), r#"{"v":"\u003c/script>"}"#);
    }

    #[test]
    fn test_page_without_islands_has_no_scripts() {
        let root: VNode = VNode::element("p").child("hi").into();
        let html = render_page(&root, &IslandManifest::new(), &Config::production()).unwrap();
        assert_eq!(html, "<!DOCTYPE html><html><head></head><body><p>hi</p></body></html>");
    }
}
