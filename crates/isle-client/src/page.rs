//! Live page

use crate::{revive, ClientError, Host, InstanceId, IslandRegistry, MountQueue};
use isle_core::{Component, Config};
use isle_dom::Document;
use isle_html::HtmlParser;
use isle_serial::{deserialize, TagFactories, Value};

/// A server-rendered document together with the host that owns its
/// live instances
pub struct Page<H: Host> {
    pub(crate) document: Document,
    pub(crate) host: H,
    pub(crate) islands: IslandRegistry,
    pub(crate) config: Config,
    pub(crate) factories: TagFactories,
    queue: MountQueue,
    roots: Vec<InstanceId>,
}

impl<H: Host> Page<H> {
    pub fn new(document: Document, host: H, config: Config) -> Self {
        Self {
            document,
            host,
            islands: IslandRegistry::new(),
            config,
            factories: TagFactories::default(),
            queue: MountQueue::new(),
            roots: Vec::new(),
        }
    }

    /// Parse server output into a page
    pub fn parse(html: &str, url: &str, host: H, config: Config) -> Result<Self, ClientError> {
        let document = HtmlParser::new().parse_with_url(html, url)?;
        Ok(Self::new(document, host, config))
    }

    /// Builder: register an island component
    pub fn with_island(mut self, component: Component) -> Self {
        self.islands.register(component);
        self
    }

    /// Builder: constructors for tagged values in state payloads
    pub fn with_factories(mut self, factories: TagFactories) -> Self {
        self.factories = factories;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn islands(&self) -> &IslandRegistry {
        &self.islands
    }

    pub fn islands_mut(&mut self) -> &mut IslandRegistry {
        &mut self.islands
    }

    /// Root instances mounted so far
    pub fn roots(&self) -> &[InstanceId] {
        &self.roots
    }

    /// Read the props payload and walk the document, scheduling a mount
    /// for every top-level island and partial region. Returns the number
    /// of scheduled mounts.
    pub fn boot(&mut self) -> Result<usize, ClientError> {
        let props = read_props(&self.document, &self.config, &self.factories)?;
        let before = self.queue.len();
        revive(&self.document, &self.islands, &props, &mut self.queue)?;
        Ok(self.queue.len() - before)
    }

    /// Mount everything scheduled by [`Page::boot`]
    pub fn run_scheduled(&mut self) -> Result<Vec<InstanceId>, ClientError> {
        let mounted = self.queue.run(&mut self.document, &mut self.host)?;
        self.roots.extend(&mounted);
        Ok(mounted)
    }

    /// Render a live instance again
    pub fn rerender(&mut self, id: InstanceId) -> Result<(), ClientError> {
        Ok(self.host.rerender(&mut self.document, id)?)
    }

    /// Boot and mount in one step
    pub fn start(&mut self) -> Result<Vec<InstanceId>, ClientError> {
        self.boot()?;
        self.run_scheduled()
    }
}

/// Deserialize the props array embedded in `document`.
///
/// A document without a state script has no props.
pub(crate) fn read_props(document: &Document, config: &Config, factories: &TagFactories) -> Result<Vec<Value>, ClientError> {
    let Some(script) = document.get_element_by_id(&config.state_element_id) else {
        return Ok(Vec::new());
    };
    let payload = document.tree().text_content(script);
    let value = deserialize(&payload, factories)?;
    let props = value.as_array()
        .map(|array| array.to_vec())
        .ok_or_else(|| ClientError::InvalidState("props payload is not an array".to_string()))?;
    tracing::debug!(count = props.len(), "Read props payload");
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Runtime;

    #[test]
    fn test_read_props_requires_array() {
        let html = r#"<html><body><script id="__ISL_STATE" type="application/json">{"v":{"a":1}}</script></body></html>"#;
        let document = isle_html::parse(html).unwrap();
        let err = read_props(&document, &Config::default(), &TagFactories::default()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidState(_)));
    }

    #[test]
    fn test_boot_without_islands() {
        let mut page = Page::parse("<p>static</p>", "http://site.test/", Runtime::new(), Config::default()).unwrap();
        assert_eq!(page.boot().unwrap(), 0);
        assert!(page.run_scheduled().unwrap().is_empty());
        assert!(page.roots().is_empty());
    }
}
