//! Island module loading

use crate::ClientError;
use futures::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use isle_core::Component;

/// Resolves island modules named by a partial response's registry block
pub trait ModuleLoader {
    /// Load the component exported as `export` by the module at `url`
    fn load(&self, url: &str, export: &str) -> LocalBoxFuture<'_, Result<Component, ClientError>>;
}

/// Loader over components compiled into the client
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    modules: IndexMap<(String, String), Component>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: provide `component` as `export` of the module at `url`
    pub fn with(mut self, url: &str, export: &str, component: Component) -> Self {
        self.insert(url, export, component);
        self
    }

    pub fn insert(&mut self, url: &str, export: &str, component: Component) {
        self.modules.insert((url.to_string(), export.to_string()), component);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for StaticModules {
    fn load(&self, url: &str, export: &str) -> LocalBoxFuture<'_, Result<Component, ClientError>> {
        let result = self.modules
            .get(&(url.to_string(), export.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::ModuleLoad {
                url: url.to_string(),
                export: export.to_string(),
            });
        tracing::trace!(url, export, found = result.is_ok(), "Loading island module");
        async move { result }.boxed_local()
    }
}
