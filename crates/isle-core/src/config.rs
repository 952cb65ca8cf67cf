//! Framework configuration

/// Names and URLs shared by the server renderer and the client runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Element id of the serialized props payload
    pub state_element_id: String,

    /// Element id of the island registry block
    pub islands_element_id: String,

    /// Query parameter marking a partial request
    pub partial_query_param: String,

    /// Module exporting the client runtime
    pub runtime_module_url: String,

    /// Dev reload script injected into pages, never merged on the client
    pub dev_reload_script: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_element_id: "__ISL_STATE".to_string(),
            islands_element_id: "__ISL_ISLANDS".to_string(),
            partial_query_param: "isl-partial".to_string(),
            runtime_module_url: "/_isl/runtime.js".to_string(),
            dev_reload_script: Some("/_isl/refresh.js".to_string()),
        }
    }
}

impl Config {
    /// Configuration without the dev reload script
    pub fn production() -> Self {
        Self {
            dev_reload_script: None,
            ..Self::default()
        }
    }
}
