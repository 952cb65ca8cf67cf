//! Client errors

use crate::InstanceId;
use isle_dom::DomError;

/// Failure inside the component host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Unknown instance {0}")]
    UnknownInstance(InstanceId),

    #[error("Instance {0} is unmounted")]
    Unmounted(InstanceId),

    #[error("Instance {0} is not a partial owner")]
    NotAPartial(InstanceId),

    #[error("Cannot mount a {0} node as a root")]
    NotMountable(&'static str),

    #[error("Instance {0} is not attached to the document")]
    Detached(InstanceId),

    #[error("DOM operation failed: {0}")]
    Dom(#[from] DomError),
}

/// Revival and partial merge errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not a partial response (content type {0:?})")]
    NotAPartialResponse(Option<String>),

    #[error("No partials found in response")]
    NoPartialsFound,

    #[error("Unknown island {island:?} (export {export:?})")]
    UnknownIsland { island: String, export: String },

    #[error("No props at index {0}")]
    MissingProps(usize),

    #[error("Props at index {0} are not an object")]
    InvalidProps(usize),

    #[error("Invalid state payload: {0}")]
    InvalidState(String),

    #[error("Marker {0:?} is never closed")]
    UnbalancedMarker(String),

    #[error("Marker {found:?} does not close {expected:?}")]
    MismatchedMarker { expected: Option<String>, found: String },

    #[error("Failed to load module {url} (export {export})")]
    ModuleLoad { url: String, export: String },

    #[error("Invalid island registry block: {0}")]
    InvalidManifest(#[source] serde_json::Error),

    #[error("Response body is not UTF-8: {0}")]
    InvalidBody(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Marker(#[from] isle_core::MarkerError),

    #[error(transparent)]
    Serial(#[from] isle_serial::SerialError),

    #[error(transparent)]
    Parse(#[from] isle_html::ParseError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
