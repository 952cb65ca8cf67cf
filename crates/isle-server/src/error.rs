//! Render errors

use isle_core::MarkerError;

/// Render error
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Island {0:?} has no module in the manifest")]
    MissingIsland(String),

    #[error("Island export {0:?} is not a JavaScript identifier")]
    InvalidExport(String),

    #[error("Invalid partial name {0:?}")]
    InvalidPartialName(String),

    #[error("Partial {0:?} rendered twice")]
    DuplicatePartial(String),

    #[error("Invalid marker: {0}")]
    Marker(#[from] MarkerError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
