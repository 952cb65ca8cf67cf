//! Serialization errors

use crate::Tag;

/// Errors raised while decoding a serialized value graph.
///
/// Every variant means the payload is corrupted or was produced by an
/// incompatible version; none of them is recoverable.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload has no `v` field")]
    MissingRoot,

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Invalid `{tag}` payload: {reason}")]
    InvalidPayload { tag: Tag, reason: String },

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid reference: {path}")]
    InvalidReference { path: String },

    #[error("Malformed reference table")]
    MalformedReferences,
}
