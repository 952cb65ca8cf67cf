//! Boundary marker protocol
//!
//! Islands, slots and partial regions are delimited in rendered HTML by
//! pairs of comments:
//!
//! ```text
//! <!--isl:{island}:{export}:{propsIndex}:{key}-->   ...   <!--/isl:{island}:{export}:{propsIndex}:{key}-->
//! <!--isl-slot:{propsIndex}:{prop}-->               ...   <!--/isl-slot:{propsIndex}:{prop}-->
//! <!--isl-partial:{name}:{mode}:{key}-->            ...   <!--/isl-partial:{name}:{mode}:{key}-->
//! ```
//!
//! Names never contain `:`. The key comes last, is empty when absent and
//! may contain `:`. No field may contain `--`, so a marker can never end
//! its comment early.

use crate::MergeMode;
use std::fmt;

const ISLAND_PREFIX: &str = "isl:";
const SLOT_PREFIX: &str = "isl-slot:";
const PARTIAL_PREFIX: &str = "isl-partial:";
const CLOSE_PREFIX: char = '/';

/// Marker error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("Malformed marker: {0}")]
    Malformed(String),

    #[error("Invalid marker name: {0:?}")]
    InvalidName(String),

    #[error("Invalid marker key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid props index: {0}")]
    InvalidIndex(String),

    #[error("Unknown merge mode: {0}")]
    UnknownMergeMode(String),
}

/// Which end of a region a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Open,
    Close,
}

/// What a marker pair delimits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Server-rendered output of a top-level island
    Island {
        island: String,
        export: String,
        props_index: usize,
        key: Option<String>,
    },
    /// Forwarded children of the island at `props_index`
    Slot {
        props_index: usize,
        prop: String,
    },
    /// Named partial region
    Partial {
        name: String,
        mode: MergeMode,
        key: Option<String>,
    },
}

/// One boundary marker (the text of an HTML comment)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    pub edge: Edge,
    pub kind: MarkerKind,
}

impl Marker {
    pub fn open(kind: MarkerKind) -> Self {
        Self { edge: Edge::Open, kind }
    }

    pub fn close(kind: MarkerKind) -> Self {
        Self { edge: Edge::Close, kind }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.edge == Edge::Open
    }

    /// Whether `self` is the close marker matching `open`
    pub fn closes(&self, open: &Marker) -> bool {
        self.edge == Edge::Close && open.edge == Edge::Open && self.kind == open.kind
    }

    /// Parse comment text.
    ///
    /// Comments that do not start with a marker prefix are not markers and
    /// yield `Ok(None)`; a recognised prefix with a bad payload is an error.
    pub fn parse(comment: &str) -> Result<Option<Marker>, MarkerError> {
        let (edge, text) = match comment.strip_prefix(CLOSE_PREFIX) {
            Some(rest) => (Edge::Close, rest),
            None => (Edge::Open, comment),
        };
        let malformed = || MarkerError::Malformed(comment.to_string());

        let kind = if let Some(payload) = text.strip_prefix(ISLAND_PREFIX) {
            let mut fields = payload.splitn(4, ':');
            let (Some(island), Some(export), Some(index), Some(key)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            MarkerKind::Island {
                island: island.to_string(),
                export: export.to_string(),
                props_index: parse_index(index)?,
                key: non_empty(key),
            }
        } else if let Some(payload) = text.strip_prefix(SLOT_PREFIX) {
            let (index, prop) = payload.split_once(':').ok_or_else(malformed)?;
            MarkerKind::Slot {
                props_index: parse_index(index)?,
                prop: prop.to_string(),
            }
        } else if let Some(payload) = text.strip_prefix(PARTIAL_PREFIX) {
            let mut fields = payload.splitn(3, ':');
            let (Some(name), Some(mode), Some(key)) = (fields.next(), fields.next(), fields.next()) else {
                return Err(malformed());
            };
            MarkerKind::Partial {
                name: name.to_string(),
                mode: mode.parse()?,
                key: non_empty(key),
            }
        } else {
            return Ok(None);
        };

        let marker = Marker { edge, kind };
        marker.validate()?;
        Ok(Some(marker))
    }

    /// Check that the marker text round-trips through an HTML comment
    pub fn validate(&self) -> Result<(), MarkerError> {
        match &self.kind {
            MarkerKind::Island { island, export, key, .. } => {
                check_name(island)?;
                check_name(export)?;
                check_key(key.as_deref())
            }
            MarkerKind::Slot { prop, .. } => check_name(prop),
            MarkerKind::Partial { name, key, .. } => {
                check_name(name)?;
                check_key(key.as_deref())
            }
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.edge == Edge::Close {
            write!(f, "{CLOSE_PREFIX}")?;
        }
        match &self.kind {
            MarkerKind::Island { island, export, props_index, key } => write!(
                f,
                "{ISLAND_PREFIX}{island}:{export}:{props_index}:{}",
                key.as_deref().unwrap_or_default()
            ),
            MarkerKind::Slot { props_index, prop } => write!(f, "{SLOT_PREFIX}{props_index}:{prop}"),
            MarkerKind::Partial { name, mode, key } => write!(
                f,
                "{PARTIAL_PREFIX}{name}:{mode}:{}",
                key.as_deref().unwrap_or_default()
            ),
        }
    }
}

fn parse_index(text: &str) -> Result<usize, MarkerError> {
    text.parse().map_err(|_| MarkerError::InvalidIndex(text.to_string()))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn check_name(name: &str) -> Result<(), MarkerError> {
    if name.is_empty() || name.contains(':') || name.contains("--") {
        return Err(MarkerError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn check_key(key: Option<&str>) -> Result<(), MarkerError> {
    match key {
        Some(key) if key.contains("--") || key.ends_with('-') => Err(MarkerError::InvalidKey(key.to_string())),
        _ => Ok(()),
    }
}
