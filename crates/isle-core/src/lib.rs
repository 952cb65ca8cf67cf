//! isle core
//!
//! Types shared by the server renderer and the client runtime: virtual
//! nodes, components and their props, the comment marker protocol that
//! delimits islands, slots and partial regions, merge modes, configuration
//! and the wire shape of a fetched response.

mod component;
mod config;
mod marker;
mod merge;
mod props;
mod response;
mod vnode;

pub use component::{Component, IslandId, IslandSpec, Scope};
pub use config::Config;
pub use marker::{Edge, Marker, MarkerError, MarkerKind};
pub use merge::MergeMode;
pub use props::Props;
pub use response::{Response, HTML_CONTENT_TYPE};
pub use vnode::{ComponentNode, ElementNode, Fragment, PartialNode, SlotNode, VNode};

pub use isle_serial::{Object, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
