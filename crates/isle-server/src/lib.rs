//! isle server
//!
//! Renders a virtual node tree to HTML. Island components get boundary
//! markers and an entry in the props array, forwarded children of islands
//! get slot markers, and partial regions are captured by name so partial
//! requests can answer with just those regions.

mod error;
mod page;
mod render;
mod state;

pub use error::RenderError;
pub use page::{is_partial_request, render_page, render_partial, respond, IslandManifest};
pub use render::Renderer;
pub use state::{Owner, RenderState, SlotRecord};
