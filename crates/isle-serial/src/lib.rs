//! isle value graph serialization
//!
//! Encodes a graph of JavaScript-like values into a JSON envelope
//! `{"v": <graph>, "r": [[target, ref, ...], ...]}`:
//! - arrays and objects are reference-counted handles, so the same aggregate
//!   can appear at several paths (or inside itself);
//! - repeated identities are written once, later occurrences become `0`
//!   placeholders plus an entry in `r`;
//! - non-JSON values travel as objects carrying the `_f` tag field.

mod value;
mod path;
mod tag;
mod ser;
mod de;
mod error;

pub use value::{Array, Object, Signal, Value};
pub use path::Path;
pub use tag::{Tag, TAG_FIELD};
pub use ser::{serialize, Serialized};
pub use de::{deserialize, TagFactories};
pub use error::SerialError;
