//! Value graph serializer

use crate::{Path, Tag, Value, TAG_FIELD};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Largest integer a double represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Output of [`serialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Serialized {
    /// JSON text of the `{"v": .., "r": ..}` envelope
    pub serialized: String,
    /// A plain JSON parse of `v` would not reproduce the graph
    pub requires_deserializer: bool,
    /// At least one tagged value was written
    pub has_tagged_values: bool,
    /// At least one signal was written
    pub has_signals: bool,
}

/// Serialize a value graph.
///
/// Repeated aggregates (the same `Array`, `Object` or `Signal` handle met
/// again, including cycles) are written once at the first path they are met
/// in depth-first, insertion order; later occurrences become `0` and are
/// listed in the `r` table as `[target, ref, ...]`.
pub fn serialize(value: &Value) -> Serialized {
    let mut encoder = Encoder::default();
    encoder.enter(None);
    let root = encoder.encode(value);

    let mut envelope = Map::new();
    envelope.insert("v".to_string(), root);
    if !encoder.references.is_empty() {
        let table = encoder.references
            .values()
            .map(|(target, refs)| {
                JsonValue::Array(
                    std::iter::once(target)
                        .chain(refs.iter())
                        .map(Path::to_json)
                        .collect(),
                )
            })
            .collect();
        envelope.insert("r".to_string(), JsonValue::Array(table));
    }

    let requires_deserializer = encoder.has_tagged_values || !encoder.references.is_empty();
    tracing::trace!(
        references = encoder.references.len(),
        tagged = encoder.has_tagged_values,
        "Serialized value graph"
    );

    Serialized {
        serialized: JsonValue::Object(envelope).to_string(),
        requires_deserializer,
        has_tagged_values: encoder.has_tagged_values,
        has_signals: encoder.has_signals,
    }
}

#[derive(Default)]
struct Encoder {
    /// Aggregate identity -> path node of its first occurrence
    seen: HashMap<usize, usize>,
    /// Aggregate identity -> (target path, referencing paths), in first-repeat order
    references: IndexMap<usize, (Path, Vec<Path>)>,
    /// Visited positions as (parent, key) links
    nodes: Vec<(Option<usize>, Option<String>)>,
    /// Path nodes from the root to the value being visited
    position: Vec<usize>,
    has_tagged_values: bool,
    has_signals: bool,
}

/// Aggregate whose children are still being encoded
enum Frame {
    Array {
        items: Vec<JsonValue>,
        rest: std::vec::IntoIter<Value>,
    },
    Object {
        map: Map<String, JsonValue>,
        escaped: Option<JsonValue>,
        rest: std::vec::IntoIter<(String, Value)>,
        key: String,
    },
    Signal {
        rest: Option<Value>,
        inner: JsonValue,
    },
}

impl Frame {
    /// Next child to encode, with its path segment
    fn next_child(&mut self) -> Option<(String, Value)> {
        match self {
            Frame::Array { items, rest } => rest.next().map(|item| (items.len().to_string(), item)),
            Frame::Object { rest, key, .. } => {
                let (next, item) = rest.next()?;
                key.clone_from(&next);
                Some((next, item))
            }
            Frame::Signal { rest, .. } => rest.take().map(|item| ("value".to_string(), item)),
        }
    }

    fn accept(&mut self, json: JsonValue) {
        match self {
            Frame::Array { items, .. } => items.push(json),
            Frame::Object { map, escaped, key, .. } => {
                if key.as_str() == TAG_FIELD {
                    *escaped = Some(json);
                } else {
                    map.insert(key.clone(), json);
                }
            }
            Frame::Signal { inner, .. } => *inner = json,
        }
    }
}

impl Encoder {
    /// Depth-first encode with an explicit frame stack
    fn encode(&mut self, value: &Value) -> JsonValue {
        let mut frames = Vec::new();
        let mut done = self.open(value, &mut frames);

        loop {
            if let Some(json) = done.take() {
                let Some(frame) = frames.last_mut() else {
                    return json;
                };
                frame.accept(json);
                self.position.pop();
            }

            let Some(frame) = frames.last_mut() else {
                return JsonValue::Null;
            };
            match frame.next_child() {
                Some((key, child)) => {
                    self.enter(Some(key));
                    done = self.open(&child, &mut frames);
                }
                None => {
                    done = frames.pop().map(|frame| self.close(frame));
                }
            }
        }
    }

    /// Encode a leaf or a repeat, or push a frame for a new aggregate
    fn open(&mut self, value: &Value, frames: &mut Vec<Frame>) -> Option<JsonValue> {
        match value {
            Value::Null => Some(JsonValue::Null),
            Value::Bool(b) => Some(JsonValue::Bool(*b)),
            Value::Number(n) => Some(number(*n)),
            Value::String(s) => Some(JsonValue::String(s.clone())),
            Value::BigInt(n) => {
                self.has_tagged_values = true;
                Some(tagged(Tag::BigInt, [("d", JsonValue::String(n.to_string()))]))
            }
            Value::Bytes(bytes) => {
                self.has_tagged_values = true;
                Some(tagged(Tag::Bytes, [("d", JsonValue::String(STANDARD.encode(bytes)))]))
            }
            Value::Signal(signal) => {
                if let Some(placeholder) = self.visit(signal.addr()) {
                    return Some(placeholder);
                }
                self.has_tagged_values = true;
                self.has_signals = true;
                frames.push(Frame::Signal { rest: Some(signal.get()), inner: JsonValue::Null });
                None
            }
            Value::Array(array) => {
                if let Some(placeholder) = self.visit(array.addr()) {
                    return Some(placeholder);
                }
                let items = array.to_vec();
                frames.push(Frame::Array {
                    items: Vec::with_capacity(items.len()),
                    rest: items.into_iter(),
                });
                None
            }
            Value::Object(object) => {
                if let Some(placeholder) = self.visit(object.addr()) {
                    return Some(placeholder);
                }
                frames.push(Frame::Object {
                    map: Map::new(),
                    escaped: None,
                    rest: object.entries().into_iter(),
                    key: String::new(),
                });
                None
            }
        }
    }

    fn close(&mut self, frame: Frame) -> JsonValue {
        match frame {
            Frame::Array { items, .. } => JsonValue::Array(items),
            Frame::Object { map, escaped: None, .. } => JsonValue::Object(map),
            Frame::Object { map, escaped: Some(original), .. } => {
                self.has_tagged_values = true;
                tagged(Tag::Literal, [("k", original), ("v", JsonValue::Object(map))])
            }
            Frame::Signal { inner, .. } => tagged(Tag::Signal, [("v", inner)]),
        }
    }

    fn enter(&mut self, key: Option<String>) {
        let parent = self.position.last().copied();
        self.nodes.push((parent, key));
        self.position.push(self.nodes.len() - 1);
    }

    /// Full path of a recorded position
    fn path(&self, node: usize) -> Path {
        let mut segments = Vec::new();
        let mut cursor = Some(node);
        while let Some((parent, key)) = cursor.and_then(|id| self.nodes.get(id)) {
            segments.push(key.clone());
            cursor = *parent;
        }
        segments.reverse();
        Path::from(segments)
    }

    /// Record the current position for `addr`; on a repeat return the placeholder
    fn visit(&mut self, addr: usize) -> Option<JsonValue> {
        let current = self.position.last().copied().unwrap_or_default();
        match self.seen.get(&addr).copied() {
            Some(first) => {
                let path = self.path(current);
                let target = self.path(first);
                self.references
                    .entry(addr)
                    .or_insert_with(|| (target, Vec::new()))
                    .1
                    .push(path);
                Some(JsonValue::from(0))
            }
            None => {
                self.seen.insert(addr, current);
                None
            }
        }
    }
}

/// JSON number the way a JavaScript host writes it
fn number(n: f64) -> JsonValue {
    if !n.is_finite() {
        JsonValue::Null
    } else if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
    }
}

fn tagged<const N: usize>(tag: Tag, fields: [(&str, JsonValue); N]) -> JsonValue {
    let mut map = Map::new();
    map.insert(TAG_FIELD.to_string(), JsonValue::String(tag.as_str().to_string()));
    for (key, value) in fields {
        map.insert(key.to_string(), value);
    }
    JsonValue::Object(map)
}
