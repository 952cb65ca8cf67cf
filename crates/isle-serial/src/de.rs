//! Value graph deserializer

use crate::{Array, Object, Path, SerialError, Signal, Tag, Value, TAG_FIELD};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize as _;
use serde_json::{Map, Value as JsonValue};

/// Factories for tagged values that need host cooperation
pub struct TagFactories {
    signal: Box<dyn Fn(Value) -> Signal>,
}

impl TagFactories {
    /// Use a custom reactive cell constructor
    pub fn new(signal: impl Fn(Value) -> Signal + 'static) -> Self {
        Self {
            signal: Box::new(signal),
        }
    }

    /// Build a reactive cell seeded with `value`
    pub fn signal(&self, value: Value) -> Signal {
        (self.signal)(value)
    }
}

impl Default for TagFactories {
    fn default() -> Self {
        Self::new(|value| Signal::new(value))
    }
}

impl std::fmt::Debug for TagFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagFactories").finish_non_exhaustive()
    }
}

/// Decode a serialized envelope back into a value graph.
///
/// References are resolved after the whole `v` graph is built, so the order
/// of the `r` table does not matter.
pub fn deserialize(input: &str, factories: &TagFactories) -> Result<Value, SerialError> {
    let mut json = serde_json::Deserializer::from_str(input);
    json.disable_recursion_limit();
    let envelope = JsonValue::deserialize(&mut json)?;
    json.end()?;
    let JsonValue::Object(mut envelope) = envelope else {
        return Err(SerialError::MissingRoot);
    };
    let root = envelope.remove("v").ok_or(SerialError::MissingRoot)?;
    let value = revive(root, factories)?;

    match envelope.remove("r") {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::Array(entries)) => {
            tracing::trace!(entries = entries.len(), "Resolving references");
            for entry in &entries {
                resolve_entry(&value, entry)?;
            }
        }
        Some(_) => return Err(SerialError::MalformedReferences),
    }

    Ok(value)
}

/// Aggregate whose children are still being decoded
enum Frame {
    Array {
        array: Array,
        rest: std::vec::IntoIter<JsonValue>,
    },
    Object {
        object: Object,
        rest: serde_json::map::IntoIter,
        key: String,
    },
    Signal {
        rest: Option<JsonValue>,
        inner: Value,
    },
    /// Escaped object: `v` first, then the original `_f` value from `k`
    Literal {
        rest: Option<JsonValue>,
        original: Option<JsonValue>,
        object: Option<Object>,
    },
}

impl Frame {
    fn next_child(&mut self) -> Option<JsonValue> {
        match self {
            Frame::Array { rest, .. } => rest.next(),
            Frame::Object { rest, key, .. } => {
                let (next, item) = rest.next()?;
                *key = next;
                Some(item)
            }
            Frame::Signal { rest, .. } => rest.take(),
            Frame::Literal { rest, original, .. } => rest.take().or_else(|| original.take()),
        }
    }

    fn accept(&mut self, value: Value) -> Result<(), SerialError> {
        match self {
            Frame::Array { array, .. } => array.push(value),
            Frame::Object { object, key, .. } => {
                object.insert(key, value);
            }
            Frame::Signal { inner, .. } => *inner = value,
            Frame::Literal { object: Some(object), .. } => {
                object.insert(TAG_FIELD, value);
            }
            Frame::Literal { object, .. } => {
                let Value::Object(rest) = value else {
                    return Err(SerialError::InvalidPayload {
                        tag: Tag::Literal,
                        reason: "`v` is not an object".to_string(),
                    });
                };
                *object = Some(rest);
            }
        }
        Ok(())
    }

    fn close(self, factories: &TagFactories) -> Value {
        match self {
            Frame::Array { array, .. } => Value::Array(array),
            Frame::Object { object, .. } => Value::Object(object),
            Frame::Signal { inner, .. } => Value::Signal(factories.signal(inner)),
            Frame::Literal { object, .. } => Value::Object(object.unwrap_or_default()),
        }
    }
}

/// Build a value graph from decoded JSON with an explicit frame stack
fn revive(json: JsonValue, factories: &TagFactories) -> Result<Value, SerialError> {
    let mut frames = Vec::new();
    let mut done = open(json, &mut frames)?;

    loop {
        if let Some(value) = done.take() {
            let Some(frame) = frames.last_mut() else {
                return Ok(value);
            };
            frame.accept(value)?;
        }

        let Some(frame) = frames.last_mut() else {
            return Ok(Value::Null);
        };
        done = match frame.next_child() {
            Some(child) => open(child, &mut frames)?,
            None => frames.pop().map(|frame| frame.close(factories)),
        };
    }
}

/// Decode a leaf, or push a frame for an aggregate
fn open(json: JsonValue, frames: &mut Vec<Frame>) -> Result<Option<Value>, SerialError> {
    let value = match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => Value::Number(
            n.as_f64().ok_or_else(|| SerialError::InvalidNumber(n.to_string()))?,
        ),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => {
            frames.push(Frame::Array { array: Array::new(), rest: items.into_iter() });
            return Ok(None);
        }
        JsonValue::Object(mut map) => match map.remove(TAG_FIELD) {
            None => {
                frames.push(Frame::Object { object: Object::new(), rest: map.into_iter(), key: String::new() });
                return Ok(None);
            }
            Some(JsonValue::String(tag)) => return open_tagged(tag.parse()?, map, frames),
            Some(other) => return Err(SerialError::UnknownTag(other.to_string())),
        },
    };
    Ok(Some(value))
}

fn open_tagged(tag: Tag, mut map: Map<String, JsonValue>, frames: &mut Vec<Frame>) -> Result<Option<Value>, SerialError> {
    let invalid = |reason: &str| SerialError::InvalidPayload { tag, reason: reason.to_string() };

    match tag {
        Tag::BigInt => {
            let digits = take_string(&mut map, tag, "d")?;
            digits.parse::<i128>()
                .map(|n| Some(Value::BigInt(n)))
                .map_err(|e| invalid(&e.to_string()))
        }
        Tag::Bytes => {
            let encoded = take_string(&mut map, tag, "d")?;
            STANDARD.decode(encoded)
                .map(|bytes| Some(Value::Bytes(bytes)))
                .map_err(|e| invalid(&e.to_string()))
        }
        Tag::Signal => {
            let inner = map.remove("v").ok_or_else(|| invalid("missing `v`"))?;
            frames.push(Frame::Signal { rest: Some(inner), inner: Value::Null });
            Ok(None)
        }
        Tag::Literal => {
            let original = map.remove("k").ok_or_else(|| invalid("missing `k`"))?;
            let rest = map.remove("v").ok_or_else(|| invalid("missing `v`"))?;
            frames.push(Frame::Literal { rest: Some(rest), original: Some(original), object: None });
            Ok(None)
        }
    }
}

fn take_string(map: &mut Map<String, JsonValue>, tag: Tag, field: &str) -> Result<String, SerialError> {
    match map.remove(field) {
        Some(JsonValue::String(s)) => Ok(s),
        _ => Err(SerialError::InvalidPayload {
            tag,
            reason: format!("`{field}` must be a string"),
        }),
    }
}

fn resolve_entry(root: &Value, entry: &JsonValue) -> Result<(), SerialError> {
    let JsonValue::Array(paths) = entry else {
        return Err(SerialError::MalformedReferences);
    };
    let Some((target_path, ref_paths)) = paths.split_first() else {
        return Err(SerialError::MalformedReferences);
    };

    let target_path = Path::from_json(target_path)?;
    let target = lookup(root, &target_path)?;

    for ref_path in ref_paths {
        let ref_path = Path::from_json(ref_path)?;
        assign(root, &ref_path, target.clone())?;
    }
    Ok(())
}

fn invalid_reference(path: &Path) -> SerialError {
    SerialError::InvalidReference { path: path.to_string() }
}

/// Child of `value` at `key`; a signal's `value` key always resolves
fn step(value: &Value, key: &str) -> Option<Value> {
    match value {
        Value::Object(object) => object.get(key),
        Value::Array(array) => array.get(key.parse().ok()?),
        Value::Signal(signal) if key == "value" => Some(signal.get()),
        _ => None,
    }
}

fn lookup(root: &Value, path: &Path) -> Result<Value, SerialError> {
    let mut current = root.clone();
    for key in path.segments().iter().flatten() {
        current = step(&current, key).ok_or_else(|| invalid_reference(path))?;
    }
    Ok(current)
}

/// Overwrite the slot at `path`; the parent must already own the key
fn assign(root: &Value, path: &Path, target: Value) -> Result<(), SerialError> {
    let (key, parent_path) = path.split_last().ok_or_else(|| invalid_reference(path))?;
    let parent = lookup(root, &parent_path)?;

    let assigned = match &parent {
        Value::Object(object) if object.contains_key(key) => {
            object.insert(key, target);
            true
        }
        Value::Array(array) => key.parse().is_ok_and(|index| array.set(index, target)),
        Value::Signal(signal) if key == "value" => {
            signal.set(target);
            true
        }
        _ => false,
    };

    if assigned { Ok(()) } else { Err(invalid_reference(path)) }
}
