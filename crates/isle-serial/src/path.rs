//! Reference paths

use crate::SerialError;
use serde_json::Value as JsonValue;
use std::fmt;

/// Key sequence locating a node from the graph root.
///
/// `None` segments stand for the root itself (`null` on the wire); array
/// indices are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<Option<String>>);

impl Path {
    /// The root path `[null]`
    pub fn root() -> Self {
        Self(vec![None])
    }

    /// Path segments
    pub fn segments(&self) -> &[Option<String>] {
        &self.0
    }

    /// Extend with one key
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Some(key.into()));
        Self(segments)
    }

    /// Split off the terminal key, if the path ends in one
    pub fn split_last(&self) -> Option<(&str, Path)> {
        let (last, parent) = self.0.split_last()?;
        Some((last.as_deref()?, Self(parent.to_vec())))
    }

    pub(crate) fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.0.iter()
                .map(|segment| segment.clone().map_or(JsonValue::Null, JsonValue::String))
                .collect(),
        )
    }

    pub(crate) fn from_json(json: &JsonValue) -> Result<Self, SerialError> {
        let JsonValue::Array(items) = json else {
            return Err(SerialError::MalformedReferences);
        };
        items.iter()
            .map(|item| match item {
                JsonValue::Null => Ok(None),
                JsonValue::String(s) => Ok(Some(s.clone())),
                JsonValue::Number(n) if n.is_u64() => Ok(Some(n.to_string())),
                _ => Err(SerialError::MalformedReferences),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<Option<String>>> for Path {
    fn from(segments: Vec<Option<String>>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_json() {
        let path = Path::root().child("b").child("0");
        assert_eq!(path.to_string(), r#"[null,"b","0"]"#);
        assert_eq!(Path::from_json(&path.to_json()).unwrap(), path);
    }

    #[test]
    fn test_numeric_segments_accepted() {
        let json: JsonValue = serde_json::from_str("[null, 3]").unwrap();
        assert_eq!(Path::from_json(&json).unwrap(), Path::root().child("3"));
    }

    #[test]
    fn test_split_last() {
        let path = Path::root().child("a");
        let (key, parent) = path.split_last().unwrap();
        assert_eq!(key, "a");
        assert_eq!(parent, Path::root());
        assert!(Path::root().split_last().is_none());
    }
}
