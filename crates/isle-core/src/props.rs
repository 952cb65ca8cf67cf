//! Component props

use crate::VNode;
use indexmap::IndexMap;
use isle_serial::{Object, Value};

/// Inputs of a component.
///
/// `data` is the serializable part and travels in the props array; `slots`
/// holds forwarded markup, which travels as HTML between slot markers and is
/// never serialized.
#[derive(Debug, Clone, Default)]
pub struct Props {
    data: Object,
    slots: IndexMap<String, VNode>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props backed by an existing object (shares the handle)
    pub fn from_object(data: Object) -> Self {
        Self {
            data,
            slots: IndexMap::new(),
        }
    }

    /// Builder: set a data prop
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key, value);
        self
    }

    /// Builder: set a slot prop
    pub fn with_slot(mut self, name: &str, content: impl Into<VNode>) -> Self {
        self.slots.insert(name.to_string(), content.into());
        self
    }

    pub fn data(&self) -> &Object {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key)
    }

    pub fn slot(&self, name: &str) -> Option<&VNode> {
        self.slots.get(name)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, &VNode)> {
        self.slots.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn set_slot(&mut self, name: &str, content: VNode) {
        self.slots.insert(name.to_string(), content);
    }

    pub fn has_slots(&self) -> bool {
        !self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_and_slots_are_separate() {
        let props = Props::new()
            .with("count", 3)
            .with_slot("children", VNode::text("hi"));
        assert_eq!(props.get("count").and_then(|v| v.as_f64()), Some(3.0));
        assert!(!props.data().contains_key("children"));
        assert!(props.slot("children").is_some());
        assert!(props.has_slots());
    }

    #[test]
    fn test_from_object_shares_handle() {
        let data = Object::new();
        let props = Props::from_object(data.clone());
        data.insert("late", true);
        assert_eq!(props.get("late").and_then(|v| v.as_bool()), Some(true));
    }
}
