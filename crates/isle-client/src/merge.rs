//! Partial content merging

use isle_core::{MergeMode, VNode};

/// Prefix of keys generated while prepending. Marker keys may not contain
/// `--`, so no server-rendered key starts with it.
const GENERATED_KEY_PREFIX: &str = "--";

/// Children of a partial owner after merging `content` into `current`.
///
/// Prepending shifts positions, so the leading unkeyed children get
/// sequential keys (up to the first explicit key) and the new content is
/// wrapped in a keyed fragment. Position-matched instances behind the
/// insertion point then keep their identity on later prepends.
pub fn merge_children(current: &[VNode], mode: MergeMode, content: Vec<VNode>) -> Vec<VNode> {
    match mode {
        MergeMode::Replace => content,
        MergeMode::Append => {
            let mut children = current.to_vec();
            children.extend(content);
            children
        }
        MergeMode::Prepend => prepend(current, content),
    }
}

fn prepend(current: &[VNode], content: Vec<VNode>) -> Vec<VNode> {
    let mut existing = current.to_vec();
    let mut next_key = 0usize;
    for node in existing.iter_mut() {
        if node.key().is_some() {
            break;
        }
        // Text cannot carry a key
        if node.set_key(format!("{GENERATED_KEY_PREFIX}{next_key}")) {
            next_key += 1;
        }
    }

    let wrapper_key = format!("{GENERATED_KEY_PREFIX}isl-{}", existing.len());
    let incoming = match <[VNode; 1]>::try_from(content) {
        Ok([single]) if single.key().is_some() => single,
        Ok([single]) => VNode::keyed_fragment(wrapper_key, vec![single]),
        Err(content) => VNode::keyed_fragment(wrapper_key, content),
    };

    let mut children = Vec::with_capacity(existing.len() + 1);
    children.push(incoming);
    children.extend(existing);
    children
}
