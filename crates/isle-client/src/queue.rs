//! Deferred mounts
//!
//! The walker never mounts while it is still iterating the document. It
//! records each top-level region here and the queue mounts them afterwards,
//! in the order they were found.

use crate::{ClientError, Host, InstanceId};
use isle_core::VNode;
use isle_dom::{DomError, Document, NodeId};

/// A region of server output waiting to be replaced by a live instance
#[derive(Debug, Clone)]
pub struct PendingMount {
    /// Component or partial node to mount
    pub node: VNode,
    /// Open marker comment
    pub open: NodeId,
    /// Close marker comment
    pub close: NodeId,
}

#[derive(Debug, Default)]
pub struct MountQueue {
    pending: Vec<PendingMount>,
}

impl MountQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mount: PendingMount) {
        self.pending.push(mount);
    }

    /// Move every pending mount of `other` to the back of this queue
    pub fn append(&mut self, other: &mut MountQueue) {
        self.pending.append(&mut other.pending);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Mount every pending region in enqueue order.
    ///
    /// The server output between the markers is dropped, the instance is
    /// mounted in its place and both marker comments are removed.
    pub fn run<H: Host>(&mut self, document: &mut Document, host: &mut H) -> Result<Vec<InstanceId>, ClientError> {
        let pending = std::mem::take(&mut self.pending);
        let mut mounted = Vec::with_capacity(pending.len());

        for PendingMount { node, open, close } in pending {
            let tree = document.tree_mut();
            let parent = tree.parent(close).ok_or(DomError::NotFound(close))?;

            let mut cursor = tree.next_sibling(open);
            while let Some(sibling) = cursor {
                if sibling == close {
                    break;
                }
                cursor = tree.next_sibling(sibling);
                tree.remove(sibling)?;
            }

            let id = host.mount(document, node, parent, Some(close))?;
            let tree = document.tree_mut();
            tree.remove(open)?;
            tree.remove(close)?;

            tracing::trace!(instance = %id, "Mounted region");
            mounted.push(id);
        }

        if !mounted.is_empty() {
            tracing::debug!(count = mounted.len(), "Mount queue flushed");
        }
        Ok(mounted)
    }
}
