//! Per-request render state

use indexmap::{IndexMap, IndexSet};
use isle_core::{IslandId, VNode};
use isle_serial::Value;

/// Entry of the owner stack: who is rendering the current subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// An island's own render output
    Island(String),
    /// A plain component's render output
    Component(String),
    /// Forwarded children of the island at this props index
    Slot { props_index: usize, name: String },
}

/// Slot content registered while rendering an island
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub props_index: usize,
    pub name: String,
}

/// Everything one render pass accumulates.
///
/// Created per request, mutated by [`crate::Renderer`] during the single
/// render pass, consumed by response assembly.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Data props of every marked island, indexed by marker props index
    pub props: Vec<Value>,
    /// Distinct islands encountered, as (island, export) pairs
    pub islands: IndexSet<IslandId>,
    /// Nodes hoisted into `<head>`
    pub head: Vec<VNode>,
    /// HTML of each top-level partial region (markers included), by name
    pub partials: IndexMap<String, String>,
    /// Slot content wrapped in slot markers
    pub slots: Vec<SlotRecord>,
    pub(crate) partial_names: IndexSet<String>,
    pub(crate) partial_depth: usize,
    owners: Vec<Owner>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_owner(&mut self, owner: Owner) {
        self.owners.push(owner);
    }

    pub(crate) fn pop_owner(&mut self) {
        self.owners.pop();
    }

    /// Current owner stack, outermost first
    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    /// Whether the nearest island-or-slot owner is an island.
    ///
    /// Islands rendered there are owned by that island's client instance
    /// and get no marker of their own.
    pub fn inside_island(&self) -> bool {
        self.owners.iter()
            .rev()
            .find(|owner| !matches!(owner, Owner::Component(_)))
            .is_some_and(|owner| matches!(owner, Owner::Island(_)))
    }

    /// Allocate the next props index for an island's data props
    pub(crate) fn push_props(&mut self, props: Value) -> usize {
        self.props.push(props);
        self.props.len() - 1
    }
}
