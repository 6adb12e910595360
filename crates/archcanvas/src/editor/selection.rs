//! Selection state
//!
//! Single-node, multi-node and text-label selection are mutually exclusive;
//! activating one replaces whatever was selected before.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Node { id: String },
    TextLabel { id: String },
    Multi {
        nodes: BTreeSet<String>,
        connections: BTreeSet<String>,
    },
}

impl Selection {
    pub fn node(id: impl Into<String>) -> Self {
        Selection::Node { id: id.into() }
    }

    pub fn text_label(id: impl Into<String>) -> Self {
        Selection::TextLabel { id: id.into() }
    }

    /// Multi-selection; collapses to `None` when both sets are empty
    pub fn multi(
        nodes: impl IntoIterator<Item = String>,
        connections: impl IntoIterator<Item = String>,
    ) -> Self {
        let nodes: BTreeSet<String> = nodes.into_iter().collect();
        let connections: BTreeSet<String> = connections.into_iter().collect();
        if nodes.is_empty() && connections.is_empty() {
            Selection::None
        } else {
            Selection::Multi { nodes, connections }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Whether `id` is selected, singly or as part of a group
    pub fn contains_node(&self, id: &str) -> bool {
        match self {
            Selection::Node { id: selected } => selected == id,
            Selection::Multi { nodes, .. } => nodes.contains(id),
            _ => false,
        }
    }

    /// Whether `id` belongs to the multi-selection
    pub fn in_multi(&self, id: &str) -> bool {
        matches!(self, Selection::Multi { nodes, .. } if nodes.contains(id))
    }

    pub fn contains_connection(&self, id: &str) -> bool {
        matches!(self, Selection::Multi { connections, .. } if connections.contains(id))
    }

    /// Selected node ids in sorted order
    pub fn node_ids(&self) -> Vec<String> {
        match self {
            Selection::Node { id } => vec![id.clone()],
            Selection::Multi { nodes, .. } => nodes.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn connection_ids(&self) -> Vec<String> {
        match self {
            Selection::Multi { connections, .. } => connections.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Add or remove a node from the multi-selection.
    ///
    /// A single selected node becomes the first member of the group.
    pub fn toggle_node(&mut self, id: &str) {
        let (mut nodes, connections) = match std::mem::take(self) {
            Selection::Node { id: existing } => (BTreeSet::from([existing]), BTreeSet::new()),
            Selection::Multi { nodes, connections } => (nodes, connections),
            _ => (BTreeSet::new(), BTreeSet::new()),
        };
        if !nodes.remove(id) {
            nodes.insert(id.to_string());
        }
        *self = Selection::multi(nodes, connections);
    }

    /// Drop a deleted node; returns true if the selection changed
    pub fn forget_node(&mut self, id: &str) -> bool {
        match self {
            Selection::Node { id: selected } if selected == id => {
                *self = Selection::None;
                true
            }
            Selection::Multi { nodes, connections } => {
                let changed = nodes.remove(id);
                if nodes.is_empty() && connections.is_empty() {
                    *self = Selection::None;
                }
                changed
            }
            _ => false,
        }
    }

    /// Drop a deleted connection; returns true if the selection changed
    pub fn forget_connection(&mut self, id: &str) -> bool {
        match self {
            Selection::Multi { nodes, connections } => {
                let changed = connections.remove(id);
                if nodes.is_empty() && connections.is_empty() {
                    *self = Selection::None;
                }
                changed
            }
            _ => false,
        }
    }

    /// Drop a deleted text label; returns true if the selection changed
    pub fn forget_text_label(&mut self, id: &str) -> bool {
        match self {
            Selection::TextLabel { id: selected } if selected == id => {
                *self = Selection::None;
                true
            }
            _ => false,
        }
    }
}
