//! Core layout trait for batch node positioning
//!
//! Layouts are pure: they read a [`Database`] and return new positions,
//! leaving connections and node identity untouched.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{Database, Position};

/// Positions computed by a layout, in node order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub positions: Vec<(String, Position)>,
}

impl LayoutResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, id: impl Into<String>, position: Position) {
        self.positions.push((id.into(), position));
    }

    /// Position assigned to `id`, if any
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.positions
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use archcanvas::core::LayoutAlgorithm;
/// use archcanvas::layout::{GridLayout, LayoutGraph};
///
/// let mut graph = LayoutGraph::new();
/// graph.push_node("a");
/// graph.push_node("b");
/// let result = GridLayout::new().layout(&graph).unwrap();
/// assert_eq!(result.len(), 2);
/// ```
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Compute new positions for every node in the database
    fn layout(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
