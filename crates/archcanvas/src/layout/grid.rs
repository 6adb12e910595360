//! Grid layout: row-major, `ceil(sqrt(n))` columns.

use anyhow::Result;
use tracing::{debug, span, Level};

use super::LayoutGraph;
use crate::core::{Database, LayoutAlgorithm, LayoutResult, Position};

const ORIGIN: f64 = 100.0;
const COLUMN_SPACING: f64 = 200.0;
const ROW_SPACING: f64 = 150.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct GridLayout;

impl GridLayout {
    pub fn new() -> Self {
        Self
    }

    /// Column count for `n` nodes
    pub fn columns(n: usize) -> usize {
        (n as f64).sqrt().ceil().max(1.0) as usize
    }
}

impl LayoutAlgorithm<LayoutGraph> for GridLayout {
    type Output = LayoutResult;

    fn layout(&self, graph: &LayoutGraph) -> Result<LayoutResult> {
        let layout_span = span!(Level::INFO, "layout_grid", node_count = graph.node_count());
        let _enter = layout_span.enter();

        let cols = Self::columns(graph.node_count());
        let mut result = LayoutResult::new();
        for (i, node) in graph.nodes().enumerate() {
            let (row, col) = (i / cols, i % cols);
            result.place(
                node.id.clone(),
                Position::new(
                    ORIGIN + col as f64 * COLUMN_SPACING,
                    ORIGIN + row as f64 * ROW_SPACING,
                ),
            );
        }
        debug!(placed = result.len(), cols, "Grid layout complete");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "grid"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_nodes_use_three_columns() {
        let mut graph = LayoutGraph::new();
        for id in ["a", "b", "c", "d", "e"] {
            graph.push_node(id);
        }
        let result = GridLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("c"), Some(Position::new(500.0, 100.0)));
        assert_eq!(result.position_of("d"), Some(Position::new(100.0, 250.0)));
    }

    #[test]
    fn test_empty_graph() {
        let result = GridLayout::new().layout(&LayoutGraph::new()).unwrap();
        assert!(result.is_empty());
    }
}
