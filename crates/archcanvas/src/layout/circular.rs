//! Circular layout
//!
//! The best-connected node sits in the middle and the rest of the connected
//! nodes ring it. Isolated nodes go to the top-left corner.

use anyhow::Result;
use std::f64::consts::TAU;
use tracing::{debug, span, Level};

use super::LayoutGraph;
use crate::core::{Database, LayoutAlgorithm, LayoutResult, Position, NODE_HEIGHT, NODE_WIDTH};

const SPACING: f64 = 150.0;
const ROW_SPACING: f64 = 120.0;
const MIN_WIDTH: f64 = 1000.0;
const MIN_HEIGHT: f64 = 800.0;
const CORNER: f64 = 50.0;
const RADIUS_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy, Default)]
pub struct CircularLayout;

impl CircularLayout {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutAlgorithm<LayoutGraph> for CircularLayout {
    type Output = LayoutResult;

    fn layout(&self, graph: &LayoutGraph) -> Result<LayoutResult> {
        let layout_span = span!(
            Level::INFO,
            "layout_circular",
            node_count = graph.node_count(),
            edge_count = graph.edge_count()
        );
        let _enter = layout_span.enter();

        let n = graph.node_count() as f64;
        let center_x = MIN_WIDTH.max(n * SPACING) / 2.0;
        let center_y = MIN_HEIGHT.max(n * ROW_SPACING) / 2.0;
        let half = (NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);

        let (isolated, mut connected): (Vec<&str>, Vec<&str>) = graph
            .nodes()
            .map(|n| n.id.as_str())
            .partition(|id| graph.is_isolated(id));
        // Stable: ties keep insertion order.
        connected.sort_by_key(|id| std::cmp::Reverse(graph.degree(id)));

        let mut result = LayoutResult::new();
        if let Some((center, ring)) = connected.split_first() {
            result.place(*center, Position::new(center_x - half.0, center_y - half.1));

            let radius = center_x.min(center_y) * RADIUS_FACTOR;
            for (i, id) in ring.iter().enumerate() {
                let angle = i as f64 / ring.len() as f64 * TAU;
                result.place(
                    *id,
                    Position::new(
                        center_x + angle.cos() * radius - half.0,
                        center_y + angle.sin() * radius - half.1,
                    ),
                );
            }
        }

        if !isolated.is_empty() {
            let cols = (isolated.len() as f64).sqrt().ceil() as usize;
            for (i, id) in isolated.iter().enumerate() {
                let (row, col) = (i / cols, i % cols);
                result.place(
                    *id,
                    Position::new(CORNER + col as f64 * SPACING, CORNER + row as f64 * ROW_SPACING),
                );
            }
        }

        debug!(placed = result.len(), "Circular layout complete");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "circular"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_is_centered() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "hub");
        graph.push_edge("hub", "b");
        graph.push_edge("hub", "c");
        let result = CircularLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("hub"), Some(Position::new(420.0, 350.0)));
    }

    #[test]
    fn test_ring_nodes_are_equidistant() {
        let mut graph = LayoutGraph::new();
        for leaf in ["a", "b", "c", "d"] {
            graph.push_edge("hub", leaf);
        }
        let result = CircularLayout::new().layout(&graph).unwrap();
        let hub = result.position_of("hub").unwrap();
        for leaf in ["a", "b", "c", "d"] {
            let d = hub.distance_to(result.position_of(leaf).unwrap());
            assert!((d - 240.0).abs() < 1e-9, "distance {}", d);
        }
    }

    #[test]
    fn test_isolated_nodes_in_corner() {
        let mut graph = LayoutGraph::new();
        graph.push_node("x");
        graph.push_node("y");
        let result = CircularLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("x"), Some(Position::new(50.0, 50.0)));
        assert_eq!(result.position_of("y"), Some(Position::new(200.0, 50.0)));
    }
}
