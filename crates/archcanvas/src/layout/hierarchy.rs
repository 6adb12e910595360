//! Hierarchy layout
//!
//! Breadth-first levels from the root nodes, one row per level. Nodes that
//! no edge touches are parked in a grid towards the bottom right.

use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, span, trace, Level};

use super::LayoutGraph;
use crate::core::{Database, LayoutAlgorithm, LayoutResult, Position};

const BASE_SPACING: f64 = 200.0;
const VERTICAL_SPACING: f64 = 150.0;
const ROW_WIDTH: f64 = 1200.0;
const MARGIN: f64 = 100.0;
const MIN_WIDTH: f64 = 1200.0;
const MIN_HEIGHT: f64 = 800.0;
const ISOLATED_INSET: (f64, f64) = (400.0, 300.0);
const ISOLATED_STEP: (f64, f64) = (180.0, 120.0);

#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyLayout;

impl HierarchyLayout {
    pub fn new() -> Self {
        Self
    }

    /// BFS levels over the connected part of the graph
    fn levels<'a>(&self, graph: &'a LayoutGraph, connected: &[&'a str]) -> Vec<Vec<&'a str>> {
        let targets = graph.targets();
        let mut roots: Vec<&str> = connected
            .iter()
            .copied()
            .filter(|id| !targets.contains(id))
            .collect();
        if roots.is_empty() {
            roots.extend(connected.first().copied());
        }

        let mut levels = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = roots;
        while !current.is_empty() {
            visited.extend(current.iter().copied());
            let mut next: Vec<&str> = Vec::new();
            for id in &current {
                for child in graph.successors(id) {
                    if !visited.contains(child) && !next.contains(&child) {
                        next.push(child);
                    }
                }
            }
            levels.push(current);
            current = next;
        }

        let remaining: Vec<&str> = connected
            .iter()
            .copied()
            .filter(|id| !visited.contains(id))
            .collect();
        if !remaining.is_empty() {
            trace!(count = remaining.len(), "Unreached nodes appended as a final level");
            levels.push(remaining);
        }
        levels
    }
}

impl LayoutAlgorithm<LayoutGraph> for HierarchyLayout {
    type Output = LayoutResult;

    fn layout(&self, graph: &LayoutGraph) -> Result<LayoutResult> {
        let layout_span = span!(
            Level::INFO,
            "layout_hierarchy",
            node_count = graph.node_count(),
            edge_count = graph.edge_count()
        );
        let _enter = layout_span.enter();

        let (isolated, connected): (Vec<&str>, Vec<&str>) = graph
            .nodes()
            .map(|n| n.id.as_str())
            .partition(|id| graph.is_isolated(id));

        let mut result = LayoutResult::new();
        for (level_index, level) in self.levels(graph, &connected).iter().enumerate() {
            let level_width = level.len() as f64 * BASE_SPACING;
            let start_x = MARGIN.max((ROW_WIDTH - level_width) / 2.0);
            let y = MARGIN + level_index as f64 * VERTICAL_SPACING;
            for (i, id) in level.iter().enumerate() {
                result.place(*id, Position::new(start_x + i as f64 * BASE_SPACING, y));
            }
        }

        if !isolated.is_empty() {
            let n = graph.node_count() as f64;
            let width = MIN_WIDTH.max(n * BASE_SPACING);
            let height = MIN_HEIGHT.max(n * VERTICAL_SPACING);
            let cols = (isolated.len() as f64).sqrt().ceil() as usize;
            for (i, id) in isolated.iter().enumerate() {
                let (row, col) = (i / cols, i % cols);
                result.place(
                    *id,
                    Position::new(
                        width - ISOLATED_INSET.0 + col as f64 * ISOLATED_STEP.0,
                        height - ISOLATED_INSET.1 + row as f64 * ISOLATED_STEP.1,
                    ),
                );
            }
        }

        debug!(placed = result.len(), isolated = isolated.len(), "Hierarchy layout complete");
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_stacked() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        graph.push_edge("b", "c");
        let result = HierarchyLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("a"), Some(Position::new(500.0, 100.0)));
        assert_eq!(result.position_of("b"), Some(Position::new(500.0, 250.0)));
        assert_eq!(result.position_of("c"), Some(Position::new(500.0, 400.0)));
    }

    #[test]
    fn test_siblings_share_a_row() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("root", "x");
        graph.push_edge("root", "y");
        let result = HierarchyLayout::new().layout(&graph).unwrap();
        let x = result.position_of("x").unwrap();
        let y = result.position_of("y").unwrap();
        assert_eq!(x.y, y.y);
        assert_eq!(y.x - x.x, 200.0);
    }

    #[test]
    fn test_cycle_falls_back_to_first_node() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        graph.push_edge("b", "a");
        let result = HierarchyLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("a").unwrap().y, 100.0);
        assert_eq!(result.position_of("b").unwrap().y, 250.0);
    }

    #[test]
    fn test_isolated_nodes_go_bottom_right() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        graph.push_node("lonely");
        let result = HierarchyLayout::new().layout(&graph).unwrap();
        assert_eq!(result.position_of("lonely"), Some(Position::new(800.0, 500.0)));
        assert_eq!(result.len(), 3);
    }
}
