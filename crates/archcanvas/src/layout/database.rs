//! Layout graph
//!
//! A lightweight node/edge store handed to layout algorithms. It can hold
//! the whole diagram or just a freshly imported subset.

use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::core::{Database, Identified, Link, Position};
use crate::editor::DiagramModel;

/// A node as seen by a layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub position: Option<Position>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: None,
        }
    }
}

impl Identified for LayoutNode {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A directed edge as seen by a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
}

impl LayoutEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Link for LayoutEdge {
    fn source(&self) -> &str {
        &self.from
    }

    fn target(&self) -> &str {
        &self.to
    }
}

/// Graph store for layout input
///
/// Maintains insertion order for deterministic layout.
#[derive(Debug, Default, Clone)]
pub struct LayoutGraph {
    nodes: HashMap<String, LayoutNode>,
    node_order: Vec<String>,
    edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every node and connection of the model
    pub fn from_model(model: &DiagramModel) -> Self {
        let ids: Vec<String> = model.nodes().map(|n| n.id.clone()).collect();
        Self::from_model_subset(model, &ids)
    }

    /// Only `ids` and the connections running between them
    pub fn from_model_subset(model: &DiagramModel, ids: &[String]) -> Self {
        let mut graph = Self::new();
        for id in ids {
            if let Some(node) = model.node(id) {
                graph.insert(LayoutNode {
                    id: node.id.clone(),
                    position: Some(node.position),
                });
            }
        }
        for connection in model.connections() {
            if graph.has_node(&connection.from_node_id) && graph.has_node(&connection.to_node_id) {
                graph
                    .edges
                    .push(LayoutEdge::new(&connection.from_node_id, &connection.to_node_id));
            }
        }
        debug!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            "Built layout graph"
        );
        graph
    }

    fn insert(&mut self, node: LayoutNode) {
        if !self.nodes.contains_key(&node.id) {
            self.node_order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add an unplaced node
    pub fn push_node(&mut self, id: impl Into<String>) {
        self.insert(LayoutNode::new(id));
    }

    /// Add an edge; endpoints are created if missing
    pub fn push_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let edge = LayoutEdge::new(from, to);
        for id in [&edge.from, &edge.to] {
            if !self.has_node(id) {
                self.push_node(id.clone());
            }
        }
        self.edges.push(edge);
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes with at least one incoming edge
    pub fn targets(&self) -> HashSet<&str> {
        self.edges.iter().map(|e| e.to.as_str()).collect()
    }

    /// Nodes that no edge touches
    pub fn is_isolated(&self, id: &str) -> bool {
        !self.edges.iter().any(|e| e.from == id || e.to == id)
    }

    /// Ids that `id` points to, in edge order and without repeats
    pub fn successors(&self, id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|e| e.from == id)
            .map(|e| e.to.as_str())
            .filter(|to| seen.insert(*to))
            .collect()
    }
}

impl Database for LayoutGraph {
    type Node = LayoutNode;
    type Edge = LayoutEdge;

    fn add_node(&mut self, node: LayoutNode) -> Result<()> {
        trace!(node_id = %node.id, "Adding node to layout graph");
        self.insert(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: LayoutEdge) -> Result<()> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.has_node(endpoint) {
                bail!("edge references unknown node '{}'", endpoint);
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &LayoutEdge> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_edge_creates_endpoints() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.degree("a"), 1);
    }

    #[test]
    fn test_add_edge_rejects_unknown_endpoint() {
        let mut graph = LayoutGraph::new();
        graph.push_node("a");
        assert!(graph.add_edge(LayoutEdge::new("a", "ghost")).is_err());
    }

    #[test]
    fn test_successors_are_unique() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        graph.push_edge("a", "b");
        graph.push_edge("a", "c");
        assert_eq!(graph.successors("a"), vec!["b", "c"]);
    }
}
