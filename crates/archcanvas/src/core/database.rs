//! Core database trait for graph data handed to layout algorithms
//!
//! Layouts read nodes and edges through this trait so they can run over the
//! whole diagram or over a freshly imported subset alike.

use anyhow::Result;

/// Something addressable by a stable id
pub trait Identified {
    fn id(&self) -> &str;
}

/// A directed link between two ids
pub trait Link {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
}

/// Core trait for graph storage
///
/// The associated types let each store define its own node and edge records,
/// as long as nodes carry an id and edges name their endpoints.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync + Identified;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync + Link;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a node by ID
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;

    /// Number of edges touching `id` in either direction
    fn degree(&self, id: &str) -> usize {
        self.edges()
            .filter(|e| e.source() == id || e.target() == id)
            .count()
    }
}
