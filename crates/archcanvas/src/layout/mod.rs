//! Batch layout algorithms
//!
//! Each algorithm reads a [`LayoutGraph`] and returns new positions for its
//! nodes. Connections and node identity are never touched.

mod circular;
mod database;
mod grid;
mod hierarchy;

pub use circular::*;
pub use database::*;
pub use grid::*;
pub use hierarchy::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{EditorError, LayoutAlgorithm, LayoutResult};

/// Boxed layout over a [`LayoutGraph`]
pub type DynLayout = Box<dyn LayoutAlgorithm<LayoutGraph, Output = LayoutResult>>;

/// Named layout choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Hierarchy,
    Circular,
    Grid,
}

impl LayoutKind {
    pub fn all() -> &'static [LayoutKind] {
        &[LayoutKind::Hierarchy, LayoutKind::Circular, LayoutKind::Grid]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Hierarchy => "hierarchy",
            LayoutKind::Circular => "circular",
            LayoutKind::Grid => "grid",
        }
    }

    pub fn algorithm(&self) -> DynLayout {
        match self {
            LayoutKind::Hierarchy => Box::new(HierarchyLayout::new()),
            LayoutKind::Circular => Box::new(CircularLayout::new()),
            LayoutKind::Grid => Box::new(GridLayout::new()),
        }
    }

    /// Run this layout over `graph`
    pub fn run(&self, graph: &LayoutGraph) -> anyhow::Result<LayoutResult> {
        self.algorithm().layout(graph)
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hierarchy" | "hierarchical" | "tree" => Ok(LayoutKind::Hierarchy),
            "circular" | "circle" => Ok(LayoutKind::Circular),
            "grid" => Ok(LayoutKind::Grid),
            _ => Err(EditorError::UnknownLayout {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout_names() {
        assert_eq!("grid".parse::<LayoutKind>().unwrap(), LayoutKind::Grid);
        assert_eq!("Circular".parse::<LayoutKind>().unwrap(), LayoutKind::Circular);
        assert!(matches!(
            "spiral".parse::<LayoutKind>(),
            Err(EditorError::UnknownLayout { .. })
        ));
    }

    #[test]
    fn test_registry_names_match() {
        for kind in LayoutKind::all() {
            assert_eq!(kind.algorithm().name(), kind.as_str());
        }
    }

    #[test]
    fn test_layouts_place_every_node_once() {
        let mut graph = LayoutGraph::new();
        graph.push_edge("a", "b");
        graph.push_edge("b", "c");
        graph.push_node("d");
        for kind in LayoutKind::all() {
            let result = kind.run(&graph).unwrap();
            assert_eq!(result.len(), 4, "{}", kind);
            for id in ["a", "b", "c", "d"] {
                assert!(result.position_of(id).is_some(), "{} missing {}", kind, id);
            }
        }
    }
}
