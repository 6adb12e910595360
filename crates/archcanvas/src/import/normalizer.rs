//! Import normalizer
//!
//! Applies an [`ImportRecord`] to a model. Everything that can fail
//! (validation, name resolution, layout) runs before the first node is
//! inserted, so a rejected import leaves the model untouched.

use std::collections::HashMap;
use tracing::{debug, info, span, warn, Level};

use super::{auto_map, ImportRecord};
use crate::core::{EditorError, Position, TechnologyCatalog};
use crate::editor::{DiagramModel, NewNode};
use crate::layout::{LayoutGraph, LayoutKind};

/// Placement used before layout, and as the layout key space
fn provisional_position(index: usize) -> Position {
    Position::new(index as f64 * 200.0 + 100.0, 100.0)
}

/// What an import added to the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub node_ids: Vec<String>,
    pub connection_ids: Vec<String>,
    /// Imported name to new node id; a repeated name maps to its last node
    pub names: HashMap<String, String>,
    /// Layout that ran, if positions were missing
    pub layout: Option<LayoutKind>,
}

impl ImportSummary {
    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }
}

/// Turns import records into model mutations
#[derive(Debug, Clone)]
pub struct ImportNormalizer<'a> {
    catalog: &'a TechnologyCatalog,
    default_layout: LayoutKind,
}

impl<'a> ImportNormalizer<'a> {
    pub fn new(catalog: &'a TechnologyCatalog) -> Self {
        Self {
            catalog,
            default_layout: LayoutKind::default(),
        }
    }

    pub fn with_default_layout(mut self, layout: LayoutKind) -> Self {
        self.default_layout = layout;
        self
    }

    /// Insert `record` into `model`.
    ///
    /// `layout` wins over the record's own hint, which wins over the
    /// normalizer default. Layout only runs when some node has no position,
    /// and then covers every imported node.
    pub fn apply(
        &self,
        model: &mut DiagramModel,
        record: &ImportRecord,
        layout: Option<LayoutKind>,
    ) -> Result<ImportSummary, EditorError> {
        let import_span = span!(
            Level::INFO,
            "import",
            nodes = record.nodes.len(),
            connections = record.connections.len()
        );
        let _enter = import_span.enter();

        record.validate()?;

        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (index, node) in record.nodes.iter().enumerate() {
            by_name.insert(node.name.as_str(), index);
        }

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for connection in &record.connections {
            match (by_name.get(connection.from.as_str()), by_name.get(connection.to.as_str())) {
                (Some(&from), Some(&to)) if from != to => edges.push((from, to)),
                (Some(_), Some(_)) => debug!(name = %connection.from, "Skipping self connection"),
                _ => warn!(
                    from = %connection.from,
                    to = %connection.to,
                    "Skipping connection to an unknown name"
                ),
            }
        }

        let layout_kind = record
            .needs_layout()
            .then(|| layout.or(record.layout).unwrap_or(self.default_layout));
        let positions = match layout_kind {
            Some(kind) => self.layout_positions(record.nodes.len(), &edges, kind)?,
            None => record
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| n.position.unwrap_or_else(|| provisional_position(i)))
                .collect(),
        };

        let mut summary = ImportSummary {
            layout: layout_kind,
            ..ImportSummary::default()
        };
        for (node, position) in record.nodes.iter().zip(positions) {
            let title = node.display_title();
            let technology = auto_map(title, node.technology.as_deref(), self.catalog);
            let id = model.add_node(NewNode::new(technology, position, title));
            summary.names.insert(node.name.clone(), id.clone());
            summary.node_ids.push(id);
        }
        for (from, to) in edges {
            let connection = model.add_connection(&summary.node_ids[from], &summary.node_ids[to])?;
            summary.connection_ids.push(connection);
        }

        info!(
            nodes = summary.node_ids.len(),
            connections = summary.connection_ids.len(),
            layout = ?summary.layout,
            "Import applied"
        );
        Ok(summary)
    }

    /// Lay out the imported subgraph, keyed by record index
    fn layout_positions(
        &self,
        count: usize,
        edges: &[(usize, usize)],
        kind: LayoutKind,
    ) -> Result<Vec<Position>, EditorError> {
        let mut graph = LayoutGraph::new();
        for index in 0..count {
            graph.push_node(index.to_string());
        }
        for (from, to) in edges {
            graph.push_edge(from.to_string(), to.to_string());
        }
        let result = kind
            .run(&graph)
            .map_err(|err| EditorError::layout_error(err.to_string()))?;
        Ok((0..count)
            .map(|i| {
                result
                    .position_of(&i.to_string())
                    .unwrap_or_else(|| provisional_position(i))
            })
            .collect())
    }
}
