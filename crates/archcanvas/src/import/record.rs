//! Import record
//!
//! The JSON exchange schema: named nodes with optional technology and
//! position, and connections between node names. Validation happens up
//! front so a bad document never reaches the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::{EditorError, Position};
use crate::editor::DiagramModel;
use crate::layout::LayoutKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportNode {
    /// Key that connections refer to
    pub name: String,
    /// Display title; the name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ImportNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            technology: None,
            position: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title the created node gets
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConnection {
    pub from: String,
    pub to: String,
}

impl ImportConnection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A whole import document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub nodes: Vec<ImportNode>,
    #[serde(default)]
    pub connections: Vec<ImportConnection>,
    /// Preferred layout when positions are missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutKind>,
}

impl ImportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any node arrives without a position
    pub fn needs_layout(&self) -> bool {
        self.nodes.iter().any(|n| n.position.is_none())
    }

    /// Check names and endpoints without touching a model
    pub fn validate(&self) -> Result<(), EditorError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.name.trim().is_empty() {
                return Err(EditorError::missing_field("name", index));
            }
            if let Some(position) = node.position {
                if !position.is_finite() {
                    return Err(EditorError::import_error(format!(
                        "node {} ('{}') has a non-finite position",
                        index, node.name
                    )));
                }
            }
        }
        for (index, connection) in self.connections.iter().enumerate() {
            if connection.from.trim().is_empty() || connection.to.trim().is_empty() {
                return Err(EditorError::import_error(format!(
                    "connection {} needs both 'from' and 'to'",
                    index
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and validate a JSON import document.
///
/// Missing `name` fields are reported with the index of the offending node.
pub fn parse_json(input: &str) -> Result<ImportRecord, EditorError> {
    let value: Value = serde_json::from_str(input)?;
    let Value::Object(root) = &value else {
        return Err(EditorError::invalid_json(
            "expected an object with 'nodes' and 'connections'".to_string(),
        ));
    };

    if let Some(nodes) = root.get("nodes") {
        let Value::Array(nodes) = nodes else {
            return Err(EditorError::invalid_json("'nodes' must be an array".to_string()));
        };
        for (index, node) in nodes.iter().enumerate() {
            trace!(index, "Checking imported node");
            if !matches!(node.get("name"), Some(Value::String(_))) {
                return Err(EditorError::missing_field("name", index));
            }
        }
    }

    let record: ImportRecord = serde_json::from_value(value)?;
    record.validate()?;
    debug!(
        nodes = record.nodes.len(),
        connections = record.connections.len(),
        "Parsed JSON import record"
    );
    Ok(record)
}

/// Export the model in the import schema.
///
/// Nodes are keyed by id and carry their title separately, so duplicate or
/// empty titles still re-import with the same endpoints.
pub fn export_record(model: &DiagramModel) -> ImportRecord {
    let nodes = model
        .nodes()
        .map(|n| {
            ImportNode::named(&n.id)
                .with_title(&n.title)
                .with_technology(&n.technology_id)
                .at(n.position)
        })
        .collect();
    let connections = model
        .renderable_connections()
        .map(|(_, from, to)| ImportConnection::new(&from.id, &to.id))
        .collect();
    ImportRecord {
        nodes,
        connections,
        layout: None,
    }
}
