//! Diagram model
//!
//! The authoritative in-memory graph: nodes, connections, text labels and
//! the selection. Every mutation goes through these methods and is recorded
//! as a [`MutationEvent`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use super::{EventLog, MutationEvent, Selection};
use crate::core::{
    derive_connection_type, label_rect, stroke_style, ArrowType, CanvasContent, ConnectionType,
    CustomStyle, EditorError, Environment, NodeStatus, PathStyle, Position, Rect, StrokeStyle,
    DEFAULT_TECHNOLOGY_ID,
};

/// Host and sizing facts about the machine a node represents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// Where a node is deployed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A placed diagram box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub technology_id: String,
    pub position: Position,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(flatten)]
    pub system: SystemFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        technology_id: impl Into<String>,
        position: Position,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            technology_id: technology_id.into(),
            position,
            title: title.into(),
            node_type: None,
            system: SystemFields::default(),
            status: None,
            cpu_usage: None,
            memory_usage: None,
            placement: Placement::default(),
            description: None,
        }
    }

    /// Rectangle the node occupies
    pub fn rect(&self) -> Rect {
        Rect::node_at(self.position)
    }
}

/// Fields for a node about to be created; the model assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub technology_id: String,
    pub position: Position,
    pub title: String,
    pub node_type: Option<String>,
}

impl NewNode {
    pub fn new(technology_id: impl Into<String>, position: Position, title: impl Into<String>) -> Self {
        Self {
            technology_id: technology_id.into(),
            position,
            title: title.into(),
            node_type: None,
        }
    }

    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }
}

/// Partial node update; `None` leaves a field untouched.
///
/// `id` is accepted so hosts can send whole records back, but ids never
/// change. Blank technology ids and non-finite positions are dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeUpdate {
    pub id: Option<String>,
    pub technology_id: Option<String>,
    pub position: Option<Position>,
    pub title: Option<String>,
    pub node_type: Option<String>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub storage: Option<u32>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub hostname: Option<String>,
    pub status: Option<NodeStatus>,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub environment: Option<Environment>,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub cluster: Option<String>,
    pub namespace: Option<String>,
    pub description: Option<String>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn technology(mut self, technology_id: impl Into<String>) -> Self {
        self.technology_id = Some(technology_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A directed styled edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub arrow_type: ArrowType,
    pub path_style: PathStyle,
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<CustomStyle>,
}

impl Connection {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from_node_id: from.into(),
            to_node_id: to.into(),
            arrow_type: ArrowType::Default,
            path_style: PathStyle::Straight,
            animated: false,
            custom_style: None,
        }
    }

    /// The derived type label
    pub fn connection_type(&self) -> ConnectionType {
        derive_connection_type(self.animated, self.path_style, self.arrow_type)
    }

    /// Stroke parameters for rendering this connection
    pub fn stroke(&self) -> StrokeStyle {
        stroke_style(self.arrow_type, self.path_style, self.animated, self.custom_style.as_ref())
    }

    /// True if either endpoint is `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }
}

/// Partial connection style change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionStyleUpdate {
    pub arrow_type: Option<ArrowType>,
    pub path_style: Option<PathStyle>,
    pub animated: Option<bool>,
}

/// Partial text label change
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLabelUpdate {
    pub text: Option<String>,
    pub position: Option<Position>,
}

/// Free-floating annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub id: String,
    pub text: String,
    pub position: Position,
}

impl TextLabel {
    pub fn rect(&self) -> Rect {
        label_rect(&self.text, self.position)
    }
}

/// What sits under a canvas point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HitTarget {
    Background,
    Node { id: String, origin: Position },
    TextLabel { id: String, origin: Position },
}

/// In-memory diagram store
#[derive(Debug, Default)]
pub struct DiagramModel {
    nodes: HashMap<String, Node>,
    node_order: Vec<String>,
    connections: Vec<Connection>,
    text_labels: Vec<TextLabel>,
    selection: Selection,
    events: EventLog,
    node_counter: usize,
    connection_counter: usize,
    label_counter: usize,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model that keeps at most `capacity` undrained events
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            events: EventLog::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn next_id(counter: &mut usize, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            *counter += 1;
            let id = format!("{}-{}", prefix, counter);
            if !taken(&id) {
                return id;
            }
        }
    }

    pub(crate) fn record(&mut self, event: MutationEvent) {
        trace!(event = event.kind(), "Mutation recorded");
        self.events.push(event);
    }

    /// Drain the recorded mutation events
    pub fn take_events(&mut self) -> Vec<MutationEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &EventLog {
        &self.events
    }

    // ---- nodes ----

    /// Create a node and return its id
    pub fn add_node(&mut self, new_node: NewNode) -> String {
        let nodes = &self.nodes;
        let id = Self::next_id(&mut self.node_counter, "node", |id| nodes.contains_key(id));
        let technology_id = if new_node.technology_id.trim().is_empty() {
            DEFAULT_TECHNOLOGY_ID.to_string()
        } else {
            new_node.technology_id
        };
        let position = if new_node.position.is_finite() {
            new_node.position
        } else {
            warn!(node_id = %id, "Non-finite position on create; placing at origin");
            Position::default()
        };

        let mut node = Node::new(id.clone(), technology_id, position, new_node.title);
        node.node_type = new_node.node_type;
        debug!(node_id = %id, technology = %node.technology_id, "Node created");
        self.nodes.insert(id.clone(), node);
        self.node_order.push(id.clone());
        self.record(MutationEvent::NodeCreated { id: id.clone() });
        id
    }

    /// Insert a fully formed node, keeping its id
    pub fn insert_node(&mut self, node: Node) -> Result<(), EditorError> {
        if self.nodes.contains_key(&node.id) {
            return Err(EditorError::import_error(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.node_order.push(id.clone());
        self.record(MutationEvent::NodeCreated { id });
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move one node; non-finite targets are ignored
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), EditorError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| EditorError::unknown_node(id))?;
        if !position.is_finite() {
            warn!(node_id = %id, "Ignoring non-finite move");
            return Ok(());
        }
        if node.position != position {
            node.position = position;
            self.record(MutationEvent::NodeMoved {
                id: id.to_string(),
                position,
            });
        }
        Ok(())
    }

    /// Move several nodes; unknown ids are skipped
    pub fn move_nodes(&mut self, moves: &[(String, Position)]) -> usize {
        moves
            .iter()
            .filter(|(id, position)| self.move_node(id, *position).is_ok())
            .count()
    }

    /// Merge a partial update into a node.
    ///
    /// Identity and placement are protected: the id never changes, a blank
    /// technology id is ignored and a non-finite position is ignored. Free
    /// text fields accept empty strings.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Result<(), EditorError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| EditorError::unknown_node(id))?;

        if let Some(requested) = update.id.as_deref() {
            if requested != id {
                warn!(node_id = %id, requested = %requested, "Ignoring attempt to change node id");
            }
        }
        match update.technology_id {
            Some(technology) if !technology.trim().is_empty() => node.technology_id = technology,
            Some(_) => warn!(node_id = %id, "Ignoring blank technology id"),
            None => {}
        }
        match update.position {
            Some(position) if position.is_finite() => node.position = position,
            Some(_) => warn!(node_id = %id, "Ignoring non-finite position"),
            None => {}
        }

        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(node_type) = update.node_type {
            node.node_type = Some(node_type);
        }
        let system = &mut node.system;
        system.cpu = update.cpu.or(system.cpu);
        system.memory = update.memory.or(system.memory);
        system.storage = update.storage.or(system.storage);
        system.port = update.port.or(system.port);
        if update.ip.is_some() {
            system.ip = update.ip;
        }
        if update.hostname.is_some() {
            system.hostname = update.hostname;
        }
        node.status = update.status.or(node.status);
        node.cpu_usage = update.cpu_usage.or(node.cpu_usage);
        node.memory_usage = update.memory_usage.or(node.memory_usage);

        let placement = &mut node.placement;
        placement.environment = update.environment.or(placement.environment);
        for (slot, value) in [
            (&mut placement.region, update.region),
            (&mut placement.zone, update.zone),
            (&mut placement.cluster, update.cluster),
            (&mut placement.namespace, update.namespace),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        if update.description.is_some() {
            node.description = update.description;
        }

        self.record(MutationEvent::NodeUpdated { id: id.to_string() });
        Ok(())
    }

    /// Delete a node and every connection touching it.
    ///
    /// Returns the ids of the removed connections.
    pub fn delete_node(&mut self, id: &str) -> Result<Vec<String>, EditorError> {
        if self.nodes.remove(id).is_none() {
            return Err(EditorError::unknown_node(id));
        }
        self.node_order.retain(|n| n != id);

        let (removed, kept): (Vec<Connection>, Vec<Connection>) =
            std::mem::take(&mut self.connections)
                .into_iter()
                .partition(|c| c.touches(id));
        self.connections = kept;

        let removed_ids: Vec<String> = removed.into_iter().map(|c| c.id).collect();
        for connection_id in &removed_ids {
            self.selection.forget_connection(connection_id);
            self.record(MutationEvent::ConnectionDeleted {
                id: connection_id.clone(),
            });
        }
        if self.selection.forget_node(id) {
            self.record(MutationEvent::SelectionChanged);
        }
        debug!(node_id = %id, cascaded = removed_ids.len(), "Node deleted");
        self.record(MutationEvent::NodeDeleted { id: id.to_string() });
        Ok(removed_ids)
    }

    // ---- connections ----

    /// Remove connections whose endpoints no longer exist
    pub fn prune_orphans(&mut self) -> usize {
        let nodes = &self.nodes;
        let (orphans, kept): (Vec<Connection>, Vec<Connection>) =
            std::mem::take(&mut self.connections)
                .into_iter()
                .partition(|c| !nodes.contains_key(&c.from_node_id) || !nodes.contains_key(&c.to_node_id));
        self.connections = kept;
        for orphan in &orphans {
            debug!(connection_id = %orphan.id, "Pruned orphaned connection");
            self.selection.forget_connection(&orphan.id);
            self.record(MutationEvent::ConnectionDeleted {
                id: orphan.id.clone(),
            });
        }
        orphans.len()
    }

    /// Connect two existing, distinct nodes and return the connection id
    pub fn add_connection(&mut self, from: &str, to: &str) -> Result<String, EditorError> {
        self.prune_orphans();
        for endpoint in [from, to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(EditorError::unknown_node(endpoint));
            }
        }
        if from == to {
            return Err(EditorError::invalid_connection(format!(
                "cannot connect node '{}' to itself",
                from
            )));
        }

        let connections = &self.connections;
        let id = Self::next_id(&mut self.connection_counter, "connection", |id| {
            connections.iter().any(|c| c.id == id)
        });
        self.connections.push(Connection::new(id.clone(), from, to));
        debug!(connection_id = %id, from = %from, to = %to, "Connection created");
        self.record(MutationEvent::ConnectionCreated {
            id: id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Connections whose endpoints both exist
    pub fn renderable_connections(&self) -> impl Iterator<Item = (&Connection, &Node, &Node)> {
        self.connections.iter().filter_map(|c| {
            let from = self.nodes.get(&c.from_node_id)?;
            let to = self.nodes.get(&c.to_node_id)?;
            Some((c, from, to))
        })
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn connection_mut(&mut self, id: &str) -> Result<&mut Connection, EditorError> {
        self.connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EditorError::UnknownConnection { id: id.to_string() })
    }

    /// Change any of arrow type, path style and animation; returns the new type
    pub fn update_connection_style(
        &mut self,
        id: &str,
        update: ConnectionStyleUpdate,
    ) -> Result<ConnectionType, EditorError> {
        self.prune_orphans();
        let connection = self.connection_mut(id)?;
        if let Some(arrow_type) = update.arrow_type {
            connection.arrow_type = arrow_type;
        }
        if let Some(path_style) = update.path_style {
            connection.path_style = path_style;
        }
        if let Some(animated) = update.animated {
            connection.animated = animated;
        }
        let connection_type = connection.connection_type();
        self.record(MutationEvent::ConnectionUpdated {
            id: id.to_string(),
            connection_type,
        });
        Ok(connection_type)
    }

    /// Attach a user-authored path; the connection becomes a plain custom arrow
    pub fn set_custom_style(&mut self, id: &str, style: CustomStyle) -> Result<ConnectionType, EditorError> {
        self.prune_orphans();
        let connection = self.connection_mut(id)?;
        connection.custom_style = Some(style);
        connection.arrow_type = ArrowType::Default;
        connection.path_style = PathStyle::Custom;
        connection.animated = false;
        let connection_type = connection.connection_type();
        self.record(MutationEvent::ConnectionUpdated {
            id: id.to_string(),
            connection_type,
        });
        Ok(connection_type)
    }

    pub fn delete_connection(&mut self, id: &str) -> Result<(), EditorError> {
        self.prune_orphans();
        let index = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EditorError::UnknownConnection { id: id.to_string() })?;
        self.connections.remove(index);
        if self.selection.forget_connection(id) {
            self.record(MutationEvent::SelectionChanged);
        }
        self.record(MutationEvent::ConnectionDeleted { id: id.to_string() });
        Ok(())
    }

    // ---- text labels ----

    pub fn add_text_label(&mut self, text: impl Into<String>, position: Position) -> String {
        let labels = &self.text_labels;
        let id = Self::next_id(&mut self.label_counter, "text", |id| {
            labels.iter().any(|l| l.id == id)
        });
        self.text_labels.push(TextLabel {
            id: id.clone(),
            text: text.into(),
            position,
        });
        self.record(MutationEvent::TextLabelCreated { id: id.clone() });
        id
    }

    pub fn text_label(&self, id: &str) -> Option<&TextLabel> {
        self.text_labels.iter().find(|l| l.id == id)
    }

    pub fn text_labels(&self) -> impl Iterator<Item = &TextLabel> {
        self.text_labels.iter()
    }

    /// Change a label's text and/or position
    pub fn update_text_label(
        &mut self,
        id: &str,
        text: Option<String>,
        position: Option<Position>,
    ) -> Result<(), EditorError> {
        let label = self
            .text_labels
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| EditorError::UnknownTextLabel { id: id.to_string() })?;
        if let Some(text) = text {
            label.text = text;
        }
        if let Some(position) = position.filter(|p| p.is_finite()) {
            label.position = position;
        }
        self.record(MutationEvent::TextLabelUpdated { id: id.to_string() });
        Ok(())
    }

    pub fn delete_text_label(&mut self, id: &str) -> Result<(), EditorError> {
        let index = self
            .text_labels
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EditorError::UnknownTextLabel { id: id.to_string() })?;
        self.text_labels.remove(index);
        if self.selection.forget_text_label(id) {
            self.record(MutationEvent::SelectionChanged);
        }
        self.record(MutationEvent::TextLabelDeleted { id: id.to_string() });
        Ok(())
    }

    // ---- selection ----

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection, dropping ids that do not exist
    pub fn set_selection(&mut self, selection: Selection) {
        let selection = match selection {
            Selection::Node { id } if !self.nodes.contains_key(&id) => Selection::None,
            Selection::TextLabel { id } if self.text_label(&id).is_none() => Selection::None,
            Selection::Multi { nodes, connections } => Selection::multi(
                nodes.into_iter().filter(|id| self.nodes.contains_key(id)),
                connections
                    .into_iter()
                    .filter(|id| self.connection(id).is_some()),
            ),
            other => other,
        };
        if selection != self.selection {
            self.selection = selection;
            self.record(MutationEvent::SelectionChanged);
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::None);
    }

    /// Ctrl-click behaviour: add or remove one node from the group
    pub fn toggle_node_selection(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            return;
        }
        let mut selection = self.selection.clone();
        selection.toggle_node(id);
        self.set_selection(selection);
    }

    /// Select every node and connection
    pub fn select_all(&mut self) {
        let nodes: Vec<String> = self.node_order.clone();
        let connections: Vec<String> = self.connections.iter().map(|c| c.id.clone()).collect();
        self.set_selection(Selection::multi(nodes, connections));
    }

    /// Box selection: nodes whose rectangle overlaps `rect`, plus connections
    /// whose endpoints were both picked up. Replaces the current selection
    /// and returns the number of nodes.
    pub fn select_in_rect(&mut self, rect: Rect) -> usize {
        let nodes: Vec<String> = self
            .nodes()
            .filter(|n| n.rect().overlaps(&rect))
            .map(|n| n.id.clone())
            .collect();
        let picked: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        let connections: Vec<String> = self
            .connections
            .iter()
            .filter(|c| picked.contains(c.from_node_id.as_str()) && picked.contains(c.to_node_id.as_str()))
            .map(|c| c.id.clone())
            .collect();
        let count = nodes.len();
        self.set_selection(Selection::multi(nodes, connections));
        count
    }

    /// Delete whatever is selected; returns the number of removed items
    pub fn delete_selection(&mut self) -> usize {
        match self.selection.clone() {
            Selection::None => 0,
            Selection::Node { id } => self.delete_node(&id).map(|_| 1).unwrap_or(0),
            Selection::TextLabel { id } => self.delete_text_label(&id).map(|_| 1).unwrap_or(0),
            Selection::Multi { nodes, connections } => {
                let mut removed = 0;
                for id in &connections {
                    if self.connection(id).is_some() && self.delete_connection(id).is_ok() {
                        removed += 1;
                    }
                }
                for id in &nodes {
                    if let Ok(cascaded) = self.delete_node(id) {
                        removed += 1 + cascaded.len();
                    }
                }
                self.clear_selection();
                removed
            }
        }
    }

    // ---- queries ----

    /// Topmost element under `point`; nodes win over labels
    pub fn hit_test(&self, point: Position) -> HitTarget {
        if let Some(node) = self
            .node_order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id))
            .find(|n| n.rect().contains(point))
        {
            return HitTarget::Node {
                id: node.id.clone(),
                origin: node.position,
            };
        }
        if let Some(label) = self.text_labels.iter().rev().find(|l| l.rect().contains(point)) {
            return HitTarget::TextLabel {
                id: label.id.clone(),
                origin: label.position,
            };
        }
        HitTarget::Background
    }

    /// Remove everything, including the selection
    pub fn clear(&mut self) {
        let node_ids: Vec<String> = self.node_order.clone();
        for id in node_ids {
            if let Err(err) = self.delete_node(&id) {
                debug!(node_id = %id, error = %err, "Node vanished while clearing");
            }
        }
        let label_ids: Vec<String> = self.text_labels.iter().map(|l| l.id.clone()).collect();
        for id in label_ids {
            if let Err(err) = self.delete_text_label(&id) {
                debug!(label_id = %id, error = %err, "Label vanished while clearing");
            }
        }
        self.connections.clear();
        self.selection = Selection::None;
    }
}

impl CanvasContent for DiagramModel {
    fn node_positions(&self) -> Vec<(String, Position)> {
        self.nodes().map(|n| (n.id.clone(), n.position)).collect()
    }

    fn connection_endpoints(&self) -> Vec<(Position, Position)> {
        self.renderable_connections()
            .map(|(_, from, to)| (from.position, to.position))
            .collect()
    }

    fn set_node_position(&mut self, id: &str, position: Position) {
        if let Err(err) = self.move_node(id, position) {
            trace!(error = %err, "Bounds manager moved a missing node");
        }
    }

    fn shift_all(&mut self, dx: f64, dy: f64) {
        for node in self.nodes.values_mut() {
            node.position = node.position.offset(dx, dy);
        }
        for label in &mut self.text_labels {
            label.position = label.position.offset(dx, dy);
        }
        self.record(MutationEvent::ContentShifted { dx, dy });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(n: usize) -> (DiagramModel, Vec<String>) {
        let mut model = DiagramModel::new();
        let ids = (0..n)
            .map(|i| {
                model.add_node(NewNode::new(
                    "postgres",
                    Position::new(i as f64 * 200.0, 100.0),
                    format!("Node {}", i),
                ))
            })
            .collect();
        (model, ids)
    }

    #[test]
    fn test_add_node_assigns_unique_ids() {
        let (model, ids) = model_with(3);
        assert_eq!(model.node_count(), 3);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_blank_technology_falls_back_to_default() {
        let mut model = DiagramModel::new();
        let id = model.add_node(NewNode::new("  ", Position::new(0.0, 0.0), "x"));
        assert_eq!(model.node(&id).unwrap().technology_id, "default");
    }

    #[test]
    fn test_update_protects_identity_fields() {
        let (mut model, ids) = model_with(1);
        let update = NodeUpdate {
            id: Some("other".to_string()),
            technology_id: Some(String::new()),
            position: Some(Position::new(f64::NAN, 0.0)),
            title: Some(String::new()),
            hostname: Some(String::new()),
            ..NodeUpdate::default()
        };
        model.update_node(&ids[0], update).unwrap();
        let node = model.node(&ids[0]).unwrap();
        assert_eq!(node.id, ids[0]);
        assert_eq!(node.technology_id, "postgres");
        assert_eq!(node.position, Position::new(0.0, 100.0));
        assert_eq!(node.title, "");
        assert_eq!(node.system.hostname.as_deref(), Some(""));
    }

    #[test]
    fn test_update_from_json_with_nulls() {
        let (mut model, ids) = model_with(1);
        let update: NodeUpdate =
            serde_json::from_str(r#"{"technologyId": null, "position": null, "cpu": 4, "region": "eu-west-1"}"#)
                .unwrap();
        model.update_node(&ids[0], update).unwrap();
        let node = model.node(&ids[0]).unwrap();
        assert_eq!(node.technology_id, "postgres");
        assert_eq!(node.system.cpu, Some(4));
        assert_eq!(node.placement.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_connection_rules() {
        let (mut model, ids) = model_with(2);
        assert!(model.add_connection(&ids[0], &ids[0]).is_err());
        assert!(model.add_connection(&ids[0], "ghost").is_err());
        let id = model.add_connection(&ids[0], &ids[1]).unwrap();
        assert_eq!(model.connection(&id).unwrap().connection_type(), ConnectionType::Default);
    }

    #[test]
    fn test_style_update_is_partial() {
        let (mut model, ids) = model_with(2);
        let id = model.add_connection(&ids[0], &ids[1]).unwrap();
        let ty = model
            .update_connection_style(
                &id,
                ConnectionStyleUpdate {
                    arrow_type: Some(ArrowType::Split),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(ty, ConnectionType::Split);
        let ty = model
            .update_connection_style(
                &id,
                ConnectionStyleUpdate {
                    animated: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(ty, ConnectionType::Animated);
        assert_eq!(model.connection(&id).unwrap().arrow_type, ArrowType::Split);
    }

    #[test]
    fn test_custom_style_resets_arrow_and_animation() {
        let (mut model, ids) = model_with(2);
        let id = model.add_connection(&ids[0], &ids[1]).unwrap();
        model
            .update_connection_style(
                &id,
                ConnectionStyleUpdate {
                    arrow_type: Some(ArrowType::Dotted),
                    animated: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let ty = model.set_custom_style(&id, CustomStyle::default()).unwrap();
        assert_eq!(ty, ConnectionType::Custom);
        let connection = model.connection(&id).unwrap();
        assert!(!connection.animated);
        assert_eq!(connection.arrow_type, ArrowType::Default);
    }

    #[test]
    fn test_hit_test_prefers_topmost_node() {
        let mut model = DiagramModel::new();
        let _below = model.add_node(NewNode::new("redis", Position::new(0.0, 0.0), "below"));
        let above = model.add_node(NewNode::new("redis", Position::new(50.0, 50.0), "above"));
        match model.hit_test(Position::new(100.0, 80.0)) {
            HitTarget::Node { id, .. } => assert_eq!(id, above),
            other => panic!("expected node, got {:?}", other),
        }
        assert_eq!(model.hit_test(Position::new(900.0, 900.0)), HitTarget::Background);
    }

    #[test]
    fn test_hit_test_finds_label() {
        let mut model = DiagramModel::new();
        let label = model.add_text_label("New Text", Position::new(300.0, 200.0));
        assert_eq!(
            model.hit_test(Position::new(305.0, 210.0)),
            HitTarget::TextLabel {
                id: label,
                origin: Position::new(300.0, 200.0)
            }
        );
    }

    #[test]
    fn test_delete_selection_multi() {
        let (mut model, ids) = model_with(3);
        let c = model.add_connection(&ids[1], &ids[2]).unwrap();
        model.set_selection(Selection::multi(vec![ids[0].clone(), ids[1].clone()], vec![c]));
        let removed = model.delete_selection();
        assert_eq!(removed, 3);
        assert_eq!(model.node_count(), 1);
        assert_eq!(model.connection_count(), 0);
        assert!(model.selection().is_empty());
    }

    #[test]
    fn test_set_selection_drops_unknown_ids() {
        let (mut model, ids) = model_with(1);
        model.set_selection(Selection::multi(vec![ids[0].clone(), "ghost".into()], Vec::new()));
        assert_eq!(model.selection().node_ids(), vec![ids[0].clone()]);
        model.set_selection(Selection::node("ghost"));
        assert!(model.selection().is_empty());
    }

    #[test]
    fn test_events_are_recorded_and_drained() {
        let (mut model, ids) = model_with(2);
        model.add_connection(&ids[0], &ids[1]).unwrap();
        let events = model.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], MutationEvent::ConnectionCreated { .. }));
        assert!(model.take_events().is_empty());
    }

    #[test]
    fn test_shift_moves_labels_too() {
        let (mut model, ids) = model_with(1);
        let label = model.add_text_label("note", Position::new(10.0, 10.0));
        model.shift_all(100.0, 0.0);
        assert_eq!(model.node(&ids[0]).unwrap().position, Position::new(100.0, 100.0));
        assert_eq!(model.text_label(&label).unwrap().position, Position::new(110.0, 10.0));
    }

    #[test]
    fn test_clear_removes_everything_and_records_deletions() {
        let (mut model, ids) = model_with(2);
        model.add_connection(&ids[0], &ids[1]).unwrap();
        let label = model.add_text_label("note", Position::new(10.0, 10.0));
        model.select_all();
        model.take_events();

        model.clear();

        assert_eq!(model.node_count(), 0);
        assert_eq!(model.connection_count(), 0);
        assert_eq!(model.text_labels().count(), 0);
        assert!(model.selection().is_empty());
        let events = model.take_events();
        assert!(events.contains(&MutationEvent::NodeDeleted { id: ids[1].clone() }));
        assert!(events.contains(&MutationEvent::TextLabelDeleted { id: label }));
    }
}
