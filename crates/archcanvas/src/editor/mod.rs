//! Interactive editor
//!
//! [`Editor`] owns the diagram model, the canvas bounds and the interaction
//! state. Input events are reduced to effects, and the effects are applied
//! one at a time so a drag frame and an auto-shrink never interleave.

mod events;
mod interaction;
mod model;
mod selection;

pub use events::*;
pub use interaction::*;
pub use model::*;
pub use selection::*;

use serde::Serialize;
use tracing::{debug, span, trace, Level};

use crate::core::{
    compute_anchors, compute_route, label_extent, Anchors, CanvasBounds, ConnectionType,
    CustomStyle, EditorConfig, EditorError, FrameOutcome, PathDescriptor, Position, Size,
    StrokeStyle, TechnologyCatalog,
};
use crate::import::{export_record, parse_input, ImportNormalizer, ImportRecord, ImportSummary, InputFormat};
use crate::layout::{LayoutGraph, LayoutKind};

/// What one input event did, for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorResponse {
    /// Viewport pan requested by a space-drag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_connection: Option<String>,
    pub deleted: usize,
    pub resized: bool,
}

/// A connection as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    #[serde(flatten)]
    pub connection: Connection,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
}

/// Full editor state for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub nodes: Vec<Node>,
    pub connections: Vec<ConnectionView>,
    pub text_labels: Vec<TextLabel>,
    pub selection: Selection,
    pub canvas: Size,
    pub interaction: InteractionState,
}

/// Geometry and stroke for one drawable connection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedConnection {
    pub id: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub anchors: Anchors,
    /// SVG path data
    pub path: String,
    #[serde(skip)]
    pub descriptor: PathDescriptor,
    pub stroke: StrokeStyle,
}

#[derive(Debug)]
pub struct Editor {
    model: DiagramModel,
    bounds: CanvasBounds,
    interaction: InteractionState,
    catalog: TechnologyCatalog,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            model: DiagramModel::with_event_capacity(config.event_capacity),
            bounds: CanvasBounds::new(config.clone()),
            interaction: InteractionState::new(),
            catalog: TechnologyCatalog::builtin(),
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: TechnologyCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    /// Direct model access for CRUD operations that bypass input handling
    pub fn model_mut(&mut self) -> &mut DiagramModel {
        &mut self.model
    }

    pub fn bounds(&self) -> &CanvasBounds {
        &self.bounds
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn catalog(&self) -> &TechnologyCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn take_events(&mut self) -> Vec<MutationEvent> {
        self.model.take_events()
    }

    // ---- input ----

    /// Pointer pressed at `at`; `toggle` is the ctrl/cmd modifier
    pub fn pointer_down(&mut self, at: Position, toggle: bool) -> EditorResponse {
        let target = self.model.hit_test(at);
        self.handle(InputEvent::PointerDown { at, target, toggle })
    }

    pub fn pointer_move(&mut self, at: Position) -> EditorResponse {
        self.handle(InputEvent::PointerMove { at })
    }

    pub fn pointer_up(&mut self, at: Position) -> EditorResponse {
        self.handle(InputEvent::PointerUp { at })
    }

    pub fn key_down(&mut self, key: Key, focus: Focus) -> EditorResponse {
        self.handle(InputEvent::KeyDown { key, focus })
    }

    pub fn key_up(&mut self, key: Key) -> EditorResponse {
        self.handle(InputEvent::KeyUp { key })
    }

    pub fn window_blur(&mut self) -> EditorResponse {
        self.handle(InputEvent::WindowBlur)
    }

    /// Reduce one event and apply its effects in order
    pub fn handle(&mut self, event: InputEvent) -> EditorResponse {
        let effects = self.interaction.apply(&event, self.model.selection());
        let mut response = EditorResponse::default();
        for effect in effects {
            self.apply_effect(effect, &mut response);
        }
        response
    }

    fn apply_effect(&mut self, effect: Effect, response: &mut EditorResponse) {
        trace!(?effect, "Applying effect");
        match effect {
            Effect::ClearSelection => self.model.clear_selection(),
            Effect::SelectNode { id } => self.model.set_selection(Selection::node(id)),
            Effect::ToggleNodeSelection { id } => self.model.toggle_node_selection(&id),
            Effect::SelectTextLabel { id } => self.model.set_selection(Selection::text_label(id)),
            Effect::DragNode {
                node_id,
                proposed,
                companions,
            } => {
                let outcome = self
                    .bounds
                    .on_node_drag_frame(&mut self.model, &node_id, proposed, &companions);
                if outcome.resized {
                    self.record_resize();
                    response.resized = true;
                }
                response.frame = Some(outcome);
            }
            Effect::MoveTextLabel { id, position } => {
                let position = self.clamp_label(&id, position);
                if let Err(err) = self.model.update_text_label(&id, None, Some(position)) {
                    debug!(error = %err, "Label drag on a missing label");
                }
            }
            Effect::FinishNodeDrag => {
                response.resized |= self.settle_bounds();
            }
            Effect::SelectInRect { rect } => {
                let min = self.config.min_selection_extent;
                if rect.width >= min && rect.height >= min {
                    let count = self.model.select_in_rect(rect);
                    debug!(count, "Box selection");
                }
            }
            Effect::CreateConnection { from, to } => match self.model.add_connection(&from, &to) {
                Ok(id) => response.created_connection = Some(id),
                Err(err) => debug!(error = %err, "Connection not created"),
            },
            Effect::DeleteSelection => response.deleted += self.model.delete_selection(),
            Effect::Pan { dx, dy } => {
                let total = response.pan.unwrap_or_default();
                response.pan = Some(total.offset(dx, dy));
            }
        }
    }

    /// Keep a dragged label inside the canvas
    fn clamp_label(&self, id: &str, position: Position) -> Position {
        let extent = self
            .model
            .text_label(id)
            .map(|l| label_extent(&l.text))
            .unwrap_or_default();
        let max_x = (self.bounds.width() - extent.width).max(0.0);
        let max_y = (self.bounds.height() - extent.height).max(0.0);
        Position::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
    }

    fn record_resize(&mut self) {
        let size = self.bounds.size();
        self.model.record(MutationEvent::CanvasResized {
            width: size.width,
            height: size.height,
        });
    }

    /// Run auto-shrink; returns whether the canvas size changed
    fn settle_bounds(&mut self) -> bool {
        let outcome = self.bounds.perform_auto_shrink(&mut self.model);
        if outcome.resized {
            self.record_resize();
        }
        outcome.resized
    }

    // ---- commands ----

    /// Create a node from a catalog entry dropped at `at`
    pub fn drop_technology(&mut self, technology_id: &str, at: Position) -> String {
        let technology = self.catalog.resolve(technology_id);
        let id = self
            .model
            .add_node(NewNode::new(technology.id.clone(), at, technology.name.clone()));
        self.settle_bounds();
        id
    }

    /// Enter connect mode from `from`; ignored for unknown nodes
    pub fn begin_connect(&mut self, from: &str) -> bool {
        if self.model.node(from).is_none() {
            return false;
        }
        self.handle(InputEvent::BeginConnect {
            from: from.to_string(),
        });
        matches!(self.interaction.mode, InteractionMode::Connecting { .. })
    }

    pub fn open_custom_arrow_editor(&mut self, connection_id: &str) -> bool {
        if self.model.connection(connection_id).is_none() {
            return false;
        }
        self.handle(InputEvent::OpenCustomArrowEditor {
            connection_id: connection_id.to_string(),
        });
        matches!(self.interaction.mode, InteractionMode::CustomArrowEditing { .. })
    }

    /// Save the editor's path and close it.
    ///
    /// Applies to every selected connection, or to the connection being
    /// edited when none is selected.
    pub fn apply_custom_arrow(&mut self, style: CustomStyle) -> Result<ConnectionType, EditorError> {
        let InteractionMode::CustomArrowEditing { connection_id } = &self.interaction.mode else {
            return Err(EditorError::invalid_connection(
                "custom arrow editor is not open".to_string(),
            ));
        };
        let mut targets = self.model.selection().connection_ids();
        if targets.is_empty() {
            targets.push(connection_id.clone());
        }
        let result = targets.iter().try_fold(ConnectionType::Custom, |_, id| {
            self.model.set_custom_style(id, style.clone())
        });
        self.handle(InputEvent::CloseCustomArrowEditor);
        result
    }

    pub fn cancel_custom_arrow(&mut self) {
        self.handle(InputEvent::CloseCustomArrowEditor);
    }

    /// Add a label; `None` uses the configured default text
    pub fn add_text_label(&mut self, text: Option<String>) -> String {
        let text = text.unwrap_or_else(|| self.config.default_label_text.clone());
        let id = self
            .model
            .add_text_label(text, self.config.default_label_position);
        self.model.set_selection(Selection::text_label(id.clone()));
        id
    }

    pub fn select_all(&mut self) {
        self.model.select_all();
    }

    pub fn delete_selection(&mut self) -> usize {
        self.model.delete_selection()
    }

    /// Apply a partial node update; a moved node may resize the canvas
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> Result<(), EditorError> {
        let moved = update.position.is_some();
        self.model.update_node(id, update)?;
        if moved {
            self.settle_bounds();
        }
        Ok(())
    }

    pub fn delete_node(&mut self, id: &str) -> Result<Vec<String>, EditorError> {
        self.model.delete_node(id)
    }

    pub fn update_connection_style(
        &mut self,
        id: &str,
        update: ConnectionStyleUpdate,
    ) -> Result<ConnectionType, EditorError> {
        self.model.update_connection_style(id, update)
    }

    pub fn delete_connection(&mut self, id: &str) -> Result<(), EditorError> {
        self.model.delete_connection(id)
    }

    pub fn update_text_label(&mut self, id: &str, update: TextLabelUpdate) -> Result<(), EditorError> {
        self.model.update_text_label(id, update.text, update.position)
    }

    pub fn delete_text_label(&mut self, id: &str) -> Result<(), EditorError> {
        self.model.delete_text_label(id)
    }

    /// Lay out every node, or only `subset`, then settle the canvas
    pub fn apply_layout(&mut self, kind: LayoutKind, subset: Option<&[String]>) -> Result<usize, EditorError> {
        let layout_span = span!(Level::INFO, "apply_layout", layout = %kind);
        let _enter = layout_span.enter();

        let graph = match subset {
            Some(ids) => LayoutGraph::from_model_subset(&self.model, ids),
            None => LayoutGraph::from_model(&self.model),
        };
        let result = kind
            .run(&graph)
            .map_err(|err| EditorError::layout_error(err.to_string()))?;
        let moved = self.model.move_nodes(&result.positions);
        self.settle_bounds();
        Ok(moved)
    }

    /// Apply a parsed import record, then settle the canvas
    pub fn import_record(
        &mut self,
        record: &ImportRecord,
        layout: Option<LayoutKind>,
    ) -> Result<ImportSummary, EditorError> {
        let summary = ImportNormalizer::new(&self.catalog).apply(&mut self.model, record, layout)?;
        self.settle_bounds();
        Ok(summary)
    }

    /// Parse and import raw text; the format is detected when `None`
    pub fn import_text(
        &mut self,
        input: &str,
        format: Option<InputFormat>,
        layout: Option<LayoutKind>,
    ) -> Result<ImportSummary, EditorError> {
        let record = parse_input(input, format, &self.catalog)?;
        self.import_record(&record, layout)
    }

    pub fn export(&self) -> ImportRecord {
        export_record(&self.model)
    }

    // ---- output ----

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            nodes: self.model.nodes().cloned().collect(),
            connections: self
                .model
                .connections()
                .map(|c| ConnectionView {
                    connection: c.clone(),
                    connection_type: c.connection_type(),
                })
                .collect(),
            text_labels: self.model.text_labels().cloned().collect(),
            selection: self.model.selection().clone(),
            canvas: self.bounds.size(),
            interaction: self.interaction.clone(),
        }
    }

    /// Route every connection whose endpoints exist and do not coincide
    pub fn routes(&self) -> Vec<RoutedConnection> {
        self.model
            .renderable_connections()
            .filter_map(|(connection, from, to)| {
                let Some(anchors) = compute_anchors(&from.rect(), &to.rect()) else {
                    trace!(connection_id = %connection.id, "Skipping degenerate connection");
                    return None;
                };
                let descriptor = compute_route(
                    anchors.from_point,
                    anchors.to_point,
                    connection.path_style,
                    connection.custom_style.as_ref(),
                );
                Some(RoutedConnection {
                    id: connection.id.clone(),
                    connection_type: connection.connection_type(),
                    anchors,
                    path: descriptor.to_string(),
                    descriptor,
                    stroke: connection.stroke(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_technology_uses_catalog_name() {
        let mut editor = Editor::new();
        let id = editor.drop_technology("redis", Position::new(200.0, 200.0));
        let node = editor.model().node(&id).unwrap();
        assert_eq!(node.title, "Redis");
        let fallback = editor.drop_technology("not-a-tech", Position::new(500.0, 200.0));
        assert_eq!(editor.model().node(&fallback).unwrap().technology_id, "default");
    }

    #[test]
    fn test_click_drag_release_moves_node() {
        let mut editor = Editor::new();
        let id = editor.drop_technology("redis", Position::new(200.0, 200.0));
        editor.pointer_down(Position::new(210.0, 210.0), false);
        assert!(editor.model().selection().contains_node(&id));
        editor.pointer_move(Position::new(410.0, 260.0));
        editor.pointer_up(Position::new(410.0, 260.0));
        assert_eq!(editor.model().node(&id).unwrap().position, Position::new(400.0, 250.0));
        assert!(editor.interaction().mode.is_idle());
    }

    #[test]
    fn test_connect_gesture() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(500.0, 100.0));
        assert!(editor.begin_connect(&a));
        let response = editor.pointer_down(Position::new(520.0, 120.0), false);
        let created = response.created_connection.unwrap();
        let connection = editor.model().connection(&created).unwrap();
        assert_eq!(connection.from_node_id, a);
        assert_eq!(connection.to_node_id, b);
    }

    #[test]
    fn test_custom_arrow_round() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(500.0, 100.0));
        let c = editor.model_mut().add_connection(&a, &b).unwrap();
        assert!(editor.apply_custom_arrow(CustomStyle::default()).is_err());
        assert!(editor.open_custom_arrow_editor(&c));
        let ty = editor.apply_custom_arrow(CustomStyle::default()).unwrap();
        assert_eq!(ty, ConnectionType::Custom);
        assert!(editor.interaction().mode.is_idle());
    }

    #[test]
    fn test_custom_arrow_applies_to_selected_connections() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(500.0, 100.0));
        let c = editor.drop_technology("redis", Position::new(500.0, 500.0));
        let first = editor.model_mut().add_connection(&a, &b).unwrap();
        let second = editor.model_mut().add_connection(&b, &c).unwrap();
        let untouched = editor.model_mut().add_connection(&a, &c).unwrap();
        editor
            .model_mut()
            .set_selection(Selection::multi(Vec::<String>::new(), [first.clone(), second.clone()]));

        assert!(editor.open_custom_arrow_editor(&first));
        editor.apply_custom_arrow(CustomStyle::default()).unwrap();

        let kind = |id: &str| editor.model().connection(id).unwrap().connection_type();
        assert_eq!(kind(&first), ConnectionType::Custom);
        assert_eq!(kind(&second), ConnectionType::Custom);
        assert_eq!(kind(&untouched), ConnectionType::Default);
    }

    #[test]
    fn test_json_updates_reach_the_model() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(500.0, 100.0));
        let c = editor.model_mut().add_connection(&a, &b).unwrap();
        let label = editor.add_text_label(None);

        let update: NodeUpdate = serde_json::from_str(r#"{"title":"Storefront","region":"eu-west-1"}"#).unwrap();
        editor.update_node(&a, update).unwrap();
        assert_eq!(editor.model().node(&a).unwrap().title, "Storefront");

        let style: ConnectionStyleUpdate =
            serde_json::from_str(r#"{"arrowType":"dotted"}"#).unwrap();
        assert_eq!(editor.update_connection_style(&c, style).unwrap(), ConnectionType::Dotted);

        let text: TextLabelUpdate = serde_json::from_str(r#"{"text":"edge tier"}"#).unwrap();
        editor.update_text_label(&label, text).unwrap();
        assert_eq!(editor.model().text_label(&label).unwrap().text, "edge tier");

        editor.delete_connection(&c).unwrap();
        editor.delete_text_label(&label).unwrap();
        assert_eq!(editor.model().connection_count(), 0);
        assert!(editor.model().text_label(&label).is_none());
        assert!(editor.update_node("node-99", NodeUpdate::new()).is_err());
    }

    #[test]
    fn test_routes_skip_coincident_nodes() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(100.0, 100.0));
        let c = editor.drop_technology("redis", Position::new(600.0, 100.0));
        editor.model_mut().add_connection(&a, &b).unwrap();
        let keep = editor.model_mut().add_connection(&a, &c).unwrap();
        let routes = editor.routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, keep);
        assert!(routes[0].path.starts_with('M'));
    }

    #[test]
    fn test_label_drag_is_clamped() {
        let mut editor = Editor::new();
        let id = editor.add_text_label(None);
        editor.pointer_down(Position::new(305.0, 205.0), false);
        editor.pointer_move(Position::new(-500.0, -500.0));
        editor.pointer_up(Position::new(-500.0, -500.0));
        assert_eq!(editor.model().text_label(&id).unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_snapshot_serializes_derived_type() {
        let mut editor = Editor::new();
        let a = editor.drop_technology("react", Position::new(100.0, 100.0));
        let b = editor.drop_technology("express", Position::new(500.0, 100.0));
        editor.model_mut().add_connection(&a, &b).unwrap();
        let json = serde_json::to_value(editor.snapshot()).unwrap();
        assert_eq!(json["connections"][0]["type"], "default");
        assert_eq!(json["connections"][0]["fromNodeId"], a.as_str());
        assert_eq!(json["canvas"]["width"], 2000.0);
    }
}
