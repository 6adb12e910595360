//! Canvas bounds manager
//!
//! Tracks the logical canvas size. The canvas grows while a node is dragged
//! towards an edge and shrinks back towards the floor once the drag ends.
//! Growth on the left or top is applied as prepended space: every node is
//! shifted by the same amount so nothing visibly jumps.
//!
//! This is the only place that shifts the canvas origin.

use serde::{Deserialize, Serialize};
use tracing::{debug, span, trace, Level};

use super::geometry::anchors_between;
use super::{EditorConfig, Position, Rect, Size, NODE_HEIGHT, NODE_WIDTH};

/// Node and connection positions the bounds manager reads and rewrites
pub trait CanvasContent {
    /// Top-left positions of every node
    fn node_positions(&self) -> Vec<(String, Position)>;

    /// Endpoint node positions of every renderable connection
    fn connection_endpoints(&self) -> Vec<(Position, Position)>;

    /// Place one node
    fn set_node_position(&mut self, id: &str, position: Position);

    /// Translate every positioned element by `(dx, dy)`
    fn shift_all(&mut self, dx: f64, dy: f64);
}

/// Result of one drag frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameOutcome {
    /// Where the dragged node ended up
    pub position: Position,
    /// Origin shift applied to all content (non-zero after left/top growth)
    pub shift: Position,
    /// Whether the canvas size changed
    pub resized: bool,
}

/// Result of an auto-shrink pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShrinkOutcome {
    pub shift: Position,
    pub resized: bool,
}

/// Growable and shrinkable logical canvas
#[derive(Debug, Clone)]
pub struct CanvasBounds {
    size: Size,
    config: EditorConfig,
}

impl CanvasBounds {
    /// Canvas at the configured floor size
    pub fn new(config: EditorConfig) -> Self {
        Self {
            size: config.floor,
            config,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Handle one pointer-move frame of a node drag.
    ///
    /// `companions` are the other multi-selected nodes; they follow the
    /// dragged node by the same delta.
    pub fn on_node_drag_frame<C: CanvasContent>(
        &mut self,
        content: &mut C,
        node_id: &str,
        proposed: Position,
        companions: &[String],
    ) -> FrameOutcome {
        let threshold = self.config.edge_threshold;
        let margin = self.config.expansion_margin;
        let before = self.size;
        let positions = content.node_positions();
        let Some(current) = lookup(&positions, node_id) else {
            trace!(node_id = %node_id, "Drag frame for unknown node ignored");
            return FrameOutcome::default();
        };

        let offset_x = if proposed.x < threshold {
            threshold - proposed.x + margin
        } else {
            0.0
        };
        let offset_y = if proposed.y < threshold {
            threshold - proposed.y + margin
        } else {
            0.0
        };

        let right = proposed.x + NODE_WIDTH;
        if right > before.width - threshold {
            self.size.width += right - (before.width - threshold) + margin;
        }
        let bottom = proposed.y + NODE_HEIGHT;
        if bottom > before.height - threshold {
            self.size.height += bottom - (before.height - threshold) + margin;
        }
        self.size.width += offset_x;
        self.size.height += offset_y;

        let clamped = Position::new(proposed.x.max(threshold), proposed.y.max(threshold));
        let delta = clamped - current;

        if offset_x != 0.0 || offset_y != 0.0 {
            debug!(offset_x, offset_y, "Canvas grew on left/top; shifting content");
            content.shift_all(offset_x, offset_y);
        }

        let final_position = clamped.offset(offset_x, offset_y);
        content.set_node_position(node_id, final_position);

        for companion in companions.iter().filter(|id| id.as_str() != node_id) {
            if let Some(start) = lookup(&positions, companion) {
                let moved = start + delta;
                let placed = Position::new(moved.x.max(threshold), moved.y.max(threshold));
                content.set_node_position(companion, placed.offset(offset_x, offset_y));
            }
        }

        let resized = self.size != before;
        if resized {
            debug!(
                width = self.size.width,
                height = self.size.height,
                "Canvas expanded during drag"
            );
        }

        FrameOutcome {
            position: final_position,
            shift: Position::new(offset_x, offset_y),
            resized,
        }
    }

    /// Shrink the canvas towards the floor after a drag or batch edit.
    ///
    /// Content at negative coordinates is first moved back into view. The
    /// canvas is never left smaller than the floor or than the content plus
    /// padding.
    pub fn perform_auto_shrink<C: CanvasContent>(&mut self, content: &mut C) -> ShrinkOutcome {
        let shrink_span = span!(Level::DEBUG, "auto_shrink", width = self.size.width, height = self.size.height);
        let _enter = shrink_span.enter();

        let before = self.size;
        let floor = self.config.floor;
        let Some(mut bounds) = self.content_bounds(content) else {
            self.size = floor;
            return ShrinkOutcome {
                shift: Position::default(),
                resized: self.size != before,
            };
        };

        let shift = Position::new(
            if bounds.x < 0.0 { -bounds.x + self.config.edge_threshold } else { 0.0 },
            if bounds.y < 0.0 { -bounds.y + self.config.edge_threshold } else { 0.0 },
        );
        if shift != Position::default() {
            debug!(dx = shift.x, dy = shift.y, "Moving negative content back into view");
            content.shift_all(shift.x, shift.y);
            bounds.x += shift.x;
            bounds.y += shift.y;
        }

        let padding = self.config.shrink_padding;
        let required = Size::new(bounds.right() + padding, bounds.bottom() + padding);

        if required.width <= floor.width && required.height <= floor.height {
            self.size = floor;
        } else {
            self.size.width = settle(self.size.width, required.width, floor.width, self.config.shrink_threshold);
            self.size.height = settle(self.size.height, required.height, floor.height, self.config.shrink_threshold);
        }

        let resized = self.size != before;
        if resized {
            debug!(width = self.size.width, height = self.size.height, "Canvas resized after drag");
        }
        ShrinkOutcome { shift, resized }
    }

    /// Tight box around every node and every padded connection span
    pub fn content_bounds<C: CanvasContent>(&self, content: &C) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for (_, position) in content.node_positions() {
            let rect = Rect::node_at(position);
            bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
        }
        for (from, to) in content.connection_endpoints() {
            if let Some(anchors) = anchors_between(from, to) {
                let rect = anchors.span().inflate(self.config.connection_padding);
                bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
            }
        }
        bounds
    }

    /// Restore the floor size
    pub fn reset(&mut self) {
        self.size = self.config.floor;
    }
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn lookup(positions: &[(String, Position)], id: &str) -> Option<Position> {
    positions.iter().find(|(n, _)| n == id).map(|(_, p)| *p)
}

/// New extent for one dimension: grow to fit, or trim slack beyond the threshold
fn settle(current: f64, required: f64, floor: f64, threshold: f64) -> f64 {
    if current < required {
        required.max(floor)
    } else if current - required > threshold {
        required.max(floor)
    } else {
        current
    }
}
