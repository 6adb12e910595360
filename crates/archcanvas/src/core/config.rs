//! Editor configuration
//!
//! Tunable constants for canvas growth, shrinking and pointer handling.

use serde::{Deserialize, Serialize};

use super::{Position, Size};

/// Pending mutation events kept when nobody drains them
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Tunable constants shared by the canvas bounds manager and the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Smallest canvas the bounds manager will ever shrink to
    pub floor: Size,
    /// Distance from a canvas edge at which dragging triggers growth
    pub edge_threshold: f64,
    /// Extra space added beyond the overshoot when the canvas grows
    pub expansion_margin: f64,
    /// Padding kept around content when shrinking
    pub shrink_padding: f64,
    /// Unused slack required before a dimension is shrunk
    pub shrink_threshold: f64,
    /// Padding around each connection span in the content bounding box
    pub connection_padding: f64,
    /// Box selections smaller than this in either axis are ignored
    pub min_selection_extent: f64,
    /// Text of a freshly added label
    pub default_label_text: String,
    /// Where freshly added labels are placed
    pub default_label_position: Position,
    /// Undrained mutation events kept before the oldest are dropped
    pub event_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            floor: Size::new(2000.0, 1500.0),
            edge_threshold: 50.0,
            expansion_margin: 300.0,
            shrink_padding: 300.0,
            shrink_threshold: 200.0,
            connection_padding: 50.0,
            min_selection_extent: 5.0,
            default_label_text: "New Text".to_string(),
            default_label_position: Position::new(300.0, 200.0),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the canvas floor
    pub fn with_floor(mut self, width: f64, height: f64) -> Self {
        self.floor = Size::new(width, height);
        self
    }
}
