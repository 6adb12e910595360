//! ArchCanvas - interactive infrastructure diagram editing core
//!
//! Node and connection geometry, a self-adjusting canvas, the pointer and
//! keyboard interaction state machine, automatic layouts and import of JSON
//! records or raw service logs.
//!
//! # Quick Start
//!
//! ```rust
//! use archcanvas::prelude::*;
//!
//! let mut editor = Editor::new();
//! let summary = editor
//!     .import_text(
//!         r#"{"nodes":[{"name":"web"},{"name":"db","technology":"postgresql"}],
//!             "connections":[{"from":"web","to":"db"}]}"#,
//!         None,
//!         Some(LayoutKind::Grid),
//!     )
//!     .unwrap();
//! assert_eq!(summary.node_ids.len(), 2);
//!
//! let routes = editor.routes();
//! assert_eq!(routes.len(), 1);
//! assert!(routes[0].path.starts_with('M'));
//! ```
//!
//! # Driving the editor
//!
//! Input is fed as pointer and key events; the editor hit-tests, reduces the
//! event through the interaction state machine and applies the resulting
//! effects to the model and canvas bounds:
//!
//! ```rust
//! use archcanvas::prelude::*;
//!
//! let mut editor = Editor::new();
//! let id = editor.drop_technology("redis", Position::new(200.0, 200.0));
//!
//! editor.pointer_down(Position::new(210.0, 210.0), false);
//! editor.pointer_move(Position::new(310.0, 210.0));
//! editor.pointer_up(Position::new(310.0, 210.0));
//!
//! assert_eq!(editor.model().node(&id).unwrap().position, Position::new(300.0, 200.0));
//! ```

pub mod core;
pub mod editor;
pub mod import;
pub mod layout;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        derive_connection_type, ArrowType, CanvasBounds, ConnectionType, CustomStyle, Database,
        EditorConfig, EditorError, LayoutAlgorithm, PathStyle, Position, Rect, Size,
        TechnologyCatalog,
    };
    pub use crate::editor::{
        Connection, DiagramModel, Editor, EditorSnapshot, Focus, InputEvent, InteractionMode, Key,
        MutationEvent, NewNode, Node, RoutedConnection, Selection,
    };
    pub use crate::import::{Detector, ImportNormalizer, ImportRecord, InputFormat};
    pub use crate::layout::{LayoutGraph, LayoutKind};
}

/// Import a payload into a fresh editor and return its snapshot as JSON
///
/// # Example
/// ```rust
/// let json = archcanvas::import_to_json(r#"{"nodes":[{"name":"api"}]}"#, None).unwrap();
/// assert!(json.contains("\"title\":\"api\""));
/// ```
pub fn import_to_json(input: &str, layout: Option<layout::LayoutKind>) -> anyhow::Result<String> {
    let mut editor = editor::Editor::new();
    editor.import_text(input, None, layout)?;
    Ok(serde_json::to_string(&editor.snapshot())?)
}
