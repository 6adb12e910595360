//! WebAssembly bindings for ArchCanvas
//!
//! Wraps an [`Editor`] in a handle the browser drives with pointer and key
//! events. State crosses the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::core::{CustomStyle, Position};
use crate::editor::{ConnectionStyleUpdate, Editor, Focus, Key, NodeUpdate, TextLabelUpdate};
use crate::import::InputFormat;
use crate::layout::LayoutKind;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

fn parse_key(key: &str) -> Key {
    match key {
        " " | "Space" => Key::Space,
        "Shift" => Key::Shift,
        "Escape" => Key::Escape,
        "Delete" => Key::Delete,
        "Backspace" => Key::Backspace,
        _ => Key::Other,
    }
}

fn parse_layout(layout: Option<String>) -> Result<Option<LayoutKind>, JsValue> {
    layout
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<LayoutKind>().map_err(js_error))
        .transpose()
}

/// Browser-side editor session
#[wasm_bindgen]
pub struct EditorHandle {
    editor: Editor,
}

#[wasm_bindgen]
impl EditorHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EditorHandle {
        EditorHandle {
            editor: Editor::new(),
        }
    }

    /// Every call below returns the `EditorResponse` as JSON
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, toggle: bool) -> Result<String, JsValue> {
        to_json(&self.editor.pointer_down(Position::new(x, y), toggle))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        to_json(&self.editor.pointer_move(Position::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        to_json(&self.editor.pointer_up(Position::new(x, y)))
    }

    /// `in_text_input` suppresses keyboard deletion
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, in_text_input: bool) -> Result<String, JsValue> {
        let focus = if in_text_input {
            Focus::TextInput
        } else {
            Focus::Canvas
        };
        to_json(&self.editor.key_down(parse_key(key), focus))
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, key: &str) -> Result<String, JsValue> {
        to_json(&self.editor.key_up(parse_key(key)))
    }

    #[wasm_bindgen(js_name = windowBlur)]
    pub fn window_blur(&mut self) -> Result<String, JsValue> {
        to_json(&self.editor.window_blur())
    }

    /// Returns the new node id
    #[wasm_bindgen(js_name = dropTechnology)]
    pub fn drop_technology(&mut self, technology_id: &str, x: f64, y: f64) -> String {
        self.editor.drop_technology(technology_id, Position::new(x, y))
    }

    #[wasm_bindgen(js_name = beginConnect)]
    pub fn begin_connect(&mut self, from: &str) -> bool {
        self.editor.begin_connect(from)
    }

    #[wasm_bindgen(js_name = openCustomArrowEditor)]
    pub fn open_custom_arrow_editor(&mut self, connection_id: &str) -> bool {
        self.editor.open_custom_arrow_editor(connection_id)
    }

    /// `style_json` is a serialized custom style
    #[wasm_bindgen(js_name = applyCustomArrow)]
    pub fn apply_custom_arrow(&mut self, style_json: &str) -> Result<String, JsValue> {
        let style: CustomStyle = serde_json::from_str(style_json).map_err(js_error)?;
        let connection_type = self.editor.apply_custom_arrow(style).map_err(js_error)?;
        Ok(connection_type.to_string())
    }

    #[wasm_bindgen(js_name = cancelCustomArrow)]
    pub fn cancel_custom_arrow(&mut self) {
        self.editor.cancel_custom_arrow();
    }

    #[wasm_bindgen(js_name = addTextLabel)]
    pub fn add_text_label(&mut self, text: Option<String>) -> String {
        self.editor.add_text_label(text)
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) {
        self.editor.select_all();
    }

    /// `update_json` is a partial node record; unknown or locked fields are ignored
    #[wasm_bindgen(js_name = updateNode)]
    pub fn update_node(&mut self, id: &str, update_json: &str) -> Result<(), JsValue> {
        let update: NodeUpdate = serde_json::from_str(update_json).map_err(js_error)?;
        self.editor.update_node(id, update).map_err(js_error)
    }

    /// Returns the ids of connections removed with the node as JSON
    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&mut self, id: &str) -> Result<String, JsValue> {
        let removed = self.editor.delete_node(id).map_err(js_error)?;
        to_json(&removed)
    }

    /// Returns the derived connection type
    #[wasm_bindgen(js_name = updateConnectionStyle)]
    pub fn update_connection_style(&mut self, id: &str, update_json: &str) -> Result<String, JsValue> {
        let update: ConnectionStyleUpdate = serde_json::from_str(update_json).map_err(js_error)?;
        let connection_type = self
            .editor
            .update_connection_style(id, update)
            .map_err(js_error)?;
        Ok(connection_type.to_string())
    }

    #[wasm_bindgen(js_name = deleteConnection)]
    pub fn delete_connection(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor.delete_connection(id).map_err(js_error)
    }

    /// Returns how many items were removed
    #[wasm_bindgen(js_name = deleteSelection)]
    pub fn delete_selection(&mut self) -> usize {
        self.editor.delete_selection()
    }

    #[wasm_bindgen(js_name = updateTextLabel)]
    pub fn update_text_label(&mut self, id: &str, update_json: &str) -> Result<(), JsValue> {
        let update: TextLabelUpdate = serde_json::from_str(update_json).map_err(js_error)?;
        self.editor.update_text_label(id, update).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteTextLabel)]
    pub fn delete_text_label(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor.delete_text_label(id).map_err(js_error)
    }

    /// Import JSON or log text; returns the import summary's node ids as JSON
    pub fn import(
        &mut self,
        input: &str,
        format: Option<String>,
        layout: Option<String>,
    ) -> Result<String, JsValue> {
        let format = format
            .filter(|f| !f.is_empty())
            .map(|f| f.parse::<InputFormat>().map_err(js_error))
            .transpose()?;
        let layout = parse_layout(layout)?;
        let summary = self
            .editor
            .import_text(input, format, layout)
            .map_err(js_error)?;
        to_json(&summary.node_ids)
    }

    /// Lay out all nodes; returns how many moved
    #[wasm_bindgen(js_name = applyLayout)]
    pub fn apply_layout(&mut self, layout: &str) -> Result<usize, JsValue> {
        let kind = layout.parse::<LayoutKind>().map_err(js_error)?;
        self.editor.apply_layout(kind, None).map_err(js_error)
    }

    pub fn export(&self) -> Result<String, JsValue> {
        self.editor.export().to_json().map_err(js_error)
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.editor.snapshot())
    }

    pub fn routes(&self) -> Result<String, JsValue> {
        to_json(&self.editor.routes())
    }

    /// Drain pending mutation events as JSON
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<String, JsValue> {
        to_json(&self.editor.take_events())
    }
}

impl Default for EditorHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Import a payload into a throwaway editor and return its snapshot as JSON
#[wasm_bindgen(js_name = importToJson)]
pub fn import_to_json(input: &str, layout: Option<String>) -> Result<String, JsValue> {
    let layout = parse_layout(layout)?;
    crate::import_to_json(input, layout).map_err(js_error)
}
