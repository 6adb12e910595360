//! Core error types for diagram editing
//!
//! Recoverable failures surfaced to callers. Geometry and partial updates
//! never produce these; they degrade silently instead.

use thiserror::Error;

/// Core error types for diagram editing
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Missing field '{field}' in node {index}")]
    MissingField { field: String, index: usize },

    #[error("Import error: {message}")]
    ImportError { message: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Unknown connection: {id}")]
    UnknownConnection { id: String },

    #[error("Unknown text label: {id}")]
    UnknownTextLabel { id: String },

    #[error("Invalid connection: {message}")]
    InvalidConnection { message: String },

    #[error("Layout error: {message}")]
    LayoutError { message: String },

    #[error("Unknown layout: {name}")]
    UnknownLayout { name: String },

    #[error("Unknown path style: {name}")]
    UnknownPathStyle { name: String },

    #[error("Unknown arrow type: {name}")]
    UnknownArrowType { name: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl EditorError {
    /// Create a new invalid JSON error
    pub fn invalid_json(message: String) -> Self {
        Self::InvalidJson { message }
    }

    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>, index: usize) -> Self {
        Self::MissingField {
            field: field.into(),
            index,
        }
    }

    /// Create a new import error
    pub fn import_error(message: String) -> Self {
        Self::ImportError { message }
    }

    /// Create a new unknown node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create a new invalid connection error
    pub fn invalid_connection(message: String) -> Self {
        Self::InvalidConnection { message }
    }

    /// Create a new layout error
    pub fn layout_error(message: String) -> Self {
        Self::LayoutError { message }
    }

    /// True for failures caused by malformed import input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson { .. } | Self::MissingField { .. } | Self::ImportError { .. }
        )
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_json(err.to_string())
    }
}
