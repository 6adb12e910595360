//! Core abstractions for diagram editing
//!
//! Value types, geometry, routing, canvas bounds and the traits the editor,
//! layout and import layers are built on.

pub mod canvas;
mod catalog;
mod config;
mod database;
pub mod edge_routing;
mod error;
pub mod geometry;
mod layout;
pub mod logging;
mod style;
pub mod text;
mod types;

pub use canvas::*;
pub use catalog::*;
pub use config::*;
pub use database::*;
pub use edge_routing::*;
pub use error::*;
pub use geometry::{anchors_between, compute_anchors, Anchors};
pub use layout::*;
pub use logging::*;
pub use style::*;
pub use text::*;
pub use types::*;
