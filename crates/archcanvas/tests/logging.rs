//! Tests for logging functionality
//!
//! These tests verify that logging initialization works correctly
//! with different configurations.

use archcanvas::core::logging::{init_logging, resolve_format, LogFormat};
use archcanvas::core::Position;
use archcanvas::editor::Editor;
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("COMPACT").unwrap(), LogFormat::Compact);
    assert!(LogFormat::from_str("invalid").is_err());
}

#[test]
fn test_log_format_variants() {
    let variants = LogFormat::variants();
    assert!(variants.contains(&"compact"));
    assert!(variants.contains(&"pretty"));
    assert!(variants.contains(&"json"));
}

#[test]
fn test_invalid_format_is_an_error() {
    assert!(resolve_format(Some("xml")).is_err());
    assert!(init_logging(Some("info"), Some("xml")).is_err());
}

#[test]
fn test_init_logging_with_levels() {
    // Only the first call installs a subscriber; the rest must fail gracefully
    let _ = init_logging(Some("trace"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("pretty"));
    let _ = init_logging(Some("off"), Some("json"));
    let _ = init_logging(Some("not a directive ==="), None);
}

#[test]
fn test_editor_works_with_tracing_enabled() {
    let _ = init_logging(Some("trace"), Some("compact"));

    let mut editor = Editor::new();
    let a = editor.drop_technology("nginx", Position::new(100.0, 100.0));
    let b = editor.drop_technology("nodejs", Position::new(500.0, 100.0));
    editor.model_mut().add_connection(&a, &b).unwrap();
    editor.pointer_down(Position::new(110.0, 110.0), false);
    editor.pointer_move(Position::new(-100.0, 110.0));
    editor.pointer_up(Position::new(-100.0, 110.0));

    assert_eq!(editor.routes().len(), 1);
}
