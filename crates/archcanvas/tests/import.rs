//! Import of JSON records and service logs into an editor

use archcanvas::core::{EditorError, Position};
use archcanvas::editor::{Editor, NodeUpdate};
use archcanvas::import::{parse_json, ImportNode, ImportRecord, InputFormat};
use archcanvas::layout::LayoutKind;

const AB: &str = r#"{"nodes":[{"name":"A"},{"name":"B"}],"connections":[{"from":"A","to":"B"}]}"#;

#[test]
fn test_grid_import_of_two_nodes() {
    let mut editor = Editor::new();
    let summary = editor.import_text(AB, None, Some(LayoutKind::Grid)).unwrap();

    let a = editor.model().node(summary.id_for("A").unwrap()).unwrap().clone();
    let b = editor.model().node(summary.id_for("B").unwrap()).unwrap().clone();
    assert_ne!(a.position, b.position);
    assert_eq!(summary.layout, Some(LayoutKind::Grid));

    let connections: Vec<_> = editor.model().connections().collect();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].from_node_id, a.id);
    assert_eq!(connections[0].to_node_id, b.id);
}

#[test]
fn test_record_layout_hint_is_used() {
    let mut editor = Editor::new();
    let input = r#"{"nodes":[{"name":"A"},{"name":"B"},{"name":"C"}],
        "connections":[{"from":"A","to":"B"},{"from":"B","to":"C"}],
        "layout":"hierarchy"}"#;
    let summary = editor.import_text(input, None, None).unwrap();
    assert_eq!(summary.layout, Some(LayoutKind::Hierarchy));

    let y = |name: &str| {
        editor
            .model()
            .node(summary.id_for(name).unwrap())
            .unwrap()
            .position
            .y
    };
    assert!(y("A") < y("B"));
    assert!(y("B") < y("C"));
}

#[test]
fn test_missing_name_reports_index_and_changes_nothing() {
    let mut editor = Editor::new();
    let input = r#"{"nodes":[{"name":"A"},{"technology":"redis"}],"connections":[]}"#;
    let err = editor.import_text(input, Some(InputFormat::Json), None).unwrap_err();
    assert!(matches!(err, EditorError::MissingField { index: 1, .. }));
    assert_eq!(editor.model().node_count(), 0);
    assert!(editor.take_events().is_empty());
}

#[test]
fn test_malformed_json_is_rejected() {
    let err = parse_json("{\"nodes\": [").unwrap_err();
    assert!(matches!(err, EditorError::InvalidJson { .. }));
    assert!(err.is_validation());
    assert!(parse_json("[1, 2]").is_err());
}

#[test]
fn test_explicit_positions_survive() {
    let mut editor = Editor::new();
    let mut record = ImportRecord::new();
    record.nodes.push(ImportNode::named("edge").at(Position::new(700.0, 120.0)));
    record.nodes.push(ImportNode::named("core").at(Position::new(300.0, 500.0)));
    let summary = editor.import_record(&record, Some(LayoutKind::Circular)).unwrap();

    assert_eq!(summary.layout, None);
    let edge = editor.model().node(summary.id_for("edge").unwrap()).unwrap();
    assert_eq!(edge.position, Position::new(700.0, 120.0));
}

#[test]
fn test_export_then_import_reproduces_the_diagram() {
    let mut original = Editor::new();
    original
        .import_text(
            r#"{"nodes":[{"name":"web","technology":"react"},{"name":"orders-api"},{"name":"cache","technology":"redis"}],
                "connections":[{"from":"web","to":"orders-api"},{"from":"orders-api","to":"cache"}]}"#,
            None,
            Some(LayoutKind::Hierarchy),
        )
        .unwrap();
    let copy = reimport(&original);

    assert_eq!(shape(&original), shape(&copy));
    assert_eq!(endpoints(&original), endpoints(&copy));
}

#[test]
fn test_round_trip_keeps_endpoints_with_duplicate_and_empty_titles() {
    let mut original = Editor::new();
    let web = original.drop_technology("react", Position::new(100.0, 100.0));
    let first_cache = original.drop_technology("redis", Position::new(400.0, 100.0));
    let api = original.drop_technology("express", Position::new(100.0, 400.0));
    let second_cache = original.drop_technology("redis", Position::new(400.0, 400.0));
    original.model_mut().add_connection(&web, &first_cache).unwrap();
    original.model_mut().add_connection(&api, &second_cache).unwrap();
    original
        .model_mut()
        .update_node(&web, NodeUpdate::new().title(""))
        .unwrap();

    let copy = reimport(&original);

    assert_eq!(shape(&original), shape(&copy));
    assert_eq!(endpoints(&original), vec![(0, 1), (2, 3)]);
    assert_eq!(endpoints(&copy), vec![(0, 1), (2, 3)]);
    assert_eq!(copy.model().nodes().next().unwrap().title, "");
}

fn reimport(editor: &Editor) -> Editor {
    let exported = editor.export().to_json().unwrap();
    let mut copy = Editor::new();
    copy.import_text(&exported, None, None).unwrap();
    copy
}

fn shape(editor: &Editor) -> Vec<(String, String, Position)> {
    editor
        .model()
        .nodes()
        .map(|n| (n.title.clone(), n.technology_id.clone(), n.position))
        .collect()
}

/// Connection endpoints as indexes into node order
fn endpoints(editor: &Editor) -> Vec<(usize, usize)> {
    let order: Vec<String> = editor.model().nodes().map(|n| n.id.clone()).collect();
    let index = |id: &str| order.iter().position(|n| n == id).unwrap();
    editor
        .model()
        .connections()
        .map(|c| (index(&c.from_node_id), index(&c.to_node_id)))
        .collect()
}

#[test]
fn test_imports_accumulate() {
    let mut editor = Editor::new();
    editor.import_text(AB, None, Some(LayoutKind::Grid)).unwrap();
    let second = editor.import_text(AB, None, Some(LayoutKind::Grid)).unwrap();
    assert_eq!(editor.model().node_count(), 4);
    assert_eq!(editor.model().connection_count(), 2);
    assert_eq!(second.node_ids.len(), 2);
}

#[cfg(feature = "logs")]
#[test]
fn test_log_import_builds_service_graph() {
    let logs = "\
2024-03-01T09:15:00.120Z INFO [gateway] trace_id=abc GET /api/orders 200 35ms
2024-03-01T09:15:00.140Z INFO service=orders-api trace_id=abc GET /api/orders 200 20ms
2024-03-01T09:15:00.150Z DEBUG service=postgres trace_id=abc query took 4ms
2024-03-01T09:15:01.000Z ERROR service=orders-api trace_id=def POST /api/orders 500 1.2s";
    let mut editor = Editor::new();
    let summary = editor.import_text(logs, None, None).unwrap();

    assert_eq!(summary.node_ids.len(), 3);
    let postgres = editor.model().node(summary.id_for("postgres").unwrap()).unwrap();
    assert_eq!(postgres.technology_id, "postgres");
    assert_eq!(editor.model().connection_count(), 2);
}
