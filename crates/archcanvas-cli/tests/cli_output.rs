//! End-to-end tests that run the built binary
//!
//! Logging is switched off through the environment so stdout only carries
//! command output.

use std::process::{Command, Output};

const RECORD: &str = r#"{
    "nodes": [{"name": "frontend"}, {"name": "api"}, {"name": "cache", "technology": "redis"}],
    "connections": [{"from": "frontend", "to": "api"}, {"from": "api", "to": "cache"}]
}"#;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_archcanvas"))
        .args(args)
        .env("ARCHCANVAS_LOG_LEVEL", "off")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run archcanvas")
}

fn write_input(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_import_prints_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "diagram.json", RECORD);
    let output = run_cli(&["import", "-i", &input, "--layout", "grid"]);
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["nodes"][2]["technologyId"], "redis");
    assert_eq!(snapshot["nodes"][0]["position"]["x"], 100.0);
    assert_eq!(snapshot["connections"].as_array().unwrap().len(), 2);
}

#[test]
fn test_import_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "diagram.json", RECORD);
    let out_path = dir.path().join("snapshot.json");
    let output = run_cli(&["import", "-i", &input, "-o", out_path.to_str().unwrap()]);
    assert!(output.status.success());
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("\"technologyId\""));
}

#[test]
fn test_import_logs() {
    let dir = tempfile::tempdir().unwrap();
    let logs = "2024-01-15T10:00:00Z INFO service=gateway trace_id=t1 GET /orders 200 12ms\n\
                2024-01-15T10:00:01Z INFO service=orders trace_id=t1 GET /orders 200 8ms\n";
    let input = write_input(&dir, "app.log", logs);
    let output = run_cli(&["import", "-i", &input, "--format", "logs", "--record"]);
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["nodes"].as_array().unwrap().len(), 2);
    let title_of = |key: &serde_json::Value| {
        record["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|n| &n["name"] == key)
            .map(|n| n["title"].clone())
            .unwrap()
    };
    assert_eq!(title_of(&record["connections"][0]["from"]), "gateway");
    assert_eq!(title_of(&record["connections"][0]["to"]), "orders");
}

#[test]
fn test_route_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "diagram.json", RECORD);
    let output = run_cli(&["route", "-i", &input]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.lines().all(|l| l.contains(" M")));
}

#[test]
fn test_detect_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "diagram.json", RECORD);
    let output = run_cli(&["detect", "-i", &input]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "json");
}

#[test]
fn test_validate_rejects_missing_name() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "bad.json", r#"{"nodes":[{"name":"ok"},{"technology":"redis"}]}"#);
    let output = run_cli(&["validate", "-i", &input]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✗ Invalid json import"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_catalog_json() {
    let output = run_cli(&["catalog", "--json", "--category", "Database"]);
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(entries
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["id"] == "redis"));
}
