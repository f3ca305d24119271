use assert_cmd::Command;
use predicates::prelude::*;
use schemaboard_core::RelationType;
use schemaboard_graph::{RelationshipOptions, SchemaGraph, SchemaSnapshot, Table};
use serde_json::Value;
use std::path::Path;

fn sample_snapshot() -> SchemaSnapshot {
    let mut graph = SchemaGraph::new();
    let user = Table::new("user").at(0.0, 0.0).with_size(200.0, 150.0);
    let order = Table::new("order").at(500.0, 100.0).with_size(200.0, 150.0);
    let (user_id, order_id) = (user.id, order.id);
    graph.add_table(user).unwrap();
    graph.add_table(order).unwrap();
    graph
        .create_relationship(
            user_id,
            order_id,
            RelationType::OneToMany,
            RelationshipOptions::auto_link(),
        )
        .unwrap();
    graph.to_snapshot()
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn schemaboard() -> Command {
    Command::cargo_bin("schemaboard").unwrap()
}

#[test]
fn check_passes_on_consistent_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    write_json(&path, &serde_json::to_value(sample_snapshot()).unwrap());

    schemaboard()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tables, 1 relationships"))
        .stdout(predicate::str::contains("no repairs needed"))
        .stdout(predicate::str::contains("integrity check passed"));
}

#[test]
fn check_reports_and_writes_repairs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");

    let mut value = serde_json::to_value(sample_snapshot()).unwrap();
    let mut dangling = value["relationships"][0].clone();
    dangling["id"] = Value::String(uuid::Uuid::new_v4().to_string());
    dangling["toTableId"] = Value::String(uuid::Uuid::new_v4().to_string());
    value["relationships"].as_array_mut().unwrap().push(dangling);
    write_json(&path, &value);

    schemaboard()
        .args(["check", "--write"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 repairs applied"))
        .stdout(predicate::str::contains("dropped relationship"))
        .stdout(predicate::str::contains("integrity check passed"));

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["relationships"].as_array().unwrap().len(), 1);
    assert!(written["savedAt"].is_string());
}

#[test]
fn check_fails_on_integrity_violation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");

    let mut value = serde_json::to_value(sample_snapshot()).unwrap();
    let columns = value["tables"][1]["columns"].as_array_mut().unwrap();
    let fk = columns
        .iter_mut()
        .find(|c| c["name"] == "user_id")
        .unwrap();
    fk["name"] = Value::String("owner".to_string());
    write_json(&path, &value);

    schemaboard()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("foreign-key-name"));
}

#[test]
fn check_fails_on_unreadable_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    std::fs::write(&path, "{ not json").unwrap();

    schemaboard()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load snapshot"));

    schemaboard()
        .arg("check")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure();
}

#[test]
fn routes_prints_paths_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    write_json(&path, &serde_json::to_value(sample_snapshot()).unwrap());

    let output = schemaboard().arg("routes").arg(&path).output().unwrap();
    assert!(output.status.success());

    let lines: Value = serde_json::from_slice(&output.stdout).unwrap();
    let line = &lines[0];
    assert_eq!(line["type"], "one-to-many");
    assert_eq!(line["path"], "M 200,66 C 320,66 380,198 500,198");
    assert_eq!(line["style"]["color"], "#3b82f6");
    assert_eq!(line["usedFallback"], false);
}

#[test]
fn routes_uses_layout_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let config = dir.path().join("diagram.toml");
    write_json(&path, &serde_json::to_value(sample_snapshot()).unwrap());
    std::fs::write(&config, "[layout]\ncontrol_offset = 60.0\n").unwrap();

    schemaboard()
        .arg("routes")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("M 200,66 C 260,66 440,198 500,198"));

    std::fs::write(&config, "[canvas]\nwheel_zoom_factor = 0.5\n").unwrap();
    schemaboard()
        .arg("routes")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load settings"));
}
