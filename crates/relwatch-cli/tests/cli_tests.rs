//! CLI integration tests
//!
//! Runs the `relwatch` binary against snapshot files in a temp directory.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn plugin(id: &str, downloads: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Plugin {}", id),
        "author": "someone",
        "description": "does things",
        "repo": format!("someone/{}", id),
        "downloads": downloads,
        "tags": ["a", "b"]
    })
}

fn theme(repo: &str) -> Value {
    json!({
        "name": "Minimal",
        "author": "kepano",
        "repo": repo,
        "screenshot": "dark.png",
        "modes": ["dark", "light"]
    })
}

fn relwatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relwatch"))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_cli_diff_json_lists_changes_in_category_order() {
    let temp_dir = TempDir::new().unwrap();
    let old = temp_dir.path().join("old.json");
    let new = temp_dir.path().join("new.json");
    write_json(&old, &json!([plugin("calendar", 10), plugin("dataview", 5)]));
    write_json(
        &new,
        &json!([plugin("calendar", 11), plugin("excalidraw", 1)]),
    );

    let output = relwatch(&[
        "diff",
        "--entity-type",
        "obsidian-plugin",
        "--old",
        old.to_str().unwrap(),
        "--new",
        new.to_str().unwrap(),
        "--json",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let changes: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let summary: Vec<(&str, &str)> = changes
        .iter()
        .map(|c| (c["id"].as_str().unwrap(), c["type"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("excalidraw", "full"),
            ("calendar", "soft"),
            ("dataview", "removal"),
        ]
    );
    assert_eq!(changes[0]["entityType"], "obsidian-plugin");
    assert_eq!(changes[2]["data"]["downloads"], 5);
}

#[test]
fn test_cli_diff_text_summary() {
    let temp_dir = TempDir::new().unwrap();
    let old = temp_dir.path().join("old.json");
    let new = temp_dir.path().join("new.json");
    write_json(&old, &json!([plugin("calendar", 10)]));
    write_json(&new, &json!([plugin("calendar", 12)]));

    let output = relwatch(&[
        "diff",
        "--entity-type",
        "obsidian-plugin",
        "--old",
        old.to_str().unwrap(),
        "--new",
        new.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Changes: obsidian-plugin"));
    assert!(stdout.contains("### Soft (1)"));
    assert!(stdout.contains("- `calendar`"));
}

#[test]
fn test_cli_diff_unknown_entity_type_fails() {
    let temp_dir = TempDir::new().unwrap();
    let old = temp_dir.path().join("old.json");
    write_json(&old, &json!([]));

    let output = relwatch(&[
        "diff",
        "--entity-type",
        "gitlab-project",
        "--old",
        old.to_str().unwrap(),
        "--new",
        old.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gitlab-project"), "stderr: {}", stderr);
}

#[test]
fn test_cli_diff_with_config_file_defines_new_type() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("detectors.yaml");
    fs::write(
        &config,
        r#"
detectors:
  gitlab-project:
    id_field: path
    tracked_fields: [name]
    update_fields: [description]
    soft_update_fields: [stars]
"#,
    )
    .unwrap();
    let old = temp_dir.path().join("old.json");
    let new = temp_dir.path().join("new.json");
    write_json(
        &old,
        &json!([{ "path": "g/one", "name": "One", "description": "x", "stars": 1 }]),
    );
    write_json(
        &new,
        &json!([{ "path": "g/one", "name": "One", "description": "y", "stars": 2 }]),
    );

    let output = relwatch(&[
        "diff",
        "--entity-type",
        "gitlab-project",
        "--old",
        old.to_str().unwrap(),
        "--new",
        new.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let changes: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["type"], "update");
}

#[test]
fn test_cli_reconcile_reports_changes_and_missing() {
    let temp_dir = TempDir::new().unwrap();
    let old_dir = temp_dir.path().join("old");
    let fetched_dir = temp_dir.path().join("fetched");
    fs::create_dir_all(&old_dir).unwrap();
    fs::create_dir_all(&fetched_dir).unwrap();

    write_json(
        &old_dir.join("plugins.json"),
        &json!([plugin("calendar", 10), plugin("dataview", 5)]),
    );
    write_json(&old_dir.join("themes.json"), &json!([theme("kepano/Minimal")]));
    // Second entry has no id and cannot be resolved.
    write_json(
        &fetched_dir.join("plugins.json"),
        &json!([plugin("calendar", 12), { "name": "nameless" }]),
    );
    write_json(
        &fetched_dir.join("themes.json"),
        &json!([theme("kepano/minimal")]),
    );

    let output = relwatch(&[
        "reconcile",
        "--old-dir",
        old_dir.to_str().unwrap(),
        "--fetched-dir",
        fetched_dir.to_str().unwrap(),
        "--json",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let plugins = report["changes"]["plugins"].as_array().unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0]["id"], "calendar");
    assert_eq!(plugins[0]["type"], "soft");
    assert_eq!(plugins[1]["id"], "dataview");
    assert_eq!(plugins[1]["type"], "removal");
    assert!(report["changes"]["themes"].is_null());
    assert_eq!(report["summary"]["processed"]["plugins"], 1);
    assert_eq!(report["summary"]["processed"]["themes"], 1);
    assert_eq!(report["summary"]["changes"]["removed"], 1);
    assert_eq!(report["failures"], json!([]));

    let missing = report["summary"]["missing"].as_array().unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["id"], "obsidian-plugin#1");
    assert_eq!(missing[0]["code"], "ERR_IDENTIFIER_MISSING");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "Warning: missing obsidian-plugin 'obsidian-plugin#1' [ERR_IDENTIFIER_MISSING]"
    ));
}

#[test]
fn test_cli_reconcile_failed_type_exits_non_zero_after_partial_output() {
    let temp_dir = TempDir::new().unwrap();
    let old_dir = temp_dir.path().join("old");
    let fetched_dir = temp_dir.path().join("fetched");
    fs::create_dir_all(&old_dir).unwrap();
    fs::create_dir_all(&fetched_dir).unwrap();

    // No persisted state yet: every fetched plugin is new.
    write_json(
        &fetched_dir.join("plugins.json"),
        &json!([plugin("calendar", 1)]),
    );

    let output = relwatch(&[
        "reconcile",
        "--old-dir",
        old_dir.to_str().unwrap(),
        "--fetched-dir",
        fetched_dir.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Changes: obsidian-plugin"));
    assert!(stdout.contains("### Full (1)"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("obsidian-theme failed"), "stderr: {}", stderr);
}
