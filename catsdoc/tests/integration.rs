use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_catsdoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read_json(path: &std::path::Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_prints_json() {
    let input = std::fs::read_to_string(fixture_path("renoise/application.lua")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.ends_with("]\n"));

    let value: Value = serde_json::from_str(&output).unwrap();
    let class = &value[0];
    assert_eq!(class["kind"], "class");
    assert_eq!(class["name"], "renoise.Application");
    assert_eq!(class["description"], "The Renoise application.");
    assert_eq!(class["methods"][0]["name"], "show_message");
    assert_eq!(
        class["methods"][0]["params"],
        serde_json::json!([{ "name": "message", "type": "string", "optional": false }])
    );
    assert_eq!(class["methods"][0]["location"]["file"], "<stdin>");
}

#[test]
fn stdin_mode_enum_members_in_order() {
    let input = std::fs::read_to_string(fixture_path("colors.lua")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let value: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value[0]["kind"], "enum");
    assert_eq!(
        value[0]["members"],
        serde_json::json!([
            { "name": "black", "value": "0" },
            { "name": "red", "value": "2" },
            { "name": "green", "value": "4" },
        ])
    );
}

// -- file mode --

#[test]
fn file_mode_writes_doc_json() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("renoise"))
        .assert()
        .success();

    let value = read_json(&dir.path().join("doc.json"));
    let names: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|e| format!("{} {}", e["kind"].as_str().unwrap(), e["name"].as_str().unwrap()))
        .collect();
    assert_eq!(
        names,
        vec![
            "global renoise",
            "global renoise.API_VERSION",
            "class renoise.Application",
            "class renoise.Song",
            "class renoise.Track",
        ]
    );

    let methods: Vec<_> = value[2]["methods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(methods, vec!["show_message", "song", "open_url"]);
    assert_eq!(
        value[4]["fields"][0]["description"],
        "Linear volume  \nfrom 0 to 4."
    );
}

#[test]
fn numeric_global_keeps_literal_text() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("renoise/api.lua"))
        .assert()
        .success();

    let text = std::fs::read_to_string(dir.path().join("doc.json")).unwrap();
    assert!(text.contains("\"value\": 6.1,"), "{}", text);
}

#[test]
fn file_mode_is_idempotent() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    for dir in [&first, &second] {
        cmd()
            .args(["-o", dir.path().to_str().unwrap()])
            .arg(fixture_path("renoise"))
            .arg(fixture_path("colors.lua"))
            .assert()
            .success();
    }

    let a = std::fs::read(first.path().join("doc.json")).unwrap();
    let b = std::fs::read(second.path().join("doc.json")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn glob_patterns_are_expanded() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("renoise/app*.lua"))
        .assert()
        .success();

    let value = read_json(&dir.path().join("doc.json"));
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn log_file_is_written() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("logs");

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .args(["--log-dir", logs.to_str().unwrap()])
        .arg(fixture_path("broken.lua"))
        .assert()
        .failure();

    let log = std::fs::read_to_string(logs.join("catsdoc.log")).unwrap();
    assert!(log.contains("wrote documentation"), "{}", log);
    assert!(log.contains("unresolved-owner"), "{}", log);
    assert!(!log.contains("\u{1b}["));
}

// -- diagnostics and exit codes --

#[test]
fn unresolved_owner_fails_but_writes_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("broken.lua"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unresolved-owner"))
        .stderr(predicate::str::contains("mixer"));

    let value = read_json(&dir.path().join("doc.json"));
    assert_eq!(value[0]["name"], "mixer");
    assert!(value[0].get("fields").is_none());
}

#[test]
fn warnings_pass_by_default() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("widget.lua"))
        .assert()
        .success()
        .stderr(predicate::str::contains("unresolved-type"));
}

#[test]
fn deny_warnings_fails_on_warning() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--deny-warnings"])
        .arg(fixture_path("widget.lua"))
        .assert()
        .code(1);
}

#[test]
fn known_type_silences_warning() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--deny-warnings"])
        .args(["--known-type", "Widget"])
        .arg(fixture_path("widget.lua"))
        .assert()
        .success()
        .stderr(predicate::str::contains("unresolved-type").not());
}

#[test]
fn output_required_with_files() {
    cmd()
        .arg(fixture_path("colors.lua"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn no_matching_files_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("missing/*.lua"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Lua files found"));
}
