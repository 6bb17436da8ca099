use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_record-filter")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("RECORD_FILTER_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("command should run")
}

const CLASSES: &str = r#"[
  {"name": "Class 10", "code": "C10", "class_level": "class_10", "capacity": 30, "is_active": "true"},
  {"name": "Class 9 A", "code": "C9A", "class_level": "class_9", "capacity": 50, "is_active": "true"},
  {"name": "Class 9 B", "code": "C9B", "class_level": "class_9", "capacity": 45, "is_active": "false"},
  // json5 allows comments and trailing commas
]"#;

#[test]
fn test_filter_json_output_applies_rules_with_and() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    write_file(&file, CLASSES);

    let output = run(&[
        "-F",
        "json",
        "filter",
        file.to_str().expect("utf8 path"),
        "--catalog",
        "classes",
        "-r",
        "class_level:equals:class_9",
        "-r",
        "is_active:equals:true",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["search"]["total"], 3);
    assert_eq!(value["search"]["matches"], 1);
    assert_eq!(value["search"]["records"][0]["name"], "Class 9 A");
    assert_eq!(value["search"]["rules"][1]["operator"], "equals");
}

#[test]
fn test_filter_search_uses_catalog_search_fields() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    write_file(&file, CLASSES);

    let output = run(&[
        "-F",
        "json",
        "filter",
        file.to_str().expect("utf8 path"),
        "-c",
        "classes",
        "-s",
        "c9",
    ]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["search"]["matches"], 2);
}

#[test]
fn test_count_by_field_writes_output_file() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    let out = dir.path().join("count.txt");
    write_file(&file, CLASSES);

    let output = run(&[
        "-o",
        out.to_str().expect("utf8 path"),
        "filter",
        file.to_str().expect("utf8 path"),
        "-c",
        "classes",
        "-r",
        "capacity:between:40,60",
        "--count",
        "--count-by",
        "class_level",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = fs::read_to_string(&out).expect("output file should exist");
    assert!(content.starts_with("FILTER count by class_level (2 records)"));
    assert!(content.contains("     2  class_9"));
}

#[test]
fn test_illegal_operator_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    write_file(&file, CLASSES);

    let output = run(&[
        "filter",
        file.to_str().expect("utf8 path"),
        "-c",
        "classes",
        "-r",
        "name:greater:3",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not valid for text fields"), "stderr: {stderr}");
}

#[test]
fn test_uncoercible_operand_yields_empty_result_not_error() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    write_file(&file, CLASSES);

    let output = run(&[
        "filter",
        file.to_str().expect("utf8 path"),
        "-c",
        "classes",
        "-r",
        "capacity:greater:abc",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FILTER matched 0 of 3 records"));
    assert!(stdout.contains("No matching records found."));
}

#[test]
fn test_non_array_records_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("one.json");
    write_file(&file, r#"{"name": "Class 10"}"#);

    let output = run(&["filter", file.to_str().expect("utf8 path"), "-c", "classes"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("must contain a JSON array"));
}

#[test]
fn test_unknown_catalog_lists_available_ones() {
    let dir = tempdir().expect("temp dir");
    let file = dir.path().join("classes.json");
    write_file(&file, CLASSES);

    let output = run(&["filter", file.to_str().expect("utf8 path"), "-c", "parents"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Catalog 'parents' not found"));
    assert!(stderr.contains("teachers"));
}

#[test]
fn test_catalog_command_json() {
    let output = run(&["-F", "json", "catalog", "students"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["catalog"]["name"], "students");
}

#[test]
fn test_validate_reports_broken_config() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("filters.toml");
    write_file(
        &config,
        r#"
[[catalogs]]
name = "dupes"

[[catalogs.fields]]
key = "name"
label = "Name"
kind = "text"

[[catalogs.fields]]
key = "name"
label = "Again"
kind = "text"
"#,
    );

    let output = run(&["--config", config.to_str().expect("utf8 path"), "validate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate field key: 'name'"));

    let output = run(&["validate"]);
    assert!(output.status.success());
}
