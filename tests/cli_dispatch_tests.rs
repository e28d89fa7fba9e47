use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_deaddrop")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("deaddrop-{name}-{stamp}"))
}

#[test]
fn missing_command_prints_usage() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: deaddrop"));
}

#[test]
fn unknown_command_prints_usage() {
    let output = Command::new(bin())
        .arg("launch")
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn deploy_command_requires_its_arguments() {
    let output = Command::new(bin())
        .args(["deploy", "op-kestrel"])
        .output()
        .expect("deploy should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: deaddrop deploy"));
}

#[test]
fn status_command_rejects_malformed_ids() {
    let output = Command::new(bin())
        .args(["status", "not-a-uuid"])
        .output()
        .expect("status should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a deployment id"));
}

#[test]
fn export_command_requires_id_and_path() {
    let output = Command::new(bin())
        .arg("export")
        .output()
        .expect("export should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn validate_command_falls_back_to_the_builtin_catalog() {
    let output = Command::new(bin())
        .args(["validate", "/nonexistent/missions/index.json"])
        .output()
        .expect("validate should run");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn validate_command_returns_non_zero_on_broken_catalog() {
    let dir = unique_temp_dir("broken-catalog");
    fs::create_dir_all(&dir).expect("temp dir");
    let index = dir.join("index.json");
    fs::write(
        &index,
        r#"{"missions":[{"id":"hollow","name":"Hollow","primary_tag":"recon"}]}"#,
    )
    .expect("index fixture");
    fs::write(
        dir.join("hollow.json"),
        r#"{"id":"hollow","name":"Hollow","primary_tag":"recon","phases":[],"approaches":[]}"#,
    )
    .expect("record fixture");

    let output = Command::new(bin())
        .args(["validate", index.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"));

    let _ = fs::remove_dir_all(dir);
}
