#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

/// Copies a fixture into `directory`, returning the copy's path.
pub fn copy_fixture(directory: &TempDir, name: &str) -> PathBuf {
    let target = directory.path().join(name);
    fs::copy(fixture_path(name), &target).expect("fixture copy should succeed");
    target
}

fn command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_horizon-websso"));
    command.env_remove("WEBSSO_SETTINGS_PATH");
    command.env_remove("WEBSSO_IDP_TABLE");
    command.env_remove("RUST_LOG");
    command
}

pub fn run_websso(args: &[&str]) -> Output {
    command()
        .args(args)
        .output()
        .expect("failed to run horizon-websso binary")
}

pub fn run_websso_with_env(args: &[&str], env: &[(&str, &Path)]) -> Output {
    let mut command = command();
    command.args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("failed to run horizon-websso binary")
}

pub fn run_websso_with_stdin(args: &[&str], input: &str) -> Output {
    let mut command = command();
    command.args(args);
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command.spawn().expect("failed to spawn horizon-websso binary");
    let stdin = child.stdin.as_mut().expect("stdin should be available");
    stdin
        .write_all(input.as_bytes())
        .expect("stdin write should succeed");
    child
        .wait_with_output()
        .expect("failed to read process output")
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("path should be utf-8")
}

pub fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command should succeed: stdout={} stderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn assert_error_type(output: &Output, expected_type: &str) -> Value {
    assert!(
        !output.status.success(),
        "command should fail: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    let response = stdout_json(output);
    assert_eq!(response["error"]["type"], expected_type);
    response
}
