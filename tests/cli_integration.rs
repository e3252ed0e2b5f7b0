//! CLI integration tests
//!
//! These run the compiled binary and check exit codes, what lands on stdout
//! and how configuration reaches the scan.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn goscan_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_goscan"))
}

fn create_go_repo(dir: &TempDir) -> PathBuf {
    let root = dir.path().to_path_buf();
    fs::write(
        root.join("main.go"),
        "package main\n\nimport \"example.com/app/util\"\n\nfunc main() { util.Run() }\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("util")).unwrap();
    fs::write(root.join("util/util.go"), "package util\n\nfunc Run() {}\n").unwrap();
    root
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(goscan_bin())
        .args(args)
        .current_dir(cwd)
        .env_remove("GOSCAN_IMPORT_PATH")
        .env_remove("GOSCAN_SKIP_GODEPS")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute goscan")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    let output = run(&["--help"], temp.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("goscan"));
    assert!(stdout.contains("scan"));
}

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    let output = run(&["--version"], temp.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_scan_current_directory() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);

    let output = run(&["scan", "--repo", "example.com/app"], &root);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let units = stdout_json(&output);
    let names: Vec<&str> = units
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"example.com/app"));
    assert!(names.contains(&"example.com/app/util"));
}

#[test]
fn test_scan_explicit_path_with_pattern() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);
    let root_arg = root.to_string_lossy().to_string();
    let cwd = TempDir::new().unwrap();

    let output = run(
        &[
            "scan",
            &root_arg,
            "--import-path",
            "example.com/app",
            "--pattern",
            "example.com/app/util",
        ],
        cwd.path(),
    );
    assert!(output.status.success());

    let units = stdout_json(&output);
    assert_eq!(units.as_array().unwrap().len(), 1);
    assert_eq!(units[0]["Name"], "example.com/app/util");
    assert_eq!(units[0]["Dir"], "util");
    assert_eq!(units[0]["Files"], serde_json::json!(["util/util.go"]));
}

#[test]
fn test_scan_config_from_stdin() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);

    let mut child = Command::new(goscan_bin())
        .args(["scan", "--config", "-"])
        .current_dir(&root)
        .env_remove("GOSCAN_IMPORT_PATH")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn goscan");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"ImportPath": "example.com/app", "PkgPatterns": ["example.com/app"]}"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let units = stdout_json(&output);
    assert_eq!(units.as_array().unwrap().len(), 1);
    assert_eq!(units[0]["Name"], "example.com/app");
}

#[test]
fn test_scan_yaml_output() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);

    let output = run(
        &["scan", "--import-path", "example.com/app", "--format", "yaml"],
        &root,
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Name: example.com/app"));
    assert!(stdout.contains("Type: GoPackage"));
}

#[test]
fn test_scan_empty_tree_prints_empty_list() {
    let temp = TempDir::new().unwrap();

    let output = run(&["scan"], temp.path());
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::json!([]));
}

#[test]
fn test_scan_missing_path_fails() {
    let temp = TempDir::new().unwrap();
    let output = run(&["scan", "does-not-exist"], temp.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_scan_malformed_config_fails_without_output() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);
    fs::write(root.join("srcfile.json"), "{\"GOPATH\": ").unwrap();

    let output = run(&["scan", "--config", "srcfile.json"], &root);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_scan_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let root = create_go_repo(&temp);
    let out = TempDir::new().unwrap();
    let out_path = out.path().join("units.json");
    let out_arg = out_path.to_string_lossy().to_string();

    let output = run(&["scan", "--repo", "example.com/app", "-o", &out_arg], &root);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);
}
