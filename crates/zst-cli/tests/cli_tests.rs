//! End-to-end tests of the `zst` binary that never touch the system

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn zst() -> Command {
    Command::cargo_bin("zst").unwrap()
}

#[test]
fn test_help_lists_commands() {
    zst()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("STRATEGIES"));
}

#[test]
fn test_version() {
    zst()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions() {
    zst()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zst"));
}

#[test]
fn test_generated_config_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zst.toml");

    zst()
        .args(["config", "generate", "-o"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    zst()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    // Refuses to overwrite without --force
    zst()
        .args(["config", "generate", "-o"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[scheduler]\nworkers = 0\n").unwrap();

    zst()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_probe_missing_hostlist() {
    let dir = tempdir().unwrap();

    zst()
        .current_dir(dir.path())
        .args(["probe", "does-not-exist.txt", "-q"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_legacy_without_files_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("zst.toml");
    std::fs::write(
        &config,
        format!("[paths]\nlog_dir = {:?}\n", dir.path().join("logs")),
    )
    .unwrap();

    // Fails on the privilege check or on the missing inputs, before any mutation
    zst()
        .current_dir(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["missing.json", "missing.txt"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_no_arguments_prints_usage_error() {
    zst()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage"));
}
