//! CLI end-to-end tests
//!
//! Tests for the mediashelf command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the mediashelf binary
#[allow(deprecated)]
fn mediashelf_cmd() -> Command {
    Command::cargo_bin("mediashelf").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = mediashelf_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = mediashelf_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mediashelf"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = mediashelf_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "mediashelf {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = mediashelf_cmd();
    cmd.args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--audio-meta"))
        .stdout(predicate::str::contains("--transcoder-log"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = mediashelf_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_serve_missing_source_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = mediashelf_cmd();
    cmd.args(["serve"])
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source folder does not exist"));
}

#[test]
fn test_cli_serve_source_is_file_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let mut cmd = mediashelf_cmd();
    cmd.arg("serve")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a folder"));
}

#[test]
fn test_cli_serve_unknown_mode_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = mediashelf_cmd();
    cmd.arg("serve")
        .arg(dir.path())
        .args(["--mode", "copytotemp_bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}

#[test]
fn test_cli_serve_invalid_port() {
    let dir = tempdir().unwrap();
    let mut cmd = mediashelf_cmd();
    cmd.arg("serve")
        .arg(dir.path())
        .args(["--port", "99999"])
        .assert()
        .failure();
}

#[test]
fn test_cli_probe_nonexistent_file() {
    let mut cmd = mediashelf_cmd();
    cmd.args(["probe", "/nonexistent/clip.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_config_validation() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("mediashelf.toml");
    fs::write(
        &config_path,
        "[server]\nhost = \"127.0.0.1\"\nport = 9090\n\n[storage]\ndata_dir = \"/srv/shelf\"\n",
    )
    .unwrap();

    let mut cmd = mediashelf_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("127.0.0.1:9090"))
        .stdout(predicate::str::contains("/srv/shelf/assets"));
}

#[test]
fn test_cli_config_validation_rejects_zero_port() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.toml");
    fs::write(&config_path, "[server]\nport = 0\n").unwrap();

    let mut cmd = mediashelf_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("port cannot be 0"));
}

#[test]
fn test_cli_validate_uses_global_config_flag() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("cfg.toml");
    fs::write(&config_path, "[server]\nport = 8123\n").unwrap();

    let mut cmd = mediashelf_cmd();
    cmd.arg("-c")
        .arg(&config_path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains(":8123"));
}
