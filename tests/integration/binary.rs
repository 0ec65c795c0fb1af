//! The slidesmith binary: exit codes, the stderr error line, and log files.

use crate::integration::{write_file, SINGLE_SLIDE_DOCUMENT};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn slidesmith(config_home: &Path, workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slidesmith"))
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("SLIDESMITH_ENV")
        .env_remove("SLIDESMITH_LOG")
        .env_remove("SLIDESMITH_LOG_OUTPUT")
        .env_remove("SLIDESMITH_ACCESS_TOKEN")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn validate_succeeds_and_logs_to_requested_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");
    let workspace = temp_dir.path().join("ws");
    std::fs::create_dir_all(&config_home).unwrap();
    write_file(&workspace, "slides.json", SINGLE_SLIDE_DOCUMENT);

    let output = slidesmith(&config_home, &workspace, &["--log-file", "run.log", "validate"]);

    assert!(
        output.status.success(),
        "validate should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Content Document"));

    let log_path = workspace.join("run.log");
    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(
        content.contains("slidesmith starting"),
        "log file should contain a startup message; got: {}",
        content.lines().next().unwrap_or("")
    );
}

#[test]
fn nothing_to_do_exits_non_zero_with_one_error_line() {
    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");
    let workspace = temp_dir.path().join("ws");
    std::fs::create_dir_all(&config_home).unwrap();
    write_file(&workspace, "slides.json", r#"{"slides": []}"#);

    let output = slidesmith(
        &config_home,
        &workspace,
        &["--quiet", "run", "--presentation", "deck-1"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let error_lines: Vec<&str> = stderr
        .lines()
        .filter(|line| line.starts_with("error: "))
        .collect();
    assert_eq!(error_lines.len(), 1, "stderr={:?}", stderr);
    assert!(error_lines[0].starts_with("error: setup failed:"));
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_configuration_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");
    let workspace = temp_dir.path().join("ws");
    std::fs::create_dir_all(&config_home).unwrap();
    write_file(
        &workspace,
        "config/config.toml",
        "[presentation]\nrequests_per_minute = 0\n",
    );

    let output = slidesmith(&config_home, &workspace, &["--quiet", "validate"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("requests_per_minute"));
}
