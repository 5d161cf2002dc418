//! Integration tests for the `rscbulk` CLI binary.
//!
//! These tests cover argument parsing, help output, input and config
//! errors, all without a reachable RSC.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `rscbulk` binary with env isolation.
///
/// Clears all `RSCBULK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn rscbulk_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rscbulk");
    cmd.env("HOME", "/tmp/rscbulk-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/rscbulk-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("RSCBULK_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    rscbulk_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("--csv")
            .and(predicate::str::contains("--inline"))
            .and(predicate::str::contains("--validate-only"))
            .and(predicate::str::contains("Examples:")),
    );
}

#[test]
fn test_version_flag() {
    rscbulk_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rscbulk"));
}

#[test]
fn test_examples_flag() {
    rscbulk_cmd()
        .arg("--examples")
        .assert()
        .success()
        .stdout(predicate::str::contains("rscbulk -c rscs.csv"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    rscbulk_cmd().arg("--bogus").assert().code(2);
}

#[test]
fn test_invalid_output_format() {
    rscbulk_cmd()
        .args(["-c", "rscs.csv", "--output", "yaml"])
        .assert()
        .code(2);
}

// ── Input errors ────────────────────────────────────────────────────

#[test]
fn test_no_input_exits_1() {
    rscbulk_cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No RSCs given"));
}

#[test]
fn test_short_csv_line_exits_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "192.168.0.67,123456789abcdef0!").unwrap();
    writeln!(file, "192.168.0.17").unwrap();

    rscbulk_cmd()
        .arg("-c")
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error in line 2"));
}

#[test]
fn test_missing_csv_exits_1() {
    rscbulk_cmd()
        .args(["-c", "/tmp/rscbulk-cli-test-nonexistent/rscs.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot read device list"));
}

#[test]
fn test_blank_csv_is_no_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file).unwrap();

    rscbulk_cmd()
        .arg("-c")
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No RSCs given"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_invalid_env_config_is_usage_error() {
    rscbulk_cmd()
        .env("RSCBULK_POLL_INTERVAL_SECS", "0")
        .args(["-i", "192.168.0.67,123456789abcdef0!"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll_interval_secs"));
}

#[test]
fn test_zero_poll_interval_flag_is_usage_error() {
    rscbulk_cmd()
        .args(["-i", "192.168.0.67,pw", "--poll-interval", "0"])
        .assert()
        .code(2);
}

// ── Discovery ───────────────────────────────────────────────────────

#[test]
fn test_discover_with_device_list_is_usage_error() {
    rscbulk_cmd()
        .args(["-d", "-c", "rscs.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_zero_discovery_window_is_usage_error() {
    rscbulk_cmd()
        .env("RSCBULK_DISCOVERY_SECS", "0")
        .arg("-d")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("discovery_secs"));
}
