//! CLI tests for the ckagent binary.
//!
//! Validates:
//! - `run` prints plugin output and exits with the check state
//! - Agent failures still answer with an UNKNOWN plugin line
//! - `list` / `describe` in text and JSON
//! - `parse` turns plugin output into JSON
//! - `config show` / `config schema` and configuration error exit codes

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// ============================================================================
// Helpers
// ============================================================================

/// A ckagent command isolated from the user's own configuration.
fn ckagent(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("ckagent");
    cmd.timeout(Duration::from_secs(60))
        .env_remove("CKAGENT_CONFIG")
        .env_remove("CKAGENT_LOG")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("ckagent.json");
    fs::write(&path, body).expect("write config");
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_dummy_exits_with_state() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["run", "check_dummy", "1", "hello"])
        .assert()
        .code(1)
        .stdout("WARNING - hello\n");
}

#[test]
fn run_dummy_with_named_arguments() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["run", "check_dummy", "state=critical", "text=disk on fire"])
        .assert()
        .code(2)
        .stdout("CRITICAL - disk on fire\n");
}

#[test]
fn run_unknown_check_is_unknown_state() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["run", "check_nope"])
        .assert()
        .code(3)
        .stdout("UNKNOWN - unknown check: check_nope\n");
}

#[test]
fn run_unknown_argument_is_unknown_state() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["run", "check_uptime", "bogus=1"])
        .assert()
        .code(3)
        .stdout(predicate::str::starts_with("UNKNOWN - unknown argument: bogus"));
}

#[test]
fn run_with_broken_config_reports_unknown() {
    let home = tempdir().unwrap();
    let config = write_config(&home, "{ not json");
    ckagent(&home)
        .arg("--config")
        .arg(&config)
        .args(["run", "check_dummy", "0"])
        .assert()
        .code(3)
        .stdout(predicate::str::starts_with("UNKNOWN - configuration error:"));
}

#[test]
fn run_applies_config_aliases() {
    let home = tempdir().unwrap();
    let config = write_config(
        &home,
        r#"{
            "schema_version": "1.0.0",
            "checks": {"check_dummy": {"default_args": ["text=from config"]}},
            "aliases": {"alias_crit": {"command": "check_dummy", "args": ["state=2"]}}
        }"#,
    );
    ckagent(&home)
        .arg("--config")
        .arg(&config)
        .args(["run", "alias_crit"])
        .assert()
        .code(2)
        .stdout("CRITICAL - from config\n");
}

#[test]
fn run_refuses_disabled_check() {
    let home = tempdir().unwrap();
    let config = write_config(
        &home,
        r#"{"schema_version": "1.0.0", "checks": {"check_dummy": {"disabled": true}}}"#,
    );
    ckagent(&home)
        .env("CKAGENT_CONFIG", &config)
        .args(["run", "check_dummy", "0"])
        .assert()
        .code(3)
        .stdout("UNKNOWN - check check_dummy is disabled by configuration\n");
}

#[cfg(target_os = "linux")]
#[test]
fn run_memory_reports_perf_data() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["run", "check_memory", "type=physical"])
        .assert()
        .stdout(predicate::str::is_match(r"^(OK|WARNING|CRITICAL) - physical = .+ \|'physical'=\d+B").unwrap())
        .stdout(predicate::str::contains("'physical %'="));
}

#[test]
fn logs_stay_off_stdout() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["-vv", "run", "check_dummy", "0", "quiet"])
        .assert()
        .code(0)
        .stdout("OK - quiet\n");
}

// ============================================================================
// list / describe
// ============================================================================

#[test]
fn list_shows_checks_and_aliases() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("check_dummy"))
        .stdout(predicate::str::contains("check_uptime (aliases: CheckUpTime)"))
        .stdout(predicate::str::contains("check_memory (aliases: CheckMEM)"));
}

#[test]
fn list_json() {
    let home = tempdir().unwrap();
    let json = stdout_json(ckagent(&home).args(["list", "--json"]));
    let names: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, ["check_dummy", "check_memory", "check_uptime"]);
}

#[test]
fn describe_by_alias() {
    let home = tempdir().unwrap();
    let json = stdout_json(ckagent(&home).args(["describe", "CheckMEM", "--json"]));
    assert_eq!(json["name"], "check_memory");
    assert_eq!(json["default_warning"], "used_pct > 80");
    assert!(json["arguments"]
        .as_array()
        .expect("arguments")
        .iter()
        .any(|a| a["key"] == "type"));
}

#[test]
fn describe_text_lists_common_arguments() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["describe", "check_uptime"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Arguments:"))
        .stdout(predicate::str::contains("warn"))
        .stdout(predicate::str::contains("Attributes:"))
        .stdout(predicate::str::contains("uptime_text"));
}

#[test]
fn describe_unknown_check_is_usage_error() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["describe", "check_nope"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("unknown check: check_nope"));
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn parse_reads_stdin() {
    let home = tempdir().unwrap();
    let json = stdout_json(
        ckagent(&home)
            .arg("parse")
            .write_stdin("WARNING - disk 80% | '/'=80%;70;90;0;100 inodes=12\n"),
    );
    assert_eq!(json["state"], "WARNING");
    assert_eq!(json["output"], "WARNING - disk 80%");
    let metrics = json["metrics"].as_array().expect("metrics");
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0]["name"], "/");
    assert_eq!(metrics[0]["unit"], "%");
    assert_eq!(metrics[0]["warning"], "70");
    assert_eq!(metrics[0]["max"], 100.0);
    assert_eq!(metrics[1]["name"], "inodes");
    assert_eq!(metrics[1]["critical"], Value::Null);
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_show_defaults() {
    let home = tempdir().unwrap();
    let output = ckagent(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("built-in defaults"))
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("parse JSON");
    assert_eq!(json["schema_version"], "1.0.0");
}

#[test]
fn config_show_from_config_dir() {
    let home = tempdir().unwrap();
    let dir = home.path().join(".config").join("ckagent");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.json"),
        r#"{"schema_version": "1.0.0", "description": "from xdg"}"#,
    )
    .unwrap();

    let json = stdout_json(ckagent(&home).args(["config", "show"]));
    assert_eq!(json["description"], "from xdg");
}

#[test]
fn config_missing_explicit_file_exits_10() {
    let home = tempdir().unwrap();
    ckagent(&home)
        .args(["--config", "/nonexistent/ckagent.json", "config", "show"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn config_incompatible_schema_exits_10() {
    let home = tempdir().unwrap();
    let config = write_config(&home, r#"{"schema_version": "9.0.0"}"#);
    ckagent(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("incompatible schema version 9.0.0"));
}

#[test]
fn config_schema_is_json() {
    let home = tempdir().unwrap();
    let json = stdout_json(ckagent(&home).args(["config", "schema"]));
    assert!(json["properties"]["checks"].is_object());
    assert!(json["properties"]["aliases"].is_object());
}
