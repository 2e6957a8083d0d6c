#![cfg(unix)]

use assert_cmd::prelude::*;
use std::process::Command;

mod common;
use common::FakeCompiler;

fn limcheck() -> Command {
    let mut cmd = Command::cargo_bin("limcheck").unwrap();
    cmd.env_remove("CC").env_remove("RUST_LOG");
    cmd
}

#[test]
fn matching_limits_exit_zero() {
    let cc = FakeCompiler::path_max(Some("4096"), Some("4096"));
    let output = limcheck().arg("--cc").arg(cc.command()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PATH_MAX = 4096 == __PATH_MAX = 4096"));
    assert!(stdout.trim_end().ends_with("PASS"));
}

#[test]
fn mismatched_limits_exit_one() {
    let cc = FakeCompiler::path_max(Some("4096"), Some("1024"));
    let output = limcheck().arg("--cc").arg(cc.command()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[FAIL] PATH_MAX = 4096 != __PATH_MAX = 1024"));
}

#[test]
fn undefined_library_limit_exit_one() {
    let cc = FakeCompiler::path_max(Some("4096"), None);
    let output = limcheck().arg("--cc").arg(cc.command()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("__PATH_MAX = <undefined>"));
}

#[test]
fn nonexistent_compiler_reports_error() {
    let output = limcheck()
        .arg("--cc")
        .arg("/nonexistent/limcheck/cc")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("C compiler not found"), "stderr: {}", stderr);
    assert!(stderr.contains("Failed to run the C compiler"), "stderr: {}", stderr);
}

#[test]
fn string_valued_limits_are_an_error() {
    let cc = FakeCompiler::path_max(Some(".LC0"), Some(".LC0"));
    let output = limcheck().arg("--cc").arg(cc.command()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not read limit values"), "stderr: {}", stderr);
    assert!(stderr.contains("Parse error"), "stderr: {}", stderr);
}

#[test]
fn cc_environment_variable_is_default() {
    let cc = FakeCompiler::path_max(Some("4096"), Some("4096"));
    let output = limcheck().env("CC", cc.command()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn json_report() {
    let cc = FakeCompiler::path_max(Some("4096"), Some("1024"));
    let output = limcheck()
        .args(["--format", "json", "--cc"])
        .arg(cc.command())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["outcomes"][0]["status"], "mismatch");
    assert_eq!(report["outcomes"][0]["kernel_value"], "4096");
    assert_eq!(report["outcomes"][0]["library_value"], "1024");
}

#[test]
fn unknown_format_is_rejected() {
    let cc = FakeCompiler::path_max(Some("4096"), Some("4096"));
    limcheck()
        .args(["--format", "yaml", "--cc"])
        .arg(cc.command())
        .assert()
        .failure();
}
