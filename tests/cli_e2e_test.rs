//! Binary-level tests: argument validation, exit codes, and a full run
//! over the shared fixture.


use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use test_env::{standard_speeches, write_reference_fixture, write_speeches};

fn hsr() -> Command {
    Command::cargo_bin("hsr").unwrap()
}

#[test]
fn zero_cores_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    hsr()
        .args(["--cores", "0", "--scratch"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--cores"));
}

#[test]
fn absurd_core_count_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    hsr()
        .args(["--cores", "1000000", "--scratch"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--cores"));
}

#[test]
fn missing_reference_tables_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    hsr()
        .args(["--cores", "1", "--scratch"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn full_run_writes_output_and_prints_ratios() {
    let dir = TempDir::new().unwrap();
    write_reference_fixture(dir.path());
    write_speeches(&dir.path().join("speeches.csv"), &standard_speeches());

    hsr()
        .args(["--cores", "1", "--scratch"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hits"))
        .stdout(predicate::str::contains("ambiguities"))
        .stdout(predicate::str::contains("Total rows processed: 15"));

    let output = std::fs::read_to_string(dir.path().join("output.csv")).unwrap();
    assert!(output.starts_with("sentence_id,speaker,suggested_speaker"));
    assert_eq!(output.lines().count(), standard_speeches().len() + 1);
}

#[test]
fn scratch_env_var_selects_the_data_root() {
    let dir = TempDir::new().unwrap();
    write_reference_fixture(dir.path());
    write_speeches(&dir.path().join("speeches.csv"), &standard_speeches());

    hsr()
        .env("SCRATCH", dir.path())
        .args(["--cores", "1"])
        .assert()
        .success();

    assert!(dir.path().join("output.csv").exists());
}

#[test]
fn webhook_secret_prepares_the_notification_payload() {
    let dir = TempDir::new().unwrap();
    write_reference_fixture(dir.path());
    write_speeches(&dir.path().join("speeches.csv"), &standard_speeches());

    hsr()
        .env("WEBHOOK_SECRET", "t00/secret")
        .args(["--cores", "1", "--verbose", "--scratch"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("completion notification"));
}
