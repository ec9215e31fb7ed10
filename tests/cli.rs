// tests/cli.rs
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_prints_the_crate_version() {
    let mut cmd = Command::cargo_bin("gomarks").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn records_on_a_fresh_database_prints_nothing_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gomarks").unwrap();
    cmd.env("GOMARKS_HOME", dir.path())
        .arg("records")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_subcommand_exits_nonzero() {
    let mut cmd = Command::cargo_bin("gomarks").unwrap();
    cmd.assert().failure();
}
