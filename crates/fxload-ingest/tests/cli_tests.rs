//! CLI surface tests for the fxload binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_data_dir_exits_nonzero_before_touching_the_store() {
    // No MySQL is running here; the data root gate must fire first
    Command::cargo_bin("fxload")
        .unwrap()
        .env_clear()
        .arg("--data-dir")
        .arg("/definitely/not/a/real/path")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn help_lists_connection_flags() {
    Command::cargo_bin("fxload")
        .unwrap()
        .env_clear()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--database"))
        .stdout(predicate::str::contains("--data-dir"));
}
