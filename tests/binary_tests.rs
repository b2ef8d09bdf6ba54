//! Tests running the `portation` binary as a subprocess

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn portation() -> Command {
    Command::cargo_bin("portation").unwrap()
}

#[test]
fn test_help_lists_commands() {
    portation()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("columns"));
}

#[test]
fn test_export_binary() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("people");

    portation()
        .args(["export", "test-data/schema.yaml", "test-data/people.yaml"])
        .arg(&output)
        .args(["--format", "csv", "--class", "Person"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"));

    let content = fs::read_to_string(dir.path().join("people.csv")).unwrap();
    assert!(content.starts_with("Identifiant;Prénom;Nom;Âge"));
}

#[test]
fn test_export_binary_reports_errors() {
    let dir = TempDir::new().unwrap();

    portation()
        .args(["export", "test-data/schema.yaml", "test-data/people.yaml"])
        .arg(dir.path().join("people.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--class"));
}

#[test]
fn test_import_binary_to_stdout() {
    portation()
        .args(["import", "test-data/schema.yaml", "test-data/people.csv"])
        .args(["--class", "Person"])
        .assert()
        .success()
        .stdout(predicate::str::contains("firstname: James"))
        .stderr(predicate::str::contains("could not be mapped"));
}

#[test]
fn test_columns_binary() {
    portation()
        .args(["columns", "test-data/schema.yaml", "Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Téléphone"))
        .stdout(predicate::str::contains("(hidden)"));
}

#[test]
fn test_columns_binary_rejects_mode() {
    portation()
        .args(["columns", "test-data/schema.yaml", "Customer", "--mode", "sideways"])
        .assert()
        .failure();
}
