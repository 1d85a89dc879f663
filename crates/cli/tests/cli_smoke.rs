//! CLI smoke tests for nightly.
//!
//! These tests verify that the commands run end to end and return
//! appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the nightly binary.
fn nightly_cmd() -> Command {
  cargo_bin_cmd!("nightly")
}

const PROJECT: &str = r#"{"name": "acme/site", "require": {"acme/lib": "1.*"}}"#;

const LOCK: &str = r#"{
  "packages": [
    {
      "name": "acme/lib",
      "version": "1.2.0",
      "type": "library",
      "time": "2014-02-01 09:00:00",
      "license": ["MIT"],
      "homepage": "https://acme.example",
      "autoload": {"psr-0": {"Lib_": "lib/"}}
    },
    {"name": "contao/core", "version": "3.2.0", "type": "metapackage"}
  ]
}"#;

fn write(temp: &TempDir, rel: &str, content: &str) {
  let path = temp.path().join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

/// A project plus an already resolved repository, so no resolver is needed.
fn resolved_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  write(&temp, "nightly.composer.json", PROJECT);
  write(&temp, "build_repository_acme-site/composer.lock", LOCK);
  write(
    &temp,
    "build_repository_acme-site/vendor/acme/lib/lib/Lib/Util.php",
    "<?php\nclass Lib_Util {}\n",
  );
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  nightly_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  nightly_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("nightly"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "report"] {
    nightly_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// build
// =============================================================================

#[test]
#[serial]
fn build_fails_without_project() {
  let temp = TempDir::new().unwrap();

  nightly_cmd()
    .arg("build")
    .current_dir(temp.path())
    .env("NIGHTLY_WORKSPACE", temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("nightly.composer.json"));
}

#[test]
#[serial]
fn build_rejects_project_without_require() {
  let temp = TempDir::new().unwrap();
  write(&temp, "nightly.composer.json", r#"{"name": "acme/site"}"#);

  nightly_cmd()
    .args(["build", "--no-update"])
    .current_dir(temp.path())
    .env("NIGHTLY_WORKSPACE", temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("require"));
}

#[test]
#[serial]
fn build_directory_from_existing_lock() {
  let temp = resolved_project();

  nightly_cmd()
    .args(["build", "--no-update", "--dir"])
    .current_dir(temp.path())
    .env("NIGHTLY_WORKSPACE", temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Built acme/site"))
    .stdout(predicate::str::contains("  packages 1"))
    .stdout(predicate::str::contains("Skipped 1 package(s):"))
    .stdout(predicate::str::contains("- contao/core (blacklisted)"));

  let output = temp.path().join("acme-site");
  assert!(output.join("nightly.txt").is_file());
  assert!(output.join("system/modules/acme-lib/classes/lib/Lib/Util.php").is_file());
  assert!(output.join("system/modules/!acme-site/config/vendor_autoload.php").is_file());
}

#[test]
#[serial]
fn build_archive_with_json_summary() {
  let temp = resolved_project();

  let assert = nightly_cmd()
    .args(["--format", "json", "build", "--no-update", "--xml", "versions.xml"])
    .current_dir(temp.path())
    .env("NIGHTLY_WORKSPACE", temp.path())
    .assert()
    .success();

  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  assert_eq!(summary["name"], "acme/site");
  assert_eq!(summary["imported"][0], "acme/lib");
  assert!(temp.path().join("acme-site.zip").is_file());
  assert!(temp.path().join("versions.xml").is_file());
}

#[test]
fn build_rejects_dir_and_zip_together() {
  nightly_cmd()
    .args(["build", "--dir", "--zip"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

// =============================================================================
// report
// =============================================================================

#[test]
fn report_prints_text_table() {
  let temp = resolved_project();

  nightly_cmd()
    .arg("report")
    .arg(temp.path().join("build_repository_acme-site/composer.lock"))
    .assert()
    .success()
    .stdout(predicate::str::starts_with("Name"))
    .stdout(predicate::str::contains("https://acme.example"))
    .stdout(predicate::str::contains("acme/lib"))
    .stdout(predicate::str::contains("contao/core").not());
}

#[test]
fn report_prints_xml() {
  let temp = resolved_project();

  nightly_cmd()
    .arg("report")
    .arg(temp.path().join("build_repository_acme-site/composer.lock"))
    .arg("--xml")
    .assert()
    .success()
    .stdout(predicate::str::contains("<name>acme/lib</name>"))
    .stdout(predicate::str::contains("<hash>1.2.0</hash>"));
}

#[test]
fn report_honors_project_blacklist() {
  let temp = resolved_project();
  write(
    &temp,
    "project.json",
    r#"{"name": "acme/site", "require": {}, "extra": {"nightly-builder": {"blacklist": ["acme/lib"]}}}"#,
  );

  nightly_cmd()
    .arg("report")
    .arg(temp.path().join("build_repository_acme-site/composer.lock"))
    .arg("--project")
    .arg(temp.path().join("project.json"))
    .assert()
    .success()
    .stdout(predicate::str::contains("acme/lib").not());
}

#[test]
fn report_fails_on_missing_lock() {
  let temp = TempDir::new().unwrap();

  nightly_cmd()
    .arg("report")
    .arg(temp.path().join("composer.lock"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("composer.lock"));
}
