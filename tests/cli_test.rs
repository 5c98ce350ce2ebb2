//! Command-line integration tests
//!
//! These run the `amity` binary with the credential kept in the session
//! database under a temporary data directory, so no keyring or network is
//! touched.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn amity(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("amity").unwrap();
    cmd.env_remove("AMITY_API_BASE_URL")
        .env_remove("AMITY_DATA_DIR")
        .env_remove("AMITY_CODE_LENGTH")
        .env("AMITY_CREDENTIAL_STORE", "file")
        .arg("--config")
        .arg(data_dir.path().join("missing.yaml"))
        .arg("--data-dir")
        .arg(data_dir.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("amity").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("delete-account"));
}

#[test]
fn test_fresh_install_shows_onboarding_slides() {
    let dir = TempDir::new().unwrap();
    amity(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("onboarding-slides"));
}

#[test]
fn test_dismissed_intro_persists_across_runs() {
    let dir = TempDir::new().unwrap();
    amity(&dir).args(["intro", "dismiss"]).assert().success();

    let output = amity(&dir).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["screenGroup"], "auth-flow/email");
    assert_eq!(status["authStep"], "idle");
    assert_eq!(status["hasSeenOnboarding"], true);
}

#[test]
fn test_logout_when_signed_out_succeeds() {
    let dir = TempDir::new().unwrap();
    amity(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_profile_show_when_signed_out() {
    let dir = TempDir::new().unwrap();
    amity(&dir)
        .args(["profile", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    amity(&dir)
        .args(["--api-base-url", "ftp://example.com", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_config_file_is_honored() {
    let (config_dir, config_path) = common::temp_config_file(
        r#"
api:
  base_url: "not a url"
"#,
    );
    let data_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("amity").unwrap();
    cmd.env_remove("AMITY_API_BASE_URL")
        .env("AMITY_CREDENTIAL_STORE", "file")
        .arg("--config")
        .arg(&config_path)
        .arg("--data-dir")
        .arg(data_dir.path())
        .arg("status");
    cmd.assert().failure();
    drop(config_dir);
}
