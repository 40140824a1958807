//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end. Every test points the
//! config and data directories at a scratch directory so the user's real
//! configuration is never read or written.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the binary to test, isolated under `home`.
fn commitcraft(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("commitcraft").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("GROQ_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git").arg("--version").output().is_ok_and(|o| o.status.success())
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI-assisted commit and release messages"))
        .stdout(predicate::str::contains("--release"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_history_help() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path())
        .args(["history", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--releases"));
}

#[test]
fn test_invalid_history_format() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path()).args(["history", "--format", "yaml"]).assert().failure();
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_path_flag() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path())
        .arg("--config-path")
        .assert()
        .success()
        .stdout(predicate::str::contains("commitcraft"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_creates_default_global_file() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    commitcraft(home.path())
        .current_dir(work.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[commit_types]"))
        .stdout(predicate::str::contains("type_format = \"[%s]\""))
        .stdout(predicate::str::contains("api_key").not());

    assert!(home.path().join("config/commitcraft/config.toml").exists());
}

#[test]
fn test_config_merges_local_file() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    std::fs::write(
        work.path().join(".commitcraft.toml"),
        "[commit_format]\ntype_format = \"%s:\"\n\n[commit_types]\nbehavior = \"append\"\ntypes = [{ tag = \"SEC\", description = \"security fix\" }]\n",
    )
    .unwrap();

    commitcraft(home.path())
        .current_dir(work.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("type_format = \"%s:\""))
        .stdout(predicate::str::contains("SEC"))
        .stdout(predicate::str::contains("IMP"));
}

#[test]
fn test_malformed_local_config_names_the_file() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    std::fs::write(work.path().join(".commitcraft.toml"), "[commit_format\n").unwrap();

    commitcraft(home.path())
        .current_dir(work.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".commitcraft.toml"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_bash_completions() {
    let home = TempDir::new().unwrap();
    commitcraft(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commitcraft"));
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_history_outside_repository_fails() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    commitcraft(home.path())
        .current_dir(work.path())
        .env("GIT_CEILING_DIRECTORIES", work.path().parent().unwrap_or(work.path()))
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("git repository"));
}

#[test]
fn test_history_in_empty_repository() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let init = std::process::Command::new("git").arg("init").current_dir(work.path()).output().unwrap();
    assert!(init.status.success());

    commitcraft(home.path())
        .current_dir(work.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0 commits"));

    commitcraft(home.path())
        .current_dir(work.path())
        .args(["history", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
