//! End-to-end tests for the obsidian-sync binary.
//!
//! These tests run the compiled binary with assert_cmd against temporary
//! projects. None of them needs a running Obsidian instance.

use assert_cmd::Command;
use osync_test_utils::{TestProject, time::at};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const API_VARS: &[&str] = &[
    "OBSIDIAN_API_HOST",
    "OBSIDIAN_API_KEY",
    "SLACK_WEBHOOK_URL",
    "DISCORD_WEBHOOK_URL",
    "RUST_LOG",
];

/// A Command for the binary, run in `dir` with no API settings inherited.
fn sync_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("obsidian-sync"));
    cmd.current_dir(dir);
    for var in API_VARS {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn help_describes_the_tool() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Obsidian vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("backup"));
}

#[test]
fn version_names_the_binary() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("obsidian-sync"));
}

#[test]
fn unknown_log_level_is_a_usage_error() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .args(["config", "--log-level", "loud"])
        .assert()
        .code(2);
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn init_creates_the_project_layout() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .args(["init", "-n", "atlas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project initialized"));

    assert!(dir.path().join("config/obsidian-sync.yml").is_file());
    assert!(dir.path().join(".env.example").is_file());
    assert!(dir.path().join("notes/atlas.md").is_file());

    let settings = fs::read_to_string(dir.path().join("config/obsidian-sync.yml")).unwrap();
    assert!(settings.contains("10-Projects/atlas"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path()).args(["init", "-n", "atlas"]).assert().success();

    sync_cmd(dir.path())
        .args(["init", "-n", "atlas"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    sync_cmd(dir.path())
        .args(["init", "-n", "atlas", "--force", "-v", "Work/Atlas"])
        .assert()
        .success();
    let settings = fs::read_to_string(dir.path().join("config/obsidian-sync.yml")).unwrap();
    assert!(settings.contains("Work/Atlas"));
}

#[test]
fn init_rejects_an_escaping_notes_dir() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .args(["init", "-d", "../outside"])
        .assert()
        .failure();
    assert!(!dir.path().join("config/obsidian-sync.yml").exists());
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_prints_json_without_secrets() {
    let project = TestProject::new();
    project.write_settings("sync:\n  conflict_resolution: merge\n");

    let output = sync_cmd(project.root())
        .env("OBSIDIAN_API_KEY", "super-secret")
        .args(["config", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("super-secret"));
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["vault_project_path"], TestProject::VAULT_DIR);
    assert_eq!(summary["conflict_resolution"], "merge");
    assert_eq!(summary["has_api_key"], true);
    assert_eq!(summary["has_api_host"], false);
}

#[test]
fn config_table_is_found_from_a_subdirectory() {
    let project = TestProject::new();
    project.write_settings("");
    let nested = project.notes_dir().join("deep");
    fs::create_dir_all(&nested).unwrap();

    sync_cmd(&nested)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(TestProject::VAULT_DIR));
}

#[test]
fn config_writes_defaults_for_a_fresh_directory() {
    let dir = tempdir().unwrap();
    sync_cmd(dir.path())
        .args(["config", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("newer_wins"));
    assert!(dir.path().join("config/obsidian-sync.yml").is_file());
}

#[test]
fn invalid_settings_fail_with_a_message() {
    let project = TestProject::new();
    project.write_settings("sync:\n  interval_seconds: 0\n");

    sync_cmd(project.root())
        .arg("config")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("interval"));
}

// ============================================================================
// Sync and Test
// ============================================================================

#[test]
fn sync_without_api_settings_names_the_missing_variables() {
    let project = TestProject::new();
    project.write_settings("");

    sync_cmd(project.root())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OBSIDIAN_API_HOST"))
        .stderr(predicate::str::contains("OBSIDIAN_API_KEY"));
}

#[test]
fn sync_against_an_unreachable_host_exits_with_connectivity_code() {
    let project = TestProject::new();
    project.write_settings("");

    sync_cmd(project.root())
        .env("OBSIDIAN_API_HOST", "http://127.0.0.1:1")
        .env("OBSIDIAN_API_KEY", "key")
        .args(["sync", "--dry-run"])
        .assert()
        .code(3);
}

#[test]
fn test_command_prints_troubleshooting_hints() {
    let project = TestProject::new();
    project.write_settings("");

    sync_cmd(project.root())
        .env("OBSIDIAN_API_HOST", "http://127.0.0.1:1")
        .env("OBSIDIAN_API_KEY", "key")
        .arg("test")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Troubleshooting"));
}

// ============================================================================
// Backup
// ============================================================================

#[test]
fn backup_snapshots_the_notes_directory() {
    let project = TestProject::new();
    project.write_settings("");
    project.write_note_at("ideas.md", "# Ideas\n", at(9, 0));

    sync_cmd(project.root())
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files"));

    let backed_up: Vec<_> = project
        .files_under("notes_backup")
        .into_iter()
        .filter(|path| path.ends_with("ideas.md"))
        .collect();
    assert_eq!(backed_up.len(), 1);
}

#[test]
fn backup_prunes_to_the_requested_count() {
    let project = TestProject::new();
    project.write_settings("");
    project.write_note_at("ideas.md", "# Ideas\n", at(9, 0));

    for _ in 0..3 {
        sync_cmd(project.root()).arg("backup").assert().success();
    }
    sync_cmd(project.root())
        .args(["backup", "--max-backups", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keeping 2"));

    let snapshots = fs::read_dir(project.root().join("notes_backup/snapshots"))
        .unwrap()
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .count();
    assert_eq!(snapshots, 2);
}
