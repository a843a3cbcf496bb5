//! Multi-pass scenarios across crates
//!
//! Each test follows one project through several passes: initialization,
//! edits on either side, conflicts and backups. The vault is in memory.

use chrono::{Duration, Utc};
use osync_core::{
    BackupManager, ConflictOutcome, InitOptions, MemoryVault, ProjectConfig, Secrets, SyncEngine,
    SyncOptions, initialize_project,
};
use osync_test_utils::TestProject;
use osync_test_utils::time::at;
use pretty_assertions::assert_eq;
use std::fs;

fn remote(path: &str) -> String {
    format!("{}/{}", TestProject::VAULT_DIR, path)
}

fn load(project: &TestProject) -> ProjectConfig {
    ProjectConfig::load_with(project.root(), Secrets::default()).unwrap()
}

fn pass(config: &ProjectConfig, vault: &MemoryVault) -> osync_core::SyncResult {
    SyncEngine::new(config, vault, SyncOptions::default())
        .run()
        .unwrap()
}

#[test]
fn initialized_project_publishes_its_hub_note() {
    let dir = tempfile::tempdir().unwrap();
    let options = InitOptions {
        project_name: Some("atlas".to_string()),
        ..InitOptions::default()
    };
    initialize_project(dir.path(), &options).unwrap();

    let config = ProjectConfig::load_with(dir.path(), Secrets::default()).unwrap();
    assert_eq!(config.vault_project_path(), "10-Projects/atlas");

    let vault = MemoryVault::new();
    let result = pass(&config, &vault);

    assert_eq!(result.uploaded(), ["atlas.md".to_string()]);
    let hub = vault.content("10-Projects/atlas/atlas.md").unwrap();
    assert!(String::from_utf8(hub).unwrap().starts_with("# atlas"));

    // Backups are on by default, so the pass left a snapshot behind
    let backup = result.backup_path.expect("pre-sync snapshot");
    assert!(fs::metadata(&backup).unwrap().is_dir());
}

#[test]
fn edits_on_alternating_sides_converge() {
    let project = TestProject::new();
    project.write_settings("sync:\n  create_backup: false\n");
    project.write_note_at("plan.md", "# Plan\n", at(9, 0));
    let config = load(&project);
    let vault = MemoryVault::new();

    let first = pass(&config, &vault);
    assert_eq!(first.uploaded(), ["plan.md".to_string()]);

    // The upload stamped the vault copy with the current time; same text, so
    // the clocks alone do not cause a transfer
    let second = pass(&config, &vault);
    assert_eq!(second.total_changes(), 0);
    assert_eq!(second.unchanged, vec!["plan.md".to_string()]);

    let edited_at = Utc::now() + Duration::hours(1);
    vault.insert(&remote("plan.md"), "# Plan\n\n- ship it\n", edited_at);
    let third = pass(&config, &vault);
    assert_eq!(third.obsidian_to_local.updated, vec!["plan.md".to_string()]);
    assert_eq!(project.read_note("plan.md"), "# Plan\n\n- ship it\n");
    assert_eq!(project.note_mtime("plan.md").timestamp(), edited_at.timestamp());

    let fourth = pass(&config, &vault);
    assert_eq!(fourth.total_changes(), 0);
    assert!(fourth.conflicts.is_empty());
}

#[test]
fn merge_strategy_combines_additions_from_both_sides() {
    let project = TestProject::new();
    project.write_settings("sync:\n  conflict_resolution: merge\n  create_backup: false\n");
    project.write_note_at("log.md", "# Log\n- monday\n- local tuesday\n", at(10, 0));
    let config = load(&project);
    let vault = MemoryVault::new();
    vault.insert(&remote("log.md"), "# Log\n- monday\n", at(9, 0));
    vault.insert(&remote("todo.md"), "- [ ] call\n", at(9, 0));

    let first = pass(&config, &vault);
    // Local text is a superset of the vault's, so the merge keeps the local copy
    assert_eq!(first.local_to_obsidian.updated, vec!["log.md".to_string()]);
    assert_eq!(first.downloaded(), ["todo.md".to_string()]);

    vault.insert(
        &remote("log.md"),
        "# Log\n- monday\n- local tuesday\n- vault wednesday\n",
        Utc::now() + Duration::hours(1),
    );
    fs::write(
        project.note_path("log.md"),
        "# Log\n- preface\n- monday\n- local tuesday\n",
    )
    .unwrap();

    let second = pass(&config, &vault);
    assert_eq!(second.merged, vec!["log.md".to_string()]);
    assert_eq!(second.conflicts[0].outcome, ConflictOutcome::Merged);

    let expected = "# Log\n- preface\n- monday\n- local tuesday\n- vault wednesday\n";
    assert_eq!(project.read_note("log.md"), expected);
    assert_eq!(
        String::from_utf8(vault.content(&remote("log.md")).unwrap()).unwrap(),
        expected
    );

    let third = pass(&config, &vault);
    assert_eq!(third.total_changes(), 0);
}

#[test]
fn repeated_passes_keep_only_the_newest_snapshots() {
    let project = TestProject::new();
    project.write_settings("backup:\n  max_backups: 2\n");
    project.write_note_at("a.md", "# A\n", at(9, 0));
    let config = load(&project);
    let vault = MemoryVault::new();

    let mut taken = Vec::new();
    for _ in 0..4 {
        let result = pass(&config, &vault);
        taken.push(result.backup_path.expect("snapshot per pass"));
    }

    let manager = BackupManager::from_config(&config);
    let remaining: Vec<String> = manager
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|snapshot| snapshot.path.as_str().to_string())
        .collect();
    assert_eq!(remaining, taken[2..].to_vec());
}

#[test]
fn excluded_notes_never_leave_either_side() {
    let project = TestProject::new();
    project.write_settings(
        "sync:\n  create_backup: false\nfilters:\n  include_extensions: [\".md\"]\n  exclude_patterns: [\"drafts\", \"*.tmp\"]\n",
    );
    project.write_note_at("drafts/secret.md", "hidden\n", at(9, 0));
    project.write_note_at("public.md", "shown\n", at(9, 0));
    let config = load(&project);
    let vault = MemoryVault::new();
    vault.insert(&remote("drafts/remote.md"), "hidden too\n", at(9, 0));

    let result = pass(&config, &vault);

    assert_eq!(result.uploaded(), ["public.md".to_string()]);
    assert!(result.downloaded().is_empty());
    assert!(vault.content(&remote("drafts/secret.md")).is_none());
    assert!(!project.note_exists("drafts/remote.md"));
}
