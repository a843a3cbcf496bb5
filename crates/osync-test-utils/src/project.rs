//! [`TestProject`] builder for sync scenarios.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// A temporary project directory with a settings file and a notes folder.
///
/// # Example
///
/// ```rust,no_run
/// use osync_test_utils::{TestProject, time::at};
///
/// let project = TestProject::new();
/// project.write_settings("sync:\n  conflict_resolution: merge\n");
/// project.write_note_at("ideas.md", "# Ideas\n", at(9, 0));
/// project.assert_note_contains("ideas.md", "Ideas");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// The vault folder written by [`TestProject::write_settings`].
    pub const VAULT_DIR: &'static str = "10-Projects/test-project";

    /// Create an empty project with a `notes/` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("notes")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root().join("notes")
    }

    pub fn note_path(&self, relative: &str) -> PathBuf {
        self.notes_dir().join(relative)
    }

    /// Write `config/obsidian-sync.yml` with the vault folder set to
    /// [`TestProject::VAULT_DIR`], followed by `extra` YAML sections.
    pub fn write_settings(&self, extra: &str) {
        let config_dir = self.root().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let content = format!(
            "obsidian:\n  vault_project_path: {}\n  local_notes_dir: notes\n{extra}",
            Self::VAULT_DIR
        );
        fs::write(config_dir.join("obsidian-sync.yml"), content).unwrap();
    }

    /// Write a note and set its modification time.
    pub fn write_note_at(&self, relative: &str, content: &str, modified: DateTime<Utc>) {
        let path = self.note_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self.set_note_mtime(relative, modified);
    }

    pub fn set_note_mtime(&self, relative: &str, modified: DateTime<Utc>) {
        let file = File::options()
            .write(true)
            .open(self.note_path(relative))
            .unwrap();
        file.set_modified(SystemTime::from(modified)).unwrap();
    }

    pub fn read_note(&self, relative: &str) -> String {
        let path = self.note_path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read note: {}", path.display()))
    }

    pub fn note_mtime(&self, relative: &str) -> DateTime<Utc> {
        let modified = fs::metadata(self.note_path(relative))
            .unwrap()
            .modified()
            .unwrap();
        modified.into()
    }

    pub fn note_exists(&self, relative: &str) -> bool {
        self.note_path(relative).is_file()
    }

    /// Assert that the note at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the note cannot be read or does not contain `content`.
    pub fn assert_note_contains(&self, relative: &str, content: &str) {
        let actual = self.read_note(relative);
        assert!(
            actual.contains(content),
            "Note {} does not contain expected content.\nExpected: {}\nActual: {}",
            relative,
            content,
            actual
        );
    }

    /// Files under `relative_dir` (relative to the project root), recursively.
    pub fn files_under(&self, relative_dir: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![self.root().join(relative_dir)];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    found.push(path);
                }
            }
        }
        found.sort();
        found
    }
}
