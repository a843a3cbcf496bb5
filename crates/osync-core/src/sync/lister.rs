//! Listing notes on both sides

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use osync_fs::{FileFilter, NormalizedPath, io, scan_dir, validate_relative};

use super::record::FileRecord;
use super::report::SkippedEntry;
use crate::config::ProjectConfig;
use crate::vault::VaultApi;
use crate::Result;

/// Both sides of a pass, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub local: BTreeMap<String, FileRecord>,
    pub remote: BTreeMap<String, FileRecord>,
    /// Vault entries that could not be used
    pub skipped_remote: Vec<SkippedEntry>,
}

/// Lists the local notes directory and the matching vault folder.
pub struct DirectoryLister<'a> {
    notes_dir: PathBuf,
    vault_dir: String,
    filter: FileFilter,
    vault: &'a dyn VaultApi,
}

impl<'a> DirectoryLister<'a> {
    pub fn new(
        notes_dir: PathBuf,
        vault_dir: impl Into<String>,
        filter: FileFilter,
        vault: &'a dyn VaultApi,
    ) -> Self {
        let vault_dir: String = vault_dir.into();
        Self {
            notes_dir,
            vault_dir: vault_dir.trim_matches('/').to_string(),
            filter,
            vault,
        }
    }

    pub fn from_config(config: &ProjectConfig, vault: &'a dyn VaultApi) -> Result<Self> {
        Ok(Self::new(
            config.local_notes_dir(),
            config.vault_project_path(),
            config.file_filter()?,
            vault,
        ))
    }

    /// Local file for a relative path.
    pub fn local_path(&self, relative: &str) -> NormalizedPath {
        NormalizedPath::new(&self.notes_dir).join(relative)
    }

    /// Vault path for a relative path.
    pub fn remote_path(&self, relative: &str) -> String {
        if self.vault_dir.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.vault_dir, relative)
        }
    }

    pub fn read_local(&self, relative: &str) -> Result<Vec<u8>> {
        Ok(io::read_bytes(&self.local_path(relative))?)
    }

    pub fn list(&self) -> Result<Listing> {
        let local = self.list_local()?;
        let (remote, skipped_remote) = self.list_remote()?;
        Ok(Listing {
            local,
            remote,
            skipped_remote,
        })
    }

    /// Every included file under the notes directory.
    pub fn list_local(&self) -> Result<BTreeMap<String, FileRecord>> {
        let entries = scan_dir(&self.notes_dir, &self.filter)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let modified: DateTime<Utc> = entry.modified.into();
                let record = FileRecord::new(entry.relative_path.clone(), modified, entry.size);
                (entry.relative_path, record)
            })
            .collect())
    }

    /// Every included note under the vault folder, with content.
    ///
    /// A missing folder is an empty listing. Unusable entries and per-note
    /// HTTP failures are returned as skipped; transport and authentication
    /// failures abort.
    pub fn list_remote(&self) -> Result<(BTreeMap<String, FileRecord>, Vec<SkippedEntry>)> {
        let mut records = BTreeMap::new();
        let mut skipped = Vec::new();
        self.walk_remote("", &mut records, &mut skipped)?;
        tracing::debug!(
            vault = %self.vault.describe(),
            folder = %self.vault_dir,
            notes = records.len(),
            skipped = skipped.len(),
            "listed vault folder"
        );
        Ok((records, skipped))
    }

    fn walk_remote(
        &self,
        relative_dir: &str,
        records: &mut BTreeMap<String, FileRecord>,
        skipped: &mut Vec<SkippedEntry>,
    ) -> Result<()> {
        let dir = if relative_dir.is_empty() {
            self.vault_dir.clone()
        } else {
            self.remote_path(relative_dir)
        };

        let Some(entries) = self.vault.list_dir(&dir)? else {
            return Ok(());
        };

        for name in entries {
            let relative = if relative_dir.is_empty() {
                name.trim_end_matches('/').to_string()
            } else {
                format!("{relative_dir}/{}", name.trim_end_matches('/'))
            };

            let relative = match validate_relative(&relative) {
                Ok(clean) => clean,
                Err(err) => {
                    tracing::warn!(entry = %name, error = %err, "ignoring unusable vault entry");
                    skipped.push(SkippedEntry {
                        path: relative,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if name.ends_with('/') {
                let dir_name = relative.rsplit('/').next().unwrap_or(&relative);
                if self.filter.is_excluded_name(dir_name) {
                    continue;
                }
                self.walk_remote(&relative, records, skipped)?;
                continue;
            }

            if !self.filter.matches(&relative) {
                continue;
            }

            match self.vault.read_note(&self.remote_path(&relative)) {
                Ok(note) => {
                    let record = FileRecord::new(relative.clone(), note.modified, note.size)
                        .with_content(note.content);
                    records.insert(relative, record);
                }
                Err(err) if err.aborts_pass() => return Err(err),
                Err(err) => {
                    tracing::warn!(path = %relative, error = %err, "failed to read vault note");
                    skipped.push(SkippedEntry {
                        path: relative,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
