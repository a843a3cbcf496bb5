//! Snapshot and overwrite backup management

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use osync_fs::checksum::compute_checksum;
use osync_fs::{ConfigStore, FileFilter, NormalizedPath, io, scan_dir};
use serde::{Deserialize, Serialize};

use crate::config::ProjectConfig;
use crate::sync::Side;
use crate::Result;

const SNAPSHOTS_DIR: &str = "snapshots";
const OVERWRITES_DIR: &str = "overwrites";
const METADATA_FILE: &str = "metadata.toml";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A file captured in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackedUpFile {
    pub path: String,
    pub checksum: String,
}

/// Metadata written next to every snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created: DateTime<Utc>,
    /// Notes directory the snapshot was taken from
    pub source: String,
    pub files: Vec<BackedUpFile>,
}

/// A snapshot directory on disk
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub path: NormalizedPath,
    /// `None` when the metadata file is missing or unreadable
    pub metadata: Option<SnapshotMetadata>,
}

impl Snapshot {
    pub fn file_count(&self) -> usize {
        self.metadata.as_ref().map_or(0, |m| m.files.len())
    }
}

/// Creates, lists and prunes backups under one backup root.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_root: NormalizedPath,
    notes_dir: NormalizedPath,
    store: ConfigStore,
}

impl BackupManager {
    pub fn new(backup_root: impl AsRef<Path>, notes_dir: impl AsRef<Path>) -> Self {
        Self {
            backup_root: NormalizedPath::new(backup_root),
            notes_dir: NormalizedPath::new(notes_dir),
            store: ConfigStore::new(),
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.backup_root(), config.local_notes_dir())
    }

    pub fn backup_root(&self) -> &NormalizedPath {
        &self.backup_root
    }

    fn snapshots_dir(&self) -> NormalizedPath {
        self.backup_root.join(SNAPSHOTS_DIR)
    }

    /// Copy the whole notes directory into a new timestamped snapshot.
    ///
    /// Returns `None` when there is no notes directory to copy.
    pub fn create_snapshot(&self) -> Result<Option<Snapshot>> {
        if !self.notes_dir.is_dir() {
            tracing::debug!(notes = %self.notes_dir.as_str(), "no notes directory to snapshot");
            return Ok(None);
        }

        let (name, dir) = unique_dir(&self.snapshots_dir());
        let target = dir.join("notes");
        fs::create_dir_all(target.to_native())?;

        let mut files = Vec::new();
        for entry in scan_dir(&self.notes_dir.to_native(), &FileFilter::allow_all())? {
            let source = self.notes_dir.join(&entry.relative_path);
            let content = io::read_bytes(&source)?;
            io::write_atomic(&target.join(&entry.relative_path), &content)?;
            files.push(BackedUpFile {
                checksum: compute_checksum(&content),
                path: entry.relative_path,
            });
        }

        let metadata = SnapshotMetadata {
            created: Utc::now(),
            source: self.notes_dir.as_str().to_string(),
            files,
        };
        self.store.save(&dir.join(METADATA_FILE), &metadata)?;

        tracing::info!(
            snapshot = %dir.as_str(),
            files = metadata.files.len(),
            "created notes snapshot"
        );
        Ok(Some(Snapshot {
            name,
            path: dir,
            metadata: Some(metadata),
        }))
    }

    /// Snapshots from oldest to newest.
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        let dir = self.snapshots_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(dir.to_native())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = dir.join(&name);
            let metadata_path = path.join(METADATA_FILE);
            let metadata = if metadata_path.exists() {
                match self.store.load::<SnapshotMetadata>(&metadata_path) {
                    Ok(metadata) => Some(metadata),
                    Err(err) => {
                        tracing::warn!(snapshot = %name, error = %err, "unreadable snapshot metadata");
                        None
                    }
                }
            } else {
                None
            };
            snapshots.push(Snapshot {
                name,
                path,
                metadata,
            });
        }

        snapshots.sort_by(|a, b| order_key(&a.name).cmp(&order_key(&b.name)));
        Ok(snapshots)
    }

    /// Delete the oldest snapshots and overwrite sets beyond `max_backups`
    /// each.
    ///
    /// Returns the removed snapshot directories.
    pub fn cleanup(&self, max_backups: usize) -> Result<Vec<NormalizedPath>> {
        let snapshots = self.list_snapshots()?;
        let excess = snapshots.len().saturating_sub(max_backups);

        let mut removed = Vec::with_capacity(excess);
        for snapshot in snapshots.into_iter().take(excess) {
            fs::remove_dir_all(snapshot.path.to_native())?;
            tracing::info!(snapshot = %snapshot.name, "removed old snapshot");
            removed.push(snapshot.path);
        }

        self.prune_overwrites(max_backups)?;
        Ok(removed)
    }

    /// Overwrite set directories, oldest first.
    pub fn list_overwrites(&self) -> Result<Vec<NormalizedPath>> {
        let dir = self.backup_root.join(OVERWRITES_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir.to_native())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort_by(|a, b| order_key(a).cmp(&order_key(b)));
        Ok(names.iter().map(|name| dir.join(name)).collect())
    }

    fn prune_overwrites(&self, max_backups: usize) -> Result<()> {
        let sets = self.list_overwrites()?;
        let excess = sets.len().saturating_sub(max_backups);
        for set in sets.into_iter().take(excess) {
            fs::remove_dir_all(set.to_native())?;
            tracing::info!(overwrites = %set.as_str(), "removed old overwrite backups");
        }
        Ok(())
    }

    /// Start collecting overwrite backups for one pass.
    ///
    /// The directory is only created once something is saved.
    pub fn begin_overwrites(&self) -> OverwriteSession {
        let (_, dir) = unique_dir(&self.backup_root.join(OVERWRITES_DIR));
        OverwriteSession { dir }
    }
}

/// Overwrite backups of a single pass
#[derive(Debug, Clone)]
pub struct OverwriteSession {
    dir: NormalizedPath,
}

impl OverwriteSession {
    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Save the version of a note about to be replaced on `side`.
    pub fn save(&self, side: Side, relative: &str, content: &[u8]) -> Result<NormalizedPath> {
        let path = self.dir.join(&side.to_string()).join(relative);
        io::write_atomic(&path, content)?;
        tracing::debug!(backup = %path.as_str(), "saved overwritten version");
        Ok(path)
    }
}

/// A timestamped directory under `parent` that sorts after every existing
/// directory from the same second.
fn unique_dir(parent: &NormalizedPath) -> (String, NormalizedPath) {
    let stamp = Local::now().format(STAMP_FORMAT).to_string();

    let highest = fs::read_dir(parent.to_native())
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let (prefix, suffix) = order_key(&name);
                    (prefix == stamp).then_some(suffix)
                })
                .max()
        })
        .unwrap_or(None);

    let name = match highest {
        None => stamp,
        Some(suffix) => format!("{stamp}_{}", suffix + 1),
    };
    let dir = parent.join(&name);
    (name, dir)
}

/// Split `<stamp>[_<n>]` into its stamp and numeric suffix (0 when absent).
fn order_key(name: &str) -> (&str, u32) {
    let stamp_len = "YYYYmmdd_HHMMSS".len();
    match (name.get(..stamp_len), name.get(stamp_len..)) {
        (Some(stamp), Some("")) => (stamp, 0),
        (Some(stamp), Some(rest)) => match rest.strip_prefix('_').and_then(|n| n.parse().ok()) {
            Some(n) => (stamp, n),
            None => (name, 0),
        },
        _ => (name, 0),
    }
}
