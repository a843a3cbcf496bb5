//! Backups of notes before they are replaced
//!
//! Two kinds live under the backup root:
//!
//! - `snapshots/<timestamp>/` holds a full copy of the notes directory taken
//!   before a pass, plus `metadata.toml`
//! - `overwrites/<timestamp>/{local,obsidian}/` holds the previous version of
//!   each note a pass replaced after a conflict

mod manager;

pub use manager::{BackedUpFile, BackupManager, OverwriteSession, Snapshot, SnapshotMetadata};
