//! Outcome of one sync pass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A path left untouched because of a per-file failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Transfers in one direction.
///
/// `created` holds paths that did not exist on the destination (uploads for
/// local -> Obsidian, downloads for Obsidian -> local); `updated` holds paths
/// overwritten after a conflict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

impl TransferStats {
    pub fn skip(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            path: path.into(),
            reason: reason.into(),
        });
    }

    /// Paths actually written to the destination.
    pub fn written(&self) -> impl Iterator<Item = &String> {
        self.created.iter().chain(self.updated.iter())
    }

    pub fn change_count(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// How a conflict ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConflictOutcome {
    KeptLocal,
    KeptObsidian,
    Merged,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub path: String,
    pub local_modified: DateTime<Utc>,
    pub remote_modified: DateTime<Utc>,
    pub strategy: String,
    #[serde(flatten)]
    pub outcome: ConflictOutcome,
}

/// The single action a pass took on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAction {
    Upload,
    Download,
    Merge,
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub local_to_obsidian: TransferStats,
    pub obsidian_to_local: TransferStats,
    /// Paths written with new content on both sides
    pub merged: Vec<String>,
    pub conflicts: Vec<ConflictRecord>,
    pub unchanged: Vec<String>,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Snapshot taken before the pass, if any
    pub backup_path: Option<String>,
}

impl SyncResult {
    pub fn new(started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            local_to_obsidian: TransferStats::default(),
            obsidian_to_local: TransferStats::default(),
            merged: Vec::new(),
            conflicts: Vec::new(),
            unchanged: Vec::new(),
            dry_run,
            started_at,
            duration_ms: 0,
            backup_path: None,
        }
    }

    /// Paths newly created in the vault.
    pub fn uploaded(&self) -> &[String] {
        &self.local_to_obsidian.created
    }

    /// Paths newly created locally.
    pub fn downloaded(&self) -> &[String] {
        &self.obsidian_to_local.created
    }

    /// Notes written on either side.
    pub fn total_changes(&self) -> usize {
        self.local_to_obsidian.change_count()
            + self.obsidian_to_local.change_count()
            + self.merged.len()
    }

    pub fn total_skipped(&self) -> usize {
        self.local_to_obsidian.skipped.len() + self.obsidian_to_local.skipped.len()
    }

    pub fn failed_conflicts(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|c| matches!(c.outcome, ConflictOutcome::Failed { .. }))
            .count()
    }

    /// Whether any path was skipped or left unresolved.
    pub fn has_failures(&self) -> bool {
        self.total_skipped() > 0 || self.failed_conflicts() > 0
    }

    /// Every write the pass made, in no particular order.
    pub fn actions(&self) -> Vec<(String, PathAction)> {
        let uploads = self
            .local_to_obsidian
            .written()
            .map(|p| (p.clone(), PathAction::Upload));
        let downloads = self
            .obsidian_to_local
            .written()
            .map(|p| (p.clone(), PathAction::Download));
        let merges = self.merged.iter().map(|p| (p.clone(), PathAction::Merge));
        uploads.chain(downloads).chain(merges).collect()
    }

    /// One-line summary for logs and notifications.
    pub fn summary_line(&self) -> String {
        format!(
            "{} uploaded, {} downloaded, {} updated, {} merged, {} unchanged, {} skipped, {} conflicts",
            self.local_to_obsidian.created.len(),
            self.obsidian_to_local.created.len(),
            self.local_to_obsidian.updated.len() + self.obsidian_to_local.updated.len(),
            self.merged.len(),
            self.unchanged.len(),
            self.total_skipped(),
            self.conflicts.len(),
        )
    }
}
