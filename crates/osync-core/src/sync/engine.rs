//! SyncEngine implementation
//!
//! The SyncEngine runs one pass at a time: it lists both sides, plans an
//! action per path, resolves conflicts and writes the winners, then reports.

use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use osync_fs::io;

use super::lister::{DirectoryLister, Listing};
use super::reconcile::{PlannedAction, plan};
use super::record::{FileRecord, Side};
use super::report::{ConflictOutcome, ConflictRecord, SyncResult};
use super::resolver::{Conflict, ConflictResolver, Resolution};
use crate::backup::{BackupManager, OverwriteSession};
use crate::config::ProjectConfig;
use crate::notify::{Notifier, PassOutcome};
use crate::vault::VaultApi;
use crate::{Error, Result};

/// Options for a sync pass
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute and report the actions without writing anything
    pub dry_run: bool,
}

/// Where a pass currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Listing,
    Reconciling,
    Applying,
    Reporting,
}

/// Engine for synchronizing a notes directory with a vault folder
pub struct SyncEngine<'a> {
    config: &'a ProjectConfig,
    vault: &'a dyn VaultApi,
    resolver: ConflictResolver,
    notifier: Notifier,
    backups: BackupManager,
    options: SyncOptions,
    phase: SyncPhase,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine using the configured conflict strategy.
    pub fn new(config: &'a ProjectConfig, vault: &'a dyn VaultApi, options: SyncOptions) -> Self {
        Self {
            config,
            vault,
            resolver: ConflictResolver::new(config.settings.sync.conflict_resolution),
            notifier: Notifier::new(),
            backups: BackupManager::from_config(config),
            options,
            phase: SyncPhase::Idle,
        }
    }

    pub fn with_resolver(mut self, resolver: ConflictResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one pass and notify observers of its outcome.
    ///
    /// Per-file failures are recorded in the result. Only failures that make
    /// the whole pass impossible (unreachable API, rejected key, unusable
    /// configuration) are returned as errors.
    pub fn run(&mut self) -> Result<SyncResult> {
        let outcome = self.run_pass();
        self.phase = SyncPhase::Idle;

        match &outcome {
            Ok(result) => {
                tracing::info!(dry_run = result.dry_run, "{}", result.summary_line());
                self.notifier.notify(&PassOutcome::Completed(result));
            }
            Err(err) => {
                tracing::error!(error = %err, "sync pass failed");
                self.notifier.notify(&PassOutcome::Failed(err));
            }
        }
        outcome
    }

    fn run_pass(&mut self) -> Result<SyncResult> {
        let started = Instant::now();
        let mut result = SyncResult::new(Utc::now(), self.options.dry_run);
        let writes_enabled = !self.options.dry_run;
        let backups_enabled = writes_enabled && self.config.backups_enabled();

        self.phase = SyncPhase::Listing;
        let status = self.vault.status()?;
        if !status.authenticated {
            return Err(Error::Auth {
                status: None,
                message: "the server reports the API key as unauthenticated".to_string(),
            });
        }

        let lister = DirectoryLister::from_config(self.config, self.vault)?;

        if backups_enabled && self.config.settings.backup.backup_before_sync {
            match self.backups.create_snapshot() {
                Ok(Some(snapshot)) => result.backup_path = Some(snapshot.path.as_str().to_string()),
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "pre-sync snapshot failed"),
            }
        }

        let Listing {
            local,
            remote,
            skipped_remote,
        } = lister.list()?;
        result.obsidian_to_local.skipped.extend(skipped_remote);
        tracing::debug!(local = local.len(), remote = remote.len(), "listed both sides");

        self.phase = SyncPhase::Reconciling;
        let entries = plan(&local, &remote, self.config.mtime_tolerance());

        self.phase = SyncPhase::Applying;
        let overwrites = backups_enabled.then(|| self.backups.begin_overwrites());
        let mut apply = Apply {
            lister: &lister,
            vault: self.vault,
            overwrites: overwrites.as_ref(),
            writes_enabled,
            result: &mut result,
        };

        for entry in entries {
            let path = entry.path.as_str();
            match entry.action {
                PlannedAction::Upload => apply.upload(path)?,
                PlannedAction::Download => {
                    if let Some(record) = remote.get(path) {
                        apply.download(record);
                    }
                }
                PlannedAction::Unchanged => apply.result.unchanged.push(entry.path.clone()),
                PlannedAction::Conflict => {
                    if let (Some(l), Some(r)) = (local.get(path), remote.get(path)) {
                        apply.conflict(&mut self.resolver, l, r)?;
                    }
                }
            }
        }

        self.phase = SyncPhase::Reporting;
        let backup = &self.config.settings.backup;
        if writes_enabled && backup.cleanup_old_backups {
            if let Err(err) = self.backups.cleanup(backup.max_backups) {
                tracing::warn!(error = %err, "failed to prune old backups");
            }
        }

        result.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(result)
    }
}

/// Per-pass state for writing the plan out.
///
/// Per-file failures are recorded as skipped. Errors for which
/// [`Error::aborts_pass`] holds are returned and end the pass.
struct Apply<'p> {
    lister: &'p DirectoryLister<'p>,
    vault: &'p dyn VaultApi,
    overwrites: Option<&'p OverwriteSession>,
    writes_enabled: bool,
    result: &'p mut SyncResult,
}

impl Apply<'_> {
    fn upload(&mut self, path: &str) -> Result<()> {
        let content = match self.lister.read_local(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path, error = %err, "cannot read local note");
                self.result.local_to_obsidian.skip(path, err.to_string());
                return Ok(());
            }
        };

        match self.push_remote(path, &content) {
            Ok(()) => self.result.local_to_obsidian.created.push(path.to_string()),
            Err(err) if err.aborts_pass() => return Err(err),
            Err(err) => {
                tracing::warn!(path, error = %err, "upload failed");
                self.result.local_to_obsidian.skip(path, err.to_string());
            }
        }
        Ok(())
    }

    fn download(&mut self, record: &FileRecord) {
        let path = record.relative_path.as_str();
        let Some(content) = record.content() else {
            self.result
                .obsidian_to_local
                .skip(path, "vault note was listed without content");
            return;
        };

        match self.write_local(path, content, record.modified) {
            Ok(()) => self.result.obsidian_to_local.created.push(path.to_string()),
            Err(err) => {
                tracing::warn!(path, error = %err, "download failed");
                self.result.obsidian_to_local.skip(path, err.to_string());
            }
        }
    }

    fn conflict(
        &mut self,
        resolver: &mut ConflictResolver,
        local: &FileRecord,
        remote: &FileRecord,
    ) -> Result<()> {
        let path = local.relative_path.as_str();

        let local_content = match self.lister.read_local(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path, error = %err, "cannot read local note");
                self.result.local_to_obsidian.skip(path, err.to_string());
                return Ok(());
            }
        };
        let remote_content = remote.content().unwrap_or_default();

        if local_content == remote_content {
            // Same text, different clocks: nothing to transfer
            self.result.unchanged.push(path.to_string());
            return Ok(());
        }

        let local_file = self.lister.local_path(path).to_native();
        let conflict = Conflict {
            path,
            local_file: &local_file,
            local: &local_content,
            remote: remote_content,
            local_modified: local.modified,
            remote_modified: remote.modified,
        };

        let (strategy, outcome) = match resolver.resolve(&conflict) {
            Ok(resolved) => {
                tracing::info!(path, strategy = %resolved.strategy, "resolved conflict");
                let outcome = self.apply_resolution(
                    path,
                    resolved.resolution,
                    &local_content,
                    remote_content,
                    remote.modified,
                )?;
                (resolved.strategy, outcome)
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "conflict left unresolved");
                let reason = err.to_string();
                (resolver.strategy().to_string(), ConflictOutcome::Failed { reason })
            }
        };

        self.result.conflicts.push(ConflictRecord {
            path: path.to_string(),
            local_modified: local.modified,
            remote_modified: remote.modified,
            strategy,
            outcome,
        });
        Ok(())
    }

    fn apply_resolution(
        &mut self,
        path: &str,
        resolution: Resolution,
        local_content: &[u8],
        remote_content: &[u8],
        remote_modified: DateTime<Utc>,
    ) -> Result<ConflictOutcome> {
        let failed = |err: &Error| ConflictOutcome::Failed {
            reason: err.to_string(),
        };

        let outcome = match resolution {
            Resolution::KeepLocal => {
                self.backup(Side::Obsidian, path, remote_content);
                match self.push_remote(path, local_content) {
                    Ok(()) => {
                        self.result.local_to_obsidian.updated.push(path.to_string());
                        ConflictOutcome::KeptLocal
                    }
                    Err(err) if err.aborts_pass() => return Err(err),
                    Err(err) => {
                        self.result.local_to_obsidian.skip(path, err.to_string());
                        failed(&err)
                    }
                }
            }
            Resolution::KeepObsidian => {
                self.backup(Side::Local, path, local_content);
                match self.write_local(path, remote_content, remote_modified) {
                    Ok(()) => {
                        self.result.obsidian_to_local.updated.push(path.to_string());
                        ConflictOutcome::KeptObsidian
                    }
                    Err(err) => {
                        self.result.obsidian_to_local.skip(path, err.to_string());
                        failed(&err)
                    }
                }
            }
            Resolution::Merged(content) => {
                self.backup(Side::Obsidian, path, remote_content);
                self.backup(Side::Local, path, local_content);
                match self.push_remote(path, &content) {
                    Ok(()) => {}
                    Err(err) if err.aborts_pass() => return Err(err),
                    Err(err) => {
                        self.result.local_to_obsidian.skip(path, err.to_string());
                        return Ok(failed(&err));
                    }
                }
                match self.write_local(path, &content, Utc::now()) {
                    Ok(()) => {
                        self.result.merged.push(path.to_string());
                        ConflictOutcome::Merged
                    }
                    Err(err) => {
                        // The vault already holds the merged text
                        self.result.local_to_obsidian.updated.push(path.to_string());
                        self.result.obsidian_to_local.skip(path, err.to_string());
                        failed(&err)
                    }
                }
            }
        };
        Ok(outcome)
    }

    fn push_remote(&self, path: &str, content: &[u8]) -> Result<()> {
        if !self.writes_enabled {
            return Ok(());
        }
        self.vault.write_note(&self.lister.remote_path(path), content)
    }

    /// Write a note locally and stamp it with the given modification time.
    fn write_local(&self, path: &str, content: &[u8], modified: DateTime<Utc>) -> Result<()> {
        if !self.writes_enabled {
            return Ok(());
        }
        let target = self.lister.local_path(path);
        io::write_atomic(&target, content)?;
        if let Err(err) = io::set_modified(&target, SystemTime::from(modified)) {
            tracing::warn!(path, error = %err, "could not set modification time");
        }
        Ok(())
    }

    fn backup(&self, side: Side, path: &str, content: &[u8]) {
        let Some(session) = self.overwrites else {
            return;
        };
        if let Err(err) = session.save(side, path, content) {
            tracing::warn!(path, side = %side, error = %err, "failed to back up overwritten note");
        }
    }
}
