//! Core layer for obsidian-sync
//!
//! This crate holds everything between the command line and the filesystem:
//!
//! - **Configuration**: YAML settings, `.env` secrets and validation
//! - **Vault client**: the Obsidian Local REST API behind the [`VaultApi`] trait
//! - **Reconciliation**: listing, planning, conflict resolution and the [`SyncEngine`]
//! - **Backups**: pre-sync snapshots and overwrite backups
//! - **Notifications**: ordered observers of pass outcomes
//!
//! # Architecture
//!
//! ```text
//!              osync-cli
//!                  |
//!             osync-core
//!            /          \
//!      osync-fs     Obsidian REST API
//! ```

pub mod backup;
pub mod config;
pub mod error;
pub mod init;
pub mod notify;
pub mod sync;
pub mod vault;

pub use backup::{BackupManager, OverwriteSession, Snapshot, SnapshotMetadata};
pub use config::{ConfigSummary, ProjectConfig, Secrets, Settings};
pub use error::{Error, Result};
pub use init::{InitOptions, InitReport, initialize_project};
pub use notify::{FnObserver, Notifier, PassOutcome, SyncObserver, WebhookKind, WebhookObserver};
pub use sync::{
    Conflict, ConflictOutcome, ConflictPrompt, ConflictRecord, ConflictResolver,
    ConflictStrategy, DirectoryLister, FileRecord, Listing, PlanEntry, PlannedAction,
    PromptChoice, Resolution, Side, SkippedEntry, SyncEngine, SyncOptions, SyncPhase, SyncResult,
    TransferStats, watch,
};
pub use vault::{MemoryVault, RemoteNote, RestVault, ServerStatus, VaultApi};
