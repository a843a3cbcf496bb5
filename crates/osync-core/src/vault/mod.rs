//! Access to the Obsidian vault
//!
//! [`VaultApi`] is the seam between reconciliation and the Local REST API
//! plugin. [`RestVault`] talks HTTP; [`MemoryVault`] keeps notes in memory.

mod memory;
mod rest;

pub use memory::MemoryVault;
pub use rest::{RestOptions, RestVault, encode_vault_path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Answer of the API's status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub versions: Option<serde_json::Value>,
}

/// A note read from the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteNote {
    /// Vault-relative path
    pub path: String,
    pub content: Vec<u8>,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// Operations the sync engine needs from a vault.
///
/// Paths are vault-relative with forward slashes. Directory entries returned
/// by [`VaultApi::list_dir`] end with `/`.
pub trait VaultApi {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Query the status endpoint.
    fn status(&self) -> Result<ServerStatus>;

    /// List one directory. `None` means the directory does not exist.
    fn list_dir(&self, dir: &str) -> Result<Option<Vec<String>>>;

    /// Read a note with its metadata.
    fn read_note(&self, path: &str) -> Result<RemoteNote>;

    /// Create or replace a note.
    fn write_note(&self, path: &str, content: &[u8]) -> Result<()>;
}
