//! In-memory vault

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{RemoteNote, ServerStatus, VaultApi};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    notes: BTreeMap<String, (Vec<u8>, DateTime<Utc>)>,
    failing_reads: BTreeSet<String>,
    failing_writes: BTreeSet<String>,
    offline: bool,
    unauthenticated: bool,
    writes: usize,
}

/// A vault held entirely in memory.
///
/// Behaves like the REST API as seen through [`VaultApi`] and can be told
/// to fail, which makes it the stand-in for the plugin in tests and dry
/// experiments.
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<State>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace a note with an explicit modification time.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>, modified: DateTime<Utc>) {
        self.lock()
            .notes
            .insert(path.trim_start_matches('/').to_string(), (content.into(), modified));
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().notes.get(path).map(|(content, _)| content.clone())
    }

    pub fn modified(&self, path: &str) -> Option<DateTime<Utc>> {
        self.lock().notes.get(path).map(|(_, modified)| *modified)
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.lock().notes.keys().cloned().collect()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn fail_reads_of(&self, path: &str) {
        self.lock().failing_reads.insert(path.to_string());
    }

    pub fn fail_writes_to(&self, path: &str) {
        self.lock().failing_writes.insert(path.to_string());
    }

    /// Simulate the API being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Simulate a rejected API key.
    pub fn set_unauthenticated(&self, unauthenticated: bool) {
        self.lock().unauthenticated = unauthenticated;
    }

    fn check_reachable(&self, state: &State) -> Result<()> {
        if state.offline {
            return Err(Error::Connectivity {
                endpoint: self.describe(),
                status: None,
                message: "vault is offline".to_string(),
            });
        }
        if state.unauthenticated {
            return Err(Error::Auth {
                status: Some(401),
                message: "401 Unauthorized".to_string(),
            });
        }
        Ok(())
    }

    fn http_error(path: &str, status: u16) -> Error {
        Error::Connectivity {
            endpoint: format!("memory:/vault/{path}"),
            status: Some(status),
            message: format!("simulated HTTP {status}"),
        }
    }
}

impl VaultApi for MemoryVault {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn status(&self) -> Result<ServerStatus> {
        let state = self.lock();
        if state.offline {
            self.check_reachable(&state)?;
        }
        Ok(ServerStatus {
            authenticated: !state.unauthenticated,
            service: Some("memory vault".to_string()),
            versions: None,
        })
    }

    fn list_dir(&self, dir: &str) -> Result<Option<Vec<String>>> {
        let state = self.lock();
        self.check_reachable(&state)?;

        let dir = dir.trim_matches('/');
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut entries = BTreeSet::new();
        for path in state.notes.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => entries.insert(format!("{child}/")),
                None => entries.insert(rest.to_string()),
            };
        }

        if entries.is_empty() && !dir.is_empty() {
            return Ok(None);
        }
        Ok(Some(entries.into_iter().collect()))
    }

    fn read_note(&self, path: &str) -> Result<RemoteNote> {
        let state = self.lock();
        self.check_reachable(&state)?;

        if state.failing_reads.contains(path) {
            return Err(Self::http_error(path, 500));
        }
        let (content, modified) = state
            .notes
            .get(path)
            .ok_or_else(|| Self::http_error(path, 404))?;

        Ok(RemoteNote {
            path: path.to_string(),
            size: content.len() as u64,
            content: content.clone(),
            modified: *modified,
        })
    }

    fn write_note(&self, path: &str, content: &[u8]) -> Result<()> {
        let mut state = self.lock();
        self.check_reachable(&state)?;

        if state.failing_writes.contains(path) {
            return Err(Self::http_error(path, 500));
        }
        state
            .notes
            .insert(path.to_string(), (content.to_vec(), Utc::now()));
        state.writes += 1;
        Ok(())
    }
}
