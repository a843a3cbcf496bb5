//! Per-file metadata shared by both sides

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two places a note lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Local,
    Obsidian,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => write!(f, "local"),
            Side::Obsidian => write!(f, "obsidian"),
        }
    }
}

/// A note on one side, keyed by its path relative to the synced folder.
///
/// Remote records carry their content because the API returns it with the
/// metadata; local content is read only when a pass needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub relative_path: String,
    pub modified: DateTime<Utc>,
    pub size: u64,
    content: Option<Vec<u8>>,
}

impl FileRecord {
    pub fn new(relative_path: impl Into<String>, modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            modified,
            size,
            content: None,
        }
    }

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.size = content.len() as u64;
        self.content = Some(content);
        self
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }
}
