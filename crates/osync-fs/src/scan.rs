//! Recursive scan of the local notes directory

use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::{Error, FileFilter, NormalizedPath, Result};

/// A file found under the local notes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Forward-slash path relative to the scanned root
    pub relative_path: String,
    pub modified: SystemTime,
    pub size: u64,
}

/// List every file under `root` accepted by `filter`.
///
/// Excluded directories are pruned rather than walked. A missing root yields
/// an empty list. Results are sorted by relative path.
pub fn scan_dir(root: &Path, filter: &FileFilter) -> Result<Vec<LocalEntry>> {
    if !root.exists() {
        tracing::debug!(root = %root.display(), "scan root does not exist");
        return Ok(Vec::new());
    }

    let base = NormalizedPath::new(root);
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !filter.is_excluded_name(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry.map_err(|err| Error::Walk {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: err.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = NormalizedPath::new(entry.path()).relative_to(&base) else {
            continue;
        };
        if !filter.matches(&relative) {
            continue;
        }

        let metadata = entry
            .metadata()
            .map_err(|err| Error::Walk {
                path: entry.path().to_path_buf(),
                message: err.to_string(),
            })?;
        let modified = metadata
            .modified()
            .map_err(|e| Error::io(entry.path(), e))?;

        entries.push(LocalEntry {
            relative_path: relative,
            modified,
            size: metadata.len(),
        });
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(root = %root.display(), count = entries.len(), "scanned local notes");
    Ok(entries)
}
