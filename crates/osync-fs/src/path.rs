//! Slash-separated paths shared by the notes directory and the vault
//!
//! The REST API names notes with forward slashes. Local paths are converted
//! to the same form so both sides can be keyed by one relative string, and
//! turned back into native paths only when touching the disk.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A filesystem path stored with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    slashed: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            slashed: to_slashes(&path.as_ref().to_string_lossy()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.slashed
    }

    /// Native form for I/O calls.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.slashed)
    }

    /// Append a relative note path, which may span several directories.
    pub fn join(&self, relative: &str) -> Self {
        let relative = to_slashes(relative);
        let relative = relative.trim_start_matches('/');
        let base = self.slashed.trim_end_matches('/');

        let slashed = match (base.is_empty(), self.slashed.starts_with('/')) {
            (true, true) => format!("/{relative}"),
            (true, false) => relative.to_string(),
            _ => format!("{base}/{relative}"),
        };
        Self { slashed }
    }

    /// Last component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.slashed
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Extension without the dot. Dotfiles such as `.env` have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&name[dot + 1..]),
        }
    }

    /// The part of `self` below `base`, or `None` if `self` lies elsewhere.
    ///
    /// `notes_backup/a.md` is not below `notes`: the match is per component.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<String> {
        let rest = self
            .slashed
            .strip_prefix(base.slashed.trim_end_matches('/'))?;
        if rest.is_empty() {
            Some(String::new())
        } else {
            rest.strip_prefix('/').map(str::to_owned)
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

fn to_slashes(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Clean a note path that must stay inside a sync root.
///
/// Vault listings are untrusted: a name like `../../.bashrc` must never
/// become a write outside the notes directory. Leading `./`, empty and `.`
/// components are dropped from the result.
pub fn validate_relative(path: &str) -> Result<String> {
    let slashed = to_slashes(path);
    let reject = |reason: &str| Err(Error::invalid_path(path, reason));

    if slashed.trim().is_empty() {
        return reject("path is empty");
    }
    if slashed.starts_with('/') {
        return reject("path is absolute");
    }
    if slashed.as_bytes().get(1) == Some(&b':') {
        return reject("path has a drive prefix");
    }

    let mut kept = Vec::new();
    for component in slashed.split('/') {
        match component {
            "" | "." => {}
            ".." => return reject("path escapes the sync root"),
            name => kept.push(name),
        }
    }
    if kept.is_empty() {
        return reject("path has no file component");
    }
    Ok(kept.join("/"))
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.slashed)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slashed)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}
