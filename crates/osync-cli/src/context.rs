//! Project context detection
//!
//! Commands work from anywhere inside a project: the project root is the
//! nearest ancestor holding a settings file.

use std::path::{Path, PathBuf};

use osync_core::config::{CONFIG_FILE, LEGACY_CONFIG_FILE};

/// The project a command operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectContext {
    /// A directory with a settings file
    Configured { root: PathBuf },
    /// No settings file found; the starting directory is used as-is
    Unconfigured { root: PathBuf },
}

impl ProjectContext {
    pub fn root(&self) -> &Path {
        match self {
            ProjectContext::Configured { root } | ProjectContext::Unconfigured { root } => root,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ProjectContext::Configured { .. })
    }
}

/// Walk up from `start` looking for a settings file.
pub fn detect_project(start: &Path) -> ProjectContext {
    for dir in start.ancestors() {
        if dir.join(CONFIG_FILE).is_file() || dir.join(LEGACY_CONFIG_FILE).is_file() {
            return ProjectContext::Configured {
                root: dir.to_path_buf(),
            };
        }
    }
    ProjectContext::Unconfigured {
        root: start.to_path_buf(),
    }
}

/// Resolve the project for a command.
///
/// An explicit directory is taken as the root without searching.
pub fn resolve_project(explicit: Option<&Path>, cwd: &Path) -> ProjectContext {
    match explicit {
        Some(dir) => {
            let root = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                cwd.join(dir)
            };
            if root.join(CONFIG_FILE).is_file() || root.join(LEGACY_CONFIG_FILE).is_file() {
                ProjectContext::Configured { root }
            } else {
                ProjectContext::Unconfigured { root }
            }
        }
        None => detect_project(cwd),
    }
}
