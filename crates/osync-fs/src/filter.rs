//! Include-extension and exclude-pattern filtering for note paths

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::{Error, Result};

/// Decides which note paths take part in synchronization.
///
/// A path is included when its extension is in the include list (or the
/// list is empty) and none of its components matches an exclude pattern.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Lowercased extensions including the leading dot
    extensions: Vec<String>,
    excludes: GlobSet,
    patterns: Vec<String>,
}

impl FileFilter {
    /// Build a filter from configured extensions and glob patterns.
    ///
    /// Extensions may be written with or without a leading dot.
    pub fn new(include_extensions: &[String], exclude_patterns: &[String]) -> Result<Self> {
        let extensions = include_extensions
            .iter()
            .map(|ext| ext.trim())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let lower = ext.to_lowercase();
                if lower.starts_with('.') {
                    lower
                } else {
                    format!(".{lower}")
                }
            })
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            let glob = Glob::new(pattern).map_err(|err| Error::InvalidPattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
            builder.add(glob);
        }
        let excludes = builder.build().map_err(|err| Error::InvalidPattern {
            pattern: exclude_patterns.join(", "),
            message: err.to_string(),
        })?;

        Ok(Self {
            extensions,
            excludes,
            patterns: exclude_patterns.to_vec(),
        })
    }

    /// A filter that accepts every path.
    pub fn allow_all() -> Self {
        Self {
            extensions: Vec::new(),
            excludes: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// The configured exclude patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a single path component (file or directory name) is excluded.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        self.excludes.is_match(name)
    }

    /// Whether the file name carries an included extension.
    pub fn has_included_extension(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let lower = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.len() > ext.len() && lower.ends_with(ext.as_str()))
    }

    /// Whether a forward-slash relative path takes part in sync.
    pub fn matches(&self, relative_path: &str) -> bool {
        let mut components = relative_path.split('/').filter(|c| !c.is_empty()).peekable();
        let mut file_name = None;

        while let Some(component) = components.next() {
            if self.is_excluded_name(component) {
                return false;
            }
            if components.peek().is_none() {
                file_name = Some(component);
            }
        }

        file_name.is_some_and(|name| self.has_included_extension(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extension_without_dot_is_accepted() {
        let filter = FileFilter::new(&strings(&["md"]), &[]).unwrap();
        assert!(filter.matches("note.md"));
        assert!(!filter.matches("note.txt"));
    }

    #[test]
    fn bare_extension_is_not_a_file_name() {
        let filter = FileFilter::new(&strings(&[".md"]), &[]).unwrap();
        assert!(!filter.matches(".md"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = FileFilter::new(&[], &strings(&["a[b"])).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn allow_all_accepts_anything() {
        let filter = FileFilter::allow_all();
        assert!(filter.matches("deep/nested/file.bin"));
        assert!(!filter.matches(""));
    }
}
