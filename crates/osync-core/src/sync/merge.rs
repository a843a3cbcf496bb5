//! Two-way additive line merge
//!
//! Without a common ancestor the only safe merges are additive: one side's
//! lines are a subset of the other's, or each side added lines in places the
//! other left untouched. Anything else is a [`MergeConflict`].

use std::collections::HashSet;

use similar::{DiffOp, TextDiff};

/// The two versions edited the same region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("both versions changed the region starting at line {line}")]
pub struct MergeConflict {
    /// 1-based line in the vault version
    pub line: usize,
}

/// Merge two versions of a note line by line.
pub fn merge_lines(local: &str, remote: &str) -> Result<String, MergeConflict> {
    if local == remote {
        return Ok(local.to_string());
    }

    let local_lines: HashSet<&str> = local.lines().collect();
    let remote_lines: HashSet<&str> = remote.lines().collect();
    if local_lines.is_subset(&remote_lines) {
        return Ok(remote.to_string());
    }
    if remote_lines.is_subset(&local_lines) {
        return Ok(local.to_string());
    }

    let remote_n = with_trailing_newline(remote);
    let local_n = with_trailing_newline(local);
    let diff = TextDiff::from_lines(remote_n.as_str(), local_n.as_str());
    let old = diff.old_slices();
    let new = diff.new_slices();

    let mut merged = String::with_capacity(remote_n.len() + local_n.len());
    // Last one-sided run: (was a deletion, its start in the vault version)
    let mut previous: Option<(bool, usize)> = None;

    for op in diff.ops() {
        match *op {
            DiffOp::Equal { old_index, len, .. } => {
                merged.extend(old[old_index..old_index + len].iter().copied());
                previous = None;
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                // Adjacent delete and insert is a replacement in disguise
                if let Some((false, _)) = previous {
                    return Err(MergeConflict { line: old_index + 1 });
                }
                merged.extend(old[old_index..old_index + old_len].iter().copied());
                previous = Some((true, old_index));
            }
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => {
                if let Some((true, start)) = previous {
                    return Err(MergeConflict { line: start + 1 });
                }
                merged.extend(new[new_index..new_index + new_len].iter().copied());
                previous = Some((false, old_index));
            }
            DiffOp::Replace { old_index, .. } => {
                return Err(MergeConflict { line: old_index + 1 });
            }
        }
    }

    if !local.ends_with('\n') && !remote.ends_with('\n') && merged.ends_with('\n') {
        merged.pop();
    }
    Ok(merged)
}

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_versions_merge_to_themselves() {
        assert_eq!(merge_lines("a\nb\n", "a\nb\n").unwrap(), "a\nb\n");
    }

    #[test]
    fn superset_wins() {
        let local = "# Title\nline one\n";
        let remote = "# Title\nline one\nline two\n";
        assert_eq!(merge_lines(local, remote).unwrap(), remote);
        assert_eq!(merge_lines(remote, local).unwrap(), remote);
    }

    #[test]
    fn additions_in_separate_places_are_combined() {
        let remote = "intro\nmiddle\nend\n";
        let local = "intro\nlocal addition\nmiddle\nend\n";
        let remote_edit = "intro\nmiddle\nend\nremote addition\n";

        // Each side added a line the other lacks, in different places
        let merged = merge_lines(local, remote_edit).unwrap();
        assert_eq!(merged, "intro\nlocal addition\nmiddle\nend\nremote addition\n");
        assert_ne!(merged, remote);
    }

    #[test]
    fn edits_to_the_same_line_conflict() {
        let local = "title\nstatus: done\nfooter\n";
        let remote = "title\nstatus: blocked\nfooter\n";
        let err = merge_lines(local, remote).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn missing_trailing_newlines_are_preserved() {
        let remote = "a\nb";
        let local = "z\na";
        // Lines: remote {a, b}, local {z, a}; neither is a subset
        let merged = merge_lines(local, remote).unwrap();
        assert_eq!(merged, "z\na\nb");
    }
}
