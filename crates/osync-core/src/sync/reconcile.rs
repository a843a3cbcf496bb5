//! Planning: one action per path from the two listings

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    /// Only the local side has the note
    Upload,
    /// Only the vault has the note
    Download,
    /// Both sides have it with equal modification times
    Unchanged,
    /// Both sides have it and the times differ beyond the tolerance
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub path: String,
    pub action: PlannedAction,
}

/// Whether two modification times are equal within `tolerance`.
pub fn within_tolerance(a: DateTime<Utc>, b: DateTime<Utc>, tolerance: Duration) -> bool {
    let delta = (a - b).abs();
    delta.to_std().map(|d| d <= tolerance).unwrap_or(false)
}

/// Classify every path present on either side, in path order.
pub fn plan(
    local: &BTreeMap<String, FileRecord>,
    remote: &BTreeMap<String, FileRecord>,
    tolerance: Duration,
) -> Vec<PlanEntry> {
    let paths: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let action = match (local.get(path), remote.get(path)) {
                (Some(_), None) => PlannedAction::Upload,
                (None, Some(_)) => PlannedAction::Download,
                (Some(l), Some(r)) if within_tolerance(l.modified, r.modified, tolerance) => {
                    PlannedAction::Unchanged
                }
                (Some(_), Some(_)) => PlannedAction::Conflict,
                (None, None) => return None,
            };
            Some(PlanEntry {
                path: path.clone(),
                action,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn record(path: &str, secs: i64, millis: u32) -> FileRecord {
        let time = Utc.timestamp_opt(secs, millis * 1_000_000).unwrap();
        FileRecord::new(path, time, 0)
    }

    fn map(records: Vec<FileRecord>) -> BTreeMap<String, FileRecord> {
        records
            .into_iter()
            .map(|r| (r.relative_path.clone(), r))
            .collect()
    }

    #[rstest]
    #[case(0, 0, PlannedAction::Unchanged)]
    #[case(0, 999, PlannedAction::Unchanged)]
    #[case(1, 0, PlannedAction::Unchanged)]
    #[case(1, 1, PlannedAction::Conflict)]
    #[case(120, 0, PlannedAction::Conflict)]
    fn tolerance_boundary(#[case] secs: i64, #[case] millis: u32, #[case] expected: PlannedAction) {
        let local = map(vec![record("a.md", 1_000, 0)]);
        let remote = map(vec![record("a.md", 1_000 + secs, millis)]);

        let entries = plan(&local, &remote, Duration::from_secs(1));
        assert_eq!(entries[0].action, expected);
    }

    #[test]
    fn one_sided_paths_transfer() {
        let local = map(vec![record("only-local.md", 10, 0)]);
        let remote = map(vec![record("only-remote.md", 10, 0)]);

        let entries = plan(&local, &remote, Duration::from_secs(1));
        assert_eq!(
            entries,
            vec![
                PlanEntry {
                    path: "only-local.md".into(),
                    action: PlannedAction::Upload
                },
                PlanEntry {
                    path: "only-remote.md".into(),
                    action: PlannedAction::Download
                },
            ]
        );
    }

    #[test]
    fn empty_sides_plan_nothing() {
        assert!(plan(&BTreeMap::new(), &BTreeMap::new(), Duration::from_secs(1)).is_empty());
    }
}
