//! Conflict resolution strategies

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use osync_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use super::merge::merge_lines;
use crate::{Error, Result};

/// How a path modified on both sides is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// The side with the later modification time wins
    #[default]
    NewerWins,
    LocalWins,
    ObsidianWins,
    /// Additive line merge, falling back to `NewerWins`
    Merge,
    /// Ask the operator for each conflict
    Interactive,
}

impl ConflictStrategy {
    pub const ALL: [ConflictStrategy; 5] = [
        ConflictStrategy::NewerWins,
        ConflictStrategy::LocalWins,
        ConflictStrategy::ObsidianWins,
        ConflictStrategy::Merge,
        ConflictStrategy::Interactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::NewerWins => "newer_wins",
            ConflictStrategy::LocalWins => "local_wins",
            ConflictStrategy::ObsidianWins => "obsidian_wins",
            ConflictStrategy::Merge => "merge",
            ConflictStrategy::Interactive => "interactive",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConflictStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown conflict strategy '{s}' (expected one of: {})",
                    ConflictStrategy::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }
}

/// Both versions of a note that changed on both sides.
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    pub path: &'a str,
    /// Local file backing `local`, re-read after an interactive edit
    pub local_file: &'a Path,
    pub local: &'a [u8],
    pub remote: &'a [u8],
    pub local_modified: DateTime<Utc>,
    pub remote_modified: DateTime<Utc>,
}

/// The content that wins a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    KeepLocal,
    KeepObsidian,
    /// New content differing from both versions
    Merged(Vec<u8>),
}

impl Resolution {
    /// Classify resolved content against the two originals.
    pub fn from_content(content: Vec<u8>, local: &[u8], remote: &[u8]) -> Self {
        if content == local {
            Resolution::KeepLocal
        } else if content == remote {
            Resolution::KeepObsidian
        } else {
            Resolution::Merged(content)
        }
    }
}

/// A resolution and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConflict {
    pub resolution: Resolution,
    /// e.g. `newer_wins`, `merge`, `merge->newer_wins`, `interactive:local`, `custom`
    pub strategy: String,
}

/// What the operator picked for one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    KeepLocal,
    KeepObsidian,
    Merge,
    /// Edit the local file by hand, then keep the edited version
    EditLocal,
}

/// Source of operator decisions for the interactive strategy.
pub trait ConflictPrompt {
    fn choose(&mut self, conflict: &Conflict<'_>) -> Result<PromptChoice>;

    /// Block until the operator has finished editing the local file.
    fn wait_for_edit(&mut self, conflict: &Conflict<'_>) -> Result<()>;
}

/// Caller-supplied resolver: `(local, remote, path) -> resolved content`.
pub type CustomResolveFn = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Applies a [`ConflictStrategy`], a custom function, or an operator prompt.
pub struct ConflictResolver {
    strategy: ConflictStrategy,
    custom: Option<CustomResolveFn>,
    prompt: Option<Box<dyn ConflictPrompt>>,
}

impl fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("strategy", &self.strategy)
            .field("custom", &self.custom.is_some())
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

impl ConflictResolver {
    pub fn new(strategy: ConflictStrategy) -> Self {
        Self {
            strategy,
            custom: None,
            prompt: None,
        }
    }

    /// Resolve every conflict with `resolve`, whatever the strategy.
    pub fn with_custom(
        mut self,
        resolve: impl Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.custom = Some(Arc::new(resolve));
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn ConflictPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Decide which content wins a conflict.
    ///
    /// Fails with [`Error::ConflictResolution`] when the interactive strategy
    /// has no prompt, when a custom function meets non-UTF-8 content, or when
    /// the prompt itself fails.
    pub fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<ResolvedConflict> {
        if let Some(custom) = &self.custom {
            let local = as_text(conflict, conflict.local, "local")?;
            let remote = as_text(conflict, conflict.remote, "obsidian")?;
            let content = custom(local, remote, conflict.path).into_bytes();
            return Ok(ResolvedConflict {
                resolution: Resolution::from_content(content, conflict.local, conflict.remote),
                strategy: "custom".to_string(),
            });
        }

        match self.strategy {
            ConflictStrategy::NewerWins => Ok(newer_wins(conflict, "newer_wins")),
            ConflictStrategy::LocalWins => Ok(ResolvedConflict {
                resolution: Resolution::KeepLocal,
                strategy: "local_wins".to_string(),
            }),
            ConflictStrategy::ObsidianWins => Ok(ResolvedConflict {
                resolution: Resolution::KeepObsidian,
                strategy: "obsidian_wins".to_string(),
            }),
            ConflictStrategy::Merge => Ok(merge_or_newer(conflict, "merge")),
            ConflictStrategy::Interactive => self.ask(conflict),
        }
    }

    fn ask(&mut self, conflict: &Conflict<'_>) -> Result<ResolvedConflict> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Err(Error::conflict(
                conflict.path,
                "interactive resolution requested but no prompt is available",
            ));
        };

        let choice = prompt
            .choose(conflict)
            .map_err(|err| Error::conflict(conflict.path, err.to_string()))?;

        let resolved = match choice {
            PromptChoice::KeepLocal => ResolvedConflict {
                resolution: Resolution::KeepLocal,
                strategy: "interactive:local".to_string(),
            },
            PromptChoice::KeepObsidian => ResolvedConflict {
                resolution: Resolution::KeepObsidian,
                strategy: "interactive:obsidian".to_string(),
            },
            PromptChoice::Merge => merge_or_newer(conflict, "interactive:merge"),
            PromptChoice::EditLocal => {
                prompt
                    .wait_for_edit(conflict)
                    .map_err(|err| Error::conflict(conflict.path, err.to_string()))?;
                let edited = io::read_bytes(&NormalizedPath::new(conflict.local_file))
                    .map_err(|err| Error::conflict(conflict.path, err.to_string()))?;
                ResolvedConflict {
                    resolution: Resolution::from_content(edited, conflict.local, conflict.remote),
                    strategy: "interactive:edit".to_string(),
                }
            }
        };
        Ok(resolved)
    }
}

fn as_text<'a>(conflict: &Conflict<'_>, content: &'a [u8], side: &str) -> Result<&'a str> {
    std::str::from_utf8(content).map_err(|_| {
        Error::conflict(conflict.path, format!("{side} content is not valid UTF-8"))
    })
}

fn newer_wins(conflict: &Conflict<'_>, label: &str) -> ResolvedConflict {
    let resolution = if conflict.local_modified >= conflict.remote_modified {
        Resolution::KeepLocal
    } else {
        Resolution::KeepObsidian
    };
    ResolvedConflict {
        resolution,
        strategy: label.to_string(),
    }
}

fn merge_or_newer(conflict: &Conflict<'_>, label: &str) -> ResolvedConflict {
    let texts = std::str::from_utf8(conflict.local)
        .ok()
        .zip(std::str::from_utf8(conflict.remote).ok());

    let Some((local, remote)) = texts else {
        tracing::info!(path = conflict.path, "binary content cannot be merged; using newer_wins");
        return newer_wins(conflict, &format!("{label}->newer_wins"));
    };

    match merge_lines(local, remote) {
        Ok(merged) => ResolvedConflict {
            resolution: Resolution::from_content(
                merged.into_bytes(),
                conflict.local,
                conflict.remote,
            ),
            strategy: label.to_string(),
        },
        Err(err) => {
            tracing::info!(path = conflict.path, reason = %err, "merge failed; using newer_wins");
            newer_wins(conflict, &format!("{label}->newer_wins"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn conflict<'a>(local: &'a str, remote: &'a str, local_newer: bool) -> Conflict<'a> {
        let older = Utc.timestamp_opt(1_000, 0).unwrap();
        let newer = Utc.timestamp_opt(2_000, 0).unwrap();
        Conflict {
            path: "note.md",
            local_file: Path::new("/nonexistent/note.md"),
            local: local.as_bytes(),
            remote: remote.as_bytes(),
            local_modified: if local_newer { newer } else { older },
            remote_modified: if local_newer { older } else { newer },
        }
    }

    #[rstest]
    #[case(ConflictStrategy::NewerWins, true, Resolution::KeepLocal)]
    #[case(ConflictStrategy::NewerWins, false, Resolution::KeepObsidian)]
    #[case(ConflictStrategy::LocalWins, false, Resolution::KeepLocal)]
    #[case(ConflictStrategy::ObsidianWins, true, Resolution::KeepObsidian)]
    fn simple_strategies(
        #[case] strategy: ConflictStrategy,
        #[case] local_newer: bool,
        #[case] expected: Resolution,
    ) {
        let mut resolver = ConflictResolver::new(strategy);
        let resolved = resolver.resolve(&conflict("L", "R", local_newer)).unwrap();
        assert_eq!(resolved.resolution, expected);
        assert_eq!(resolved.strategy, strategy.as_str());
    }

    #[test]
    fn merge_picks_the_superset() {
        let mut resolver = ConflictResolver::new(ConflictStrategy::Merge);
        let resolved = resolver
            .resolve(&conflict("a\nb\n", "a\nb\nc\n", true))
            .unwrap();
        assert_eq!(resolved.resolution, Resolution::KeepObsidian);
    }

    #[test]
    fn failed_merge_falls_back_to_newer_wins() {
        let mut resolver = ConflictResolver::new(ConflictStrategy::Merge);
        let resolved = resolver
            .resolve(&conflict("x: 1\n", "x: 2\n", true))
            .unwrap();
        assert_eq!(resolved.resolution, Resolution::KeepLocal);
        assert_eq!(resolved.strategy, "merge->newer_wins");
    }

    #[test]
    fn interactive_without_prompt_fails() {
        let mut resolver = ConflictResolver::new(ConflictStrategy::Interactive);
        let err = resolver.resolve(&conflict("L", "R", true)).unwrap_err();
        assert!(matches!(err, Error::ConflictResolution { .. }));
    }

    #[test]
    fn custom_function_overrides_strategy() {
        let mut resolver = ConflictResolver::new(ConflictStrategy::LocalWins)
            .with_custom(|local, remote, path| format!("{path}: {local}+{remote}"));
        let resolved = resolver.resolve(&conflict("L", "R", true)).unwrap();
        assert_eq!(
            resolved.resolution,
            Resolution::Merged(b"note.md: L+R".to_vec())
        );
        assert_eq!(resolved.strategy, "custom");
    }

    #[test]
    fn custom_result_equal_to_remote_keeps_obsidian() {
        let mut resolver =
            ConflictResolver::new(ConflictStrategy::NewerWins).with_custom(|_, r, _| r.to_string());
        let resolved = resolver.resolve(&conflict("L", "R", true)).unwrap();
        assert_eq!(resolved.resolution, Resolution::KeepObsidian);
    }

    struct Scripted(PromptChoice);

    impl ConflictPrompt for Scripted {
        fn choose(&mut self, _conflict: &Conflict<'_>) -> Result<PromptChoice> {
            Ok(self.0)
        }

        fn wait_for_edit(&mut self, _conflict: &Conflict<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn interactive_uses_the_prompt_choice() {
        let mut resolver = ConflictResolver::new(ConflictStrategy::Interactive)
            .with_prompt(Box::new(Scripted(PromptChoice::KeepObsidian)));
        let resolved = resolver.resolve(&conflict("L", "R", true)).unwrap();
        assert_eq!(resolved.resolution, Resolution::KeepObsidian);
        assert_eq!(resolved.strategy, "interactive:obsidian");
    }

    #[test]
    fn interactive_edit_rereads_the_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "hand edited\n").unwrap();

        let mut c = conflict("L", "R", true);
        c.local_file = &file;

        let mut resolver = ConflictResolver::new(ConflictStrategy::Interactive)
            .with_prompt(Box::new(Scripted(PromptChoice::EditLocal)));
        let resolved = resolver.resolve(&c).unwrap();
        assert_eq!(
            resolved.resolution,
            Resolution::Merged(b"hand edited\n".to_vec())
        );
    }

    #[test]
    fn strategy_round_trips_through_strings() {
        for strategy in ConflictStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<ConflictStrategy>().unwrap(), strategy);
        }
        assert!("coin_flip".parse::<ConflictStrategy>().is_err());
    }
}
