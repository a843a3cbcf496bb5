//! Tracing setup for the command line
//!
//! Console output goes to stderr so that `--json` output on stdout stays
//! machine-readable. When the settings name a log file, a second layer writes
//! to a daily-rotated file next to it.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::LogLevel;
use crate::error::{CliError, Result};

/// Crates whose events honour the configured level; everything else is
/// limited to warnings.
const OWN_TARGETS: &[&str] = &["obsidian_sync", "osync_core", "osync_fs"];

/// Where log output goes.
pub struct LogTarget<'a> {
    pub level: LogLevel,
    /// Base log file; rotated files get a date suffix
    pub file: Option<&'a Path>,
    /// Rotated files to keep
    pub keep_files: usize,
}

/// Filter directives for a level.
pub fn filter_directives(level: LogLevel) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        OWN_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.directive())),
    );
    directives.join(",")
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the computed filter. The returned guard
/// must be held until exit so buffered file output is flushed.
pub fn init(target: LogTarget<'_>) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(target.level))
            .map_err(|err| CliError::user(format!("invalid log filter: {err}")))?,
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match target.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(
                path,
                target.keep_files,
            )?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|err| CliError::user(format!("failed to initialize logging: {err}")))?;

    Ok(guard)
}

fn rolling_appender(path: &Path, keep_files: usize) -> Result<RollingFileAppender> {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;

    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "obsidian_sync.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(keep_files.max(1))
        .build(directory)
        .map_err(|err| CliError::user(format!("cannot open log file {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_crates_follow_the_level() {
        let directives = filter_directives(LogLevel::Debug);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("osync_core=debug"));
        assert!(directives.contains("obsidian_sync=debug"));
    }

    #[test]
    fn directives_parse_as_a_filter() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
            assert!(EnvFilter::try_new(filter_directives(level)).is_ok());
        }
    }

    #[test]
    fn appender_creates_the_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/obsidian_sync.log");
        rolling_appender(&path, 5).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
