//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Obsidian Sync - keep a project's Markdown notes in step with an Obsidian vault
///
/// With no subcommand, runs a sync pass (same as `obsidian-sync sync`).
#[derive(Parser, Debug)]
#[command(name = "obsidian-sync")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Project directory (defaults to the nearest directory with a settings file)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Log level, overriding the settings file
    #[arg(short, long, global = true, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,

    #[command(flatten)]
    pub sync: SyncArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options for a sync run
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncArgs {
    /// Report what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep syncing at a fixed interval until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between passes in watch mode (defaults to the settings file)
    #[arg(short, long, value_name = "SECONDS", requires = "watch", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the settings file, .env.example, notes directory and a hub note
    ///
    /// Examples:
    ///   obsidian-sync init
    ///   obsidian-sync init -n atlas -v Work/Atlas
    Init {
        /// Project name (defaults to the directory name)
        #[arg(short = 'n', long)]
        project_name: Option<String>,

        /// Vault folder to mirror (defaults to 10-Projects/<project name>)
        #[arg(short, long)]
        vault_path: Option<String>,

        /// Local notes directory, relative to the project
        #[arg(short = 'd', long, default_value = "notes")]
        notes_dir: String,

        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a sync pass
    Sync(SyncArgs),

    /// Check that the Obsidian API is reachable and the key is accepted
    Test {
        /// Show connection details and the notes found
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Table)]
        format: ConfigFormat,
    },

    /// Snapshot the notes directory now
    Backup {
        /// Keep only this many snapshots afterwards
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        max_backups: Option<u64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level as written in the settings file (`DEBUG`, `warning`, ...).
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" | "critical" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// The matching tracing filter directive.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_syncs() {
        let cli = Cli::parse_from(["obsidian-sync"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.sync, SyncArgs::default());
    }

    #[test]
    fn top_level_sync_flags() {
        let cli = Cli::parse_from(["obsidian-sync", "--watch", "--interval", "5", "-n"]);
        assert!(cli.sync.watch);
        assert!(cli.sync.dry_run);
        assert_eq!(cli.sync.interval, Some(5));
    }

    #[test]
    fn interval_requires_watch() {
        assert!(Cli::try_parse_from(["obsidian-sync", "--interval", "5"]).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["obsidian-sync", "--watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn sync_subcommand_takes_the_same_flags() {
        let cli = Cli::parse_from(["obsidian-sync", "sync", "--json", "--dry-run"]);
        match cli.command {
            Some(Commands::Sync(args)) => {
                assert!(args.json);
                assert!(args.dry_run);
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn global_options_work_after_subcommands() {
        let cli = Cli::parse_from(["obsidian-sync", "config", "-C", "/tmp/p", "--log-level", "WARNING"]);
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.log_level, Some(LogLevel::Warning));
    }

    #[test]
    fn config_formats() {
        let cli = Cli::parse_from(["obsidian-sync", "config", "--format", "json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                format: ConfigFormat::Json
            })
        );
    }

    #[test]
    fn settings_levels_parse() {
        assert_eq!(LogLevel::from_setting("INFO"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_setting("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_setting("loud"), None);
    }
}
