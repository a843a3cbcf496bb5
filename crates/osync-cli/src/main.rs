//! Obsidian Sync CLI
//!
//! Keeps a project's local Markdown notes and a folder of an Obsidian vault
//! in step through the Local REST API plugin.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;
mod logging;

use clap::Parser;
use colored::Colorize;
use osync_core::{InitOptions, ProjectConfig};

use cli::{Cli, Commands, LogLevel};
use error::Result;
use logging::LogTarget;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let project = context::resolve_project(cli.project_dir.as_deref(), &cwd);
    let root = project.root().to_path_buf();

    // Init must not load (and so auto-create) the settings it is about to write
    if let Some(Commands::Init {
        project_name,
        vault_path,
        notes_dir,
        force,
    }) = cli.command
    {
        let _guard = logging::init(LogTarget {
            level: cli.log_level.unwrap_or(LogLevel::Info),
            file: None,
            keep_files: 0,
        })?;
        let options = InitOptions {
            project_name,
            vault_path,
            notes_dir,
            force,
        };
        return commands::run_init(&root, &options);
    }

    let config = ProjectConfig::load(&root)?;
    let log_file = config.log_file();
    let _guard = logging::init(LogTarget {
        level: cli
            .log_level
            .or_else(|| LogLevel::from_setting(&config.settings.logging.level))
            .unwrap_or(LogLevel::Info),
        file: log_file.as_deref(),
        keep_files: config.settings.logging.backup_count,
    })?;
    tracing::debug!(root = %root.display(), configured = project.is_configured(), "project resolved");

    match cli.command {
        None => commands::run_sync(&config, &cli.sync),
        Some(Commands::Sync(args)) => commands::run_sync(&config, &args),
        Some(Commands::Test { verbose }) => commands::run_test(&config, verbose),
        Some(Commands::Config { format }) => commands::run_config(&config, format),
        Some(Commands::Backup { max_backups }) => commands::run_backup(&config, max_backups),
        // Handled above
        Some(Commands::Init { .. }) => Ok(()),
    }
}
