//! Sync command: one pass, or repeated passes in watch mode

use std::time::Duration;

use colored::Colorize;
use osync_core::{
    ConflictOutcome, ConflictResolver, ConflictStrategy, Notifier, ProjectConfig, RestVault,
    SyncEngine, SyncOptions, SyncResult,
};
use osync_core::sync::watch::watch;

use crate::cli::SyncArgs;
use crate::error::Result;
use crate::interactive::TerminalPrompt;

/// Run the sync command.
pub fn run_sync(config: &ProjectConfig, args: &SyncArgs) -> Result<()> {
    let vault = RestVault::from_config(config)?;

    let strategy = config.settings.sync.conflict_resolution;
    let mut resolver = ConflictResolver::new(strategy);
    if strategy == ConflictStrategy::Interactive {
        resolver = resolver.with_prompt(Box::new(TerminalPrompt::new()));
    }

    let mut engine = SyncEngine::new(
        config,
        &vault,
        SyncOptions {
            dry_run: args.dry_run,
        },
    )
    .with_resolver(resolver)
    .with_notifier(Notifier::from_config(config));

    if !args.json {
        let mode = if args.dry_run { " (dry run)" } else { "" };
        println!(
            "{} Syncing {} with {}{}",
            "=>".blue().bold(),
            config.local_notes_dir().display().to_string().cyan(),
            config.vault_project_path().cyan(),
            mode
        );
    }

    if !args.watch {
        let result = engine.run()?;
        return print_result(&result, args.json);
    }

    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.sync_interval());
    if !args.json {
        println!(
            "Watching every {}s. Press {} to stop.",
            interval.as_secs(),
            "Ctrl+C".cyan()
        );
    }

    watch(&mut engine, interval, None, |cycle, outcome| match outcome {
        Ok(result) => {
            if let Err(err) = print_result(result, args.json) {
                tracing::warn!(cycle, error = %err, "could not print sync result");
            }
        }
        Err(err) => eprintln!(
            "{} pass {} failed: {}",
            "error".red().bold(),
            cycle,
            err
        ),
    });
    Ok(())
}

/// Print one pass's result as a coloured report or JSON.
pub fn print_result(result: &SyncResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    for path in &result.local_to_obsidian.created {
        println!("   {} {} {}", "+".green(), path, "-> Obsidian".dimmed());
    }
    for path in &result.local_to_obsidian.updated {
        println!("   {} {} {}", "~".yellow(), path, "-> Obsidian".dimmed());
    }
    for path in &result.obsidian_to_local.created {
        println!("   {} {} {}", "+".green(), path, "-> local".dimmed());
    }
    for path in &result.obsidian_to_local.updated {
        println!("   {} {} {}", "~".yellow(), path, "-> local".dimmed());
    }
    for path in &result.merged {
        println!("   {} {} {}", "*".cyan(), path, "merged".dimmed());
    }
    for conflict in &result.conflicts {
        if let ConflictOutcome::Failed { reason } = &conflict.outcome {
            println!(
                "   {} {} ({}): {}",
                "!".red(),
                conflict.path.cyan(),
                conflict.strategy.dimmed(),
                reason
            );
        }
    }
    let skipped = result
        .local_to_obsidian
        .skipped
        .iter()
        .chain(result.obsidian_to_local.skipped.iter());
    for entry in skipped {
        println!("   {} {}: {}", "-".yellow(), entry.path, entry.reason);
    }

    let label = if result.dry_run { "DRY RUN" } else { "OK" };
    let label = if result.has_failures() {
        label.yellow().bold()
    } else {
        label.green().bold()
    };
    println!(
        "{} {} ({} ms)",
        label,
        result.summary_line(),
        result.duration_ms
    );
    if let Some(backup) = &result.backup_path {
        println!("   backup: {}", backup.dimmed());
    }
    Ok(())
}
