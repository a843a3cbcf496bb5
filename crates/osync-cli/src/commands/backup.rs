//! Manual snapshot command

use colored::Colorize;
use osync_core::{BackupManager, ProjectConfig};

use crate::error::Result;

/// Run the backup command.
///
/// Always snapshots, whatever `sync.create_backup` says, then prunes down
/// to `max_backups` (or the configured limit).
pub fn run_backup(config: &ProjectConfig, max_backups: Option<u64>) -> Result<()> {
    println!("{} Backing up local notes...", "=>".blue().bold());

    let manager = BackupManager::from_config(config);
    match manager.create_snapshot()? {
        Some(snapshot) => println!(
            "{} Created {} ({} files)",
            "OK".green().bold(),
            snapshot.path.as_str().cyan(),
            snapshot.file_count()
        ),
        None => {
            println!(
                "{} Nothing to back up: {} does not exist.",
                "SKIP".yellow().bold(),
                config.local_notes_dir().display()
            );
            return Ok(());
        }
    }

    let keep = max_backups
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(config.settings.backup.max_backups);
    let removed = manager.cleanup(keep)?;
    for path in &removed {
        println!("   {} {}", "-".red(), path.as_str());
    }
    if !removed.is_empty() {
        println!("Removed {} old snapshot(s), keeping {}.", removed.len(), keep);
    }
    Ok(())
}
