//! Project initialization command

use std::path::Path;

use colored::Colorize;
use osync_core::{InitOptions, initialize_project};

use crate::error::Result;

/// Run the init command.
pub fn run_init(root: &Path, options: &InitOptions) -> Result<()> {
    println!(
        "{} Initializing Obsidian sync in {}",
        "=>".blue().bold(),
        root.display().to_string().cyan()
    );

    let report = initialize_project(root, options)?;

    println!("   {} {}", "+".green(), report.config_file.display());
    match &report.env_example {
        Some(path) => println!("   {} {}", "+".green(), path.display()),
        None => println!("   {} .env.example (kept existing)", "=".dimmed()),
    }
    println!("   {} {}", "+".green(), report.notes_dir.display());
    if let Some(note) = &report.example_note {
        println!("   {} {}", "+".green(), note.display());
    }

    println!();
    println!("{} Project initialized.", "OK".green().bold());
    println!(
        "Copy {} to {}, fill in the API key, then run {}.",
        ".env.example".cyan(),
        ".env".cyan(),
        "obsidian-sync test".cyan()
    );
    Ok(())
}
