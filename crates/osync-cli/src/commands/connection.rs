//! API connectivity check

use colored::Colorize;
use osync_core::sync::DirectoryLister;
use osync_core::{Error, ProjectConfig, RestVault, VaultApi};

use crate::error::Result;

/// Run the test command.
///
/// Probes the status endpoint and lists the project folder. On failure,
/// prints hints for the error at hand before returning it.
pub fn run_test(config: &ProjectConfig, verbose: bool) -> Result<()> {
    println!("{} Testing Obsidian API connection...", "=>".blue().bold());

    match check(config, verbose) {
        Ok(()) => Ok(()),
        Err(err) => {
            print_hints(&err);
            Err(err.into())
        }
    }
}

fn check(config: &ProjectConfig, verbose: bool) -> osync_core::Result<()> {
    let vault = RestVault::from_config(config)?;
    if verbose {
        println!("   {:<10} {}", "endpoint".bold(), vault.describe());
    }

    let status = vault.status()?;
    if !status.authenticated {
        return Err(Error::Auth {
            status: None,
            message: "the server reports the API key as unauthenticated".to_string(),
        });
    }
    println!("{} Connected and authenticated.", "OK".green().bold());

    if verbose {
        if let Some(service) = &status.service {
            println!("   {:<10} {}", "service".bold(), service);
        }
        if let Some(versions) = &status.versions {
            println!("   {:<10} {}", "versions".bold(), versions);
        }
    }

    let lister = DirectoryLister::from_config(config, &vault)?;
    let (notes, skipped) = lister.list_remote()?;
    println!(
        "   {} {} note(s) in {}",
        "*".cyan(),
        notes.len(),
        config.vault_project_path().cyan()
    );
    if verbose {
        for path in notes.keys() {
            println!("     {}", path.dimmed());
        }
        for entry in &skipped {
            println!("     {} {} ({})", "!".yellow(), entry.path, entry.reason);
        }
    }
    Ok(())
}

fn print_hints(err: &Error) {
    let hints: &[&str] = match err {
        Error::MissingEnv { .. } => &[
            "Set OBSIDIAN_API_HOST and OBSIDIAN_API_KEY in the environment or a .env file.",
        ],
        Error::Auth { .. } => &[
            "Check OBSIDIAN_API_KEY against the key shown in the Local REST API plugin settings.",
        ],
        Error::Connectivity { .. } => &[
            "Make sure Obsidian is running with the Local REST API plugin enabled.",
            "Check OBSIDIAN_API_HOST, including the port (the plugin defaults to 27124).",
            "For a tunnelled vault, check that the tunnel is up.",
        ],
        _ => &[],
    };
    if hints.is_empty() {
        return;
    }
    println!();
    println!("{}", "Troubleshooting:".yellow().bold());
    for hint in hints {
        println!("   {} {}", "-".yellow(), hint);
    }
}
