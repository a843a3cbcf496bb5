//! Interactive conflict prompts
//!
//! Uses dialoguer for terminal-based selection when the conflict strategy
//! is `interactive`.

use colored::Colorize;
use dialoguer::{Confirm, Select};
use osync_core::{Conflict, ConflictPrompt, PromptChoice};

const CHOICES: &[(&str, PromptChoice)] = &[
    ("Keep local version", PromptChoice::KeepLocal),
    ("Keep Obsidian version", PromptChoice::KeepObsidian),
    ("Merge both versions", PromptChoice::Merge),
    ("Edit the local file, then keep it", PromptChoice::EditLocal),
];

/// Lines of each version shown before asking
const PREVIEW_LINES: usize = 8;

/// Asks the operator on the terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

fn preview(label: &str, content: &[u8]) {
    let text = String::from_utf8_lossy(content);
    println!("   {}", label.bold());
    for line in text.lines().take(PREVIEW_LINES) {
        println!("   {} {}", "|".dimmed(), line);
    }
    let total = text.lines().count();
    if total > PREVIEW_LINES {
        println!("   {} ({} more lines)", "|".dimmed(), total - PREVIEW_LINES);
    }
}

fn prompt_error(err: dialoguer::Error) -> osync_core::Error {
    osync_core::Error::Io(std::io::Error::other(err.to_string()))
}

impl ConflictPrompt for TerminalPrompt {
    fn choose(&mut self, conflict: &Conflict<'_>) -> osync_core::Result<PromptChoice> {
        println!();
        println!(
            "{} Conflict in {}",
            "!".yellow().bold(),
            conflict.path.cyan()
        );
        println!(
            "   local modified {}, Obsidian modified {}",
            conflict.local_modified.format("%Y-%m-%d %H:%M:%S"),
            conflict.remote_modified.format("%Y-%m-%d %H:%M:%S")
        );
        preview("Local", conflict.local);
        preview("Obsidian", conflict.remote);

        let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
        let index = Select::new()
            .with_prompt("How should this conflict be resolved?")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        Ok(CHOICES[index].1)
    }

    fn wait_for_edit(&mut self, conflict: &Conflict<'_>) -> osync_core::Result<()> {
        println!(
            "   Edit {} and save it, then confirm.",
            conflict.local_file.display().to_string().cyan()
        );
        Confirm::new()
            .with_prompt("Done editing?")
            .default(true)
            .interact()
            .map_err(prompt_error)?;
        Ok(())
    }
}
