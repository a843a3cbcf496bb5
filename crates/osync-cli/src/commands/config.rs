//! Show the effective configuration

use colored::Colorize;
use osync_core::ProjectConfig;

use crate::cli::ConfigFormat;
use crate::error::Result;

/// Width of the label column in table output
const LABEL_WIDTH: usize = 22;

/// Run the config command.
///
/// Secrets are never printed, only whether they are set.
pub fn run_config(config: &ProjectConfig, format: ConfigFormat) -> Result<()> {
    let summary = config.summary();
    match format {
        ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ConfigFormat::Yaml => print!("{}", serde_yaml::to_string(&summary)?),
        ConfigFormat::Table => {
            println!("{} Obsidian sync configuration", "=>".blue().bold());
            println!();
            for (label, value) in summary.rows() {
                println!("   {:<width$} {}", label.bold(), value, width = LABEL_WIDTH);
            }
        }
    }
    Ok(())
}
