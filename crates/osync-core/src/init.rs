//! Project scaffolding for `obsidian-sync init`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use osync_fs::{ConfigStore, NormalizedPath, io, validate_relative};

use crate::config::{CONFIG_FILE, ProjectConfig, Settings};
use crate::{Error, Result};

const ENV_EXAMPLE: &str = "\
# Obsidian Local REST API
OBSIDIAN_API_HOST=https://localhost:27124
OBSIDIAN_API_KEY=your-api-key-here

# Optional notifications
# SLACK_WEBHOOK_URL=https://hooks.slack.com/services/...
# DISCORD_WEBHOOK_URL=https://discord.com/api/webhooks/...
";

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Defaults to the project directory's name
    pub project_name: Option<String>,
    /// Defaults to `10-Projects/<project name>`
    pub vault_path: Option<String>,
    pub notes_dir: String,
    /// Overwrite an existing settings file
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            project_name: None,
            vault_path: None,
            notes_dir: "notes".to_string(),
            force: false,
        }
    }
}

/// What `initialize_project` created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub config_file: PathBuf,
    /// `None` when an existing `.env.example` was kept
    pub env_example: Option<PathBuf>,
    pub notes_dir: PathBuf,
    /// `None` when the hub note already existed
    pub example_note: Option<PathBuf>,
}

/// Write settings, `.env.example`, the notes directory and a hub note.
pub fn initialize_project(root: &Path, options: &InitOptions) -> Result<InitReport> {
    let config_file = root.join(CONFIG_FILE);
    if config_file.exists() && !options.force {
        return Err(Error::AlreadyInitialized { path: config_file });
    }

    let project_name = match &options.project_name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string()),
    };

    let mut settings = Settings::for_project(&project_name);
    if let Some(vault_path) = &options.vault_path {
        settings.obsidian.vault_project_path = validate_relative(vault_path)
            .map_err(|err| Error::config(format!("vault path: {err}")))?;
    }
    settings.obsidian.local_notes_dir = validate_relative(&options.notes_dir)
        .map_err(|err| Error::config(format!("notes directory: {err}")))?;

    // Validate before anything touches the disk
    let config = ProjectConfig::from_settings(
        root.to_path_buf(),
        config_file.clone(),
        settings,
        Default::default(),
    )?;
    ConfigStore::new().save(&NormalizedPath::new(&config_file), &config.settings)?;
    tracing::info!(path = %config_file.display(), "wrote settings");

    let env_path = root.join(".env.example");
    let env_example = if env_path.exists() && !options.force {
        None
    } else {
        io::write_text(&NormalizedPath::new(&env_path), ENV_EXAMPLE)?;
        Some(env_path)
    };

    let notes_dir = config.local_notes_dir();
    fs::create_dir_all(&notes_dir)?;

    let note_path = notes_dir.join(format!("{project_name}.md"));
    let example_note = if note_path.exists() {
        None
    } else {
        let note = hub_note(&project_name, config.vault_project_path());
        io::write_text(&NormalizedPath::new(&note_path), &note)?;
        Some(note_path)
    };

    Ok(InitReport {
        config_file,
        env_example,
        notes_dir,
        example_note,
    })
}

fn hub_note(project_name: &str, vault_path: &str) -> String {
    format!(
        "# {project_name}\n\n\
         Hub note for {project_name}. This folder is kept in sync with \
         `{vault_path}` in the Obsidian vault.\n\n\
         ## Notes\n\n\
         - Created {}\n",
        Local::now().format("%Y-%m-%d")
    )
}
