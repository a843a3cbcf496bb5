//! Project configuration
//!
//! Settings come from `config/obsidian-sync.yml` (or a root-level
//! `obsidian-sync.yml`), secrets from the process environment after any
//! `.env` file has been loaded.

mod project;
mod secrets;
mod settings;

pub use project::{CONFIG_FILE, ConfigSummary, LEGACY_CONFIG_FILE, ProjectConfig};
pub use secrets::{DEFAULT_API_HOST, Secrets, load_dotenv};
pub use settings::{
    BackupSettings, FilterSettings, LoggingSettings, NotificationSettings, ObsidianSettings,
    Settings, SyncSettings,
};
