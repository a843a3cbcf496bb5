//! Typed settings file

use serde::{Deserialize, Serialize};

use crate::sync::ConflictStrategy;

/// Contents of the settings file.
///
/// Every section and field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub obsidian: ObsidianSettings,
    pub sync: SyncSettings,
    pub filters: FilterSettings,
    pub logging: LoggingSettings,
    pub backup: BackupSettings,
    pub notifications: NotificationSettings,
}

impl Settings {
    /// Default settings for a project with the given name.
    pub fn for_project(project_name: &str) -> Self {
        let mut settings = Self::default();
        settings.obsidian.vault_project_path = default_vault_path(project_name);
        settings
    }
}

/// Vault folder used when none is configured.
pub(crate) fn default_vault_path(project_name: &str) -> String {
    format!("10-Projects/{project_name}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsidianSettings {
    /// Vault-relative folder that mirrors the local notes directory.
    /// Empty means `10-Projects/<project name>`.
    pub vault_project_path: String,
    /// Notes directory, relative to the project root
    pub local_notes_dir: String,
    /// Verify the API's TLS certificate. The plugin ships a self-signed one.
    pub verify_tls: bool,
    pub timeout_seconds: u64,
}

impl Default for ObsidianSettings {
    fn default() -> Self {
        Self {
            vault_project_path: String::new(),
            local_notes_dir: "notes".to_string(),
            verify_tls: false,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub interval_seconds: u64,
    pub conflict_resolution: ConflictStrategy,
    pub create_backup: bool,
    /// Modification times closer than this are considered equal
    pub mtime_tolerance_seconds: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            conflict_resolution: ConflictStrategy::NewerWins,
            create_backup: true,
            mtime_tolerance_seconds: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include_extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            include_extensions: vec![".md".to_string()],
            exclude_patterns: vec![".*".to_string(), "*.tmp".to_string(), "*.bak".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file relative to the project root; `None` disables file logging
    pub file: Option<String>,
    /// Rotated log files to keep
    pub backup_count: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: Some("logs/obsidian_sync.log".to_string()),
            backup_count: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    /// Backup root relative to the project root
    pub directory: String,
    pub max_backups: usize,
    pub cleanup_old_backups: bool,
    pub backup_before_sync: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            directory: "notes_backup".to_string(),
            max_backups: 10,
            cleanup_old_backups: true,
            backup_before_sync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enable_slack: bool,
    pub enable_discord: bool,
    pub notify_on_success: bool,
    pub notify_on_error: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_slack: false,
            enable_discord: false,
            notify_on_success: false,
            notify_on_error: true,
        }
    }
}
