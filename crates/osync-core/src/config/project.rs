//! Loading, validating and summarizing a project's configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use osync_fs::{ConfigStore, FileFilter, NormalizedPath, validate_relative};
use serde::{Deserialize, Serialize};

use super::secrets::{Secrets, load_dotenv};
use super::settings::{Settings, default_vault_path};
use crate::{Error, Result};

/// Settings file location relative to the project root
pub const CONFIG_FILE: &str = "config/obsidian-sync.yml";

/// Root-level settings file consulted when [`CONFIG_FILE`] is absent
pub const LEGACY_CONFIG_FILE: &str = "obsidian-sync.yml";

/// Fully loaded and validated configuration for one project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub project_root: PathBuf,
    /// The settings file in use (it may not exist yet)
    pub config_file: PathBuf,
    pub settings: Settings,
    pub secrets: Secrets,
}

impl ProjectConfig {
    /// Load configuration for `project_root`, reading `.env` and the
    /// process environment for secrets.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self> {
        let root = project_root.as_ref();
        load_dotenv(root);
        Self::load_with(root, Secrets::from_env())
    }

    /// Load configuration with explicitly supplied secrets.
    ///
    /// When no settings file exists, defaults are used and written to
    /// [`CONFIG_FILE`] so the operator has something to edit.
    pub fn load_with(project_root: impl AsRef<Path>, secrets: Secrets) -> Result<Self> {
        let project_root = project_root.as_ref().to_path_buf();
        let store = ConfigStore::new();
        let config_file = Self::locate_config_file(&project_root);
        let project_name = project_name_of(&project_root);

        let settings = if config_file.is_file() {
            tracing::debug!(path = %config_file.display(), "loading settings");
            store.load::<Settings>(&NormalizedPath::new(&config_file))?
        } else {
            let defaults = Settings::for_project(&project_name);
            match store.save(&NormalizedPath::new(&config_file), &defaults) {
                Ok(()) => tracing::info!(path = %config_file.display(), "created default settings file"),
                Err(err) => tracing::debug!(error = %err, "could not write default settings"),
            }
            defaults
        };

        Self::from_settings(project_root, config_file, settings, secrets)
    }

    /// Build a configuration from settings already in memory.
    pub fn from_settings(
        project_root: PathBuf,
        config_file: PathBuf,
        mut settings: Settings,
        secrets: Secrets,
    ) -> Result<Self> {
        if settings.obsidian.vault_project_path.trim().is_empty() {
            settings.obsidian.vault_project_path = default_vault_path(&project_name_of(&project_root));
        }

        let config = Self {
            project_root,
            config_file,
            settings,
            secrets,
        };
        config.validate()?;
        Ok(config)
    }

    /// The settings file for a project: the preferred location if present,
    /// then the legacy root-level file, else the preferred location.
    pub fn locate_config_file(project_root: &Path) -> PathBuf {
        let preferred = project_root.join(CONFIG_FILE);
        if preferred.is_file() {
            return preferred;
        }
        let legacy = project_root.join(LEGACY_CONFIG_FILE);
        if legacy.is_file() {
            return legacy;
        }
        preferred
    }

    /// Check the values that would otherwise fail later and less clearly.
    pub fn validate(&self) -> Result<()> {
        let s = &self.settings;

        if s.sync.interval_seconds < 1 {
            return Err(Error::config("sync.interval_seconds must be at least 1"));
        }
        if s.backup.max_backups < 1 {
            return Err(Error::config("backup.max_backups must be at least 1"));
        }
        if s.obsidian.timeout_seconds < 1 {
            return Err(Error::config("obsidian.timeout_seconds must be at least 1"));
        }

        validate_relative(&s.obsidian.vault_project_path).map_err(|err| {
            Error::config(format!("obsidian.vault_project_path: {err}"))
        })?;
        validate_relative(&s.obsidian.local_notes_dir)
            .map_err(|err| Error::config(format!("obsidian.local_notes_dir: {err}")))?;
        validate_relative(&s.backup.directory)
            .map_err(|err| Error::config(format!("backup.directory: {err}")))?;

        self.file_filter()?;

        if let Some(host) = &self.secrets.api_host {
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(Error::config(format!(
                    "OBSIDIAN_API_HOST must start with http:// or https:// (got '{host}')"
                )));
            }
        }

        Ok(())
    }

    /// Final component of the project root.
    pub fn project_name(&self) -> String {
        project_name_of(&self.project_root)
    }

    /// Vault folder mirrored by the notes directory, without surrounding slashes.
    pub fn vault_project_path(&self) -> &str {
        self.settings.obsidian.vault_project_path.trim_matches('/')
    }

    pub fn local_notes_dir(&self) -> PathBuf {
        self.project_root.join(&self.settings.obsidian.local_notes_dir)
    }

    pub fn backup_root(&self) -> PathBuf {
        self.project_root.join(&self.settings.backup.directory)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.settings
            .logging
            .file
            .as_ref()
            .filter(|file| !file.trim().is_empty())
            .map(|file| self.project_root.join(file))
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.settings.sync.interval_seconds)
    }

    pub fn mtime_tolerance(&self) -> Duration {
        Duration::from_secs(self.settings.sync.mtime_tolerance_seconds)
    }

    pub fn file_filter(&self) -> Result<FileFilter> {
        let filters = &self.settings.filters;
        Ok(FileFilter::new(
            &filters.include_extensions,
            &filters.exclude_patterns,
        )?)
    }

    /// Whether backups of any kind should be written during a pass.
    pub fn backups_enabled(&self) -> bool {
        self.settings.sync.create_backup
    }

    /// Render the operator-facing summary.
    pub fn summary(&self) -> ConfigSummary {
        let s = &self.settings;
        ConfigSummary {
            project_root: self.project_root.display().to_string(),
            config_file: self.config_file.display().to_string(),
            vault_project_path: self.vault_project_path().to_string(),
            local_notes_dir: self.local_notes_dir().display().to_string(),
            sync_interval_seconds: s.sync.interval_seconds,
            conflict_resolution: s.sync.conflict_resolution.to_string(),
            create_backup: s.sync.create_backup,
            backup_directory: self.backup_root().display().to_string(),
            max_backups: s.backup.max_backups,
            log_level: s.logging.level.clone(),
            log_file: self.log_file().map(|p| p.display().to_string()),
            api_host: self.secrets.api_host_or_default().to_string(),
            has_api_host: self.secrets.api_host.is_some(),
            has_api_key: self.secrets.api_key.is_some(),
            enable_slack: s.notifications.enable_slack,
            enable_discord: s.notifications.enable_discord,
            has_ngrok_token: self.secrets.ngrok_auth_token.is_some(),
            include_extensions: s.filters.include_extensions.clone(),
            exclude_patterns: s.filters.exclude_patterns.clone(),
        }
    }
}

fn project_name_of(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

/// Flattened view of the effective configuration, secrets reduced to flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub project_root: String,
    pub config_file: String,
    pub vault_project_path: String,
    pub local_notes_dir: String,
    pub sync_interval_seconds: u64,
    pub conflict_resolution: String,
    pub create_backup: bool,
    pub backup_directory: String,
    pub max_backups: usize,
    pub log_level: String,
    pub log_file: Option<String>,
    pub api_host: String,
    pub has_api_host: bool,
    pub has_api_key: bool,
    pub enable_slack: bool,
    pub enable_discord: bool,
    pub has_ngrok_token: bool,
    pub include_extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl ConfigSummary {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" }.to_string();
        vec![
            ("Project root", self.project_root.clone()),
            ("Config file", self.config_file.clone()),
            ("Vault folder", self.vault_project_path.clone()),
            ("Local notes", self.local_notes_dir.clone()),
            ("Sync interval", format!("{}s", self.sync_interval_seconds)),
            ("Conflict resolution", self.conflict_resolution.clone()),
            ("Create backups", yes_no(self.create_backup)),
            ("Backup directory", self.backup_directory.clone()),
            ("Max backups", self.max_backups.to_string()),
            ("Log level", self.log_level.clone()),
            (
                "Log file",
                self.log_file.clone().unwrap_or_else(|| "(console only)".to_string()),
            ),
            ("API host", self.api_host.clone()),
            ("API host set", yes_no(self.has_api_host)),
            ("API key set", yes_no(self.has_api_key)),
            ("Slack", yes_no(self.enable_slack)),
            ("Discord", yes_no(self.enable_discord)),
            ("ngrok token set", yes_no(self.has_ngrok_token)),
            ("Include extensions", self.include_extensions.join(", ")),
            ("Exclude patterns", self.exclude_patterns.join(", ")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_secrets() -> Secrets {
        Secrets::default()
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::load_with(dir.path(), no_secrets()).unwrap();

        assert!(dir.path().join(CONFIG_FILE).is_file());
        assert_eq!(config.settings.sync.interval_seconds, 30);
        assert!(config.vault_project_path().starts_with("10-Projects/"));
    }

    #[test]
    fn legacy_file_is_used_when_preferred_is_absent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(LEGACY_CONFIG_FILE),
            "obsidian:\n  vault_project_path: Legacy/Place\n",
        )
        .unwrap();

        let config = ProjectConfig::load_with(dir.path(), no_secrets()).unwrap();
        assert_eq!(config.vault_project_path(), "Legacy/Place");
        assert!(config.config_file.ends_with(LEGACY_CONFIG_FILE));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::for_project("p");
        settings.sync.interval_seconds = 0;

        let err = ProjectConfig::from_settings(
            dir.path().to_path_buf(),
            dir.path().join(CONFIG_FILE),
            settings,
            no_secrets(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("interval_seconds"));
    }

    #[test]
    fn host_without_scheme_is_rejected() {
        let dir = TempDir::new().unwrap();
        let secrets = Secrets {
            api_host: Some("localhost:27124".into()),
            ..Secrets::default()
        };
        let err = ProjectConfig::from_settings(
            dir.path().to_path_buf(),
            dir.path().join(CONFIG_FILE),
            Settings::for_project("p"),
            secrets,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn summary_hides_secret_values() {
        let dir = TempDir::new().unwrap();
        let secrets = Secrets {
            api_key: Some("hunter2".into()),
            ..Secrets::default()
        };
        let config = ProjectConfig::load_with(dir.path(), secrets).unwrap();
        let summary = config.summary();

        assert!(summary.has_api_key);
        assert!(!summary.has_api_host);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
