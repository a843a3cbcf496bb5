//! Credentials and webhook URLs from the environment

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Host used when `OBSIDIAN_API_HOST` is unset.
pub const DEFAULT_API_HOST: &str = "https://localhost:27124";

/// How many parent directories above the project root are searched for `.env`.
const DOTENV_PARENT_LEVELS: usize = 3;

/// Secret values read from the environment.
///
/// Empty variables count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub api_host: Option<String>,
    pub api_key: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub discord_webhook_url: Option<String>,
    pub ngrok_auth_token: Option<String>,
    pub ngrok_domain: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_host", &self.api_host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("slack_webhook_url", &self.slack_webhook_url.is_some())
            .field("discord_webhook_url", &self.discord_webhook_url.is_some())
            .field("ngrok_auth_token", &self.ngrok_auth_token.is_some())
            .field("ngrok_domain", &self.ngrok_domain)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            api_host: get("OBSIDIAN_API_HOST"),
            api_key: get("OBSIDIAN_API_KEY"),
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
            ngrok_auth_token: get("NGROK_AUTH_TOKEN"),
            ngrok_domain: get("NGROK_DOMAIN"),
        }
    }

    /// The configured host, or the plugin's default address.
    pub fn api_host_or_default(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_API_HOST)
    }

    /// Host and key, failing with every missing variable named.
    pub fn require_api(&self) -> Result<(&str, &str)> {
        match (self.api_host.as_deref(), self.api_key.as_deref()) {
            (Some(host), Some(key)) => Ok((host, key)),
            (host, key) => {
                let mut names = Vec::new();
                if host.is_none() {
                    names.push("OBSIDIAN_API_HOST".to_string());
                }
                if key.is_none() {
                    names.push("OBSIDIAN_API_KEY".to_string());
                }
                Err(Error::MissingEnv { names })
            }
        }
    }
}

/// Load the nearest `.env` file into the process environment.
///
/// Searches the project root, then up to three parent directories. Variables
/// already present in the environment win. Returns the file that was loaded.
pub fn load_dotenv(project_root: &Path) -> Option<PathBuf> {
    let candidate = project_root
        .ancestors()
        .take(DOTENV_PARENT_LEVELS + 1)
        .map(|dir| dir.join(".env"))
        .find(|path| path.is_file())?;

    match dotenvy::from_path(&candidate) {
        Ok(()) => {
            tracing::debug!(path = %candidate.display(), "loaded environment file");
            Some(candidate)
        }
        Err(err) => {
            tracing::warn!(path = %candidate.display(), error = %err, "failed to load environment file");
            None
        }
    }
}
