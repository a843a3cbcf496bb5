//! Error types for osync-core

use std::path::PathBuf;

/// Result type for osync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in osync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The vault API could not be reached, or answered with a non-success status
    #[error("Cannot reach the Obsidian API at {endpoint}: {message}")]
    Connectivity {
        endpoint: String,
        /// HTTP status when the server answered, `None` for transport failures
        status: Option<u16>,
        message: String,
    },

    /// The vault API rejected the credentials
    #[error("Obsidian API rejected the API key ({message})")]
    Auth { status: Option<u16>, message: String },

    /// The vault API answered with a body we could not interpret
    #[error("Unexpected response from {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },

    /// A conflict could not be resolved under the active strategy
    #[error("Conflict resolution failed for {path}: {reason}")]
    ConflictResolution { path: String, reason: String },

    /// Settings are present but unusable
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Required environment variables are not set
    #[error("Missing required environment variables: {}", names.join(", "))]
    MissingEnv { names: Vec<String> },

    /// A project was already initialized
    #[error("Configuration already exists at {path} (use --force to overwrite)")]
    AlreadyInitialized { path: PathBuf },

    /// Filesystem error from osync-fs
    #[error(transparent)]
    Filesystem(#[from] osync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConflictResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the API is unusable for the rest of the pass.
    ///
    /// Transport failures and rejected credentials abort a pass; an HTTP
    /// error on a single note only skips that note.
    pub fn aborts_pass(&self) -> bool {
        match self {
            Self::Auth { .. } => true,
            Self::Connectivity { status, .. } => status.is_none(),
            Self::MissingEnv { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_abort_the_pass() {
        let err = Error::Connectivity {
            endpoint: "https://localhost:27124/".into(),
            status: None,
            message: "connection refused".into(),
        };
        assert!(err.aborts_pass());
    }

    #[test]
    fn http_errors_on_a_note_do_not_abort() {
        let err = Error::Connectivity {
            endpoint: "https://localhost:27124/vault/a.md".into(),
            status: Some(500),
            message: "internal error".into(),
        };
        assert!(!err.aborts_pass());
        assert!(!Error::conflict("a.md", "no prompt").aborts_pass());
    }

    #[test]
    fn missing_env_lists_every_name() {
        let err = Error::MissingEnv {
            names: vec!["OBSIDIAN_API_HOST".into(), "OBSIDIAN_API_KEY".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: OBSIDIAN_API_HOST, OBSIDIAN_API_KEY"
        );
    }
}
