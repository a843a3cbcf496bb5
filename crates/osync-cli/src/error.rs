//! Error types for osync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from osync-core
    #[error(transparent)]
    Core(#[from] osync_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML rendering error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// 1 for general failures, 3 when the API is unreachable, 4 when the
    /// API key is rejected. Usage errors exit with 2 from clap itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(osync_core::Error::Connectivity { .. }) => 3,
            CliError::Core(osync_core::Error::Auth { .. }) => 4,
            _ => 1,
        }
    }
}
