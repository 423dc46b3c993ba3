//! Configuration errors

use std::path::PathBuf;

use crate::secrets::SecretStoreError;

/// Errors raised while assembling configuration.
///
/// Every variant is fatal: the binaries exit before a session starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key for provider '{provider}' not set (tried: {tried})")]
    MissingApiKey { provider: String, tried: String },

    #[error("provider '{0}' requires LLM_API_BASE")]
    MissingApiBase(String),

    #[error("tool host script not found: {}", .0.display())]
    MissingScript(PathBuf),

    #[error("tool host command not found: {0}")]
    CommandNotFound(String),

    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
