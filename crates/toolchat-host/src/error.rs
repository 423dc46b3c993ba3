use thiserror::Error;
use toolchat_core::secrets::SecretStoreError;

/// Errors raised while configuring or building the tool host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("unknown tool module '{0}' (expected one of: calculator, weather, sqlite, basics)")]
    UnknownModule(String),

    #[error("no tool modules selected")]
    NoModules,

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}

pub type HostResult<T> = Result<T, HostError>;
