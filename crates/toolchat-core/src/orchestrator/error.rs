//! Orchestrator error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::providers::ProviderError;
use crate::tools::ToolHostError;

/// Coarse classification the shell and logs work with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing configuration, fatal before a session starts
    Configuration,
    /// A single tool call failed; recovered as an error tool result
    ToolDispatch,
    /// Backend or tool channel failed; the current turn is aborted
    BackendCommunication,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::ToolDispatch => "ToolDispatchError",
            ErrorKind::BackendCommunication => "BackendCommunicationError",
        };
        write!(f, "{}", s)
    }
}

/// Errors that end a `process_query` call
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("LLM backend failed: {0}")]
    Backend(#[from] ProviderError),

    #[error("tool host failed: {0}")]
    Tools(#[from] ToolHostError),
}

impl OrchestratorError {
    /// `None` for input rejected before the turn started
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            OrchestratorError::EmptyQuery => None,
            OrchestratorError::Backend(_) => Some(ErrorKind::BackendCommunication),
            OrchestratorError::Tools(e) if e.is_channel() => Some(ErrorKind::BackendCommunication),
            OrchestratorError::Tools(_) => Some(ErrorKind::ToolDispatch),
        }
    }
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
