//! Provider error types

use thiserror::Error;

/// Errors that can occur while talking to an LLM backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Non-success reply from the backend
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply that parsed but cannot be turned into an assistant turn
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// HTTP 429
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Unknown provider id
    #[error("Unsupported provider: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map an HTTP status and body to the matching error
    pub fn from_status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = body.into();
        if status == 429 {
            Self::RateLimited { provider, message }
        } else {
            Self::ApiError {
                provider,
                status,
                message,
            }
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
