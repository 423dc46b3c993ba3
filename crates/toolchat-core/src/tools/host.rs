//! The tool invocation channel as seen by the orchestrator

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::{ToolDescriptor, ToolOutput};

/// Failures on the tool channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolHostError {
    /// The host received the call and rejected or failed it.
    /// Recoverable: the failure is reported to the model as a tool result.
    #[error("tool '{name}' failed: {message}")]
    Dispatch { name: String, message: String },

    /// The channel itself is broken (process gone, transport error).
    #[error("tool channel failure: {0}")]
    Channel(String),
}

impl ToolHostError {
    pub fn dispatch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatch {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }
}

pub type ToolHostResult<T> = Result<T, ToolHostError>;

/// Something that can advertise and execute tools
///
/// `McpClient` implements this over MCP; `InMemoryToolHost` implements it
/// in-process for tests and demos.
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Current catalog, in host order
    async fn list_tools(&self) -> ToolHostResult<Vec<ToolDescriptor>>;

    /// Execute one tool call and return its text output
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolHostResult<ToolOutput>;
}
