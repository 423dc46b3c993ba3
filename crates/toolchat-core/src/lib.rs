//! Toolchat Core
//!
//! Client side of a tool-using chat session: an LLM backend that can ask
//! for tools, a tool host reached over MCP, and the orchestrator that loops
//! between the two until the model answers.
//!
//! ## Tool Orchestration
//!
//! The `orchestrator` module runs the turn loop; `tools` translates the
//! host's catalog for the backend and dispatches calls; `mcp` speaks to
//! the host process with the official rmcp SDK.
//!
//! ```rust,ignore
//! use toolchat_core::{ClientConfig, McpClient, Orchestrator, ToolRegistry};
//!
//! let config = ClientConfig::from_env(None)?;
//! let client = McpClient::connect_child_process(&config.server, logger.clone()).await?;
//! let registry = ToolRegistry::new(Arc::new(client), logger.clone());
//! let provider = create_provider(&config, logger.clone())?;
//!
//! let mut orchestrator = Orchestrator::new(provider, registry, (&config).into(), logger);
//! let outcome = orchestrator.process_query("List all tables").await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod mcp;
pub mod orchestrator;

// Re-export commonly used types
pub use types::{
    AssistantTurn, ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk,
    ToolCall, ToolDescriptor, ToolOutput, ToolResult,
};

pub use secrets::{
    ChainSecretStore, DotenvSecretStore, EnvSecretStore, MemorySecretStore, SecretStore,
    SecretStoreError, SecretStoreResult,
};

pub use logging::{FanoutLogger, FileLogger, LogLevel, Logger, NoOpLogger, TracingLogger};

pub use config::{ClientConfig, ConfigError, ConfigFile, ConfigResult, ToolHostLaunch};

pub use providers::{create_provider, CompletionRequest, Provider, ProviderError};

pub use tools::{to_function_tools, FunctionTool, ToolHost, ToolHostError, ToolRegistry};

// MCP client using official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult};

pub use orchestrator::{
    ErrorKind, Orchestrator, OrchestratorError, OrchestratorOptions, TurnOutcome, TurnReporter,
    TurnState,
};
