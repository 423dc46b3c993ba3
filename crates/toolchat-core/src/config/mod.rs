//! Configuration sources
//!
//! - `ConfigFile`: optional YAML file (user level by default)
//! - `ClientConfig`: the chat client's resolved settings

mod error;
mod file;
mod client;

pub use error::{ConfigError, ConfigResult};
pub use file::{ConfigFile, LoggingSection, ServerSection};
pub use client::{
    ClientConfig, ToolHostLaunch, provider_requires_api_key,
    DEFAULT_LOG_FILE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROVIDER,
    DEFAULT_SERVER_COMMAND, DEFAULT_SYSTEM_PROMPT,
};
