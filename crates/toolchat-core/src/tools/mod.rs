//! Tool discovery and dispatch
//!
//! ```rust,ignore
//! use toolchat_core::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::new(host, logger);
//!
//! // Fresh catalog in function-calling format
//! let tools = registry.llm_tools().await?;
//!
//! // Execute tool calls from an LLM response, in order
//! let results = registry.execute_tool_calls(&tool_calls).await?;
//! ```

mod host;
mod catalog;
mod memory;
mod registry;

pub use host::{ToolHost, ToolHostError, ToolHostResult};
pub use catalog::{to_function_tools, FunctionSpec, FunctionTool};
pub use memory::InMemoryToolHost;
pub use registry::ToolRegistry;
