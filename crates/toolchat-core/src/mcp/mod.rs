//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to talk to the tool host over its stdio.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolchat_core::mcp::McpClient;
//! use toolchat_core::config::ToolHostLaunch;
//!
//! let client = McpClient::connect_child_process(&ToolHostLaunch::new("toolchat-host"), logger).await?;
//! let tools = client.list_mcp_tools().await?;
//! let result = client.call_mcp_tool("calculate", json!({ "expression": "2 + 2" })).await?;
//! ```

mod client;

pub use client::{McpClient, McpError, McpResult, descriptor_from_mcp, output_from_mcp};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{
    CallToolResult as McpToolResult, GetPromptResult as McpPromptResult, Prompt as McpPrompt,
    Resource as McpResource, ResourceContents as McpResourceContents, Tool as McpTool,
};
