//! MCP client using the official rmcp SDK
//!
//! Spawns the tool host as a child process and speaks MCP over its stdio.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientInfo, GetPromptRequestParams, GetPromptResult,
        Implementation, Prompt, RawContent, ReadResourceRequestParams, Resource, ResourceContents, Tool,
    },
    service::{RunningService, ServiceError},
    transport::{IntoTransport, TokioChildProcess},
    RoleClient,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ToolHostLaunch;
use crate::logging::Logger;
use crate::tools::{ToolHost, ToolHostError, ToolHostResult};
use crate::types::{ToolDescriptor, ToolOutput};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The server answered with an MCP error (unknown tool, bad params, ...)
    #[error("Server rejected request: {0}")]
    Rejected(String),

    /// Transport-level failure: closed pipe, timeout, unexpected response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
}

impl From<ServiceError> for McpError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::McpError(data) => McpError::Rejected(data.message.to_string()),
            other => McpError::Transport(other.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client session with a tool host
pub struct McpClient {
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        client_info: Implementation {
            name: "toolchat".to_string(),
            title: Some("Toolchat".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

impl McpClient {
    /// Spawn the tool host and complete the MCP handshake
    pub async fn connect_child_process(
        launch: &ToolHostLaunch,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!(
            "[McpClient] Launching tool host: {} {}",
            launch.command,
            launch.argv().join(" ")
        ));

        let mut command = tokio::process::Command::new(&launch.command);
        command.args(launch.argv()).envs(&launch.env);

        let transport = TokioChildProcess::new(command)
            .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", launch.command, e)))?;

        Self::connect_with(transport, logger).await
    }

    /// Complete the MCP handshake over any client transport
    pub async fn connect_with<T, E, A>(transport: T, logger: Arc<dyn Logger>) -> McpResult<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        let this = Self { client, logger };
        match this.server_info() {
            Some(info) => this.logger.info(&format!(
                "[McpClient] Connected to {} {}",
                info.name, info.version
            )),
            None => this.logger.info("[McpClient] Connected and initialized successfully"),
        }
        Ok(this)
    }

    /// List all available tools
    pub async fn list_mcp_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self.client.list_tools(Default::default()).await?;
        self.logger.debug(&format!("[McpClient] Listed {} tools", result.tools.len()));
        Ok(result.tools)
    }

    /// Call a tool by name
    pub async fn call_mcp_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.debug(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        Ok(self.client.call_tool(params).await?)
    }

    pub async fn list_resources(&self) -> McpResult<Vec<Resource>> {
        let resources = self.client.list_all_resources().await?;
        self.logger.debug(&format!("[McpClient] Listed {} resources", resources.len()));
        Ok(resources)
    }

    pub async fn read_resource(&self, uri: &str) -> McpResult<Vec<ResourceContents>> {
        self.logger.debug(&format!("[McpClient] Reading resource: {}", uri));
        let params: ReadResourceRequestParams = request_params(json!({ "uri": uri }))?;
        Ok(self.client.read_resource(params).await?.contents)
    }

    pub async fn list_prompts(&self) -> McpResult<Vec<Prompt>> {
        Ok(self.client.list_all_prompts().await?)
    }

    /// Render a prompt; `arguments` must be a JSON object of strings
    pub async fn get_prompt(&self, name: &str, arguments: Value) -> McpResult<GetPromptResult> {
        self.logger.debug(&format!("[McpClient] Getting prompt: {}", name));
        let params: GetPromptRequestParams = request_params(json!({
            "name": name,
            "arguments": arguments,
        }))?;
        Ok(self.client.get_prompt(params).await?)
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// End the session; the child process is terminated with it
    pub async fn close(self) -> McpResult<()> {
        self.logger.info("[McpClient] Closing connection");
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;
        Ok(())
    }
}

fn request_params<T: DeserializeOwned>(value: Value) -> McpResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// Convert an MCP tool into a catalog descriptor
pub fn descriptor_from_mcp(tool: Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}

/// Join the text parts of a tool result; non-text parts are skipped
pub fn output_from_mcp(result: CallToolResult) -> ToolOutput {
    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    ToolOutput {
        text,
        is_error: result.is_error.unwrap_or(false),
    }
}

#[async_trait]
impl ToolHost for McpClient {
    async fn list_tools(&self) -> ToolHostResult<Vec<ToolDescriptor>> {
        self.list_mcp_tools()
            .await
            .map(|tools| tools.into_iter().map(descriptor_from_mcp).collect())
            .map_err(|e| ToolHostError::channel(e.to_string()))
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolHostResult<ToolOutput> {
        match self.call_mcp_tool(name, arguments).await {
            Ok(result) => Ok(output_from_mcp(result)),
            Err(McpError::Rejected(message)) => Err(ToolHostError::dispatch(name, message)),
            Err(e) => Err(ToolHostError::channel(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;

    #[test]
    fn test_output_joins_text_parts() {
        let result = CallToolResult::success(vec![Content::text("a"), Content::text("b")]);
        let output = output_from_mcp(result);
        assert_eq!(output.text, "a\nb");
        assert!(!output.is_error);
    }

    #[test]
    fn test_output_keeps_error_flag() {
        let result = CallToolResult::error(vec![Content::text("Database path does not exist: x")]);
        let output = output_from_mcp(result);
        assert!(output.is_error);
        assert!(output.text.contains("does not exist"));
    }

    #[test]
    fn test_client_info_names_toolchat() {
        let info = client_info();
        assert_eq!(info.client_info.name, "toolchat");
    }

    #[test]
    fn test_request_params_from_json() {
        let params: ReadResourceRequestParams = request_params(json!({ "uri": "data://config" })).unwrap();
        assert_eq!(params.uri, "data://config");

        let bad: McpResult<ReadResourceRequestParams> = request_params(json!({ "uri": 7 }));
        assert!(matches!(bad, Err(McpError::InvalidParams(_))));
    }

    #[test]
    fn test_rejection_maps_to_rejected() {
        let err: McpError = ServiceError::McpError(rmcp::ErrorData::invalid_params("no such tool", None)).into();
        assert!(matches!(err, McpError::Rejected(ref m) if m == "no such tool"));
    }
}
