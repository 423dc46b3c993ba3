//! Tool registry: catalog fetch and sequential dispatch
//!
//! The registry never caches the catalog: every `fetch_catalog` goes to the
//! host, so tools added or removed between queries are picked up.

use std::sync::Arc;

use serde_json::Value;

use super::catalog::{to_function_tools, FunctionTool};
use super::host::{ToolHost, ToolHostError, ToolHostResult};
use crate::logging::Logger;
use crate::types::{ToolCall, ToolDescriptor, ToolOutput, ToolResult};

/// Dispatches model tool calls to a `ToolHost`
pub struct ToolRegistry {
    host: Arc<dyn ToolHost>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    pub fn new(host: Arc<dyn ToolHost>, logger: Arc<dyn Logger>) -> Self {
        Self { host, logger }
    }

    pub fn host(&self) -> &Arc<dyn ToolHost> {
        &self.host
    }

    /// Fetch the current catalog from the host
    pub async fn fetch_catalog(&self) -> ToolHostResult<Vec<ToolDescriptor>> {
        match self.host.list_tools().await {
            Ok(tools) => {
                self.logger.info(&format!(
                    "[ToolRegistry] Discovered {} tools: {}",
                    tools.len(),
                    tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
                ));
                Ok(tools)
            }
            Err(e) => {
                self.logger.error(&format!("[ToolRegistry] Failed to fetch tools: {}", e));
                Err(e)
            }
        }
    }

    /// Fetch the catalog and translate it for the backend
    pub async fn llm_tools(&self) -> ToolHostResult<Vec<FunctionTool>> {
        Ok(to_function_tools(&self.fetch_catalog().await?))
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolHostResult<ToolOutput> {
        self.logger.info(&format!("[ToolRegistry] Calling tool: {} with {}", name, arguments));
        self.host.call_tool(name, arguments).await
    }

    /// Execute one tool call from the model.
    ///
    /// Dispatch failures become error results that the model will see;
    /// channel failures are returned as errors and abort the turn.
    pub async fn execute_tool_call(&self, tool_call: &ToolCall) -> ToolHostResult<ToolResult> {
        match self.call_tool(&tool_call.name, tool_call.input.clone()).await {
            Ok(output) => {
                if output.is_error {
                    self.logger.warn(&format!(
                        "[ToolRegistry] Tool {} reported an error: {}",
                        tool_call.name, output.text
                    ));
                }
                Ok(ToolResult {
                    call_id: tool_call.id.clone(),
                    name: tool_call.name.clone(),
                    content: output.text,
                    is_error: output.is_error,
                })
            }
            Err(ToolHostError::Dispatch { message, .. }) => {
                self.logger.error(&format!(
                    "[ToolRegistry] Error during tool execution {}: {}",
                    tool_call.name, message
                ));
                Ok(ToolResult::error(
                    &tool_call.id,
                    &tool_call.name,
                    format!("Error during tool execution: {}", message),
                ))
            }
            Err(e) => {
                self.logger.error(&format!(
                    "[ToolRegistry] Tool channel failed during {}: {}",
                    tool_call.name, e
                ));
                Err(e)
            }
        }
    }

    /// Execute tool calls one after another, in the given order
    pub async fn execute_tool_calls(&self, tool_calls: &[ToolCall]) -> ToolHostResult<Vec<ToolResult>> {
        let mut results = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            results.push(self.execute_tool_call(call).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::tools::InMemoryToolHost;
    use serde_json::json;

    fn host() -> Arc<InMemoryToolHost> {
        let host = InMemoryToolHost::new()
            .with_tool(ToolDescriptor::new("calculate", "Math"), |_| Ok("{\"result\":2}".into()))
            .with_tool(ToolDescriptor::new("fails", "Always fails"), |_| Err("bad input".into()));
        Arc::new(host)
    }

    #[tokio::test]
    async fn test_fetch_catalog_each_time() {
        let host = host();
        let registry = ToolRegistry::new(host.clone(), Arc::new(NoOpLogger));

        registry.fetch_catalog().await.unwrap();
        let tools = registry.llm_tools().await.unwrap();

        assert_eq!(tools.len(), 2);
        assert_eq!(host.list_count(), 2);
    }

    #[tokio::test]
    async fn test_execute_success_binds_call_id() {
        let registry = ToolRegistry::new(host(), Arc::new(NoOpLogger));
        let result = registry
            .execute_tool_call(&ToolCall::new("c1", "calculate", json!({"expression": "1+1"})))
            .await
            .unwrap();
        assert_eq!(result, ToolResult::success("c1", "calculate", "{\"result\":2}"));
    }

    #[tokio::test]
    async fn test_tool_error_flag_is_kept() {
        let registry = ToolRegistry::new(host(), Arc::new(NoOpLogger));
        let result = registry
            .execute_tool_call(&ToolCall::new("c2", "fails", json!({})))
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.content, "bad input");
    }

    #[tokio::test]
    async fn test_dispatch_error_becomes_result() {
        let logger = Arc::new(MemoryLogger::new());
        let registry = ToolRegistry::new(host(), logger.clone());
        let result = registry
            .execute_tool_call(&ToolCall::new("c3", "missing", json!({})))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.content.starts_with("Error during tool execution"));
        assert_eq!(logger.messages_at(LogLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_channel_error_stops_batch() {
        let host = host();
        host.break_channel_on("calculate");
        let registry = ToolRegistry::new(host.clone(), Arc::new(NoOpLogger));

        let calls = vec![
            ToolCall::new("a", "calculate", json!({})),
            ToolCall::new("b", "fails", json!({})),
        ];
        let err = registry.execute_tool_calls(&calls).await.unwrap_err();

        assert!(err.is_channel());
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_in_order() {
        let host = host();
        let registry = ToolRegistry::new(host.clone(), Arc::new(NoOpLogger));
        let calls = vec![
            ToolCall::new("first", "fails", json!({})),
            ToolCall::new("second", "calculate", json!({})),
        ];
        let results = registry.execute_tool_calls(&calls).await.unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        let names: Vec<_> = host.calls().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["fails", "calculate"]);
    }
}
