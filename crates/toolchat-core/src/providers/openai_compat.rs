//! Plain OpenAI-compatible chat completions backend
//!
//! Talks to any server exposing `POST {api_base}/chat/completions`
//! (vLLM, llama.cpp server, LM Studio, gateways). Non-streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::logging::Logger;
use crate::tools::FunctionTool;
use crate::types::{AssistantTurn, ChatMessage, MessageRole, ToolCall};

use super::error::{ProviderError, ProviderResult};
use super::traits::{CompletionRequest, Provider, ProviderEndpoint};

const PROVIDER_ID: &str = "openai-compatible";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [FunctionTool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API sends them
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

fn function_kind() -> String {
    "function".to_string()
}

fn to_wire_message(msg: &ChatMessage) -> WireMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    let tool_calls: Vec<WireToolCall> = msg
        .tool_calls()
        .into_iter()
        .map(|call| WireToolCall {
            id: call.id,
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.name,
                arguments: call.input.to_string(),
            },
        })
        .collect();

    let text = msg.plain_text();
    let content = if text.is_empty() && !tool_calls.is_empty() {
        None
    } else {
        Some(text)
    };

    WireMessage {
        role: role.to_string(),
        content,
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        tool_call_id: msg.tool_call_id.clone(),
        name: msg.name.clone(),
    }
}

fn from_wire_tool_call(call: WireToolCall) -> ProviderResult<ToolCall> {
    let args = call.function.arguments.trim();
    let input = if args.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(args).map_err(|e| {
            ProviderError::invalid_response(
                PROVIDER_ID,
                format!("arguments for {} are not JSON: {}", call.function.name, e),
            )
        })?
    };
    Ok(ToolCall::new(call.id, call.function.name, input))
}

// ============================================================================
// Provider
// ============================================================================

/// Backend for OpenAI-compatible servers without a native genai adapter
pub struct OpenAiCompatProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    logger: Arc<dyn Logger>,
}

impl OpenAiCompatProvider {
    pub fn new(endpoint: &ProviderEndpoint, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let api_base = endpoint
            .api_base
            .clone()
            .ok_or_else(|| ProviderError::Other(format!("{} requires an API base URL", PROVIDER_ID)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
            logger,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<AssistantTurn> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(to_wire_message(&ChatMessage::system(system.clone())));
        }
        messages.extend(request.messages.iter().map(to_wire_message));

        let body = WireRequest {
            model: &request.model,
            messages,
            tools: (!request.tools.is_empty()).then_some(request.tools.as_slice()),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = self.completions_url();
        self.logger.info(&format!(
            "[OpenAiCompat] POST {} model={} messages={} tools={}",
            url,
            request.model,
            body.messages.len(),
            request.tools.len()
        ));

        let mut req = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            self.logger.error(&format!("[OpenAiCompat] HTTP {}: {}", status.as_u16(), text));
            return Err(ProviderError::from_status(PROVIDER_ID, status.as_u16(), text));
        }

        let parsed: WireResponse = response.json().await?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ProviderError::invalid_response(PROVIDER_ID, "no choices in response"))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(from_wire_tool_call)
            .collect::<ProviderResult<Vec<_>>>()?;
        let text = message.content.filter(|c| !c.is_empty());

        Ok(AssistantTurn::with_tool_calls(text, tool_calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::to_function_tools;
    use crate::types::{ToolDescriptor, ToolResult};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiCompatProvider {
        let endpoint = ProviderEndpoint::new()
            .with_api_key("sk-local")
            .with_api_base(format!("{}/v1/", server.uri()));
        OpenAiCompatProvider::new(&endpoint, Arc::new(NoOpLogger)).unwrap()
    }

    #[test]
    fn test_requires_api_base() {
        let result = OpenAiCompatProvider::new(&ProviderEndpoint::new(), Arc::new(NoOpLogger));
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_history_wire_shape() {
        let call = ToolCall::new("c1", "calculate", json!({ "expression": "1+1" }));
        let assistant = to_wire_message(&ChatMessage::assistant_tool_calls(None, &[call]));
        assert_eq!(assistant.content, None);
        assert_eq!(assistant.tool_calls.as_ref().unwrap()[0].function.arguments, r#"{"expression":"1+1"}"#);

        let tool = to_wire_message(&ChatMessage::tool_result(&ToolResult::success("c1", "calculate", "2")));
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool.name.as_deref(), Some("calculate"));
    }

    #[tokio::test]
    async fn test_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-local"))
            .and(body_partial_json(json!({ "model": "local-model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "hi there" } }]
            })))
            .mount(&server)
            .await;

        let turn = provider(&server)
            .complete(CompletionRequest::new("local-model", vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        assert_eq!(turn.text.as_deref(), Some("hi there"));
        assert!(!turn.has_tool_calls());
    }

    #[tokio::test]
    async fn test_tool_call_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "tools": [{ "type": "function", "function": { "name": "calculate" } }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_7",
                        "type": "function",
                        "function": { "name": "calculate", "arguments": "{\"expression\":\"6*7\"}" }
                    }]
                } }]
            })))
            .mount(&server)
            .await;

        let tools = to_function_tools(&[ToolDescriptor::new("calculate", "Evaluate")]);
        let request = CompletionRequest::new("m", vec![ChatMessage::user("6*7?")]).with_tools(tools);
        let turn = provider(&server).complete(request).await.unwrap();

        assert_eq!(turn.text, None);
        assert_eq!(
            turn.tool_calls,
            vec![ToolCall::new("call_7", "calculate", json!({ "expression": "6*7" }))]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(CompletionRequest::new("m", vec![ChatMessage::user("x")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(CompletionRequest::new("m", vec![ChatMessage::user("x")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }
}
