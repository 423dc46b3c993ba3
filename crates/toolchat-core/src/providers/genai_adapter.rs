//! Adapter between toolchat types and genai types

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    MessageContent as GenaiContent, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::tools::FunctionTool;
use crate::types::{ChatMessage, MessageRole, ToolCall};

use super::error::ProviderResult;
use super::traits::{CompletionRequest, ProviderEndpoint};

// ============================================================================
// Message Conversion: toolchat -> genai
// ============================================================================

/// Convert a MessageRole to genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

/// Build a genai tool call from ours
pub fn to_genai_tool_call(call: &ToolCall) -> ProviderResult<GenaiToolCall> {
    Ok(serde_json::from_value(json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.input,
    }))?)
}

/// Convert one history message.
///
/// An assistant turn that requested tools is replayed as genai's dedicated
/// tool-call message; its free text is not replayed.
pub fn to_genai_message(msg: &ChatMessage) -> ProviderResult<GenaiMessage> {
    let calls = msg.tool_calls();
    let message = match msg.role {
        MessageRole::System => GenaiMessage::system(GenaiContent::from(msg.plain_text())),
        MessageRole::User => GenaiMessage::user(GenaiContent::from(msg.plain_text())),
        MessageRole::Assistant if !calls.is_empty() => {
            let calls = calls
                .iter()
                .map(to_genai_tool_call)
                .collect::<ProviderResult<Vec<_>>>()?;
            GenaiMessage::from(calls)
        }
        MessageRole::Assistant => GenaiMessage::assistant(GenaiContent::from(msg.plain_text())),
        MessageRole::Tool => {
            let call_id = msg.tool_call_id.clone().unwrap_or_default();
            GenaiMessage::from(GenaiToolResponse::new(call_id, msg.plain_text()))
        }
    };
    Ok(message)
}

/// Convert the whole history
pub fn to_genai_messages(messages: &[ChatMessage]) -> ProviderResult<Vec<GenaiMessage>> {
    messages.iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: toolchat -> genai
// ============================================================================

/// Convert a translated catalog entry to a genai Tool
pub fn to_genai_tool(tool: &FunctionTool) -> GenaiTool {
    GenaiTool::new(&tool.function.name)
        .with_description(&tool.function.description)
        .with_schema(tool.function.parameters.clone())
}

pub fn to_genai_tools(tools: &[FunctionTool]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: toolchat -> genai
// ============================================================================

/// Per-call options derived from the request
pub fn to_genai_options(request: &CompletionRequest) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = request.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = request.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Capture tool calls in stream so we can return them
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> toolchat
// ============================================================================

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

// ============================================================================
// Client Creation
// ============================================================================

/// Create a genai Client bound to one provider.
///
/// Auth comes from the resolved configuration, never from genai's own
/// environment lookup. OpenAI-compatible services without a native genai
/// adapter are routed through the OpenAI adapter with their endpoint.
pub fn create_client(provider: &str, endpoint: &ProviderEndpoint) -> Client {
    let explicit_key = endpoint.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = explicit_key.clone();
            // None lets genai handle keyless providers such as Ollama
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let target_provider = provider.to_lowercase();
    let target_api_base = endpoint.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;

            let (endpoint, adapter_kind): (Option<Endpoint>, AdapterKind) = match target_provider.as_str() {
                "openrouter" => (
                    Some(Endpoint::from_static("https://openrouter.ai/api/v1/")),
                    AdapterKind::OpenAI,
                ),
                "mistral" => (
                    Some(Endpoint::from_static("https://api.mistral.ai/v1/")),
                    AdapterKind::OpenAI,
                ),
                _ => match &target_api_base {
                    // Custom base for a native adapter: keep the adapter, swap the endpoint
                    Some(base) => (
                        Some(Endpoint::from_owned(base.clone())),
                        model.adapter_kind,
                    ),
                    None => return Ok(target),
                },
            };

            let resolved_endpoint = endpoint.unwrap_or(target.endpoint);
            let resolved_model = ModelIden::new(adapter_kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint: resolved_endpoint,
                auth: target.auth,
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat routing)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(provider.to_lowercase().as_str(), "openrouter" | "mistral")
}
