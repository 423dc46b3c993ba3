//! Provider trait definition

use async_trait::async_trait;

use crate::tools::FunctionTool;
use crate::types::{AssistantTurn, ChatMessage};
use super::error::ProviderResult;

/// Credentials and endpoint for a provider
#[derive(Clone, Default, PartialEq)]
pub struct ProviderEndpoint {
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Everything the backend sees for one call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// System prompt, sent separately from the history
    pub system_prompt: Option<String>,
    /// Full conversation history, oldest first
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call
    pub tools: Vec<FunctionTool>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            messages,
            tools: Vec::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionTool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Names of the offered tools, in order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.function.name.as_str()).collect()
    }
}

/// LLM backend
///
/// One call in, one complete assistant turn out. Implementations do not
/// retry.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn name(&self) -> &str;

    /// Run one completion
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<AssistantTurn>;
}
