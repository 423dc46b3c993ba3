//! GenaiProvider - backend for every provider the genai crate speaks

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};
use genai::Client;

use crate::logging::Logger;
use crate::types::{AssistantTurn, StreamChunk};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_tool_call, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools,
};
use super::traits::{CompletionRequest, Provider, ProviderEndpoint};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    provider_id: String,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    pub fn new(provider_id: impl Into<String>, endpoint: &ProviderEndpoint, logger: Arc<dyn Logger>) -> Self {
        let provider_id = provider_id.into();
        let client = create_client(&provider_id, endpoint);
        Self {
            provider_id,
            client,
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Model name with a provider prefix stripped ("openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map(|(_, name)| name).unwrap_or(model)
    }

    fn api_error(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::api_error(self.provider_id.clone(), 500, message)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<AssistantTurn> {
        let model_name = Self::extract_model_name(&request.model).to_string();
        self.logger.info(&format!(
            "[GenaiProvider] complete: provider={}, model={}, messages={}, tools={}",
            self.provider_id,
            model_name,
            request.messages.len(),
            request.tools.len()
        ));

        let mut chat_req = ChatRequest::new(to_genai_messages(&request.messages)?);
        if let Some(system) = &request.system_prompt {
            chat_req = chat_req.with_system(system.clone());
        }
        if !request.tools.is_empty() {
            chat_req = chat_req.with_tools(to_genai_tools(&request.tools));
        }
        let options = to_genai_options(&request);

        let chat_stream = self
            .client
            .exec_chat_stream(&model_name, chat_req, Some(&options))
            .await
            .map_err(|e| self.api_error(e.to_string()))?;

        let mut chunks = Vec::new();
        let mut stream = chat_stream.stream;
        while let Some(event) = stream.next().await {
            let event = event.map_err(|e| {
                self.logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                self.api_error(e.to_string())
            })?;

            match event {
                ChatStreamEvent::Chunk(c) => chunks.push(StreamChunk::text(c.content)),
                ChatStreamEvent::End(end) => {
                    if let Some(tool_calls) = end.captured_tool_calls() {
                        for tc in tool_calls {
                            chunks.push(StreamChunk::tool_call(from_genai_tool_call(tc)));
                        }
                    }
                }
                ChatStreamEvent::ToolCallChunk(_) => {
                    self.logger.debug("[GenaiProvider] Stream event: ToolCallChunk");
                }
                _ => {}
            }
        }

        let turn = AssistantTurn::from_chunks(chunks);
        self.logger.info(&format!(
            "[GenaiProvider] Turn complete: {} chars, {} tool calls",
            turn.text.as_ref().map(|t| t.len()).unwrap_or(0),
            turn.tool_calls.len()
        ));
        Ok(turn)
    }
}
