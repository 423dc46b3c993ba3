//! Scripted provider for tests and offline runs
//!
//! Replies come from a queue of prepared steps. Once the queue is empty
//! the provider echoes the last user message back, which is also what the
//! `mock` provider id does.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{CompletionRequest, Provider};
use crate::logging::Logger;
use crate::types::{AssistantTurn, MessageRole, ToolCall};

/// One prepared backend reply
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this turn
    Reply(AssistantTurn),
    /// Fail the call with this message
    Fail(String),
}

impl ScriptStep {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptStep::Reply(AssistantTurn::text(text))
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        ScriptStep::Reply(AssistantTurn::with_tool_calls(None, calls))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptStep::Fail(message.into())
    }
}

/// Deterministic backend that records every request it receives
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<CompletionRequest>>,
    logger: Arc<dyn Logger>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ScriptStep>, logger: Arc<dyn Logger>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Provider with no script: every call echoes
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(Vec::new(), logger)
    }

    /// Queue another step
    pub fn push(&self, step: ScriptStep) {
        self.steps.lock().push_back(step);
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }

    fn echo_reply(request: &CompletionRequest) -> AssistantTurn {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.plain_text())
            .unwrap_or_default();
        AssistantTurn::text(format!("Echo: {}", last_user))
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<AssistantTurn> {
        self.logger.debug(&format!(
            "[ScriptedProvider] complete: messages={}, tools={}",
            request.messages.len(),
            request.tools.len()
        ));

        let step = self.steps.lock().pop_front();
        let reply = match step {
            Some(ScriptStep::Reply(turn)) => Ok(turn),
            Some(ScriptStep::Fail(message)) => Err(ProviderError::Other(message)),
            None => Ok(Self::echo_reply(&request)),
        };
        self.requests.lock().push(request);
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::ChatMessage;
    use serde_json::json;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest::new("m", vec![ChatMessage::user(text)])
    }

    #[tokio::test]
    async fn test_steps_then_echo() {
        let provider = ScriptedProvider::new(
            vec![
                ScriptStep::tool_calls(vec![ToolCall::new("1", "calculate", json!({}))]),
                ScriptStep::text("done"),
            ],
            Arc::new(NoOpLogger),
        );

        let first = provider.complete(request("a")).await.unwrap();
        assert!(first.has_tool_calls());
        let second = provider.complete(request("b")).await.unwrap();
        assert_eq!(second.text.as_deref(), Some("done"));
        let third = provider.complete(request("c")).await.unwrap();
        assert_eq!(third.text.as_deref(), Some("Echo: c"));

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_fail_step() {
        let provider = ScriptedProvider::new(vec![ScriptStep::fail("backend down")], Arc::new(NoOpLogger));
        let err = provider.complete(request("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
        // the failed request is still recorded
        assert_eq!(provider.call_count(), 1);
    }
}
