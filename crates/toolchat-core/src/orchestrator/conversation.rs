//! The tool-call loop
//!
//! One `process_query` runs a full turn: fetch the catalog, then call the
//! backend until it stops asking for tools. Tool calls are dispatched one at
//! a time in backend order. The assistant message carrying the calls and
//! their results are appended together once every call has been dispatched,
//! so history never holds a call without its result.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::logging::Logger;
use crate::providers::{CompletionRequest, Provider};
use crate::tools::{FunctionTool, ToolRegistry};
use crate::types::{AssistantTurn, ChatMessage, ToolResult};
use crate::{log_debug, log_error, log_info};

use super::error::{OrchestratorError, OrchestratorResult};
use super::reporter::{SilentReporter, TurnReporter};

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingQuery,
    FetchingTools,
    /// Backend call number `round` (1-based) in flight
    CallingLlm { round: usize },
    DispatchingTools { pending: usize },
    Done,
}

/// Per-session request settings
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl OrchestratorOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl From<&ClientConfig> for OrchestratorOptions {
    fn from(config: &ClientConfig) -> Self {
        Self::new(&config.model)
            .with_system(&config.system_prompt)
            .with_max_tokens(config.max_tokens)
    }
}

/// Summary of a finished turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Final assistant text, empty if the model returned none
    pub text: String,
    /// Number of backend calls made
    pub backend_calls: usize,
    /// Number of tool calls dispatched
    pub tool_calls: usize,
    /// History length after the turn
    pub history_len: usize,
}

/// Mediates between the operator, the backend and the tool host
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    options: OrchestratorOptions,
    reporter: Arc<dyn TurnReporter>,
    logger: Arc<dyn Logger>,
    history: Vec<ChatMessage>,
    state: TurnState,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        options: OrchestratorOptions,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            registry,
            options,
            reporter: Arc::new(SilentReporter),
            logger,
            history: Vec::new(),
            state: TurnState::AwaitingQuery,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn TurnReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Start from an existing history
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn enter(&mut self, state: TurnState) {
        log_debug!(self.logger, "[Orchestrator] {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Run one full turn for `query`.
    ///
    /// On error the turn is abandoned but history keeps what was appended
    /// before the failure (at least the user message).
    pub async fn process_query(&mut self, query: &str) -> OrchestratorResult<TurnOutcome> {
        if query.trim().is_empty() {
            return Err(OrchestratorError::EmptyQuery);
        }

        log_info!(self.logger, "[Orchestrator] Processing query ({} chars)", query.len());
        self.history.push(ChatMessage::user(query));

        let result = self.run_turn().await;
        match &result {
            Ok(outcome) => {
                self.enter(TurnState::Done);
                log_info!(
                    self.logger,
                    "[Orchestrator] Turn done: {} backend calls, {} tool calls, history {}",
                    outcome.backend_calls,
                    outcome.tool_calls,
                    outcome.history_len
                );
            }
            Err(e) => {
                log_error!(self.logger, "[Orchestrator] Turn aborted: {}", e);
            }
        }
        self.enter(TurnState::AwaitingQuery);
        result
    }

    async fn run_turn(&mut self) -> OrchestratorResult<TurnOutcome> {
        self.enter(TurnState::FetchingTools);
        let tools = self.registry.llm_tools().await?;

        let mut backend_calls = 0;
        let mut dispatched = 0;

        loop {
            backend_calls += 1;
            self.enter(TurnState::CallingLlm { round: backend_calls });
            let turn = self.call_backend(&tools).await?;

            if !turn.has_tool_calls() {
                let text = turn.text.unwrap_or_default();
                if !text.is_empty() {
                    self.reporter.assistant_text(&text);
                }
                self.history.push(ChatMessage::assistant(text.clone()));
                return Ok(TurnOutcome {
                    text,
                    backend_calls,
                    tool_calls: dispatched,
                    history_len: self.history.len(),
                });
            }

            if let Some(text) = turn.visible_text() {
                self.reporter.assistant_text(text);
            }

            self.enter(TurnState::DispatchingTools {
                pending: turn.tool_calls.len(),
            });
            let results = self.dispatch(&turn).await?;
            dispatched += results.len();

            self.history
                .push(ChatMessage::assistant_tool_calls(turn.visible_text(), &turn.tool_calls));
            self.history.extend(results.iter().map(ChatMessage::tool_result));
        }
    }

    async fn call_backend(&self, tools: &[FunctionTool]) -> OrchestratorResult<AssistantTurn> {
        let mut request = CompletionRequest::new(&self.options.model, self.history.clone())
            .with_tools(tools.to_vec());
        if let Some(system) = &self.options.system_prompt {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = self.options.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.options.temperature {
            request = request.with_temperature(temperature);
        }

        let turn = self.provider.complete(request).await?;
        log_debug!(
            self.logger,
            "[Orchestrator] Backend replied: text={}, tool_calls={}",
            turn.visible_text().is_some(),
            turn.tool_calls.len()
        );
        Ok(turn)
    }

    async fn dispatch(&self, turn: &AssistantTurn) -> OrchestratorResult<Vec<ToolResult>> {
        let mut results = Vec::with_capacity(turn.tool_calls.len());
        for call in &turn.tool_calls {
            self.reporter.tool_call(call);
            let result = self.registry.execute_tool_call(call).await?;
            if result.content.is_empty() {
                log_info!(self.logger, "[Orchestrator] Tool {} returned no results", result.name);
            }
            self.reporter.tool_result(&result);
            results.push(result);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::providers::{ScriptStep, ScriptedProvider};
    use crate::tools::InMemoryToolHost;
    use crate::types::{MessageRole, ToolCall, ToolDescriptor};
    use parking_lot::Mutex;
    use serde_json::json;

    fn tool_host() -> Arc<InMemoryToolHost> {
        Arc::new(
            InMemoryToolHost::new()
                .with_tool(ToolDescriptor::new("calculate", "Evaluate arithmetic"), |args| {
                    match args.get("expression").and_then(|v| v.as_str()) {
                        Some("2+2") => Ok(r#"{"result":4}"#.to_string()),
                        Some(other) => Ok(format!(r#"{{"result":"{}"}}"#, other)),
                        None => Err("missing expression".to_string()),
                    }
                })
                .with_tool(ToolDescriptor::new("weather", "Forecast"), |_| {
                    Ok(r#"{"forecast":"sunny"}"#.to_string())
                }),
        )
    }

    fn orchestrator(
        steps: Vec<ScriptStep>,
        host: Arc<InMemoryToolHost>,
    ) -> (Orchestrator, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(steps, Arc::new(NoOpLogger)));
        let registry = ToolRegistry::new(host, Arc::new(NoOpLogger));
        let orch = Orchestrator::new(
            provider.clone(),
            registry,
            OrchestratorOptions::new("test-model").with_system("be brief").with_max_tokens(100),
            Arc::new(NoOpLogger),
        );
        (orch, provider)
    }

    fn roles(history: &[ChatMessage]) -> Vec<MessageRole> {
        history.iter().map(|m| m.role).collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl TurnReporter for Recorder {
        fn assistant_text(&self, text: &str) {
            self.events.lock().push(format!("text:{}", text));
        }
        fn tool_call(&self, call: &ToolCall) {
            self.events.lock().push(format!("call:{}", call.name));
        }
        fn tool_result(&self, result: &ToolResult) {
            self.events.lock().push(format!("result:{}", result.call_id));
        }
    }

    #[tokio::test]
    async fn test_no_tool_turn_adds_two_messages() {
        let (mut orch, provider) = orchestrator(vec![ScriptStep::text("Hello!")], tool_host());

        let outcome = orch.process_query("hi").await.unwrap();

        assert_eq!(outcome.text, "Hello!");
        assert_eq!(outcome.backend_calls, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(outcome.history_len, 2);
        assert_eq!(roles(orch.history()), vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(orch.state(), TurnState::AwaitingQuery);
    }

    #[tokio::test]
    async fn test_request_carries_settings_and_catalog() {
        let (mut orch, provider) = orchestrator(vec![ScriptStep::text("ok")], tool_host());
        orch.process_query("hi").await.unwrap();

        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request.model, "test-model");
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.tool_names(), vec!["calculate", "weather"]);
        assert_eq!(request.messages, vec![ChatMessage::user("hi")]);
    }

    #[tokio::test]
    async fn test_tool_results_follow_calls_in_order() {
        let calls = vec![
            ToolCall::new("a", "calculate", json!({ "expression": "2+2" })),
            ToolCall::new("b", "weather", json!({ "city": "Oslo" })),
            ToolCall::new("c", "calculate", json!({ "expression": "1" })),
        ];
        let host = tool_host();
        let (mut orch, provider) = orchestrator(
            vec![ScriptStep::tool_calls(calls.clone()), ScriptStep::text("All done")],
            host.clone(),
        );

        let outcome = orch.process_query("do things").await.unwrap();

        assert_eq!(outcome.backend_calls, 2);
        assert_eq!(outcome.tool_calls, 3);
        let history = orch.history();
        assert_eq!(
            roles(history),
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Tool,
                MessageRole::Tool,
                MessageRole::Assistant,
            ]
        );
        assert_eq!(history[1].tool_calls(), calls);
        let ids: Vec<_> = history[2..5]
            .iter()
            .map(|m| m.tool_call_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(history[2].plain_text(), r#"{"result":4}"#);

        // the second backend call already sees every result
        let requests = provider.requests();
        assert_eq!(requests[1].messages.len(), 5);

        let dispatched: Vec<_> = host.calls().into_iter().map(|(name, _)| name).collect();
        assert_eq!(dispatched, vec!["calculate", "weather", "calculate"]);
    }

    #[tokio::test]
    async fn test_catalog_fetched_every_query() {
        let host = tool_host();
        let (mut orch, provider) = orchestrator(
            vec![ScriptStep::text("one"), ScriptStep::text("two")],
            host.clone(),
        );

        orch.process_query("first").await.unwrap();
        host.unregister("weather");
        host.register(ToolDescriptor::new("execute_sqlite", "Run SQL"), |_| Ok("{\"rows\":[]}".into()));
        orch.process_query("second").await.unwrap();

        assert_eq!(host.list_count(), 2);
        let requests = provider.requests();
        assert_eq!(requests[0].tool_names(), vec!["calculate", "weather"]);
        assert_eq!(requests[1].tool_names(), vec!["calculate", "execute_sqlite"]);
    }

    #[tokio::test]
    async fn test_replay_is_stable() {
        let seed = vec![ChatMessage::user("earlier"), ChatMessage::assistant("reply")];

        let mut shapes = Vec::new();
        for _ in 0..2 {
            let (orch, _) = orchestrator(vec![ScriptStep::text("same")], tool_host());
            let mut orch = orch.with_history(seed.clone());
            let outcome = orch.process_query("again").await.unwrap();
            shapes.push((outcome.history_len, roles(orch.history())));
        }

        assert_eq!(shapes[0], shapes[1]);
        assert_eq!(shapes[0].0, 4);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (mut orch, provider) = orchestrator(vec![], tool_host());
        let err = orch.process_query("   ").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyQuery));
        assert!(orch.history().is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_user_message() {
        let logger = Arc::new(MemoryLogger::new());
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptStep::fail("503")], Arc::new(NoOpLogger)));
        let mut orch = Orchestrator::new(
            provider,
            ToolRegistry::new(tool_host(), Arc::new(NoOpLogger)),
            OrchestratorOptions::new("m"),
            logger.clone(),
        );

        let err = orch.process_query("hello").await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Backend(_)));
        assert_eq!(orch.history(), &[ChatMessage::user("hello")]);
        assert!(logger
            .messages_at(LogLevel::Error)
            .iter()
            .any(|m| m.contains("Turn aborted")));
    }

    #[tokio::test]
    async fn test_backend_failure_after_tool_round_keeps_round() {
        let call = ToolCall::new("c1", "calculate", json!({ "expression": "2+2" }));
        let (mut orch, provider) = orchestrator(
            vec![
                ScriptStep::tool_calls(vec![call.clone()]),
                ScriptStep::fail("connection reset"),
            ],
            tool_host(),
        );

        let err = orch.process_query("what is 2+2?").await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Backend(_)));
        assert_eq!(err.kind(), Some(crate::orchestrator::ErrorKind::BackendCommunication));
        assert_eq!(provider.call_count(), 2);
        assert_eq!(orch.state(), TurnState::AwaitingQuery);

        let history = orch.history();
        assert_eq!(
            roles(history),
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::Tool]
        );
        assert_eq!(history[1].tool_calls(), vec![call]);
        assert_eq!(history[2].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(history[2].plain_text(), r#"{"result":4}"#);

        // the next query builds on the kept round
        provider.push(ScriptStep::text("It is 4."));
        let outcome = orch.process_query("and again?").await.unwrap();
        assert_eq!(outcome.history_len, 5);
        let requests = provider.requests();
        assert_eq!(requests[2].messages.len(), 4);
        assert_eq!(requests[2].messages[2].role, MessageRole::Tool);
    }

    #[tokio::test]
    async fn test_failed_tool_is_fed_back_to_model() {
        let call = ToolCall::new("x1", "missing_tool", json!({}));
        let (mut orch, provider) = orchestrator(
            vec![ScriptStep::tool_calls(vec![call]), ScriptStep::text("Sorry")],
            tool_host(),
        );

        let outcome = orch.process_query("try it").await.unwrap();

        assert_eq!(outcome.text, "Sorry");
        let result = &orch.history()[2];
        assert_eq!(result.tool_call_id.as_deref(), Some("x1"));
        assert!(result.plain_text().starts_with("Error during tool execution"));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_channel_failure_aborts_without_unpaired_calls() {
        let host = tool_host();
        host.break_channel_on("weather");
        let calls = vec![
            ToolCall::new("a", "calculate", json!({ "expression": "2+2" })),
            ToolCall::new("b", "weather", json!({ "city": "Rome" })),
        ];
        let (mut orch, _) = orchestrator(vec![ScriptStep::tool_calls(calls)], host);

        let err = orch.process_query("go").await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Tools(_)));
        assert_eq!(roles(orch.history()), vec![MessageRole::User]);
    }

    #[tokio::test]
    async fn test_reporter_sees_progress() {
        let recorder = Arc::new(Recorder::default());
        let turn = AssistantTurn::with_tool_calls(
            Some("Let me check".to_string()),
            vec![ToolCall::new("w1", "weather", json!({ "city": "Paris" }))],
        );
        let (orch, _) = orchestrator(vec![ScriptStep::Reply(turn), ScriptStep::text("Sunny")], tool_host());
        let mut orch = orch.with_reporter(recorder.clone());

        orch.process_query("weather in Paris?").await.unwrap();

        assert_eq!(
            *recorder.events.lock(),
            vec!["text:Let me check", "call:weather", "result:w1", "text:Sunny"]
        );
        assert_eq!(orch.history()[1].plain_text(), "Let me check");
    }
}
