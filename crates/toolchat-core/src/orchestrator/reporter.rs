use crate::types::{ToolCall, ToolResult};

/// Receives progress from a running turn, for display
///
/// All methods default to doing nothing.
pub trait TurnReporter: Send + Sync {
    /// Non-empty assistant text, both intermediate and final
    fn assistant_text(&self, _text: &str) {}

    /// A tool call is about to be dispatched
    fn tool_call(&self, _call: &ToolCall) {}

    /// A tool call finished (successfully or as an error result)
    fn tool_result(&self, _result: &ToolResult) {}
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl TurnReporter for SilentReporter {}
