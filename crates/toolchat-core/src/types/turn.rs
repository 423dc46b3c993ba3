//! Backend reply types

use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// Incremental piece of a backend reply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Text content chunk
    Text {
        text: String,
    },
    /// Complete tool call
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCall,
    },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    /// Create a tool call chunk
    pub fn tool_call(tool_call: ToolCall) -> Self {
        StreamChunk::ToolCall { tool_call }
    }
}

/// One complete reply from the LLM backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    /// Free text produced alongside (or instead of) tool calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Tool invocations requested by the model, in model order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    /// A reply that only carries text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting tool calls, with optional accompanying text
    pub fn with_tool_calls(text: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self { text, tool_calls }
    }

    /// Fold streamed chunks into a single reply
    pub fn from_chunks(chunks: impl IntoIterator<Item = StreamChunk>) -> Self {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for chunk in chunks {
            match chunk {
                StreamChunk::Text { text: t } => text.push_str(&t),
                StreamChunk::ToolCall { tool_call } => tool_calls.push(tool_call),
            }
        }
        Self {
            text: (!text.is_empty()).then_some(text),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text if present and non-empty
    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}
