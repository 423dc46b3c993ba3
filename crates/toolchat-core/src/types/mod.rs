//! Core types shared by the orchestrator, providers and tool client

mod message;
mod tool;
mod turn;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{ToolCall, ToolDescriptor, ToolOutput, ToolResult};
pub use turn::{AssistantTurn, StreamChunk};
