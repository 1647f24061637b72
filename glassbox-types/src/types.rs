//! Conversation and request/response types.
//!
//! These are the internal message shapes, not any provider's API
//! format. Providers convert to/from these.

use serde::{Deserialize, Serialize};

use glassbox_log::BrainLog;

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions).
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

/// A single content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Model reasoning content.
    Thinking {
        /// The reasoning text.
        thinking: String,
    },
    /// A tool invocation request from the model.
    ToolUse {
        /// Unique identifier for this tool use.
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// Tool input parameters.
        input: serde_json::Value,
    },
    /// Result from a tool execution, echoed back to the model.
    ToolResult {
        /// The tool-use id this result corresponds to.
        tool_use_id: String,
        /// Name of the tool that produced this result.
        name: String,
        /// The result content.
        content: String,
        /// Whether the tool execution errored.
        is_error: bool,
    },
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// Content blocks of the message.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Convenience: a user message with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Concatenated text of all plain-text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// JSON Schema description of a tool for the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
}

/// Request sent to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model to use (None = provider default).
    pub model: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// System prompt.
    pub system: Option<String>,
    /// Available tools.
    pub tools: Vec<ToolDefinition>,
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Model produced a final response.
    EndTurn,
    /// Model wants to use a tool.
    ToolUse,
    /// Hit the max_tokens limit.
    MaxTokens,
}

/// Token usage from a single provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

/// Response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assembled assistant message.
    pub message: Message,
    /// Why the provider stopped.
    pub stop_reason: StopReason,
    /// Token usage.
    pub usage: TokenUsage,
}

/// Per-request context passed to every tool execution.
///
/// Carries the request identity and the request-scoped [`BrainLog`]
/// handle. The handle travels explicitly through every signature that
/// needs it; there is no ambient global to reach for.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Identifier of the originating request.
    pub request_id: String,
    /// Request-scoped Brain Log handle (disabled outside a request).
    pub brain_log: BrainLog,
}

impl ToolContext {
    /// Context for one request, with a live Brain Log handle.
    pub fn new(request_id: impl Into<String>, brain_log: BrainLog) -> Self {
        Self {
            request_id: request_id.into(),
            brain_log,
        }
    }
}

/// Output of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text content returned to the model.
    pub content: String,
    /// Structured form of the result, when the tool produced one.
    pub structured: Option<serde_json::Value>,
    /// Whether this output represents a tool-level error.
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_serde_roundtrip() {
        for role in [Role::System, Role::User, Role::Assistant] {
            let json = serde_json::to_string(&role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
        }
    }

    #[test]
    fn content_block_tool_use_roundtrip() {
        let block = ContentBlock::ToolUse {
            id: "call_1".into(),
            name: "get_skills".into(),
            input: json!({}),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        let back: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(block, back);
    }

    #[test]
    fn content_block_tool_result_roundtrip() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "call_1".into(),
            name: "get_skills".into(),
            content: "ok".into(),
            is_error: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        let back: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(block, back);
    }

    #[test]
    fn message_text_concatenates_text_blocks() {
        let message = Message {
            role: Role::Assistant,
            content: vec![
                ContentBlock::Text { text: "Hello ".into() },
                ContentBlock::Thinking { thinking: "hmm".into() },
                ContentBlock::Text { text: "world".into() },
            ],
        };
        assert_eq!(message.text(), "Hello world");
    }

    #[test]
    fn tool_context_default_is_disabled() {
        let ctx = ToolContext::default();
        assert!(!ctx.brain_log.is_enabled());
    }
}
