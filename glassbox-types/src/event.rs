//! Runtime-level event vocabulary.
//!
//! [`RunEvent`] is what the agent runtime emits for one full request:
//! provider stream events normalized into explicit start/delta/end
//! groups per stream id, plus tool lifecycle events with correlation
//! ids and per-step markers. The Brain Log tap consumes exactly this
//! vocabulary; the stream ends by channel close, which the tap treats
//! as exhaustion.

use crate::types::TokenUsage;

/// One event in an agent run's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A response step (one model call) is starting.
    StepStart,
    /// A text output stream has started.
    TextStart {
        /// Stream identifier.
        id: String,
    },
    /// Incremental text content.
    TextDelta {
        /// Stream identifier.
        id: String,
        /// Text fragment.
        delta: String,
    },
    /// A text output stream has ended.
    TextEnd {
        /// Stream identifier.
        id: String,
    },
    /// A reasoning stream has started.
    ThinkingStart {
        /// Stream identifier.
        id: String,
    },
    /// Incremental reasoning content.
    ThinkingDelta {
        /// Stream identifier.
        id: String,
        /// Reasoning fragment.
        delta: String,
    },
    /// A reasoning stream has ended.
    ThinkingEnd {
        /// Stream identifier.
        id: String,
    },
    /// The model has started emitting a tool call.
    ToolCallStart {
        /// Tool call correlation id.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Incremental tool input JSON.
    ToolInputDelta {
        /// Tool call correlation id.
        id: String,
        /// JSON fragment.
        delta: String,
    },
    /// The tool call is fully specified (arguments assembled).
    ToolCallEnd {
        /// Tool call correlation id.
        id: String,
        /// Tool name.
        name: String,
        /// Assembled input arguments.
        input: serde_json::Value,
    },
    /// A tool produced its result.
    ///
    /// `name` and `content` are optional on purpose: a result observed
    /// from a drifting upstream protocol may carry neither, and the
    /// consumer must degrade (placeholder name, generic failure) rather
    /// than abort the stream.
    ToolResult {
        /// Tool call correlation id.
        id: String,
        /// Tool name, when recoverable.
        name: Option<String>,
        /// Result content, when recoverable.
        content: Option<String>,
        /// Explicit error signal from the execution site.
        is_error: bool,
    },
    /// Token usage for the run so far.
    Usage(TokenUsage),
    /// A stream-level error. Terminates the run.
    Error {
        /// Human-readable description.
        message: String,
    },
}
