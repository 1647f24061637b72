//! Wire chunk vocabulary and the Brain Log transport formatter.
//!
//! Chunks follow the Vercel AI SDK data-stream protocol the frontend
//! speaks: each chunk is one SSE `data:` event carrying a typed JSON
//! envelope, and the stream terminates with `data: [DONE]`. Brain Log
//! entries ride the same connection as `data-brain-log` frames, so the
//! client can pattern-match on the `type` tag to split the two streams
//! without a second connection.

use serde::{Deserialize, Serialize};

use glassbox_log::LogEntry;

/// Terminal SSE event closing the stream.
pub const SSE_DONE: &str = "data: [DONE]\n\n";

/// One chunk in the multiplexed outbound stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatChunk {
    /// Response stream opened.
    Start,
    /// A response step (one model call) is starting.
    StartStep,
    /// A text part has started.
    TextStart {
        /// Part identifier.
        id: String,
    },
    /// Incremental text content.
    TextDelta {
        /// Part identifier.
        id: String,
        /// Text fragment.
        delta: String,
    },
    /// A text part has ended.
    TextEnd {
        /// Part identifier.
        id: String,
    },
    /// A reasoning part has started.
    ReasoningStart {
        /// Part identifier.
        id: String,
    },
    /// Incremental reasoning content.
    ReasoningDelta {
        /// Part identifier.
        id: String,
        /// Reasoning fragment.
        delta: String,
    },
    /// A reasoning part has ended.
    ReasoningEnd {
        /// Part identifier.
        id: String,
    },
    /// The model started emitting a tool call.
    #[serde(rename_all = "camelCase")]
    ToolInputStart {
        /// Tool call identifier.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
    },
    /// Incremental tool input JSON.
    #[serde(rename_all = "camelCase")]
    ToolInputDelta {
        /// Tool call identifier.
        tool_call_id: String,
        /// JSON fragment.
        input_text_delta: String,
    },
    /// The tool call's arguments are fully assembled.
    #[serde(rename_all = "camelCase")]
    ToolInputAvailable {
        /// Tool call identifier.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Assembled input arguments.
        input: serde_json::Value,
    },
    /// The tool produced its output.
    #[serde(rename_all = "camelCase")]
    ToolOutputAvailable {
        /// Tool call identifier.
        tool_call_id: String,
        /// Tool output payload.
        output: serde_json::Value,
    },
    /// A response step finished.
    FinishStep,
    /// The response finished.
    Finish,
    /// A stream-level error.
    #[serde(rename_all = "camelCase")]
    Error {
        /// Human-readable description.
        error_text: String,
    },
    /// A Brain Log side-channel frame.
    #[serde(rename = "data-brain-log")]
    BrainLog {
        /// The entry's wire mapping (epoch-millisecond timestamps).
        data: serde_json::Value,
    },
}

impl ChatChunk {
    /// Format a Brain Log entry as its side-channel frame: exactly one
    /// self-describing chunk per entry.
    pub fn from_entry(entry: &LogEntry) -> Self {
        ChatChunk::BrainLog {
            data: entry.to_wire(),
        }
    }

    /// Encode this chunk as one SSE event.
    pub fn encode_sse(&self) -> String {
        // ChatChunk serialization cannot fail: all payloads are plain
        // maps/strings. Fall back to an empty object to keep the frame
        // boundary intact regardless.
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {json}\n\n")
    }
}
