//! Log entry types and kind-specific constructors.
//!
//! Each entry kind has a factory that takes exactly the fields meaningful
//! to that kind and derives the title deterministically. Preview fields
//! are truncated at construction time (100 characters for input
//! messages, 200 for tool results, reasoning, and text) because the
//! bound is a wire-size control the frontend relies on, not a display
//! choice.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Preview bound for user input messages.
pub const INPUT_PREVIEW_CHARS: usize = 100;
/// Preview bound for tool results, reasoning, and text output.
pub const OUTPUT_PREVIEW_CHARS: usize = 200;

/// The kind of a Brain Log entry. Closed set; each kind defines its own
/// `details` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// User input received.
    Input,
    /// Tool/path routing decision.
    Routing,
    /// Model reasoning (thinking) content.
    Thinking,
    /// Model text output.
    Text,
    /// Tool invocation (pending or completed).
    ToolCall,
    /// Tool execution result, separate from the invocation.
    ToolResult,
    /// Output schema validation.
    Validation,
    /// End-of-request performance metrics.
    Performance,
}

impl EntryKind {
    /// Wire-format name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Input => "input",
            EntryKind::Routing => "routing",
            EntryKind::Thinking => "thinking",
            EntryKind::Text => "text",
            EntryKind::ToolCall => "tool_call",
            EntryKind::ToolResult => "tool_result",
            EntryKind::Validation => "validation",
            EntryKind::Performance => "performance",
        }
    }
}

/// Status of a Brain Log entry.
///
/// `Pending` is only constructed for tool-call entries awaiting their
/// result; everything else is created `Success` or `Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    /// Awaiting completion (tool calls only).
    Pending,
    /// Completed successfully.
    Success,
    /// Completed with an error.
    Failure,
}

impl EntryStatus {
    /// Wire-format name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Success => "success",
            EntryStatus::Failure => "failure",
        }
    }
}

/// One observable event in the agent's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Opaque unique id, used to correlate a pending entry with its
    /// later amendment.
    pub id: String,
    /// Creation time as epoch milliseconds (the wire format).
    pub timestamp_ms: i64,
    /// Entry kind.
    pub kind: EntryKind,
    /// Short human-readable summary, derived from kind + key details.
    pub title: String,
    /// Kind-specific named fields.
    pub details: Map<String, Value>,
    /// Entry status.
    pub status: EntryStatus,
    /// Duration of the timed operation, if one completed.
    pub duration_ms: Option<f64>,
}

/// Truncate `s` to at most `bound` characters, appending `"..."` when
/// anything was cut. Character-based, so multi-byte input never splits.
pub fn truncate_preview(s: &str, bound: usize) -> String {
    match s.char_indices().nth(bound) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}

/// Round a millisecond metric to 2 decimal places. Applied at entry
/// creation, not at render time.
fn round2(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

impl LogEntry {
    fn new(kind: EntryKind, title: String, details: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp_ms: now_epoch_ms(),
            kind,
            title,
            details,
            status: EntryStatus::Success,
            duration_ms: None,
        }
    }

    /// User input received.
    pub fn input(message: &str) -> Self {
        let mut details = Map::new();
        details.insert(
            "message_preview".into(),
            json!(truncate_preview(message, INPUT_PREVIEW_CHARS)),
        );
        details.insert("length".into(), json!(message.chars().count()));
        Self::new(EntryKind::Input, "User message received".into(), details)
    }

    /// Tool/path routing decision.
    pub fn routing(
        selected_tool: Option<&str>,
        reason: &str,
        alternatives: Option<&[String]>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("reason".into(), json!(reason));
        if let Some(tool) = selected_tool {
            details.insert("selected_tool".into(), json!(tool));
        }
        if let Some(alts) = alternatives
            && !alts.is_empty()
        {
            details.insert("alternatives_considered".into(), json!(alts));
        }
        let title = match selected_tool {
            Some(tool) => format!("Selected tool: {tool}"),
            None => "Direct response (no tool)".into(),
        };
        Self::new(EntryKind::Routing, title, details)
    }

    /// Model reasoning content.
    pub fn thinking(thinking_text: &str) -> Self {
        let mut details = Map::new();
        details.insert(
            "preview".into(),
            json!(truncate_preview(thinking_text, OUTPUT_PREVIEW_CHARS)),
        );
        details.insert("length".into(), json!(thinking_text.chars().count()));
        Self::new(EntryKind::Thinking, "Model reasoning".into(), details)
    }

    /// Model text output.
    pub fn text(text: &str, is_partial: bool) -> Self {
        let mut details = Map::new();
        details.insert(
            "preview".into(),
            json!(truncate_preview(text, OUTPUT_PREVIEW_CHARS)),
        );
        details.insert("length".into(), json!(text.chars().count()));
        details.insert("is_partial".into(), json!(is_partial));
        let title = if is_partial { "Text chunk" } else { "Text response" };
        Self::new(EntryKind::Text, title.into(), details)
    }

    /// Tool invocation awaiting its result. The caller supplies the
    /// entry id so the later amendment can be correlated with the
    /// model's call id.
    pub fn tool_call_pending(id: impl Into<String>, tool_name: &str, arguments: Value) -> Self {
        let mut details = Map::new();
        details.insert("tool".into(), json!(tool_name));
        details.insert("arguments".into(), arguments);
        Self {
            id: id.into(),
            timestamp_ms: now_epoch_ms(),
            kind: EntryKind::ToolCall,
            title: format!("Calling {tool_name}..."),
            details,
            status: EntryStatus::Pending,
            duration_ms: None,
        }
    }

    /// Completed tool invocation.
    pub fn tool_call(
        tool_name: &str,
        arguments: Value,
        result_preview: Option<&str>,
        status: EntryStatus,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("tool".into(), json!(tool_name));
        details.insert("arguments".into(), arguments);
        if let Some(preview) = result_preview {
            details.insert("result_preview".into(), json!(preview));
        }
        if let Some(err) = error {
            details.insert("error".into(), json!(err));
        }
        let mut entry = Self::new(EntryKind::ToolCall, format!("Tool call: {tool_name}"), details);
        entry.status = status;
        entry.duration_ms = duration_ms.map(round2);
        entry
    }

    /// Tool execution result, separate from the invocation entry.
    pub fn tool_result(
        tool_name: &str,
        result_preview: Option<&str>,
        status: EntryStatus,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("tool".into(), json!(tool_name));
        if let Some(preview) = result_preview {
            details.insert("result_preview".into(), json!(preview));
        }
        if let Some(err) = error {
            details.insert("error".into(), json!(err));
        }
        let title = if status == EntryStatus::Failure {
            format!("Tool failed: {tool_name}")
        } else {
            format!("Tool result: {tool_name}")
        };
        let mut entry = Self::new(EntryKind::ToolResult, title, details);
        entry.status = status;
        entry.duration_ms = duration_ms.map(round2);
        entry
    }

    /// Output schema validation.
    pub fn validation(
        schema_name: &str,
        status: EntryStatus,
        validation_errors: Option<&[String]>,
        fallback_action: Option<&str>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("schema".into(), json!(schema_name));
        if let Some(errors) = validation_errors
            && !errors.is_empty()
        {
            details.insert("errors".into(), json!(errors));
        }
        if let Some(action) = fallback_action {
            details.insert("fallback_action".into(), json!(action));
        }
        let mut entry = Self::new(
            EntryKind::Validation,
            format!("Output schema validated: {schema_name}"),
            details,
        );
        entry.status = status;
        entry
    }

    /// End-of-request performance metrics. Millisecond values are
    /// rounded to 2 decimal places here, once.
    pub fn performance(
        ttft_ms: Option<f64>,
        total_ms: Option<f64>,
        tokens_in: Option<u64>,
        tokens_out: Option<u64>,
    ) -> Self {
        let mut details = Map::new();
        if let Some(ttft) = ttft_ms {
            details.insert("ttft_ms".into(), json!(round2(ttft)));
        }
        if let Some(total) = total_ms {
            details.insert("total_ms".into(), json!(round2(total)));
        }
        if let Some(tokens) = tokens_in {
            details.insert("tokens_in".into(), json!(tokens));
        }
        if let Some(tokens) = tokens_out {
            details.insert("tokens_out".into(), json!(tokens));
        }
        let mut entry = Self::new(EntryKind::Performance, "Request complete".into(), details);
        entry.duration_ms = total_ms.map(round2);
        entry
    }

    /// Wire representation: the exact payload mapping of a brain-log
    /// frame. Timestamps are epoch-millisecond integers.
    pub fn to_wire(&self) -> Value {
        json!({
            "id": self.id,
            "timestamp": self.timestamp_ms,
            "type": self.kind.as_str(),
            "title": self.title,
            "details": self.details,
            "status": self.status.as_str(),
            "duration_ms": self.duration_ms,
        })
    }
}
