//! SSE streaming support for `streamGenerateContent`.
//!
//! Parses the Server-Sent Events stream produced by the Generative
//! Language API (`alt=sse`) and maps each chunk to [`StreamEvent`]s.
//! Each SSE `data:` line carries one complete `GenerateContentResponse`
//! JSON object; there are no `event:` lines and no `[DONE]` terminator.

use futures::{Stream, StreamExt};
use reqwest::Response;

use glassbox_types::{
    ContentBlock, Message, Role, StreamEvent, StreamHandle, TokenUsage,
};

use crate::mapping::{synth_call_id, usage_from_json};

/// Wrap an HTTP response body into a [`StreamHandle`] emitting
/// [`StreamEvent`]s.
pub(crate) fn stream_completion(response: Response) -> StreamHandle {
    let byte_stream = response.bytes_stream();
    StreamHandle::new(parse_sse_stream(byte_stream))
}

/// Parse a raw byte stream into a stream of [`StreamEvent`]s.
///
/// Drives all SSE parsing state internally; completes when the byte
/// stream ends, emitting the accumulated usage and assembled message
/// last.
fn parse_sse_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    async_stream::stream! {
        let mut state = SseParserState::new();
        let mut bytes_stream = std::pin::pin!(byte_stream);
        let mut line_buf = String::new();

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield StreamEvent::Error(format!("stream read error: {e}"));
                    return;
                }
            };

            let chunk_str = match std::str::from_utf8(&chunk) {
                Ok(s) => s,
                Err(e) => {
                    yield StreamEvent::Error(format!("UTF-8 decode error: {e}"));
                    return;
                }
            };

            // Accumulate partial lines across byte chunks and process
            // each complete line.
            line_buf.push_str(chunk_str);
            while let Some(newline_pos) = line_buf.find('\n') {
                let line = line_buf[..newline_pos].trim_end_matches('\r').to_string();
                line_buf.drain(..=newline_pos);

                for event in state.process_line(&line) {
                    yield event;
                }
            }
        }

        // Process any trailing line without a final newline.
        if !line_buf.trim().is_empty() {
            let line = line_buf.trim().to_string();
            for event in state.process_line(&line) {
                yield event;
            }
        }

        if let Some(usage) = state.take_usage() {
            yield StreamEvent::Usage(usage);
        }
        if let Some(message) = state.take_final_message() {
            yield StreamEvent::MessageComplete(message);
        }
    }
}

/// In-progress tool call assembled from a `functionCall` part.
struct ToolCallInProgress {
    id: String,
    name: String,
    input: serde_json::Value,
}

/// Tracks in-progress streaming state across SSE chunks.
struct SseParserState {
    /// Accumulated plain text.
    text_buf: String,
    /// Accumulated thinking content.
    thinking_buf: String,
    /// Function calls seen so far, in arrival order.
    tool_calls: Vec<ToolCallInProgress>,
    /// Latest usage metadata (cumulative per response).
    usage: Option<TokenUsage>,
}

impl SseParserState {
    fn new() -> Self {
        Self {
            text_buf: String::new(),
            thinking_buf: String::new(),
            tool_calls: Vec::new(),
            usage: None,
        }
    }

    /// Process one SSE line and return any events it produces.
    fn process_line(&mut self, line: &str) -> Vec<StreamEvent> {
        // Blank lines separate events; comment lines start with ':'.
        let Some(data) = line.strip_prefix("data:") else {
            return vec![];
        };
        let data = data.trim();
        if data.is_empty() {
            return vec![];
        }

        let json: serde_json::Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(e) => {
                // One malformed chunk must not kill the response.
                tracing::debug!(error = %e, "skipping malformed SSE chunk");
                return vec![];
            }
        };

        self.process_chunk(&json)
    }

    /// Map one `GenerateContentResponse` chunk to events.
    fn process_chunk(&mut self, json: &serde_json::Value) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(parts) = json["candidates"][0]["content"]["parts"].as_array() {
            for part in parts {
                if let Some(text) = part["text"].as_str() {
                    if part["thought"].as_bool().unwrap_or(false) {
                        self.thinking_buf.push_str(text);
                        events.push(StreamEvent::ThinkingDelta(text.to_string()));
                    } else {
                        self.text_buf.push_str(text);
                        events.push(StreamEvent::TextDelta(text.to_string()));
                    }
                } else if part["functionCall"].is_object() {
                    let name = part["functionCall"]["name"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();
                    let input = part["functionCall"]
                        .get("args")
                        .cloned()
                        .unwrap_or_else(|| serde_json::json!({}));
                    let id = synth_call_id();
                    events.push(StreamEvent::ToolUseStart {
                        id: id.clone(),
                        name: name.clone(),
                    });
                    events.push(StreamEvent::ToolUseEnd { id: id.clone() });
                    self.tool_calls.push(ToolCallInProgress { id, name, input });
                }
                // Unknown part shapes are skipped.
            }
        }

        if let Some(usage) = usage_from_json(json) {
            // Cumulative totals; keep the latest, emit once at the end.
            self.usage = Some(usage);
        }

        if let Some(error) = json.get("error") {
            let message = error["message"]
                .as_str()
                .unwrap_or("unknown streaming error")
                .to_string();
            events.push(StreamEvent::Error(message));
        }

        events
    }

    fn take_usage(&mut self) -> Option<TokenUsage> {
        self.usage.take()
    }

    /// Assemble and return the final [`Message`] from buffered content.
    fn take_final_message(&mut self) -> Option<Message> {
        let mut content = Vec::new();

        if !self.text_buf.is_empty() {
            content.push(ContentBlock::Text {
                text: std::mem::take(&mut self.text_buf),
            });
        }
        if !self.thinking_buf.is_empty() {
            content.push(ContentBlock::Thinking {
                thinking: std::mem::take(&mut self.thinking_buf),
            });
        }
        for call in self.tool_calls.drain(..) {
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.name,
                input: call.input,
            });
        }

        if content.is_empty() {
            return None;
        }

        Some(Message {
            role: Role::Assistant,
            content,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
