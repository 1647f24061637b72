//! The Brain Log tap: interception layer over the runtime event stream.
//!
//! The tap forwards every primary-stream event unchanged and in order,
//! while mutating the request's Brain Log and injecting pending frames
//! at defined points in the stream lifecycle:
//!
//! - before the stream starts (flushes the preloaded input entry)
//! - before each response step
//! - at the first text token (which also records TTFT)
//! - at tool call start (adds the routing entry), end, and result
//! - at text/reasoning part boundaries (flushes accumulated entries)
//! - at stream end (defensive buffer flush + performance entry)
//!
//! Draining is FIFO and destructive; a side-channel frame is emitted no
//! earlier than its triggering event and no later than the next
//! injection point. Everything runs on the single request task; the
//! only suspension points are upstream polls and the consumer's own
//! backpressure.

use std::collections::HashMap;
use std::time::Instant;

use futures::{Stream, StreamExt};

use glassbox_log::{BrainLog, EntryStatus, OUTPUT_PREVIEW_CHARS, truncate_preview};
use glassbox_types::{RunEvent, TokenUsage};

use crate::chunk::ChatChunk;

/// Ordered accumulation buffers for in-flight text/reasoning parts,
/// keyed by stream id. Insertion-ordered so a defensive flush at stream
/// end emits entries deterministically.
#[derive(Debug, Default)]
struct DeltaBuffers {
    bufs: Vec<(String, String)>,
}

impl DeltaBuffers {
    /// Open a buffer for a stream id (no-op if already open).
    fn open(&mut self, id: &str) {
        if !self.contains(id) {
            self.bufs.push((id.to_string(), String::new()));
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.bufs.iter().any(|(buf_id, _)| buf_id == id)
    }

    fn append(&mut self, id: &str, delta: &str) {
        if let Some((_, buf)) = self.bufs.iter_mut().find(|(buf_id, _)| buf_id == id) {
            buf.push_str(delta);
        }
    }

    /// Close and return the accumulated content for a stream id.
    fn close(&mut self, id: &str) -> Option<String> {
        let pos = self.bufs.iter().position(|(buf_id, _)| buf_id == id)?;
        Some(self.bufs.remove(pos).1)
    }

    /// Remove and return all remaining buffers, in insertion order.
    fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.bufs)
            .into_iter()
            .map(|(_, buf)| buf)
            .collect()
    }
}

/// Interception layer that turns a [`RunEvent`] stream into the
/// multiplexed outbound [`ChatChunk`] stream, recording Brain Log
/// entries along the way.
///
/// All state (tool timing map, delta buffers, usage totals) is owned by
/// the tap instance for one request; nothing is shared across requests.
pub struct BrainLogTap {
    log: BrainLog,
}

impl BrainLogTap {
    /// Create a tap writing to the given request-scoped Brain Log
    /// handle. A disabled handle degrades to pure pass-through.
    pub fn new(log: BrainLog) -> Self {
        Self { log }
    }

    /// Wrap the runtime's event stream into the outbound chunk stream.
    ///
    /// The input stream is pulled on the same task that serves the
    /// response, so the run only advances as the client consumes.
    pub fn wrap(
        self,
        events: impl Stream<Item = RunEvent> + Send,
    ) -> impl Stream<Item = ChatChunk> + Send {
        let log = self.log;

        async_stream::stream! {
            let mut events = std::pin::pin!(events);
            let mut tool_started: HashMap<String, Instant> = HashMap::new();
            let mut text_bufs = DeltaBuffers::default();
            let mut thinking_bufs = DeltaBuffers::default();
            let mut usage = TokenUsage::default();
            let mut saw_usage = false;
            let mut step_open = false;

            yield ChatChunk::Start;
            for frame in drain(&log) {
                yield frame;
            }

            while let Some(event) = events.next().await {
                match event {
                    RunEvent::StepStart => {
                        if step_open {
                            yield ChatChunk::FinishStep;
                        }
                        step_open = true;
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::StartStep;
                    }

                    RunEvent::TextStart { id } => {
                        log.record_first_token();
                        text_bufs.open(&id);
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::TextStart { id };
                    }
                    RunEvent::TextDelta { id, delta } => {
                        if !text_bufs.contains(&id) {
                            // No text-start seen: the first delta is the
                            // first observable token.
                            log.record_first_token();
                            text_bufs.open(&id);
                        }
                        text_bufs.append(&id, &delta);
                        yield ChatChunk::TextDelta { id, delta };
                    }
                    RunEvent::TextEnd { id } => {
                        if let Some(text) = text_bufs.close(&id) {
                            if !text.is_empty() {
                                log.add_text(&text, false);
                            }
                        }
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::TextEnd { id };
                    }

                    RunEvent::ThinkingStart { id } => {
                        thinking_bufs.open(&id);
                        yield ChatChunk::ReasoningStart { id };
                    }
                    RunEvent::ThinkingDelta { id, delta } => {
                        thinking_bufs.open(&id);
                        thinking_bufs.append(&id, &delta);
                        yield ChatChunk::ReasoningDelta { id, delta };
                    }
                    RunEvent::ThinkingEnd { id } => {
                        if let Some(thinking) = thinking_bufs.close(&id) {
                            if !thinking.is_empty() {
                                log.add_thinking(&thinking);
                            }
                        }
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::ReasoningEnd { id };
                    }

                    RunEvent::ToolCallStart { id, name } => {
                        tool_started.insert(id.clone(), Instant::now());
                        log.add_routing(
                            Some(&name),
                            "Model selected this tool for the current query",
                        );
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::ToolInputStart {
                            tool_call_id: id,
                            tool_name: name,
                        };
                    }
                    RunEvent::ToolInputDelta { id, delta } => {
                        yield ChatChunk::ToolInputDelta {
                            tool_call_id: id,
                            input_text_delta: delta,
                        };
                    }
                    RunEvent::ToolCallEnd { id, name, input } => {
                        yield ChatChunk::ToolInputAvailable {
                            tool_call_id: id,
                            tool_name: name,
                            input,
                        };
                        for frame in drain(&log) {
                            yield frame;
                        }
                    }

                    RunEvent::ToolResult { id, name, content, is_error } => {
                        let duration_ms = tool_started
                            .remove(&id)
                            .map(|started| started.elapsed().as_secs_f64() * 1000.0);

                        // The execution-site middleware logs under the
                        // same call id; only reconstruct a completion
                        // entry when nothing logged this call yet.
                        if !log.has_entry(&id) {
                            record_tool_completion(
                                &log,
                                name.as_deref(),
                                content.as_deref(),
                                is_error,
                                duration_ms,
                            );
                        }
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::ToolOutputAvailable {
                            tool_call_id: id,
                            output: serde_json::Value::String(content.unwrap_or_default()),
                        };
                    }

                    RunEvent::Usage(step_usage) => {
                        saw_usage = true;
                        usage.input_tokens += step_usage.input_tokens;
                        usage.output_tokens += step_usage.output_tokens;
                    }

                    RunEvent::Error { message } => {
                        tracing::warn!(error = %message, "upstream stream error");
                        // Best-effort final flush before terminating.
                        flush_buffers(&log, &mut text_bufs, &mut thinking_bufs);
                        add_performance(&log, &usage, saw_usage);
                        for frame in drain(&log) {
                            yield frame;
                        }
                        yield ChatChunk::Error { error_text: message };
                        if step_open {
                            yield ChatChunk::FinishStep;
                        }
                        yield ChatChunk::Finish;
                        return;
                    }
                }
            }

            // Stream exhausted: flush dangling buffers (the upstream may
            // have ended without explicit end events), then close out.
            flush_buffers(&log, &mut text_bufs, &mut thinking_bufs);
            add_performance(&log, &usage, saw_usage);
            for frame in drain(&log) {
                yield frame;
            }
            if step_open {
                yield ChatChunk::FinishStep;
            }
            yield ChatChunk::Finish;
        }
    }
}

/// Drain the pending queue into side-channel frames, FIFO.
fn drain(log: &BrainLog) -> Vec<ChatChunk> {
    log.take_pending()
        .iter()
        .map(ChatChunk::from_entry)
        .collect()
}

/// Flush any non-empty delta buffers as entries (defensive completion).
fn flush_buffers(log: &BrainLog, text_bufs: &mut DeltaBuffers, thinking_bufs: &mut DeltaBuffers) {
    for text in text_bufs.drain() {
        if !text.is_empty() {
            log.add_text(&text, false);
        }
    }
    for thinking in thinking_bufs.drain() {
        if !thinking.is_empty() {
            log.add_thinking(&thinking);
        }
    }
}

/// Append the end-of-request performance entry.
fn add_performance(log: &BrainLog, usage: &TokenUsage, saw_usage: bool) {
    let (tokens_in, tokens_out) = if saw_usage {
        (Some(usage.input_tokens), Some(usage.output_tokens))
    } else {
        (None, None)
    };
    log.add_performance(log.ttft_ms(), log.total_ms(), tokens_in, tokens_out);
}

/// Record a standalone tool completion from a stream-observed result.
///
/// The success signal is a heuristic: a result with no recoverable
/// content counts as a failure with a generic error. A missing tool
/// name becomes "unknown" rather than failing the stream.
fn record_tool_completion(
    log: &BrainLog,
    name: Option<&str>,
    content: Option<&str>,
    is_error: bool,
    duration_ms: Option<f64>,
) {
    let tool_name = name.unwrap_or("unknown");
    match content {
        Some(text) if !is_error => {
            let preview = truncate_preview(text, OUTPUT_PREVIEW_CHARS);
            log.add_tool_call_complete(
                tool_name,
                serde_json::json!({}),
                Some(&preview),
                EntryStatus::Success,
                None,
                duration_ms,
            );
        }
        _ => {
            log.add_tool_call_complete(
                tool_name,
                serde_json::json!({}),
                None,
                EntryStatus::Failure,
                Some("Tool execution failed"),
                duration_ms,
            );
        }
    }
}
