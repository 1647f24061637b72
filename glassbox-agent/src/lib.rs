#![deny(missing_docs)]
//! Streaming agent loop: model + tools in a reasoning cycle.
//!
//! [`AgentLoop`] drives the Reason-Act-Observe cycle against a
//! [`Provider`]: call the model with streaming, forward its events,
//! execute any tool calls through the [`ToolRegistry`], append the
//! results, and repeat until the model answers without tools or the
//! turn limit is reached.
//!
//! [`AgentLoop::run_stream`] returns the run as a pull-driven stream of
//! [`RunEvent`]s: provider deltas normalized into explicit
//! start/delta/end groups per stream id, tool lifecycle events keyed by
//! the model's call ids, and per-step markers. The whole run advances
//! on the consumer's task as the stream is polled, so one request is
//! one cooperative task and downstream observers see events in a
//! deterministic order. Dropping the stream cancels the run.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use uuid::Uuid;

use glassbox_tool::{ToolCall, ToolRegistry};
use glassbox_types::{
    CompletionRequest, ContentBlock, Message, Provider, Role, RunEvent, StreamEvent, ToolContext,
};

/// Static configuration for an [`AgentLoop`].
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// System prompt prepended to every model call.
    pub system_prompt: String,
    /// Model identifier (None = provider default).
    pub model: Option<String>,
    /// Maximum reasoning turns before the loop stops.
    pub max_turns: u32,
    /// Maximum output tokens per model call.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            model: None,
            max_turns: 10,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Which delta stream is currently open, if any.
enum OpenStream {
    Text(String),
    Thinking(String),
}

impl OpenStream {
    /// The event that closes this stream.
    fn end_event(self) -> RunEvent {
        match self {
            OpenStream::Text(id) => RunEvent::TextEnd { id },
            OpenStream::Thinking(id) => RunEvent::ThinkingEnd { id },
        }
    }
}

/// A streaming agent loop over a provider and a tool registry.
pub struct AgentLoop<P: Provider> {
    provider: Arc<P>,
    tools: Arc<ToolRegistry>,
    config: LoopConfig,
    messages: Vec<Message>,
}

impl<P: Provider + 'static> AgentLoop<P> {
    /// Create a loop with no conversation history.
    pub fn new(provider: Arc<P>, tools: Arc<ToolRegistry>, config: LoopConfig) -> Self {
        Self {
            provider,
            tools,
            config,
            messages: Vec::new(),
        }
    }

    /// Seed the loop with prior conversation turns.
    #[must_use]
    pub fn with_history(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Run the loop, yielding [`RunEvent`]s as the run advances.
    ///
    /// The user message is appended first. The stream ends after the
    /// final step's events (or an `Error` event); dropping it cancels
    /// the run and discards all loop state.
    pub fn run_stream(
        mut self,
        user_message: Message,
        ctx: ToolContext,
    ) -> impl Stream<Item = RunEvent> + Send {
        self.messages.push(user_message);

        async_stream::stream! {
            let mut turns: u32 = 0;

            loop {
                if turns >= self.config.max_turns {
                    yield RunEvent::Error {
                        message: format!("max turns reached ({})", self.config.max_turns),
                    };
                    return;
                }

                yield RunEvent::StepStart;

                let request = CompletionRequest {
                    model: self.config.model.clone(),
                    messages: self.messages.clone(),
                    system: Some(self.config.system_prompt.clone()),
                    tools: self.tools.definitions(),
                    max_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                };

                let handle = match self.provider.complete_stream(request).await {
                    Ok(handle) => handle,
                    Err(err) => {
                        tracing::warn!(error = %err, "provider stream request failed");
                        yield RunEvent::Error {
                            message: format!("provider error: {err}"),
                        };
                        return;
                    }
                };

                let mut stream = handle.receiver;
                let mut open: Option<OpenStream> = None;
                let mut assembled: Option<Message> = None;

                while let Some(event) = stream.next().await {
                    match event {
                        StreamEvent::TextDelta(delta) => {
                            match &open {
                                Some(OpenStream::Text(id)) => {
                                    yield RunEvent::TextDelta { id: id.clone(), delta };
                                }
                                _ => {
                                    if let Some(previous) = open.take() {
                                        yield previous.end_event();
                                    }
                                    let id = Uuid::new_v4().to_string();
                                    open = Some(OpenStream::Text(id.clone()));
                                    yield RunEvent::TextStart { id: id.clone() };
                                    yield RunEvent::TextDelta { id, delta };
                                }
                            }
                        }
                        StreamEvent::ThinkingDelta(delta) => {
                            match &open {
                                Some(OpenStream::Thinking(id)) => {
                                    yield RunEvent::ThinkingDelta { id: id.clone(), delta };
                                }
                                _ => {
                                    if let Some(previous) = open.take() {
                                        yield previous.end_event();
                                    }
                                    let id = Uuid::new_v4().to_string();
                                    open = Some(OpenStream::Thinking(id.clone()));
                                    yield RunEvent::ThinkingStart { id: id.clone() };
                                    yield RunEvent::ThinkingDelta { id, delta };
                                }
                            }
                        }
                        StreamEvent::ToolUseStart { id, name } => {
                            if let Some(previous) = open.take() {
                                yield previous.end_event();
                            }
                            yield RunEvent::ToolCallStart { id, name };
                        }
                        StreamEvent::ToolUseInputDelta { id, delta } => {
                            yield RunEvent::ToolInputDelta { id, delta };
                        }
                        // Arguments are only fully assembled in the final
                        // message; ToolCallEnd is emitted from there.
                        StreamEvent::ToolUseEnd { .. } => {}
                        StreamEvent::MessageComplete(message) => {
                            assembled = Some(message);
                        }
                        StreamEvent::Usage(usage) => {
                            yield RunEvent::Usage(usage);
                        }
                        StreamEvent::Error(message) => {
                            yield RunEvent::Error { message };
                            return;
                        }
                    }
                }

                if let Some(previous) = open.take() {
                    yield previous.end_event();
                }

                let Some(message) = assembled else {
                    yield RunEvent::Error {
                        message: "stream ended without a complete message".into(),
                    };
                    return;
                };

                let tool_calls: Vec<(String, String, serde_json::Value)> = message
                    .content
                    .iter()
                    .filter_map(|block| {
                        if let ContentBlock::ToolUse { id, name, input } = block {
                            Some((id.clone(), name.clone(), input.clone()))
                        } else {
                            None
                        }
                    })
                    .collect();

                self.messages.push(message);
                turns += 1;

                if tool_calls.is_empty() {
                    return;
                }

                for (id, name, input) in &tool_calls {
                    yield RunEvent::ToolCallEnd {
                        id: id.clone(),
                        name: name.clone(),
                        input: input.clone(),
                    };
                }

                let mut result_blocks = Vec::new();
                for (id, name, input) in tool_calls {
                    let call = ToolCall {
                        id: id.clone(),
                        name: name.clone(),
                        input,
                    };
                    let (content, is_error, event_content) =
                        match self.tools.execute(&call, &ctx).await {
                            Ok(output) => {
                                let event_content = output.content.clone();
                                (output.content, output.is_error, Some(event_content))
                            }
                            Err(err) => {
                                tracing::warn!(tool = %name, error = %err, "tool call failed");
                                (err.to_string(), true, None)
                            }
                        };

                    yield RunEvent::ToolResult {
                        id: id.clone(),
                        name: Some(name.clone()),
                        content: event_content,
                        is_error,
                    };

                    result_blocks.push(ContentBlock::ToolResult {
                        tool_use_id: id,
                        name,
                        content,
                        is_error,
                    });
                }

                self.messages.push(Message {
                    role: Role::User,
                    content: result_blocks,
                });
            }
        }
    }
}
