//! Scripted implementations for testing.
//!
//! Available behind the `test-utils` feature flag. [`ScriptedProvider`]
//! replays pre-recorded event sequences, one script per `complete_stream`
//! call, so loop and pipeline tests run without a network.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::error::ProviderError;
use crate::stream::{StreamEvent, StreamHandle};
use crate::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, TokenUsage,
};

/// A provider that replays scripted event sequences.
///
/// Each call to `complete_stream` pops the next script. Calling with an
/// empty script queue yields a stream with a single error event.
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Vec<StreamEvent>>>,
}

impl ScriptedProvider {
    /// Create a provider that will replay the given scripts in order.
    pub fn new(scripts: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
        }
    }

    /// Script for a plain text response: deltas plus the assembled message.
    pub fn text_script(chunks: &[&str]) -> Vec<StreamEvent> {
        let full: String = chunks.concat();
        let mut events: Vec<StreamEvent> = chunks
            .iter()
            .map(|c| StreamEvent::TextDelta((*c).to_string()))
            .collect();
        events.push(StreamEvent::MessageComplete(Message {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: full }],
        }));
        events
    }

    /// Script for a single tool call with the given id, name, and input.
    pub fn tool_call_script(id: &str, name: &str, input: serde_json::Value) -> Vec<StreamEvent> {
        vec![
            StreamEvent::ToolUseStart {
                id: id.into(),
                name: name.into(),
            },
            StreamEvent::ToolUseEnd { id: id.into() },
            StreamEvent::MessageComplete(Message {
                role: Role::Assistant,
                content: vec![ContentBlock::ToolUse {
                    id: id.into(),
                    name: name.into(),
                    input,
                }],
            }),
        ]
    }

    fn next_script(&self) -> Vec<StreamEvent> {
        let mut scripts = self
            .scripts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        scripts
            .pop_front()
            .unwrap_or_else(|| vec![StreamEvent::Error("scripted provider exhausted".into())])
    }
}

impl crate::traits::Provider for ScriptedProvider {
    fn complete(
        &self,
        _request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        let events = self.next_script();
        async move {
            let message = events
                .into_iter()
                .find_map(|e| match e {
                    StreamEvent::MessageComplete(m) => Some(m),
                    _ => None,
                })
                .ok_or_else(|| {
                    ProviderError::InvalidResponse("script has no assembled message".into())
                })?;
            let stop_reason = if message
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
            {
                StopReason::ToolUse
            } else {
                StopReason::EndTurn
            };
            Ok(CompletionResponse {
                message,
                stop_reason,
                usage: TokenUsage::default(),
            })
        }
    }

    fn complete_stream(
        &self,
        _request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        let events = self.next_script();
        async move { Ok(StreamHandle::new(futures::stream::iter(events))) }
    }
}
