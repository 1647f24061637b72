//! Streaming event types for incremental provider responses.

use std::pin::Pin;

use futures::Stream;

use crate::types::{Message, TokenUsage};

/// An event emitted during a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental text content.
    TextDelta(String),
    /// Incremental thinking/reasoning content.
    ThinkingDelta(String),
    /// A tool use block has started.
    ToolUseStart {
        /// Tool call identifier.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Incremental tool input JSON.
    ToolUseInputDelta {
        /// Tool call identifier (matches `ToolUseStart.id`).
        id: String,
        /// JSON fragment.
        delta: String,
    },
    /// A tool use block has ended.
    ToolUseEnd {
        /// Tool call identifier.
        id: String,
    },
    /// The complete assembled message (sent at the end of the stream).
    MessageComplete(Message),
    /// Token usage statistics for the stream.
    Usage(TokenUsage),
    /// An error occurred during streaming.
    Error(String),
}

/// Handle to a streaming completion response.
pub struct StreamHandle {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = StreamEvent> + Send>>,
}

impl StreamHandle {
    /// Wrap any event stream into a handle.
    pub fn new(stream: impl Stream<Item = StreamEvent> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn handle_yields_events_in_order() {
        let handle = StreamHandle::new(futures::stream::iter(vec![
            StreamEvent::TextDelta("a".into()),
            StreamEvent::TextDelta("b".into()),
        ]));
        let events: Vec<StreamEvent> = handle.receiver.collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("a".into()),
                StreamEvent::TextDelta("b".into()),
            ]
        );
    }

    #[test]
    fn tool_use_demux_by_id() {
        let events = [
            StreamEvent::ToolUseStart { id: "t1".into(), name: "find_symbol".into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: r#"{"symbol_name""#.into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: r#": "main"}"#.into() },
            StreamEvent::ToolUseEnd { id: "t1".into() },
        ];
        let t1_input: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolUseInputDelta { id, delta } if id == "t1" => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(t1_input, r#"{"symbol_name": "main"}"#);
    }
}
