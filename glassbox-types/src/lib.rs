#![deny(missing_docs)]
//! Shared types and traits for the Glass Box backend.
//!
//! This crate is the internal lingua franca: conversation messages,
//! the [`Provider`] trait each LLM backend implements, the streaming
//! event vocabularies ([`StreamEvent`] at the provider boundary,
//! [`RunEvent`] at the runtime boundary), and the tool traits the
//! registry executes.
//!
//! Provider and tool traits use RPITIT and are intentionally not
//! object-safe; the type-erased boundary for tools is [`ToolDyn`].

pub mod error;
pub mod event;
pub mod stream;
pub mod traits;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{ProviderError, ToolError};
pub use event::RunEvent;
pub use stream::{StreamEvent, StreamHandle};
pub use traits::{BoxFuture, Provider, Tool, ToolDyn};
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StopReason, TokenUsage,
    ToolContext, ToolDefinition, ToolOutput,
};
