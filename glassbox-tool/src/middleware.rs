//! Middleware types for the tool execution pipeline.
//!
//! Middleware wraps tool execution with cross-cutting concerns like
//! logging, validation, and permissions. The pattern matches axum's
//! `from_fn`: each middleware receives a [`Next`] it can call to
//! continue the chain, or skip to short-circuit.

use std::sync::Arc;

use glassbox_types::{BoxFuture, ToolContext, ToolDyn, ToolError, ToolOutput};

/// A tool call in flight through the middleware pipeline.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Correlation id for this call (from the model).
    pub id: String,
    /// Name of the tool being called.
    pub name: String,
    /// JSON input arguments.
    pub input: serde_json::Value,
}

/// Middleware that wraps tool execution.
///
/// Each middleware receives the call, context, and a [`Next`] to
/// continue the chain. It can inspect or modify the call before passing
/// it on, short-circuit by returning without calling `next.run()`, or
/// inspect the result after the tool executes.
///
/// Uses boxed futures for dyn-compatibility (heterogeneous middleware
/// collections).
pub trait ToolMiddleware: Send + Sync {
    /// Process a tool call, optionally delegating to the rest of the chain.
    fn process<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ToolOutput, ToolError>>;
}

/// The remaining middleware chain plus the underlying tool.
///
/// Consumed on call to prevent double-invoke.
pub struct Next<'a> {
    tool: &'a dyn ToolDyn,
    middleware: &'a [Arc<dyn ToolMiddleware>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(tool: &'a dyn ToolDyn, middleware: &'a [Arc<dyn ToolMiddleware>]) -> Self {
        Self { tool, middleware }
    }

    /// Continue the middleware chain, eventually calling the tool.
    pub async fn run(self, call: &'a ToolCall, ctx: &'a ToolContext) -> Result<ToolOutput, ToolError> {
        if let Some((head, tail)) = self.middleware.split_first() {
            let next = Next::new(self.tool, tail);
            head.process(call, ctx, next).await
        } else {
            self.tool.call_dyn(call.input.clone(), ctx).await
        }
    }
}
