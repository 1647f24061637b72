//! Brain Log recording middleware.
//!
//! Records two announcements per tool call in the request's Brain Log:
//! a pending invocation entry before the tool runs, and the amended
//! result (status, preview or error, execution-site duration) after it
//! returns. The entry id is the model's call id, so downstream
//! observers of the event stream can correlate instead of duplicating.

use std::time::Instant;

use glassbox_log::EntryStatus;
use glassbox_types::{BoxFuture, ToolContext, ToolError, ToolOutput};

use crate::middleware::{Next, ToolCall, ToolMiddleware};

/// Middleware that logs every tool invocation and result to the
/// request's Brain Log. A disabled [`BrainLog`](glassbox_log::BrainLog)
/// handle on the context makes this a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrainLogMiddleware;

impl BrainLogMiddleware {
    /// Create the middleware.
    pub fn new() -> Self {
        Self
    }
}

impl ToolMiddleware for BrainLogMiddleware {
    fn process<'a>(
        &'a self,
        call: &'a ToolCall,
        ctx: &'a ToolContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            ctx.brain_log
                .add_tool_call_pending(&call.id, &call.name, call.input.clone());
            let started = Instant::now();

            let result = next.run(call, ctx).await;
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

            match &result {
                Ok(output) if !output.is_error => {
                    ctx.brain_log.update_tool_call(
                        &call.id,
                        EntryStatus::Success,
                        Some(&output.content),
                        None,
                        Some(duration_ms),
                    );
                }
                Ok(output) => {
                    ctx.brain_log.update_tool_call(
                        &call.id,
                        EntryStatus::Failure,
                        None,
                        Some(&output.content),
                        Some(duration_ms),
                    );
                }
                Err(err) => {
                    tracing::warn!(tool = %call.name, error = %err, "tool execution failed");
                    ctx.brain_log.update_tool_call(
                        &call.id,
                        EntryStatus::Failure,
                        None,
                        Some(&err.to_string()),
                        Some(duration_ms),
                    );
                }
            }

            result
        })
    }
}
