//! Core traits: [`Provider`], [`Tool`], and the type-erased [`ToolDyn`].

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, ToolError};
use crate::stream::StreamHandle;
use crate::types::{
    CompletionRequest, CompletionResponse, ToolContext, ToolDefinition, ToolOutput,
};

/// Boxed future used at dyn-compatible boundaries.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// LLM provider interface.
///
/// Uses RPITIT (return-position `impl Trait` in traits) and is
/// intentionally not object-safe; compose with generics `<P: Provider>`.
pub trait Provider: Send + Sync {
    /// Send a completion request and get a full response.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send;

    /// Send a completion request and get a stream of events.
    fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send;
}

/// Strongly-typed tool trait.
///
/// The blanket [`ToolDyn`] impl handles JSON deserialization and
/// serialization so implementations work with concrete Rust types.
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    const NAME: &'static str;
    /// The deserialized input type.
    type Args: DeserializeOwned + schemars::JsonSchema + Send;
    /// The serializable output type.
    type Output: Serialize;
    /// The tool-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Execute the tool with typed arguments.
    fn call(
        &self,
        args: Self::Args,
        ctx: &ToolContext,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Type-erased tool for dynamic dispatch. Blanket-implemented for all
/// [`Tool`] impls, enabling heterogeneous registries.
pub trait ToolDyn: Send + Sync {
    /// The tool's unique name.
    fn name(&self) -> &str;
    /// The tool definition (name, description, input schema).
    fn definition(&self) -> ToolDefinition;
    /// Execute the tool with a JSON input.
    fn call_dyn<'a>(
        &'a self,
        input: serde_json::Value,
        ctx: &'a ToolContext,
    ) -> BoxFuture<'a, Result<ToolOutput, ToolError>>;
}

impl<T: Tool> ToolDyn for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn definition(&self) -> ToolDefinition {
        let schema = schemars::schema_for!(T::Args);
        let input_schema = serde_json::to_value(schema.schema)
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
        ToolDefinition {
            name: T::NAME.to_string(),
            description: self.description().to_string(),
            input_schema,
        }
    }

    fn call_dyn<'a>(
        &'a self,
        input: serde_json::Value,
        ctx: &'a ToolContext,
    ) -> BoxFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let args: T::Args = serde_json::from_value(input)
                .map_err(|e| ToolError::InvalidInput(e.to_string()))?;

            let output = self
                .call(args, ctx)
                .await
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

            let structured = serde_json::to_value(&output)
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

            let content = match &structured {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            Ok(ToolOutput {
                content,
                structured: Some(structured),
                is_error: false,
            })
        })
    }
}
