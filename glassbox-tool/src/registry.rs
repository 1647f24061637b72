//! Tool registry: register, lookup, and execute tools.

use std::collections::HashMap;
use std::sync::Arc;

use glassbox_types::{Tool, ToolContext, ToolDefinition, ToolDyn, ToolError, ToolOutput};

use crate::middleware::{Next, ToolCall, ToolMiddleware};

/// Registry of tools with an optional middleware pipeline.
///
/// Tools are stored as type-erased [`ToolDyn`] trait objects. Middleware
/// applies to every execution, in registration order, before the tool
/// itself runs.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
    order: Vec<String>,
    middleware: Vec<Arc<dyn ToolMiddleware>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Register a strongly-typed tool (auto-erased to [`ToolDyn`]).
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.register_dyn(Arc::new(tool))
    }

    /// Register a pre-erased tool.
    pub fn register_dyn(&mut self, tool: Arc<dyn ToolDyn>) -> &mut Self {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
        self
    }

    /// Add middleware to the end of the pipeline.
    pub fn add_middleware(&mut self, m: impl ToolMiddleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(m));
        self
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools.get(name).cloned()
    }

    /// Definitions for all registered tools, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.definition())
            .collect()
    }

    /// Execute a tool call through the middleware chain.
    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        let next = Next::new(tool.as_ref(), &self.middleware);
        next.run(call, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
