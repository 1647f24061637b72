#![deny(missing_docs)]
//! Tool registry and middleware pipeline for the Glass Box backend.
//!
//! This crate provides:
//! - [`ToolRegistry`]: register tools and execute them by name
//! - [`ToolMiddleware`]: composable middleware chain (like axum's `from_fn`)
//! - [`BrainLogMiddleware`]: records every tool invocation and its
//!   result in the request's Brain Log

pub mod brain_log;
pub mod middleware;
pub mod registry;

pub use brain_log::BrainLogMiddleware;
pub use middleware::{Next, ToolCall, ToolMiddleware};
pub use registry::ToolRegistry;
