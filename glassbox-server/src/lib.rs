#![deny(missing_docs)]
//! HTTP surface for the Glass Box portfolio backend.
//!
//! Routes:
//! - `POST /chat`: streaming chat; the response body multiplexes the
//!   primary chat stream and the Brain Log side channel over SSE
//! - `GET /health`: liveness with version and uptime
//! - `GET /profile`: the static portfolio payload
//! - `GET /`: endpoint index
//!
//! Each chat request gets its own Brain Log handle, seeded with the
//! input entry and passed explicitly into the agent run and the tap;
//! nothing about a request outlives its response stream.

pub mod chat;
pub mod config;
pub mod routes;

pub use config::Config;
pub use routes::{AppState, router};
