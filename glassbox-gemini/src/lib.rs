#![deny(missing_docs)]
//! Google Gemini provider.
//!
//! Implements [`glassbox_types::Provider`] against the Generative
//! Language API (`generateContent` / `streamGenerateContent`), mapping
//! the internal conversation types to Gemini's `contents` format and
//! parsing its SSE stream into [`glassbox_types::StreamEvent`]s.
//!
//! Gemini does not assign tool-call ids and does not stream function
//! arguments incrementally; each `functionCall` part arrives whole and
//! gets a synthesized correlation id.

mod client;
mod error;
mod mapping;
mod streaming;

pub use client::Gemini;
