#![deny(missing_docs)]
//! Multiplexed chat + Brain Log streaming.
//!
//! One SSE byte stream carries two logically distinct event streams:
//! the primary chat stream (text, reasoning, and tool-call chunks in
//! the Vercel data-stream vocabulary) and the Brain Log side channel
//! (`data-brain-log` frames). [`ChatChunk`] is the wire vocabulary,
//! and [`BrainLogTap`] is the interception layer that forwards the
//! runtime's events unchanged while injecting pending Brain Log frames
//! at defined points in the stream lifecycle.

pub mod chunk;
pub mod tap;

pub use chunk::{ChatChunk, SSE_DONE};
pub use tap::BrainLogTap;
