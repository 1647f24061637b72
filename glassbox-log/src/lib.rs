#![deny(missing_docs)]
//! Brain Log entry model and per-request collector.
//!
//! The Brain Log is the side-channel trace of agent execution shown in
//! the portfolio's Glass Box mode: one [`LogEntry`] per observable event
//! (input received, routing decision, reasoning, tool call, performance
//! summary), accumulated per request by a [`BrainLogCollector`] and
//! flushed to the wire in batches.
//!
//! Entries are immutable once created, with one exception: a pending
//! tool-call entry may be amended in place (status, result, duration)
//! and re-enqueued for transmission, an explicit amend-and-re-announce
//! operation keyed by entry id.
//!
//! The [`BrainLog`] handle is the request-scoped way to reach the
//! collector. It is passed explicitly through every layer that logs
//! (never stored in a process global), and a [`BrainLog::disabled`]
//! handle turns every operation into a no-op so code paths invoked
//! outside a request never panic.

pub mod collector;
pub mod entry;

pub use collector::{BrainLog, BrainLogCollector};
pub use entry::{
    EntryKind, EntryStatus, INPUT_PREVIEW_CHARS, LogEntry, OUTPUT_PREVIEW_CHARS, truncate_preview,
};
