//! Per-request collector and the request-scoped [`BrainLog`] handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde_json::Value;

use crate::entry::{
    EntryStatus, LogEntry, OUTPUT_PREVIEW_CHARS, truncate_preview,
};

/// Accumulator for Brain Log entries during one agent execution.
///
/// Owns the full entry history (in insertion order), the FIFO pending
/// queue of entries not yet flushed to the wire, and the request timing
/// state used for the TTFT and total-time metrics.
///
/// Draining is destructive: [`take_pending`](Self::take_pending) returns
/// a snapshot of the queue and clears it. Amending a pending tool call
/// via [`update_tool_call`](Self::update_tool_call) mutates the stored
/// entry in place and re-enqueues it, so the amendment is announced on
/// the next drain without creating a second entry in the history.
#[derive(Debug)]
pub struct BrainLogCollector {
    entries: Vec<LogEntry>,
    index: HashMap<String, usize>,
    pending: Vec<usize>,
    started: Instant,
    first_token: Option<Instant>,
}

impl BrainLogCollector {
    /// Create a collector; the request clock starts now.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            started: Instant::now(),
            first_token: None,
        }
    }

    /// Append an entry to the history and the pending queue.
    pub fn add(&mut self, entry: LogEntry) {
        let idx = self.entries.len();
        self.index.insert(entry.id.clone(), idx);
        self.entries.push(entry);
        self.pending.push(idx);
    }

    /// Snapshot and clear the pending queue, in insertion order.
    pub fn take_pending(&mut self) -> Vec<LogEntry> {
        self.pending
            .drain(..)
            .map(|idx| self.entries[idx].clone())
            .collect()
    }

    /// All entries ever added, in insertion order. Amended entries
    /// appear once, with their final contents.
    pub fn all_entries(&self) -> Vec<LogEntry> {
        self.entries.clone()
    }

    /// Whether an entry with this id has been added.
    pub fn has_entry(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Record the first observable output token. Idempotent: only the
    /// first call's timestamp is retained.
    pub fn record_first_token(&mut self) {
        if self.first_token.is_none() {
            self.first_token = Some(Instant::now());
        }
    }

    /// Time to first token in milliseconds, if a token has been seen.
    pub fn ttft_ms(&self) -> Option<f64> {
        self.first_token
            .map(|t| t.duration_since(self.started).as_secs_f64() * 1000.0)
    }

    /// Total elapsed time in milliseconds since the collector was created.
    pub fn total_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Amend a tool-call entry by id and re-enqueue it for transmission.
    ///
    /// Unknown ids are tolerated as a no-op; a stale or foreign
    /// correlation id must never break the stream.
    pub fn update_tool_call(
        &mut self,
        id: &str,
        status: EntryStatus,
        result_preview: Option<&str>,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) {
        let Some(&idx) = self.index.get(id) else {
            return;
        };
        let entry = &mut self.entries[idx];
        entry.status = status;
        entry.duration_ms = duration_ms;
        if let Some(preview) = result_preview {
            entry
                .details
                .insert("result_preview".into(), Value::String(preview.into()));
        }
        if let Some(err) = error {
            entry.details.insert("error".into(), Value::String(err.into()));
        }
        let tool_name = entry
            .details
            .get("tool")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        entry.title = match status {
            EntryStatus::Success => format!("Tool call: {tool_name}"),
            EntryStatus::Failure => format!("Tool call failed: {tool_name}"),
            EntryStatus::Pending => entry.title.clone(),
        };
        self.pending.push(idx);
    }
}

impl Default for BrainLogCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply clonable, request-scoped handle to a [`BrainLogCollector`].
///
/// Created once per chat request by the orchestrator and passed
/// explicitly to everything that logs: the stream tap and, through the
/// tool context, the tool logging middleware. There is deliberately no
/// global accessor; request scoping lives in the handle itself.
///
/// [`BrainLog::disabled`] produces a handle whose every operation is a
/// no-op, for code paths that run outside a chat request.
#[derive(Debug, Clone, Default)]
pub struct BrainLog {
    inner: Option<Arc<Mutex<BrainLogCollector>>>,
}

impl BrainLog {
    /// Create a live handle with a fresh collector.
    pub fn new() -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(BrainLogCollector::new()))),
        }
    }

    /// Create a no-op handle. Every operation silently does nothing.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Whether this handle is backed by a collector.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    fn with<T>(&self, f: impl FnOnce(&mut BrainLogCollector) -> T) -> Option<T> {
        let inner = self.inner.as_ref()?;
        let mut collector = inner.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut collector))
    }

    /// Append an already-constructed entry.
    pub fn add(&self, entry: LogEntry) {
        self.with(|c| c.add(entry));
    }

    /// Add an input-received entry for the user message.
    pub fn add_input(&self, message: &str) {
        self.with(|c| c.add(LogEntry::input(message)));
    }

    /// Add a routing-decision entry.
    pub fn add_routing(&self, selected_tool: Option<&str>, reason: &str) {
        self.with(|c| c.add(LogEntry::routing(selected_tool, reason, None)));
    }

    /// Add a pending tool-call entry whose entry id is the model's call
    /// id, so the completion can be correlated later.
    pub fn add_tool_call_pending(&self, call_id: &str, tool_name: &str, arguments: Value) {
        self.with(|c| c.add(LogEntry::tool_call_pending(call_id, tool_name, arguments)));
    }

    /// Add a completed tool-call entry (no prior pending entry).
    pub fn add_tool_call_complete(
        &self,
        tool_name: &str,
        arguments: Value,
        result_preview: Option<&str>,
        status: EntryStatus,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) {
        self.with(|c| {
            c.add(LogEntry::tool_call(
                tool_name,
                arguments,
                result_preview,
                status,
                error,
                duration_ms,
            ));
        });
    }

    /// Add a standalone tool-result entry.
    pub fn add_tool_result(
        &self,
        tool_name: &str,
        result_preview: Option<&str>,
        status: EntryStatus,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) {
        self.with(|c| {
            c.add(LogEntry::tool_result(
                tool_name,
                result_preview,
                status,
                error,
                duration_ms,
            ));
        });
    }

    /// Add a thinking entry with the full accumulated reasoning text.
    pub fn add_thinking(&self, thinking_text: &str) {
        self.with(|c| c.add(LogEntry::thinking(thinking_text)));
    }

    /// Add a text-output entry with the full accumulated text.
    pub fn add_text(&self, text: &str, is_partial: bool) {
        self.with(|c| c.add(LogEntry::text(text, is_partial)));
    }

    /// Add a validation entry.
    pub fn add_validation(
        &self,
        schema_name: &str,
        status: EntryStatus,
        validation_errors: Option<&[String]>,
        fallback_action: Option<&str>,
    ) {
        self.with(|c| {
            c.add(LogEntry::validation(
                schema_name,
                status,
                validation_errors,
                fallback_action,
            ));
        });
    }

    /// Add the end-of-request performance entry.
    pub fn add_performance(
        &self,
        ttft_ms: Option<f64>,
        total_ms: Option<f64>,
        tokens_in: Option<u64>,
        tokens_out: Option<u64>,
    ) {
        self.with(|c| c.add(LogEntry::performance(ttft_ms, total_ms, tokens_in, tokens_out)));
    }

    /// Amend a tool-call entry by id; truncates the preview to the
    /// result bound. No-op on unknown ids or disabled handles.
    pub fn update_tool_call(
        &self,
        id: &str,
        status: EntryStatus,
        result_preview: Option<&str>,
        error: Option<&str>,
        duration_ms: Option<f64>,
    ) {
        let preview = result_preview.map(|p| truncate_preview(p, OUTPUT_PREVIEW_CHARS));
        self.with(|c| {
            c.update_tool_call(id, status, preview.as_deref(), error, duration_ms);
        });
    }

    /// Snapshot and clear the pending queue. Empty for disabled handles.
    pub fn take_pending(&self) -> Vec<LogEntry> {
        self.with(|c| c.take_pending()).unwrap_or_default()
    }

    /// All entries ever added, in insertion order.
    pub fn all_entries(&self) -> Vec<LogEntry> {
        self.with(|c| c.all_entries()).unwrap_or_default()
    }

    /// Whether an entry with this id exists.
    pub fn has_entry(&self, id: &str) -> bool {
        self.with(|c| c.has_entry(id)).unwrap_or(false)
    }

    /// Record the first observable output token (idempotent).
    pub fn record_first_token(&self) {
        self.with(|c| c.record_first_token());
    }

    /// Time to first token in milliseconds, if recorded.
    pub fn ttft_ms(&self) -> Option<f64> {
        self.with(|c| c.ttft_ms()).flatten()
    }

    /// Total elapsed milliseconds, or `None` for a disabled handle.
    pub fn total_ms(&self) -> Option<f64> {
        self.with(|c| c.total_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use serde_json::json;

    #[test]
    fn drain_is_exhaustive_and_destructive() {
        let mut collector = BrainLogCollector::new();
        collector.add(LogEntry::input("one"));
        collector.add(LogEntry::routing(Some("t"), "r", None));
        collector.add(LogEntry::text("two", false));

        let drained = collector.take_pending();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].kind, EntryKind::Input);
        assert_eq!(drained[1].kind, EntryKind::Routing);
        assert_eq!(drained[2].kind, EntryKind::Text);

        assert!(collector.take_pending().is_empty());
        // History keeps everything.
        assert_eq!(collector.all_entries().len(), 3);
    }

    #[test]
    fn first_token_recording_is_idempotent() {
        let mut collector = BrainLogCollector::new();
        collector.record_first_token();
        let first = collector.ttft_ms().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        collector.record_first_token();
        let second = collector.ttft_ms().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ttft_unavailable_until_first_token() {
        let collector = BrainLogCollector::new();
        assert!(collector.ttft_ms().is_none());
    }

    #[test]
    fn total_ms_always_available_and_positive() {
        let collector = BrainLogCollector::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(collector.total_ms() > 0.0);
    }

    #[test]
    fn update_then_redrain_amends_once() {
        let mut collector = BrainLogCollector::new();
        collector.add(LogEntry::tool_call_pending("call_x", "get_skills", json!({})));

        let first_drain = collector.take_pending();
        assert_eq!(first_drain.len(), 1);
        assert_eq!(first_drain[0].status, EntryStatus::Pending);

        collector.update_tool_call(
            "call_x",
            EntryStatus::Success,
            Some("ok"),
            None,
            Some(12.0),
        );

        let second_drain = collector.take_pending();
        assert_eq!(second_drain.len(), 1);
        assert_eq!(second_drain[0].id, "call_x");
        assert_eq!(second_drain[0].status, EntryStatus::Success);
        assert_eq!(second_drain[0].title, "Tool call: get_skills");
        assert_eq!(second_drain[0].details["result_preview"], json!("ok"));
        assert_eq!(second_drain[0].duration_ms, Some(12.0));

        // Present exactly once per drain, and not again after.
        assert!(collector.take_pending().is_empty());
        // History holds a single, amended entry.
        assert_eq!(collector.all_entries().len(), 1);
    }

    #[test]
    fn update_failure_sets_failed_title_and_error() {
        let mut collector = BrainLogCollector::new();
        collector.add(LogEntry::tool_call_pending("call_y", "find_symbol", json!({})));
        collector.update_tool_call(
            "call_y",
            EntryStatus::Failure,
            None,
            Some("Tool execution failed"),
            None,
        );
        let entries = collector.all_entries();
        assert_eq!(entries[0].title, "Tool call failed: find_symbol");
        assert_eq!(entries[0].details["error"], json!("Tool execution failed"));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut collector = BrainLogCollector::new();
        collector.update_tool_call("nonexistent-id", EntryStatus::Success, None, None, None);
        assert!(collector.take_pending().is_empty());
        assert!(collector.all_entries().is_empty());
    }

    #[test]
    fn handle_convenience_constructors_cover_every_kind() {
        let log = BrainLog::new();
        log.add_input("hi");
        log.add_routing(None, "no tool needed");
        log.add_thinking("mulling");
        log.add_text("answer", false);
        log.add_tool_call_complete("get_skills", json!({}), Some("ok"), EntryStatus::Success, None, Some(1.0));
        log.add_tool_result("get_skills", Some("ok"), EntryStatus::Success, None, Some(1.0));
        log.add_validation("SkillsResponse", EntryStatus::Success, None, None);
        log.add_performance(Some(1.0), Some(2.0), None, None);

        let kinds: Vec<EntryKind> = log.all_entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Input,
                EntryKind::Routing,
                EntryKind::Thinking,
                EntryKind::Text,
                EntryKind::ToolCall,
                EntryKind::ToolResult,
                EntryKind::Validation,
                EntryKind::Performance,
            ]
        );
        assert_eq!(log.take_pending().len(), 8);
    }

    #[test]
    fn disabled_handle_is_total_noop() {
        let log = BrainLog::disabled();
        log.add_input("hello");
        log.record_first_token();
        log.update_tool_call("x", EntryStatus::Success, None, None, None);
        assert!(log.take_pending().is_empty());
        assert!(log.all_entries().is_empty());
        assert!(log.ttft_ms().is_none());
        assert!(log.total_ms().is_none());
        assert!(!log.is_enabled());
    }

    #[test]
    fn handle_clones_share_one_collector() {
        let log = BrainLog::new();
        let clone = log.clone();
        clone.add_input("hi");
        assert_eq!(log.take_pending().len(), 1);
        assert!(clone.take_pending().is_empty());
    }

    #[test]
    fn handle_truncates_result_preview_on_update() {
        let log = BrainLog::new();
        log.add_tool_call_pending("call_z", "get_projects", json!({}));
        let long = "r".repeat(250);
        log.update_tool_call("call_z", EntryStatus::Success, Some(&long), None, None);
        let entries = log.all_entries();
        let preview = entries[0].details["result_preview"].as_str().unwrap();
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
    }
}
