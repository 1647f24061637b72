//! Chat request handling: message extraction and agent orchestration.
//!
//! The request body follows the UI-message shape the frontend sends:
//! `{"messages": [{"role": "...", "content": "..." | [parts],
//! "parts": [parts]}]}`. Extraction is deliberately forgiving: an
//! unrecognized body shape yields an empty user message, never a
//! rejected request.

use serde_json::Value;

use glassbox_types::{ContentBlock, Message, Role};

/// System prompt for the portfolio assistant.
pub const SYSTEM_PROMPT: &str = "\
You are an AI assistant embedded in a portfolio website. Your purpose is
to answer questions about:
1. The owner's professional experience and background
2. The architecture and design decisions of this portfolio system
3. The codebase that powers this application

You have access to tools that provide grounded, accurate information.
Always use tools when available rather than relying on general
knowledge. When you don't know something, say so clearly. When a
question is outside your scope, explain your boundaries.

Tool usage:
- `get_experience` for work history and roles
- `get_skills` for technical skills and expertise
- `get_projects` for notable projects
- `find_symbol` to locate definitions in the codebase
- `get_file_content` to read and explain code files
- `find_references` to understand how components are connected

Be concise but thorough. Provide specific details when available.";

/// Concatenated text of one incoming message, across the supported
/// content shapes.
fn message_text(message: &Value) -> String {
    match message.get("content") {
        Some(Value::String(text)) => return text.clone(),
        Some(Value::Array(parts)) => return parts_text(parts),
        _ => {}
    }
    if let Some(Value::Array(parts)) = message.get("parts") {
        return parts_text(parts);
    }
    String::new()
}

fn parts_text(parts: &[Value]) -> String {
    parts
        .iter()
        .filter(|part| {
            part.get("type")
                .and_then(Value::as_str)
                .is_none_or(|kind| kind == "text")
        })
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("")
}

fn role_of(message: &Value) -> Option<&str> {
    message.get("role").and_then(Value::as_str)
}

/// Extract the latest user-authored message text. Fails soft to an
/// empty string when no user message is found.
pub fn extract_user_text(body: &Value) -> String {
    let Some(messages) = body.get("messages").and_then(Value::as_array) else {
        return String::new();
    };
    messages
        .iter()
        .rev()
        .find(|message| role_of(message) == Some("user"))
        .map(message_text)
        .unwrap_or_default()
}

/// Convert prior conversation turns into internal messages, excluding
/// the latest user message (the orchestrator re-appends it as the
/// current input). Unknown roles and empty messages are dropped.
pub fn extract_history(body: &Value) -> Vec<Message> {
    let Some(messages) = body.get("messages").and_then(Value::as_array) else {
        return Vec::new();
    };

    let last_user_idx = messages
        .iter()
        .rposition(|message| role_of(message) == Some("user"));

    messages
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != last_user_idx)
        .filter_map(|(_, message)| {
            let role = match role_of(message) {
                Some("user") => Role::User,
                Some("assistant") => Role::Assistant,
                _ => return None,
            };
            let text = message_text(message);
            if text.is_empty() {
                return None;
            }
            Some(Message {
                role,
                content: vec![ContentBlock::Text { text }],
            })
        })
        .collect()
}
