//! End-to-end pipeline test: scripted provider → agent loop → tool
//! registry with logging middleware → Brain Log tap → multiplexed
//! chunk stream. Verifies the two logical streams interleave correctly
//! and the collector ends the request with a complete, ordered trace.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;

use glassbox_agent::{AgentLoop, LoopConfig};
use glassbox_log::{BrainLog, EntryKind, EntryStatus};
use glassbox_stream::{BrainLogTap, ChatChunk};
use glassbox_tool::{BrainLogMiddleware, ToolRegistry};
use glassbox_types::test_utils::ScriptedProvider;
use glassbox_types::{Message, Tool, ToolContext};

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
struct NoArgs {}

struct SkillsTool;

impl Tool for SkillsTool {
    const NAME: &'static str = "get_skills";
    type Args = NoArgs;
    type Output = String;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "List skills"
    }

    fn call(
        &self,
        _args: NoArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        async move { Ok("Rust, streaming systems, agent architectures".to_string()) }
    }
}

async fn run_pipeline(provider: ScriptedProvider, user_text: &str) -> (BrainLog, Vec<ChatChunk>) {
    let mut registry = ToolRegistry::new();
    registry.register(SkillsTool);
    registry.add_middleware(BrainLogMiddleware::new());

    let brain_log = BrainLog::new();
    brain_log.add_input(user_text);

    let ctx = ToolContext::new("req-test", brain_log.clone());
    let agent = AgentLoop::new(
        Arc::new(provider),
        Arc::new(registry),
        LoopConfig {
            system_prompt: "You are a portfolio assistant.".into(),
            ..LoopConfig::default()
        },
    );
    let events = agent.run_stream(Message::user(user_text), ctx);
    let chunks: Vec<ChatChunk> = BrainLogTap::new(brain_log.clone()).wrap(events).collect().await;
    (brain_log, chunks)
}

#[tokio::test]
async fn full_request_with_tool_call() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::tool_call_script("call_1", "get_skills", serde_json::json!({})),
        ScriptedProvider::text_script(&["I work with Rust ", "and streaming systems."]),
    ]);
    let (brain_log, chunks) = run_pipeline(provider, "What are your skills?").await;

    // The collector holds the complete ordered trace.
    let kinds: Vec<EntryKind> = brain_log.all_entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntryKind::Input,
            EntryKind::Routing,
            EntryKind::ToolCall,
            EntryKind::Text,
            EntryKind::Performance,
        ]
    );

    let entries = brain_log.all_entries();
    // The middleware's entry was amended in place, not duplicated by
    // the tap's stream-side observation of the same call id.
    assert_eq!(entries[2].id, "call_1");
    assert_eq!(entries[2].status, EntryStatus::Success);
    assert!(entries[2].duration_ms.is_some());
    assert!(
        entries[2].details["result_preview"]
            .as_str()
            .unwrap()
            .contains("Rust")
    );
    assert_eq!(
        entries[3].details["preview"],
        serde_json::json!("I work with Rust and streaming systems.")
    );
    assert!(entries[4].details["ttft_ms"].as_f64().unwrap() >= 0.0);
    assert!(entries[4].details["total_ms"].as_f64().unwrap() > 0.0);

    // The tool call is announced twice on the wire: pending, then amended.
    let tool_frames: Vec<&serde_json::Value> = chunks
        .iter()
        .filter_map(|chunk| match chunk {
            ChatChunk::BrainLog { data } if data["type"] == "tool_call" => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(tool_frames.len(), 2);
    assert_eq!(tool_frames[0]["status"], "pending");
    assert_eq!(tool_frames[1]["status"], "success");
    assert_eq!(tool_frames[0]["id"], tool_frames[1]["id"]);

    // Primary chunks arrive unmutated and in upstream order.
    let primary: Vec<&ChatChunk> = chunks
        .iter()
        .filter(|chunk| !matches!(chunk, ChatChunk::BrainLog { .. }))
        .collect();
    let expected_shape = [
        "start",
        "start-step",
        "tool-input-start",
        "tool-input-available",
        "tool-output-available",
        "finish-step",
        "start-step",
        "text-start",
        "text-delta",
        "text-delta",
        "text-end",
        "finish-step",
        "finish",
    ];
    let actual_shape: Vec<String> = primary
        .iter()
        .map(|chunk| {
            serde_json::to_value(chunk).unwrap()["type"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(actual_shape, expected_shape);

    // Every side-channel frame carries the exact wire field set.
    for chunk in &chunks {
        if let ChatChunk::BrainLog { data } = chunk {
            for key in ["id", "timestamp", "type", "title", "details", "status", "duration_ms"] {
                assert!(data.get(key).is_some(), "frame missing {key}: {data}");
            }
            assert!(data["timestamp"].is_i64());
        }
    }

    // Side-channel frames never precede their triggering primary event:
    // the routing frame sits between start-step and tool-input-start.
    let positions: Vec<(usize, String)> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let value = serde_json::to_value(chunk).unwrap();
            let tag = if value["type"] == "data-brain-log" {
                format!("brain:{}", value["data"]["type"].as_str().unwrap_or(""))
            } else {
                value["type"].as_str().unwrap_or("").to_string()
            };
            (i, tag)
        })
        .collect();
    let pos = |tag: &str| {
        positions
            .iter()
            .find(|(_, t)| t == tag)
            .map(|(i, _)| *i)
            .unwrap_or(usize::MAX)
    };
    assert!(pos("brain:input") < pos("start-step"));
    assert!(pos("start-step") < pos("brain:routing"));
    assert!(pos("brain:routing") < pos("tool-input-start"));
    assert!(pos("brain:tool_call") < pos("tool-output-available"));
    assert!(pos("brain:performance") < pos("finish"));
}

#[tokio::test]
async fn plain_answer_has_no_tool_entries() {
    let provider = ScriptedProvider::new(vec![ScriptedProvider::text_script(&[
        "You can reach me through the contact form.",
    ])]);
    let (brain_log, chunks) = run_pipeline(provider, "What is your email?").await;

    let kinds: Vec<EntryKind> = brain_log.all_entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::Input, EntryKind::Text, EntryKind::Performance]
    );
    assert!(!chunks.iter().any(|c| matches!(c, ChatChunk::ToolInputStart { .. })));
    assert!(matches!(chunks.last(), Some(ChatChunk::Finish)));
}
