//! Route-level tests against the assembled router with a scripted
//! provider: no network, real SSE bodies.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use glassbox_server::{AppState, Config, router};
use glassbox_tool::{BrainLogMiddleware, ToolRegistry};
use glassbox_tools::GetSkills;
use glassbox_types::test_utils::ScriptedProvider;

fn app(provider: ScriptedProvider) -> axum::Router {
    let mut registry = ToolRegistry::new();
    registry.register(GetSkills);
    registry.add_middleware(BrainLogMiddleware::new());
    let state = AppState::new(Config::default(), Arc::new(provider), Arc::new(registry));
    router(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_version_and_uptime() {
    let app = app(ScriptedProvider::new(vec![]));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn profile_returns_all_sections() {
    let app = app(ScriptedProvider::new(vec![]));
    let response = app
        .oneshot(Request::get("/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!body["experiences"].as_array().unwrap().is_empty());
    assert!(!body["skills"].as_array().unwrap().is_empty());
    assert!(!body["projects"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_streams_multiplexed_sse() {
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::tool_call_script("call_1", "get_skills", serde_json::json!({})),
        ScriptedProvider::text_script(&["I work with Rust and streaming systems."]),
    ]);
    let app = app(provider);

    let request = Request::post("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "messages": [{"role": "user", "content": "What are your skills?"}]
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));
    assert_eq!(
        response
            .headers()
            .get("x-vercel-ai-ui-message-stream")
            .unwrap(),
        "v1"
    );

    let body = body_string(response).await;

    // Both logical streams ride one connection.
    assert!(body.contains("\"type\":\"text-delta\""), "body: {body}");
    assert!(body.contains("\"type\":\"data-brain-log\""));
    assert!(body.contains("\"type\":\"input\""));
    assert!(body.contains("\"type\":\"routing\""));
    assert!(body.contains("\"type\":\"tool_call\""));
    assert!(body.contains("\"type\":\"performance\""));
    assert!(body.contains("tool-input-start"));
    assert!(body.ends_with("data: [DONE]\n\n"));
}

#[tokio::test]
async fn chat_with_malformed_shape_still_streams() {
    let provider = ScriptedProvider::new(vec![ScriptedProvider::text_script(&[
        "How can I help you?",
    ])]);
    let app = app(provider);

    // No recognizable user message: extraction fails soft to "".
    let request = Request::post("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({"messages": "garbage"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("\"type\":\"data-brain-log\""));
    // The input entry records a zero-length message.
    assert!(body.contains("\"length\":0"));
    assert!(body.ends_with("data: [DONE]\n\n"));
}
