//! Router assembly and request handlers.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Body;
use axum::extract::{Json, State};
use axum::http::{HeaderValue, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use futures::StreamExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use glassbox_agent::{AgentLoop, LoopConfig};
use glassbox_log::BrainLog;
use glassbox_stream::{BrainLogTap, ChatChunk, SSE_DONE};
use glassbox_tool::ToolRegistry;
use glassbox_types::{Message, Provider, ToolContext};

use crate::chat::{SYSTEM_PROMPT, extract_history, extract_user_text};
use crate::config::Config;

/// Shared application state. Cheap to clone; all request-scoped state
/// lives in the per-request Brain Log handle, never here.
pub struct AppState<P> {
    /// Application settings.
    pub config: Arc<Config>,
    /// The LLM provider.
    pub provider: Arc<P>,
    /// Registered tools (with logging middleware).
    pub tools: Arc<ToolRegistry>,
    /// Process start time, for the health endpoint.
    pub started: Instant,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            provider: self.provider.clone(),
            tools: self.tools.clone(),
            started: self.started,
        }
    }
}

impl<P> AppState<P> {
    /// Assemble application state.
    pub fn new(config: Config, provider: Arc<P>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            tools,
            started: Instant::now(),
        }
    }
}

/// Build the CORS layer from the configured origins.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the application router.
pub fn router<P: Provider + 'static>(state: AppState<P>) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/", get(index::<P>))
        .route("/health", get(health::<P>))
        .route("/profile", get(profile))
        .route("/chat", post(chat::<P>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index<P: Provider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": state.config.app_name,
        "version": state.config.version,
        "health": "/health",
        "profile": "/profile",
        "chat": "/chat (POST)",
    }))
}

async fn health<P: Provider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<serde_json::Value> {
    let uptime = state.started.elapsed().as_secs_f64();
    Json(serde_json::json!({
        "status": "healthy",
        "version": state.config.version,
        "uptime_seconds": (uptime * 100.0).round() / 100.0,
    }))
}

async fn profile() -> Json<glassbox_tools::experience::Profile> {
    Json(glassbox_tools::profile())
}

/// Streaming chat endpoint.
///
/// One request, one Brain Log: the handle is created here, seeded with
/// the input entry, handed to the tool context and the tap, and dropped
/// with the response stream.
async fn chat<P: Provider + 'static>(
    State(state): State<AppState<P>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4().to_string();
    let user_text = extract_user_text(&body);
    let history = extract_history(&body);

    tracing::info!(
        request_id = %request_id,
        message_chars = user_text.chars().count(),
        history_turns = history.len(),
        "chat request"
    );

    let brain_log = BrainLog::new();
    brain_log.add_input(&user_text);

    let ctx = ToolContext::new(request_id, brain_log.clone());
    let agent = AgentLoop::new(
        state.provider.clone(),
        state.tools.clone(),
        LoopConfig {
            system_prompt: SYSTEM_PROMPT.to_string(),
            model: Some(state.config.model_name.clone()),
            ..LoopConfig::default()
        },
    )
    .with_history(history);

    let events = agent.run_stream(Message::user(user_text), ctx);
    let chunks = BrainLogTap::new(brain_log).wrap(events);

    let sse_body = chunks
        .map(|chunk: ChatChunk| Ok::<String, Infallible>(chunk.encode_sse()))
        .chain(futures::stream::once(async {
            Ok::<String, Infallible>(SSE_DONE.to_string())
        }));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (
                header::HeaderName::from_static("x-vercel-ai-ui-message-stream"),
                "v1",
            ),
        ],
        Body::from_stream(sse_body),
    )
}
