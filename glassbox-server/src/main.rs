//! Glass Box portfolio backend entrypoint.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use glassbox_gemini::Gemini;
use glassbox_server::{AppState, Config, router};
use glassbox_tool::{BrainLogMiddleware, ToolRegistry};
use glassbox_tools::{
    CodebaseConfig, FindReferences, FindSymbol, GetExperience, GetFileContent, GetProjects,
    GetSkills,
};

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "glassbox=debug,tower_http=debug,info"
    } else {
        "glassbox=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_tools(config: &Config) -> ToolRegistry {
    let codebase = Arc::new(CodebaseConfig {
        root: config.codebase_root.clone(),
        max_file_lines: config.max_file_lines,
    });

    let mut registry = ToolRegistry::new();
    registry.register(GetExperience);
    registry.register(GetSkills);
    registry.register(GetProjects);
    registry.register(FindSymbol::new(codebase.clone()));
    registry.register(GetFileContent::new(codebase.clone()));
    registry.register(FindReferences::new(codebase));
    registry.add_middleware(BrainLogMiddleware::new());
    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.debug);

    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; /chat requests will fail authentication");
    }

    let provider = Arc::new(
        Gemini::new(config.gemini_api_key.clone()).model(config.model_name.clone()),
    );
    let tools = Arc::new(build_tools(&config));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        app = %config.app_name,
        version = %config.version,
        model = %config.model_name,
        addr = %addr,
        "starting server"
    );

    let state = AppState::new(config, provider, tools);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    // SIGINT is enough for local runs and Cloud Run alike.
    let _ = tokio::signal::ctrl_c().await;
}
