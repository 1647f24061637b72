//! Application settings loaded from environment variables.

use std::path::PathBuf;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name of the application.
    pub app_name: String,
    /// Version string (from the crate version).
    pub version: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// API key for the Gemini provider (`GEMINI_API_KEY`).
    pub gemini_api_key: String,
    /// Model identifier.
    pub model_name: String,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Root of the codebase served by the oracle tools.
    pub codebase_root: PathBuf,
    /// Read bound for the file-content tool.
    pub max_file_lines: usize,
    /// Verbose logging.
    pub debug: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated origin list, dropping empties.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load settings from the environment, with development defaults.
    pub fn from_env() -> Self {
        let default_origins = "http://localhost:3000,http://localhost:3001";
        Self {
            app_name: env_or("APP_NAME", "Glass Box Portfolio"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8080").parse().unwrap_or(8080),
            gemini_api_key: env_or("GEMINI_API_KEY", ""),
            model_name: env_or("MODEL_NAME", "gemini-2.0-flash"),
            cors_origins: parse_origins(&env_or("CORS_ORIGINS", default_origins)),
            codebase_root: PathBuf::from(env_or("CODEBASE_ROOT", ".")),
            max_file_lines: env_or("MAX_FILE_LINES", "500").parse().unwrap_or(500),
            debug: env_or("DEBUG", "false").parse().unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Glass Box Portfolio".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            host: "0.0.0.0".into(),
            port: 8080,
            gemini_api_key: String::new(),
            model_name: "gemini-2.0-flash".into(),
            cors_origins: vec!["http://localhost:3000".into()],
            codebase_root: PathBuf::from("."),
            max_file_lines: 500,
            debug: false,
        }
    }
}
