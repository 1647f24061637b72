//! Gemini API client struct and builder.

use std::future::Future;

use glassbox_types::{
    CompletionRequest, CompletionResponse, Provider, ProviderError, StreamHandle,
};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{from_api_response, to_api_request};
use crate::streaming::stream_completion;

/// Default model used when none is specified on the request.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default Generative Language API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Google Generative Language API.
///
/// Implements [`Provider`] for use anywhere a provider is accepted.
///
/// # Example
///
/// ```no_run
/// use glassbox_gemini::Gemini;
///
/// let client = Gemini::new("AIza...")
///     .model("gemini-2.0-flash")
///     .base_url("https://generativelanguage.googleapis.com");
/// ```
pub struct Gemini {
    /// API key (`GEMINI_API_KEY`).
    api_key: String,
    /// Default model identifier used when the request does not specify one.
    model: String,
    /// API base URL (override for testing or proxies).
    base_url: String,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl Gemini {
    /// Create a new client with the given API key and sensible defaults.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or an API proxy.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn resolve_model<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        request.model.as_deref().unwrap_or(&self.model)
    }

    /// Build the `generateContent` endpoint URL for a model.
    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Build the SSE `streamGenerateContent` endpoint URL for a model.
    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }
}

impl Provider for Gemini {
    /// Send a completion request and map the full response back.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        let url = self.generate_url(self.resolve_model(&request));
        let api_key = self.api_key.clone();
        let http_client = self.client.clone();

        async move {
            let body = to_api_request(&request);

            tracing::debug!(url = %url, "sending completion request");

            let response = http_client
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            let response_text = response.text().await.map_err(map_reqwest_error)?;

            if !status.is_success() {
                return Err(map_http_status(status, &response_text));
            }

            let json: serde_json::Value = serde_json::from_str(&response_text)
                .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON response: {e}")))?;

            from_api_response(&json)
        }
    }

    /// Send a streaming completion request; the returned handle emits
    /// [`glassbox_types::StreamEvent`]s as the model generates content.
    fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        let url = self.stream_url(self.resolve_model(&request));
        let api_key = self.api_key.clone();
        let http_client = self.client.clone();

        async move {
            let body = to_api_request(&request);

            tracing::debug!(url = %url, "sending streaming completion request");

            let response = http_client
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body_text = response.text().await.map_err(map_reqwest_error)?;
                return Err(map_http_status(status, &body_text));
            }

            Ok(stream_completion(response))
        }
    }
}
