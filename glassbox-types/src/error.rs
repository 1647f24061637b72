//! Error types for the provider, tool, and loop boundaries.

use std::time::Duration;

use thiserror::Error;

/// Errors from LLM providers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication/authorization failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The request was malformed or rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Provider rate-limited the request.
    #[error("rate limited")]
    RateLimit {
        /// Suggested delay before retrying, when the provider sent one.
        retry_after: Option<Duration>,
    },

    /// Provider-side outage or overload.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Could not parse the provider's response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit { .. }
                | ProviderError::ServiceUnavailable(_)
                | ProviderError::Timeout(_)
                | ProviderError::Network(_)
        )
    }
}

/// Errors from tool lookup and execution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The input did not match the tool's schema.
    #[error("invalid tool input: {0}")]
    InvalidInput(String),

    /// The tool ran and failed.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::Authentication("bad key".into()).to_string(),
            "authentication failed: bad key"
        );
        assert_eq!(
            ProviderError::InvalidResponse("bad json".into()).to_string(),
            "invalid response: bad json"
        );
        assert_eq!(
            ProviderError::RateLimit { retry_after: None }.to_string(),
            "rate limited"
        );
    }

    #[test]
    fn provider_error_retryable() {
        assert!(ProviderError::RateLimit { retry_after: None }.is_retryable());
        assert!(ProviderError::ServiceUnavailable("overloaded".into()).is_retryable());
        assert!(!ProviderError::Authentication("bad key".into()).is_retryable());
        assert!(!ProviderError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn tool_error_display() {
        assert_eq!(
            ToolError::NotFound("get_skills".into()).to_string(),
            "tool not found: get_skills"
        );
        assert_eq!(
            ToolError::InvalidInput("missing field".into()).to_string(),
            "invalid tool input: missing field"
        );
    }
}
