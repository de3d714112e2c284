//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a remote generation call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota exhausted: {0}")]
    Quota(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(e: serde_json::Error) -> Self {
        LlmError::MalformedResponse(e.to_string())
    }
}

impl LlmError {
    /// Short stable name for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Auth(_) => "auth",
            LlmError::Quota(_) => "quota",
            LlmError::RateLimited { .. } => "rate_limit",
            LlmError::Api { .. } => "api",
            LlmError::Network(_) => "network",
            LlmError::Timeout(_) => "timeout",
            LlmError::MalformedResponse(_) => "malformed_response",
            LlmError::Config(_) => "config",
        }
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Check if a caller could reasonably retry this error later
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::Auth(_) => false,
            LlmError::Quota(_) => false,
            LlmError::MalformedResponse(_) => false,
            LlmError::Config(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error that carried one
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
