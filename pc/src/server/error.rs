//! HTTP error mapping
//!
//! Every failure becomes `{success: false, error, message, details?}` with a
//! fixed, user-facing message per kind. Remote response bodies and credentials
//! stay in the logs.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::generator::GenerateError;
use crate::llm::LlmError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    BadBody(String),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Pitch history is not enabled")]
    StorageDisabled,

    #[error("Pitch not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl ErrorBody {
    fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error,
            message: message.into(),
            details: None,
        }
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::BadBody(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Invalid request", format!("Request body must be a JSON object: {}", reason)),
            ),
            ApiError::Generate(GenerateError::Validation(result)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    details: Some(result.details.clone()),
                    ..ErrorBody::new("Validation failed", result.message())
                },
            ),
            ApiError::Generate(GenerateError::Config(_)) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new(
                    "Service not configured",
                    "Pitch generation is unavailable because the server has no API key configured",
                ),
            ),
            ApiError::Generate(GenerateError::Structure(reason)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(
                    "Invalid generated content",
                    format!("The generated pitch could not be used ({}). Please try again.", reason),
                ),
            ),
            ApiError::Generate(GenerateError::Remote(e)) => remote_parts(e),
            ApiError::StorageDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::new("Storage disabled", "Pitch history is not enabled on this server"),
            ),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("Not found", format!("No pitch with id {}", id)),
            ),
            ApiError::Store(_) | ApiError::Task(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Internal error", "Something went wrong. Please try again later."),
            ),
        }
    }
}

fn remote_parts(e: &LlmError) -> (StatusCode, ErrorBody) {
    match e {
        LlmError::Auth(_) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("Authentication failed", "The server's API key was rejected by the generation service"),
        ),
        LlmError::Quota(_) => (
            StatusCode::TOO_MANY_REQUESTS,
            ErrorBody::new(
                "Quota exceeded",
                "The generation service quota is exhausted. Try again later or check billing.",
            ),
        ),
        LlmError::RateLimited { .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            ErrorBody::new("Rate limited", "Too many requests. Please wait a moment and try again."),
        ),
        LlmError::Timeout(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("Generation timed out", "The generation service took too long. Please try again."),
        ),
        LlmError::Network(_) | LlmError::Api { .. } | LlmError::MalformedResponse(_) | LlmError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(
                "Generation failed",
                "The generation service is unavailable. Please try again later.",
            ),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        if status.is_server_error() {
            error!(%status, "Request failed: {}", self);
        } else {
            debug!(%status, "Request rejected: {}", self);
        }

        let retry_after = match &self {
            ApiError::Generate(GenerateError::Remote(e)) if e.is_rate_limit() => e.retry_after(),
            _ => None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(delay) = retry_after
            && let Ok(value) = HeaderValue::from_str(&delay.as_secs().max(1).to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
