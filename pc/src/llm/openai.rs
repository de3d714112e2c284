//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API (and any
//! service exposing the same endpoint shape).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::{LlmConfig, ResolvedCredential};

/// Retry-after used in logs when a 429 carries no usable header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAIClient {
    /// Create a new client from configuration and a resolved credential
    pub fn from_config(config: &LlmConfig, credential: &ResolvedCredential) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            api_key: credential.expose().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let model = request.options.model.as_deref().unwrap_or(&self.model);
        debug!(%model, max_tokens = %request.options.max_tokens, "build_request_body: called");

        let max_tokens = request.options.max_tokens.min(self.max_tokens);

        // GPT-5.x and o1/o3 models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens = model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3");

        let mut body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": request.options.temperature,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if request.options.json_mode {
            debug!("build_request_body: json mode");
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    /// Send the request and read the body, without the outer timeout
    async fn exchange(&self, body: &serde_json::Value, timeout: Duration) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(e, timeout))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let text = response.text().await.map_err(|e| network_error(e, timeout))?;

        if !(200..300).contains(&status) {
            debug!(%status, "exchange: API error");
            return Err(error_for_status(status, retry_after, &text));
        }

        Ok(text)
    }
}

/// Map a transport error, separating timeouts from other failures
fn network_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Network(e)
    }
}

/// Classify a non-success HTTP response
fn error_for_status(status: u16, retry_after: Option<u64>, body: &str) -> LlmError {
    let message = api_error_message(body);
    match status {
        401 | 403 => LlmError::Auth(message),
        402 => LlmError::Quota(message),
        429 if is_quota_body(body) => LlmError::Quota(message),
        429 => {
            let retry_after = retry_after.map(Duration::from_secs);
            warn!(
                retry_after_secs = retry_after.map_or(DEFAULT_RETRY_AFTER_SECS, |d| d.as_secs()),
                "error_for_status: rate limited"
            );
            LlmError::RateLimited { retry_after }
        }
        _ => LlmError::Api { status, message },
    }
}

fn is_quota_body(body: &str) -> bool {
    let lowered = body.to_lowercase();
    lowered.contains("insufficient_quota") || lowered.contains("billing") || lowered.contains("exceeded your current quota")
}

/// Pull `error.message` out of an OpenAI error body, else the body itself
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Parse a successful OpenAI API response body
fn parse_response(text: &str) -> Result<CompletionResponse, LlmError> {
    let api_response: OpenAIResponse = serde_json::from_str(text)?;
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("Response contained no choices".to_string()))?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| LlmError::MalformedResponse("Response contained no text".to_string()))?;

    let usage = api_response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    Ok(CompletionResponse {
        content,
        stop_reason: StopReason::from_openai(choice.finish_reason.as_deref()),
        usage,
    })
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, json_mode = request.options.json_mode, "complete: called");
        let body = self.build_request_body(&request);
        let timeout = request.options.timeout();

        let text = match tokio::time::timeout(timeout, self.exchange(&body, timeout)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(?timeout, "complete: timed out");
                return Err(LlmError::Timeout(timeout));
            }
        };

        let response = parse_response(&text)?;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "complete: success"
        );
        Ok(response)
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationOptions;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    fn test_client(base_url: &str, max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: "gpt-4o".to_string(),
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            http: Client::new(),
            max_tokens,
        }
    }

    /// Serve a single canned route on a random local port
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "content": content }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        })
        .to_string()
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client("https://api.openai.com", 8192);
        let request = CompletionRequest::new("You are helpful", "Hello", GenerationOptions::default());

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_build_request_body_json_mode_and_model_override() {
        let client = test_client("https://api.openai.com", 8192);
        let options = GenerationOptions {
            model: Some("gpt-5-mini".to_string()),
            ..GenerationOptions::default()
        }
        .json();
        let request = CompletionRequest::new("s", "u", options);

        let body = client.build_request_body(&request);
        assert_eq!(body["model"], "gpt-5-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_completion_tokens"], 2000);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_max_tokens_capped() {
        let client = test_client("https://api.openai.com", 1000);
        let options = GenerationOptions {
            max_tokens: 5000,
            ..GenerationOptions::default()
        };
        let body = client.build_request_body(&CompletionRequest::new("s", "u", options));
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_error_for_status() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        match error_for_status(401, None, body) {
            LlmError::Auth(msg) => assert_eq!(msg, "Incorrect API key provided"),
            other => panic!("Expected Auth, got {other:?}"),
        }

        let quota = r#"{"error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}}"#;
        assert!(matches!(error_for_status(429, None, quota), LlmError::Quota(_)));

        let limited = error_for_status(429, Some(7), r#"{"error": {"message": "Rate limit reached"}}"#);
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(7)));

        assert!(matches!(
            error_for_status(500, None, "upstream exploded"),
            LlmError::Api { status: 500, ref message } if message == "upstream exploded"
        ));
    }

    #[test]
    fn test_parse_response() {
        let response = parse_response(&completion_body("Hi")).unwrap();
        assert_eq!(response.content, "Hi");
        assert_eq!(response.usage.total(), 15);

        assert!(matches!(parse_response("not json"), Err(LlmError::MalformedResponse(_))));
        assert!(matches!(
            parse_response(r#"{"choices": []}"#),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(&completion_body("   ")),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_success_sends_bearer_token() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap| async move {
                let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default();
                if auth == "Bearer test-key" {
                    (StatusCode::OK, completion_body("{\"ok\": true}"))
                } else {
                    (StatusCode::UNAUTHORIZED, String::new())
                }
            }),
        );
        let client = test_client(&serve(app).await, 4096);

        let text = client
            .generate("s", "u", &GenerationOptions::default().json())
            .await
            .unwrap();
        assert_eq!(text, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn test_complete_maps_rate_limit() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", "3")],
                    r#"{"error": {"message": "slow down"}}"#,
                )
            }),
        );
        let client = test_client(&serve(app).await, 4096);

        let err = client.generate("s", "u", &GenerationOptions::default()).await.unwrap_err();
        assert!(err.is_rate_limit());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                completion_body("too late")
            }),
        );
        let client = test_client(&serve(app).await, 4096);
        let options = GenerationOptions {
            timeout_ms: 100,
            ..GenerationOptions::default()
        };

        let err = client.generate("s", "u", &options).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        // Nothing listens on port 9 of localhost in the test environment
        let client = test_client("http://127.0.0.1:9", 4096);
        let options = GenerationOptions {
            timeout_ms: 2000,
            ..GenerationOptions::default()
        };
        let err = client.generate("s", "u", &options).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_) | LlmError::Timeout(_)));
    }
}
