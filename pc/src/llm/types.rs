//! LLM request/response types
//!
//! Every generation is a single system + user exchange; there is no
//! conversation state to carry between calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-call generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Model override; the client's configured model when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Max tokens for the completion (capped by the client)
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Ask the service for a single JSON object
    #[serde(rename = "json-mode")]
    pub json_mode: bool,

    /// Ceiling for the whole exchange in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_tokens: 2000,
            json_mode: false,
            timeout_ms: 60_000,
        }
    }
}

impl GenerationOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Same options with JSON-object mode switched on
    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// A completion request - everything needed for one remote call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: GenerationOptions,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>, options: GenerationOptions) -> Self {
        let system_prompt = system_prompt.into();
        let user_prompt = user_prompt.into();
        debug!(
            system_len = system_prompt.len(),
            user_len = user_prompt.len(),
            json_mode = options.json_mode,
            "CompletionRequest::new: called"
        );
        Self {
            system_prompt,
            user_prompt,
            options,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text; never empty
    pub content: String,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ContentFilter,
}

impl StopReason {
    /// Parse from an OpenAI `finish_reason` string
    pub fn from_openai(s: Option<&str>) -> Self {
        debug!(?s, "StopReason::from_openai: called");
        match s {
            Some("length") => Self::MaxTokens,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::EndTurn,
        }
    }
}

/// Token usage for cost tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
