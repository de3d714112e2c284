//! Remote generation client
//!
//! Sends system + user prompt pairs to a configured text-generation service.
//! Whether a service is available at all is decided once, at startup, and
//! carried as a [`RemoteBackend`] rather than a nullable global.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, GenerationOptions, StopReason, TokenUsage};

use crate::config::{Credential, LlmConfig, ResolvedCredential};

/// The remote service as seen by the generators
#[derive(Clone)]
pub enum RemoteBackend {
    /// A credential was found and a client built
    Configured(Arc<dyn LlmClient>),
    /// No credential; remote generation is never attempted
    Unconfigured,
}

impl RemoteBackend {
    pub fn is_configured(&self) -> bool {
        matches!(self, RemoteBackend::Configured(_))
    }

    pub fn client(&self) -> Option<&Arc<dyn LlmClient>> {
        match self {
            RemoteBackend::Configured(client) => Some(client),
            RemoteBackend::Unconfigured => None,
        }
    }
}

impl fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteBackend::Configured(_) => write!(f, "RemoteBackend::Configured"),
            RemoteBackend::Unconfigured => write!(f, "RemoteBackend::Unconfigured"),
        }
    }
}

/// Create an LLM client for the provider named in config
///
/// Supports "openai" (and OpenAI-compatible endpoints via `base-url`).
pub fn create_client(config: &LlmConfig, credential: &ResolvedCredential) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config, credential)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!("Unknown LLM provider: '{}'. Supported: openai", other)))
        }
    }
}

/// Resolve the credential once and build the backend
pub fn create_backend(config: &LlmConfig) -> Result<RemoteBackend, LlmError> {
    debug!(api_key_env = %config.api_key_env, "create_backend: called");
    match config.credential() {
        Credential::Configured(credential) => {
            let client = create_client(config, &credential)?;
            info!(provider = %config.provider, model = %config.model, "Remote generation configured");
            Ok(RemoteBackend::Configured(client))
        }
        Credential::Unconfigured => {
            warn!(
                "{} is not set; pitch generation disabled, code prompts use templates only",
                config.api_key_env
            );
            Ok(RemoteBackend::Unconfigured)
        }
    }
}
