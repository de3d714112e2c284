//! Pitch generation: validate, call the remote service in JSON mode, check structure

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{GenerateError, NOT_CONFIGURED};
use crate::domain::PitchResult;
use crate::llm::{GenerationOptions, RemoteBackend};
use crate::parser::parse_pitch;
use crate::prompts::PromptLoader;
use crate::prompts::render::idea_preview;
use crate::validation::{IdeaLimit, validate_idea};

/// Generates {name, elevator, slides} for an idea
#[derive(Debug, Clone)]
pub struct PitchGenerator {
    backend: RemoteBackend,
    loader: Arc<PromptLoader>,
    options: GenerationOptions,
}

impl PitchGenerator {
    pub fn new(backend: RemoteBackend, loader: Arc<PromptLoader>, options: GenerationOptions) -> Self {
        Self {
            backend,
            loader,
            options,
        }
    }

    pub fn backend(&self) -> &RemoteBackend {
        &self.backend
    }

    /// Generate a pitch
    ///
    /// Fails on invalid input, a missing credential, any remote error, or
    /// output that doesn't have the pitch shape. There is no local fallback.
    pub async fn generate(&self, idea: &str) -> Result<PitchResult, GenerateError> {
        debug!(idea_len = idea.len(), "PitchGenerator::generate: called");

        let validation = validate_idea(idea, IdeaLimit::Standard);
        if !validation.is_valid {
            debug!(error = ?validation.error, "PitchGenerator::generate: validation failed");
            return Err(GenerateError::Validation(validation));
        }

        let Some(client) = self.backend.client() else {
            warn!("Pitch requested but remote generation is not configured");
            return Err(GenerateError::Config(NOT_CONFIGURED.to_string()));
        };

        let system_prompt = self.loader.system_prompt("pitch-system");
        let user_prompt = format!("Startup idea: {}", idea.trim());
        let options = self.options.clone().json();

        info!(idea = %idea_preview(idea), "Generating pitch");
        let raw = client
            .generate(&system_prompt, &user_prompt, &options)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), retryable = e.is_retryable(), "Pitch generation failed: {}", e))?;

        let pitch = parse_pitch(&raw).inspect_err(|e| warn!("Generated pitch rejected: {}", e))?;
        info!(name = %pitch.name, slides = pitch.slides.len(), "Pitch generated");
        Ok(pitch)
    }
}
