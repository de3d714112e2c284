//! Code-prompt generation with a guaranteed template fallback

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::GenerateError;
use crate::domain::{CodePromptResult, PitchContext, default_file_structure};
use crate::inference::{extract_features, infer_tech_stack};
use crate::llm::{GenerationOptions, RemoteBackend};
use crate::parser::{derive_summary, parse_code_prompt};
use crate::prompts::render::idea_preview;
use crate::prompts::{PromptLoader, ScaffoldInput, code_user_prompt, render_scaffold};
use crate::validation::{IdeaLimit, validate_idea};

/// Generates a structured scaffolding prompt for an idea
#[derive(Debug, Clone)]
pub struct CodePromptGenerator {
    backend: RemoteBackend,
    loader: Arc<PromptLoader>,
    options: GenerationOptions,
    slide_excerpt_chars: usize,
}

impl CodePromptGenerator {
    pub fn new(
        backend: RemoteBackend,
        loader: Arc<PromptLoader>,
        options: GenerationOptions,
        slide_excerpt_chars: usize,
    ) -> Self {
        Self {
            backend,
            loader,
            options,
            slide_excerpt_chars,
        }
    }

    /// Generate a scaffolding prompt
    ///
    /// Only invalid input is an error. Remote failures of any kind fall back
    /// to [`Self::from_template`]; remote output that isn't the expected JSON
    /// is kept as the prompt text.
    pub async fn generate(
        &self,
        idea: &str,
        context: Option<&PitchContext>,
    ) -> Result<CodePromptResult, GenerateError> {
        debug!(idea_len = idea.len(), has_context = context.is_some(), "CodePromptGenerator::generate: called");

        let validation = validate_idea(idea, IdeaLimit::Standard);
        if !validation.is_valid {
            debug!(error = ?validation.error, "CodePromptGenerator::generate: validation failed");
            return Err(GenerateError::Validation(validation));
        }

        let Some(client) = self.backend.client() else {
            info!("Remote generation not configured; using code-prompt template");
            return Ok(self.from_template(idea, context));
        };

        let system_prompt = self.loader.system_prompt("code-system");
        let user_prompt = code_user_prompt(&self.loader, idea, context, self.slide_excerpt_chars);
        let options = self.options.clone().json();

        info!(idea = %idea_preview(idea), "Generating code prompt");
        match client.generate(&system_prompt, &user_prompt, &options).await {
            Ok(raw) => {
                debug!(raw_len = raw.len(), "CodePromptGenerator::generate: remote output received");
                Ok(parse_code_prompt(&raw, idea, context))
            }
            Err(e) => {
                warn!(kind = e.kind(), retryable = e.is_retryable(), "Code-prompt generation failed, using template: {}", e);
                Ok(self.from_template(idea, context))
            }
        }
    }

    /// The deterministic, offline result for an idea
    pub fn from_template(&self, idea: &str, context: Option<&PitchContext>) -> CodePromptResult {
        debug!(idea_len = idea.len(), "CodePromptGenerator::from_template: called");
        let tech_stack = infer_tech_stack(idea, "");
        let features = extract_features(idea);
        let summary = derive_summary(idea, context);

        let prompt = render_scaffold(
            &self.loader,
            &ScaffoldInput {
                idea,
                context,
                tech_stack: &tech_stack,
                features: &features,
                summary: &summary,
            },
        );

        CodePromptResult {
            prompt,
            tech_stack,
            file_structure: default_file_structure(),
            summary,
            features,
        }
    }
}
