//! Quick build-prompt generation: condensed, plain text, template fallback

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::GenerateError;
use crate::domain::{BuildPromptResult, PitchContext};
use crate::inference::{extract_features, infer_tech_stack};
use crate::llm::{GenerationOptions, RemoteBackend};
use crate::parser::derive_summary;
use crate::prompts::render::idea_preview;
use crate::prompts::{PromptLoader, ScaffoldInput, code_user_prompt, render_quick_scaffold};
use crate::validation::{IdeaLimit, validate_idea};

/// Generates the condensed build prompt for quick requests
#[derive(Debug, Clone)]
pub struct BuildPromptGenerator {
    backend: RemoteBackend,
    loader: Arc<PromptLoader>,
    options: GenerationOptions,
    slide_excerpt_chars: usize,
}

impl BuildPromptGenerator {
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

    /// Generate a quick build prompt; only invalid input is an error
    pub async fn generate(
        &self,
        idea: &str,
        context: Option<&PitchContext>,
    ) -> Result<BuildPromptResult, GenerateError> {
        debug!(idea_len = idea.len(), "BuildPromptGenerator::generate: called");

        let validation = validate_idea(idea, IdeaLimit::Quick);
        if !validation.is_valid {
            debug!(error = ?validation.error, "BuildPromptGenerator::generate: validation failed");
            return Err(GenerateError::Validation(validation));
        }

        let Some(client) = self.backend.client() else {
            info!("Remote generation not configured; using quick template");
            return Ok(BuildPromptResult::new(self.from_template(idea, context)));
        };

        let system_prompt = self.loader.system_prompt("quick-system");
        let user_prompt = code_user_prompt(&self.loader, idea, context, self.slide_excerpt_chars);

        info!(idea = %idea_preview(idea), "Generating quick build prompt");
        let prompt = match client.generate(&system_prompt, &user_prompt, &self.options).await {
            Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
            Ok(_) => {
                warn!("Quick build prompt came back empty, using template");
                self.from_template(idea, context)
            }
            Err(e) => {
                warn!(kind = e.kind(), retryable = e.is_retryable(), "Quick build prompt failed, using template: {}", e);
                self.from_template(idea, context)
            }
        };

        Ok(BuildPromptResult::new(prompt))
    }

    /// The deterministic, offline condensed prompt
    pub fn from_template(&self, idea: &str, context: Option<&PitchContext>) -> String {
        debug!(idea_len = idea.len(), "BuildPromptGenerator::from_template: called");
        let tech_stack = infer_tech_stack(idea, "");
        let features = extract_features(idea);
        let summary = derive_summary(idea, context);

        render_quick_scaffold(
            &self.loader,
            &ScaffoldInput {
                idea,
                context,
                tech_stack: &tech_stack,
                features: &features,
                summary: &summary,
            },
        )
    }
}
