//! Generation orchestration
//!
//! Two policies live here and are kept apart on purpose:
//! - [`PitchGenerator`] has no local substitute; every remote or structural
//!   failure reaches the caller.
//! - [`CodePromptGenerator`] and [`BuildPromptGenerator`] absorb every remote
//!   failure into a deterministic template, so valid input always yields a result.

use std::sync::Arc;

use thiserror::Error;

use crate::config::GenerationConfig;
use crate::llm::{LlmError, RemoteBackend};
use crate::parser::StructureError;
use crate::prompts::PromptLoader;
use crate::validation::ValidationResult;

mod build_prompt;
mod code_prompt;
mod pitch;

pub use build_prompt::BuildPromptGenerator;
pub use code_prompt::CodePromptGenerator;
pub use pitch::PitchGenerator;

/// Message used when pitch generation is asked for without a credential
pub const NOT_CONFIGURED: &str = "Remote generation is not configured";

/// Errors surfaced by the generators
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Input failed validation; nothing was sent anywhere
    #[error("{}", .0.message())]
    Validation(ValidationResult),

    /// No usable credential on the server side
    #[error("{0}")]
    Config(String),

    /// The remote service rejected or failed the call
    #[error(transparent)]
    Remote(#[from] LlmError),

    /// The remote service answered with something unusable
    #[error("{0}")]
    Structure(String),
}

impl From<StructureError> for GenerateError {
    fn from(e: StructureError) -> Self {
        GenerateError::Structure(e.0)
    }
}

impl GenerateError {
    /// Short stable name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::Validation(_) => "validation",
            GenerateError::Config(_) => "config",
            GenerateError::Remote(e) => e.kind(),
            GenerateError::Structure(_) => "structure",
        }
    }
}

/// The three generators, sharing one backend and one template loader
#[derive(Debug, Clone)]
pub struct Generators {
    pub pitch: PitchGenerator,
    pub code_prompt: CodePromptGenerator,
    pub build_prompt: BuildPromptGenerator,
}

impl Generators {
    pub fn new(config: &GenerationConfig, backend: RemoteBackend, loader: Arc<PromptLoader>) -> Self {
        Self {
            pitch: PitchGenerator::new(backend.clone(), loader.clone(), config.pitch.clone()),
            code_prompt: CodePromptGenerator::new(
                backend.clone(),
                loader.clone(),
                config.code_prompt.clone(),
                config.slide_excerpt_chars,
            ),
            build_prompt: BuildPromptGenerator::new(
                backend,
                loader,
                config.build_prompt.clone(),
                config.slide_excerpt_chars,
            ),
        }
    }

    pub fn remote_configured(&self) -> bool {
        self.pitch.backend().is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{IdeaLimit, validate_idea};

    #[test]
    fn test_validation_error_displays_first_violation() {
        let err = GenerateError::Validation(validate_idea("Short", IdeaLimit::Standard));
        assert_eq!(err.to_string(), "Idea must be at least 10 characters long");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_structure_error_conversion() {
        let err: GenerateError = StructureError("Expected 3 to 5 slides, got 2".to_string()).into();
        assert!(matches!(err, GenerateError::Structure(ref m) if m.contains("got 2")));
    }

    #[test]
    fn test_remote_kind_passes_through() {
        let err: GenerateError = LlmError::Quota("billing".to_string()).into();
        assert_eq!(err.kind(), "quota");
    }

    #[test]
    fn test_generators_share_backend() {
        let generators = Generators::new(
            &GenerationConfig::default(),
            RemoteBackend::Unconfigured,
            Arc::new(PromptLoader::embedded_only()),
        );
        assert!(!generators.remote_configured());
    }
}
