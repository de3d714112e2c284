//! Pitchcraft - startup pitches and code-scaffolding prompts
//!
//! Turns a short startup idea into a pitch (company name, elevator pitch and
//! HTML slides) and into a scaffolding prompt for an AI coding assistant.
//!
//! # Core Concepts
//!
//! - **Validate first**: nothing is generated from input that fails validation
//! - **Two policies**: pitches need the remote service; prompts fall back to
//!   deterministic templates when it is missing or failing
//! - **Ordered tables**: feature and tech-stack inference are keyword tables
//!   scanned in a fixed order
//!
//! # Modules
//!
//! - [`validation`] - Input validation gate
//! - [`inference`] - Tech-stack and feature inference
//! - [`prompts`] - Prompt templates and the scaffolding renderer
//! - [`llm`] - Remote generation client
//! - [`parser`] - Structuring of remote output
//! - [`generator`] - Pitch and prompt orchestration
//! - [`server`] - HTTP API
//! - [`store`] - Optional pitch history
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod generator;
pub mod inference;
pub mod llm;
pub mod parser;
pub mod prompts;
pub mod server;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, Credential, LlmConfig};
pub use domain::{BuildPromptResult, CodePromptResult, FileNode, FileStructure, PitchContext, PitchResult};
pub use generator::{BuildPromptGenerator, CodePromptGenerator, GenerateError, Generators, PitchGenerator};
pub use llm::{
    CompletionRequest, CompletionResponse, GenerationOptions, LlmClient, LlmError, OpenAIClient, RemoteBackend,
    create_backend, create_client,
};
pub use prompts::PromptLoader;
pub use server::{AppState, router};
pub use store::{PitchRecord, PitchStore, StoreError};
pub use validation::{IdeaLimit, ValidationResult, validate, validate_idea};
