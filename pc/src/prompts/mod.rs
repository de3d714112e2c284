//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for pitch and
//! scaffolding-prompt generation.
//!
//! Template loading chain:
//! 1. `{prompts.dir}/{name}.pmt` (user override)
//! 2. Embedded default compiled from `pc/prompts/`
//!
//! Templates use Handlebars syntax for variable substitution. Scaffolding
//! documents are rendered through [`render`], which never fails.

pub mod embedded;
mod loader;
pub mod render;

pub use loader::PromptLoader;
pub use render::{ScaffoldInput, code_user_prompt, render_quick_scaffold, render_scaffold, slide_excerpt};
