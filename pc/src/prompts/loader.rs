//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to the
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, warn};

use super::embedded;
use crate::config::PromptsConfig;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory, searched for `{name}.pmt`
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `override_dir` before the embedded templates
    pub fn new(override_dir: Option<&Path>) -> Self {
        debug!(?override_dir, "PromptLoader::new: called");
        let override_dir = override_dir.and_then(|dir| {
            if dir.is_dir() {
                debug!(?dir, "PromptLoader::new: override directory found");
                Some(dir.to_path_buf())
            } else {
                warn!("Prompt override directory {} does not exist; using embedded prompts", dir.display());
                None
            }
        });

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader from the `prompts` config section
    pub fn from_config(config: &PromptsConfig) -> Self {
        Self::new(config.dir.as_deref())
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    ///
    /// An override that exists but can't be read is logged and skipped.
    pub fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(path) = self.override_path(name) {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(?path, "PromptLoader::load_template: found in override directory");
                    return Ok(content);
                }
                Err(e) => warn!("Failed to read prompt override {}: {}", path.display(), e),
            }
        }

        debug!("PromptLoader::load_template: trying embedded fallback");
        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    ///
    /// A failing override is retried with the embedded template before giving up.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        match self.hbs.render_template(&template, context) {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                let Some(embedded) = embedded::get_embedded(template_name).filter(|t| *t != template) else {
                    return Err(eyre!("Failed to render template {}: {}", template_name, e));
                };
                warn!("Override for template '{}' failed to render ({}); using embedded", template_name, e);
                self.hbs
                    .render_template(embedded, context)
                    .map_err(|e| eyre!("Failed to render embedded template {}: {}", template_name, e))
            }
        }
    }

    /// A system prompt, verbatim; empty only for an unknown name
    pub fn system_prompt(&self, name: &str) -> String {
        debug!(%name, "PromptLoader::system_prompt: called");
        self.load_template(name).unwrap_or_else(|e| {
            warn!("{}", e);
            String::new()
        })
    }

    fn override_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.override_dir.as_ref()?.join(format!("{}.pmt", name));
        path.is_file().then_some(path)
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}

impl std::fmt::Debug for PromptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptLoader")
            .field("override_dir", &self.override_dir)
            .finish()
    }
}
