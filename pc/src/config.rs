//! Pitchcraft configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::GenerationOptions;

/// Main Pitchcraft configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Per-request-type generation settings
    pub generation: GenerationConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Optional pitch history storage
    pub storage: StorageConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local .pitchcraft.yml, then ~/.config/pitchcraft/pitchcraft.yml
        for path in Self::search_paths() {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path).ok()?,
            None => Self::search_paths()
                .into_iter()
                .find_map(|path| Self::load_from_file(path).ok())?,
        };
        config.log_level
    }

    /// Existing config files in lookup order, when no explicit path is given
    fn search_paths() -> Vec<PathBuf> {
        let local = PathBuf::from(".pitchcraft.yml");
        let user = dirs::config_dir().map(|dir| dir.join("pitchcraft").join("pitchcraft.yml"));
        std::iter::once(local).chain(user).filter(|path| path.exists()).collect()
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Hard cap on tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Connection-level timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 90_000,
        }
    }
}

impl LlmConfig {
    /// Look up the API key named by `api-key-env`
    ///
    /// An unset or blank variable means remote generation is unavailable.
    pub fn credential(&self) -> Credential {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Credential::Configured(ResolvedCredential(key.trim().to_string())),
            _ => Credential::Unconfigured,
        }
    }
}

/// Whether a remote-service credential is available
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(ResolvedCredential),
    Unconfigured,
}

/// An API key; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential(String);

impl ResolvedCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedCredential(***)")
    }
}

/// Generation settings for each request type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Pitch (name, elevator, slides)
    pub pitch: GenerationOptions,

    /// Full code-scaffolding prompt
    #[serde(rename = "code-prompt")]
    pub code_prompt: GenerationOptions,

    /// Quick build prompt
    #[serde(rename = "build-prompt")]
    pub build_prompt: GenerationOptions,

    /// Characters of text kept from each slide when building the user prompt
    #[serde(rename = "slide-excerpt-chars")]
    pub slide_excerpt_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            pitch: GenerationOptions {
                temperature: 0.8,
                max_tokens: 2500,
                timeout_ms: 30_000,
                ..GenerationOptions::default()
            },
            code_prompt: GenerationOptions {
                temperature: 0.7,
                max_tokens: 4000,
                timeout_ms: 90_000,
                ..GenerationOptions::default()
            },
            build_prompt: GenerationOptions {
                temperature: 0.7,
                max_tokens: 1500,
                timeout_ms: 45_000,
                ..GenerationOptions::default()
            },
            slide_excerpt_chars: 200,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. "127.0.0.1:3000"
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Pitch history storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store generated pitches
    pub enabled: bool,

    /// Directory holding `pitches.jsonl`
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/pitchcraft on Linux)
        let path = dirs::data_dir()
            .map(|d| d.join("pitchcraft"))
            .unwrap_or_else(|| PathBuf::from(".pitchcraft"));

        Self { enabled: false, path }
    }
}

/// Prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `<name>.pmt` before the embedded templates
    pub dir: Option<PathBuf>,
}
