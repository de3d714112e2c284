//! Domain types for pitch and scaffolding-prompt generation
//!
//! Nothing here outlives a single request: a request carries an idea (and
//! optionally a [`PitchContext`]), and produces either a [`PitchResult`] or a
//! [`CodePromptResult`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Nested project layout: path segment -> node
pub type FileStructure = BTreeMap<String, FileNode>;

/// A node in a [`FileStructure`]
///
/// Serialized untagged so the wire shape is a plain nested object whose values
/// are objects (directories), arrays of child names, or `null` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileNode {
    Directory(FileStructure),
    Listing(Vec<String>),
    File,
}

impl FileNode {
    fn dir<const N: usize>(entries: [(&str, FileNode); N]) -> Self {
        FileNode::Directory(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn listing(names: &[&str]) -> Self {
        FileNode::Listing(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Optional pitch data attached to a code-prompt request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevator: Option<String>,

    /// Slide records; usually HTML strings, occasionally objects with an
    /// `html` or `content` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides: Option<Vec<serde_json::Value>>,
}

impl PitchContext {
    /// Company name, if present and non-blank
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Elevator pitch, if present and non-blank
    pub fn elevator(&self) -> Option<&str> {
        self.elevator.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Raw markup of every slide that carries any
    pub fn slide_markup(&self) -> Vec<&str> {
        debug!("PitchContext::slide_markup: called");
        let Some(slides) = &self.slides else {
            return Vec::new();
        };

        slides
            .iter()
            .filter_map(|slide| match slide {
                serde_json::Value::String(s) => Some(s.as_str()),
                serde_json::Value::Object(obj) => obj
                    .get("html")
                    .or_else(|| obj.get("content"))
                    .and_then(|v| v.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A generated pitch: company name, one-sentence pitch, and HTML slides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchResult {
    pub name: String,
    pub elevator: String,
    pub slides: Vec<String>,
}

/// A structured scaffolding prompt for an AI coding assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePromptResult {
    pub prompt: String,
    pub tech_stack: Vec<String>,
    pub file_structure: FileStructure,
    pub summary: String,
    pub features: Vec<String>,
}

/// [`CodePromptResult`] stamped with its generation time, as returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedCodePrompt {
    #[serde(flatten)]
    pub result: CodePromptResult,
    pub generated_at: DateTime<Utc>,
}

impl From<CodePromptResult> for TimestampedCodePrompt {
    fn from(result: CodePromptResult) -> Self {
        Self {
            result,
            generated_at: Utc::now(),
        }
    }
}

/// Label attached to every quick build prompt
pub const QUICK_OPTIMIZED_FOR: &str = "quick development";

/// Condensed scaffolding prompt for the quick request type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPromptResult {
    pub prompt: String,
    pub character_count: usize,
    pub generated_at: DateTime<Utc>,
    pub optimized_for: String,
}

impl BuildPromptResult {
    pub fn new(prompt: String) -> Self {
        debug!(prompt_len = prompt.len(), "BuildPromptResult::new: called");
        Self {
            character_count: prompt.chars().count(),
            prompt,
            generated_at: Utc::now(),
            optimized_for: QUICK_OPTIMIZED_FOR.to_string(),
        }
    }
}

/// The fixed project layout used whenever generated output doesn't supply one
pub fn default_file_structure() -> FileStructure {
    let root = FileNode::dir([
        (
            "backend",
            FileNode::dir([
                (
                    "src",
                    FileNode::dir([
                        ("config", FileNode::listing(&["database.js", "env.js"])),
                        ("controllers", FileNode::File),
                        ("middleware", FileNode::listing(&["auth.js", "errorHandler.js", "validate.js"])),
                        ("models", FileNode::File),
                        ("routes", FileNode::File),
                        ("services", FileNode::File),
                        ("utils", FileNode::File),
                        ("app.js", FileNode::File),
                        ("server.js", FileNode::File),
                    ]),
                ),
                ("tests", FileNode::File),
                (".env.example", FileNode::File),
                ("package.json", FileNode::File),
            ]),
        ),
        (
            "frontend",
            FileNode::dir([
                ("public", FileNode::File),
                (
                    "src",
                    FileNode::dir([
                        ("components", FileNode::listing(&["common", "layout", "features"])),
                        ("context", FileNode::File),
                        ("hooks", FileNode::File),
                        ("pages", FileNode::File),
                        ("services", FileNode::listing(&["api.js"])),
                        ("utils", FileNode::File),
                        ("App.jsx", FileNode::File),
                        ("main.jsx", FileNode::File),
                    ]),
                ),
                ("package.json", FileNode::File),
                ("tailwind.config.js", FileNode::File),
                ("vite.config.js", FileNode::File),
            ]),
        ),
        ("docs", FileNode::listing(&["API.md", "SETUP.md"])),
        (".gitignore", FileNode::File),
        ("docker-compose.yml", FileNode::File),
        ("README.md", FileNode::File),
    ]);

    let mut structure = FileStructure::new();
    structure.insert("project-root".to_string(), root);
    structure
}

/// Render a [`FileStructure`] as an indented tree, one entry per line
///
/// Directories end in `/`; listings expand to their child names.
pub fn render_tree(structure: &FileStructure) -> String {
    debug!(entries = structure.len(), "render_tree: called");
    let mut out = String::new();
    render_level(structure, 0, &mut out);
    out
}

fn render_level(structure: &FileStructure, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, node) in structure {
        match node {
            FileNode::Directory(children) => {
                out.push_str(&format!("{}{}/\n", indent, name));
                render_level(children, depth + 1, out);
            }
            FileNode::Listing(children) => {
                out.push_str(&format!("{}{}/\n", indent, name));
                for child in children {
                    out.push_str(&format!("{}  {}\n", indent, child));
                }
            }
            FileNode::File => {
                out.push_str(&format!("{}{}\n", indent, name));
            }
        }
    }
}
