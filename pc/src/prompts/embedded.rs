//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Pitch system prompt: JSON {name, elevator, slides} with the 4-slide arc
pub const PITCH_SYSTEM: &str = include_str!("../../prompts/pitch-system.pmt");

/// Code-prompt system prompt: JSON {prompt, techStack, fileStructure, summary, features}
pub const CODE_SYSTEM: &str = include_str!("../../prompts/code-system.pmt");

/// Quick build-prompt system prompt: plain text, condensed
pub const QUICK_SYSTEM: &str = include_str!("../../prompts/quick-system.pmt");

/// User prompt shared by both code-prompt variants
pub const CODE_USER: &str = include_str!("../../prompts/code-user.pmt");

/// Full scaffolding document used as the offline fallback
pub const SCAFFOLD: &str = include_str!("../../prompts/scaffold.pmt");

/// Condensed scaffolding document for quick requests
pub const SCAFFOLD_QUICK: &str = include_str!("../../prompts/scaffold-quick.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let found = match name {
        "pitch-system" => Some(PITCH_SYSTEM),
        "code-system" => Some(CODE_SYSTEM),
        "quick-system" => Some(QUICK_SYSTEM),
        "code-user" => Some(CODE_USER),
        "scaffold" => Some(SCAFFOLD),
        "scaffold-quick" => Some(SCAFFOLD_QUICK),
        _ => None,
    };
    if found.is_none() {
        debug!(%name, "get_embedded: no match found");
    }
    found
}
