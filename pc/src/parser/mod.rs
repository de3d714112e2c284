//! Structuring of remote generation output
//!
//! [`parse_output`] is total: it either finds a JSON object in the text or
//! hands the text back untouched. The pitch and code-prompt parsers then apply
//! their own (different) policies to the two cases.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{CodePromptResult, FileStructure, PitchContext, PitchResult, default_file_structure};
use crate::inference::{dedup_preserving_order, extract_features, extract_features_with, infer_tech_stack};

/// Allowed slide count for a pitch
pub const SLIDE_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Summary length used when the idea has no sentence break
pub const SUMMARY_MAX_CHARS: usize = 150;

/// Remote output was well-formed but semantically unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StructureError(pub String);

/// Result of looking for a JSON object in generated text
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    Object(Map<String, Value>),
    RawText(String),
}

/// Find a JSON object in `raw`
///
/// Tries the whole (trimmed) text first, then the first balanced `{...}` span.
/// Never fails: anything else comes back as [`ParsedOutput::RawText`].
pub fn parse_output(raw: &str) -> ParsedOutput {
    debug!(raw_len = raw.len(), "parse_output: called");

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(raw.trim()) {
        debug!("parse_output: whole text is a JSON object");
        return ParsedOutput::Object(obj);
    }

    if let Some(span) = extract_first_json_object(raw) {
        match serde_json::from_str::<Value>(span) {
            Ok(Value::Object(obj)) => {
                debug!(span_len = span.len(), "parse_output: found embedded JSON object");
                return ParsedOutput::Object(obj);
            }
            Ok(_) => debug!("parse_output: embedded span is not an object"),
            Err(e) => debug!(error = %e, "parse_output: embedded span is not valid JSON"),
        }
    }

    debug!("parse_output: no JSON object, returning raw text");
    ParsedOutput::RawText(raw.to_string())
}

/// Returns the first balanced `{...}` span in `s`
///
/// Braces inside JSON string literals are ignored.
pub fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if start.is_none() {
            if c == '{' {
                start = Some(i);
                depth = 1;
            }
            continue;
        }

        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let st = start?;
                    return Some(&s[st..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a pitch from remote output
///
/// Requires `name`, `elevator` and `slides` (3 to 5 non-empty strings).
pub fn parse_pitch(raw: &str) -> Result<PitchResult, StructureError> {
    debug!(raw_len = raw.len(), "parse_pitch: called");
    let obj = match parse_output(raw) {
        ParsedOutput::Object(obj) => obj,
        ParsedOutput::RawText(_) => {
            warn!("parse_pitch: response did not contain a JSON object");
            return Err(StructureError("Generated pitch was not valid JSON".to_string()));
        }
    };

    let name = required_string(&obj, "name")?;
    let elevator = required_string(&obj, "elevator")?;

    let slides = match obj.get("slides") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item.as_str().map(str::trim) {
                Some(s) if !s.is_empty() => Ok(s.to_string()),
                _ => Err(StructureError("Every slide must be a non-empty string".to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(StructureError("Missing or invalid 'slides' field".to_string())),
    };

    if !SLIDE_RANGE.contains(&slides.len()) {
        warn!(count = slides.len(), "parse_pitch: slide count out of range");
        return Err(StructureError(format!(
            "Expected {} to {} slides, got {}",
            SLIDE_RANGE.start(),
            SLIDE_RANGE.end(),
            slides.len()
        )));
    }

    debug!(%name, slide_count = slides.len(), "parse_pitch: success");
    Ok(PitchResult { name, elevator, slides })
}

fn required_string(obj: &Map<String, Value>, field: &str) -> Result<String, StructureError> {
    match obj.get(field).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(StructureError(format!("Missing or invalid '{}' field", field))),
    }
}

/// Structure remote output into a [`CodePromptResult`]
///
/// Uses a JSON object when one with a non-empty `prompt` and a `techStack`
/// array is present; otherwise the whole text becomes the prompt and every
/// other field is inferred locally.
pub fn parse_code_prompt(raw: &str, idea: &str, context: Option<&PitchContext>) -> CodePromptResult {
    debug!(raw_len = raw.len(), idea_len = idea.len(), "parse_code_prompt: called");

    if let ParsedOutput::Object(obj) = parse_output(raw)
        && let Some(result) = code_prompt_from_object(&obj, idea, context)
    {
        debug!("parse_code_prompt: using structured object");
        return result;
    }

    debug!("parse_code_prompt: treating output as raw prompt text");
    CodePromptResult {
        prompt: raw.to_string(),
        tech_stack: infer_tech_stack(idea, raw),
        file_structure: default_file_structure(),
        summary: derive_summary(idea, context),
        features: extract_features_with(idea, raw),
    }
}

fn code_prompt_from_object(
    obj: &Map<String, Value>,
    idea: &str,
    context: Option<&PitchContext>,
) -> Option<CodePromptResult> {
    let prompt = obj.get("prompt").and_then(Value::as_str).filter(|s| !s.trim().is_empty())?;
    let tech_stack = string_array(obj.get("techStack")?)?;
    if tech_stack.is_empty() {
        debug!("code_prompt_from_object: empty techStack");
        return None;
    }

    let file_structure = obj
        .get("fileStructure")
        .and_then(|v| match serde_json::from_value::<FileStructure>(v.clone()) {
            Ok(fs) if !fs.is_empty() => Some(fs),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "code_prompt_from_object: unusable fileStructure");
                None
            }
        })
        .unwrap_or_else(default_file_structure);

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derive_summary(idea, context));

    let features = obj
        .get("features")
        .and_then(string_array)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| extract_features(idea));

    Some(CodePromptResult {
        prompt: prompt.to_string(),
        tech_stack,
        file_structure,
        summary,
        features,
    })
}

/// Non-empty strings of a JSON array, deduplicated; `None` if not an array
fn string_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(dedup_preserving_order(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    ))
}

/// One-line summary: the context's elevator pitch, else the idea's first
/// sentence, else the idea cut to [`SUMMARY_MAX_CHARS`]
pub fn derive_summary(idea: &str, context: Option<&PitchContext>) -> String {
    if let Some(elevator) = context.and_then(PitchContext::elevator) {
        debug!("derive_summary: using elevator pitch");
        return elevator.to_string();
    }

    let idea = idea.trim();
    if let Some(sentence) = first_sentence(idea) {
        debug!("derive_summary: using first sentence");
        return sentence.to_string();
    }

    debug!("derive_summary: truncating idea");
    truncate_chars(idea, SUMMARY_MAX_CHARS)
}

/// The text up to and including the first `.`, `!` or `?` that ends a
/// sentence (followed by whitespace), if there is a later sentence
fn first_sentence(text: &str) -> Option<&str> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && let Some((_, next)) = chars.peek()
            && next.is_whitespace()
        {
            return Some(&text[..i + c.len_utf8()]);
        }
    }

    // A lone sentence ending in punctuation is still a sentence
    if text.ends_with(['.', '!', '?']) && text.chars().count() <= SUMMARY_MAX_CHARS {
        return Some(text);
    }
    None
}

/// Cut `text` to at most `max` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
