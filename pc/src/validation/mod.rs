//! Input validation gate
//!
//! Every rule runs and every violation is collected, in rule order, so callers
//! can report the first problem as the headline and the rest as details.
//! Validation is pure: no I/O, no logging above `debug`.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Minimum idea length in characters, after trimming
pub const MIN_IDEA_CHARS: usize = 10;

/// Substrings that mark an idea as unsafe markup (matched case-insensitively)
pub const BLOCKED_PATTERNS: [&str; 4] = ["script:", "<script", "javascript:", "data:text/html"];

pub const IDEA_REQUIRED: &str = "Idea is required";
pub const IDEA_NOT_STRING: &str = "Idea must be a string";
pub const IDEA_EMPTY: &str = "Idea cannot be empty";
pub const IDEA_TOO_SHORT: &str = "Idea must be at least 10 characters long";
pub const IDEA_HARMFUL: &str = "Idea contains potentially harmful content";
pub const CONTEXT_NOT_OBJECT: &str = "Pitch data must be an object";
pub const CONTEXT_NAME_NOT_STRING: &str = "Pitch name must be a string";
pub const CONTEXT_ELEVATOR_NOT_STRING: &str = "Elevator pitch must be a string";
pub const CONTEXT_SLIDES_NOT_ARRAY: &str = "Slides must be an array";

/// Upper bound on idea length, by request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdeaLimit {
    /// Pitch and full code-prompt requests
    #[default]
    Standard,
    /// Quick build-prompt requests
    Quick,
}

impl IdeaLimit {
    /// Maximum idea length in characters, after trimming
    pub fn max_chars(&self) -> usize {
        match self {
            Self::Standard => 2000,
            Self::Quick => 500,
        }
    }

    fn too_long_message(&self) -> String {
        format!("Idea must be less than {} characters", self.max_chars())
    }
}

/// Outcome of validating one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// First violation, if any
    pub error: Option<String>,
    /// Every violation, in rule order
    pub details: Vec<String>,
}

impl ValidationResult {
    fn from_details(details: Vec<String>) -> Self {
        Self {
            is_valid: details.is_empty(),
            error: details.first().cloned(),
            details,
        }
    }

    /// Headline message for display
    pub fn message(&self) -> &str {
        self.error.as_deref().unwrap_or("Invalid input")
    }

    /// Mentions a length violation (too short, too long, or empty)
    pub fn is_length_violation(&self) -> bool {
        self.details
            .iter()
            .any(|d| d == IDEA_EMPTY || d == IDEA_TOO_SHORT || d.starts_with("Idea must be less than"))
    }
}

/// Validate a raw request: the idea value and an optional pitch-context value
///
/// Both arrive as loosely typed JSON so that type mismatches can be reported
/// with the same messages as bounds violations. A JSON `null` context is
/// treated as absent.
pub fn validate(idea: Option<&Value>, context: Option<&Value>, limit: IdeaLimit) -> ValidationResult {
    debug!(?limit, has_context = context.is_some(), "validate: called");
    let mut details = Vec::new();

    match idea {
        None | Some(Value::Null) => {
            debug!("validate: idea missing");
            details.push(IDEA_REQUIRED.to_string());
        }
        Some(Value::String(text)) => {
            details.extend(idea_violations(text, limit));
        }
        Some(_) => {
            debug!("validate: idea not a string");
            details.push(IDEA_NOT_STRING.to_string());
        }
    }

    if let Some(ctx) = context {
        details.extend(context_violations(ctx));
    }

    let result = ValidationResult::from_details(details);
    debug!(is_valid = result.is_valid, violations = result.details.len(), "validate: done");
    result
}

/// Validate idea text that is already known to be a string
pub fn validate_idea(idea: &str, limit: IdeaLimit) -> ValidationResult {
    debug!(?limit, idea_len = idea.len(), "validate_idea: called");
    ValidationResult::from_details(idea_violations(idea, limit))
}

fn idea_violations(idea: &str, limit: IdeaLimit) -> Vec<String> {
    let mut details = Vec::new();
    let trimmed = idea.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        details.push(IDEA_EMPTY.to_string());
    } else if len < MIN_IDEA_CHARS {
        details.push(IDEA_TOO_SHORT.to_string());
    } else if len > limit.max_chars() {
        details.push(limit.too_long_message());
    }

    if contains_blocked_pattern(trimmed) {
        debug!("idea_violations: blocked pattern found");
        details.push(IDEA_HARMFUL.to_string());
    }

    details
}

/// True if `text` contains any of [`BLOCKED_PATTERNS`], ignoring case
pub fn contains_blocked_pattern(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BLOCKED_PATTERNS.iter().any(|p| lowered.contains(p))
}

fn context_violations(ctx: &Value) -> Vec<String> {
    let mut details = Vec::new();

    let obj = match ctx {
        Value::Null => return details,
        Value::Object(obj) => obj,
        _ => {
            debug!("context_violations: not an object");
            details.push(CONTEXT_NOT_OBJECT.to_string());
            return details;
        }
    };

    if matches!(obj.get("name"), Some(v) if !v.is_null() && !v.is_string()) {
        details.push(CONTEXT_NAME_NOT_STRING.to_string());
    }
    if matches!(obj.get("elevator"), Some(v) if !v.is_null() && !v.is_string()) {
        details.push(CONTEXT_ELEVATOR_NOT_STRING.to_string());
    }
    if matches!(obj.get("slides"), Some(v) if !v.is_null() && !v.is_array()) {
        details.push(CONTEXT_SLIDES_NOT_ARRAY.to_string());
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn check(idea: Value) -> ValidationResult {
        validate(Some(&idea), None, IdeaLimit::Standard)
    }

    #[test]
    fn test_valid_idea() {
        let result = check(json!("A marketplace for renting camping gear"));
        assert!(result.is_valid);
        assert!(result.error.is_none());
        assert!(result.details.is_empty());
    }

    #[test]
    fn test_missing_and_null_idea() {
        let result = validate(None, None, IdeaLimit::Standard);
        assert_eq!(result.error.as_deref(), Some(IDEA_REQUIRED));

        let result = check(Value::Null);
        assert_eq!(result.error.as_deref(), Some(IDEA_REQUIRED));
    }

    #[test]
    fn test_non_string_idea() {
        let result = check(json!(12345678901_u64));
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some(IDEA_NOT_STRING));
    }

    #[test]
    fn test_empty_after_trim() {
        let result = check(json!("   \n\t "));
        assert_eq!(result.details, vec![IDEA_EMPTY.to_string()]);
    }

    #[test]
    fn test_too_short() {
        let result = check(json!("Short"));
        assert_eq!(result.error.as_deref(), Some(IDEA_TOO_SHORT));
        assert!(result.is_length_violation());
    }

    #[test]
    fn test_too_long_standard_and_quick() {
        let long = "a".repeat(2001);
        let result = check(json!(long));
        assert_eq!(result.error.as_deref(), Some("Idea must be less than 2000 characters"));

        let exact = "a".repeat(2000);
        assert!(check(json!(exact)).is_valid);

        let quick = "a".repeat(501);
        let result = validate(Some(&json!(quick)), None, IdeaLimit::Quick);
        assert_eq!(result.error.as_deref(), Some("Idea must be less than 500 characters"));
    }

    #[test]
    fn test_harmful_content_accumulates_with_length() {
        let result = check(json!("<SCRIPT>"));
        assert_eq!(result.details, vec![IDEA_TOO_SHORT.to_string(), IDEA_HARMFUL.to_string()]);
        assert_eq!(result.error.as_deref(), Some(IDEA_TOO_SHORT));
    }

    #[test]
    fn test_blocked_patterns_case_insensitive() {
        assert!(contains_blocked_pattern("click JavaScript:alert(1) here"));
        assert!(contains_blocked_pattern("DATA:TEXT/HTML,<b>x</b>"));
        assert!(contains_blocked_pattern("vbscript:foo"));
        assert!(!contains_blocked_pattern("a scripting language tutor"));
    }

    #[test]
    fn test_context_must_be_object() {
        let ctx = json!(["not", "an", "object"]);
        let result = validate(Some(&json!("A valid startup idea here")), Some(&ctx), IdeaLimit::Standard);
        assert_eq!(result.details, vec![CONTEXT_NOT_OBJECT.to_string()]);
    }

    #[test]
    fn test_null_context_is_absent() {
        let result = validate(
            Some(&json!("A valid startup idea here")),
            Some(&Value::Null),
            IdeaLimit::Standard,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_context_field_types() {
        let ctx = json!({ "name": 5, "elevator": ["x"], "slides": "one" });
        let result = validate(Some(&json!("tiny")), Some(&ctx), IdeaLimit::Standard);
        assert_eq!(
            result.details,
            vec![
                IDEA_TOO_SHORT.to_string(),
                CONTEXT_NAME_NOT_STRING.to_string(),
                CONTEXT_ELEVATOR_NOT_STRING.to_string(),
                CONTEXT_SLIDES_NOT_ARRAY.to_string(),
            ]
        );
    }

    #[test]
    fn test_valid_context() {
        let ctx = json!({ "name": "Acme", "elevator": "We sell anvils.", "slides": ["<h1>A</h1>"] });
        let result = validate(Some(&json!("An anvil delivery service")), Some(&ctx), IdeaLimit::Standard);
        assert!(result.is_valid);
    }

    #[test]
    fn test_validate_idea_matches_validate() {
        let idea = "Short";
        assert_eq!(
            validate_idea(idea, IdeaLimit::Standard),
            validate(Some(&json!(idea)), None, IdeaLimit::Standard)
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(check(json!("Short"))).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["error"], IDEA_TOO_SHORT);
    }

    proptest! {
        #[test]
        fn prop_in_bounds_ideas_are_valid(idea in "[a-zA-Z0-9 ,.]{0,1990}") {
            let idea = format!("idea {}x", idea.trim());
            prop_assume!(idea.chars().count() >= MIN_IDEA_CHARS);
            let result = validate_idea(&idea, IdeaLimit::Standard);
            prop_assert!(result.is_valid, "unexpected violations: {:?}", result.details);
        }

        #[test]
        fn prop_short_ideas_are_rejected(idea in "[a-z]{1,9}", pad in " {0,5}") {
            let padded = format!("{pad}{idea}{pad}");
            let result = validate_idea(&padded, IdeaLimit::Standard);
            prop_assert!(!result.is_valid);
            prop_assert_eq!(result.error.as_deref(), Some(IDEA_TOO_SHORT));
        }

        #[test]
        fn prop_blocked_patterns_always_flagged(
            prefix in "[a-z ]{0,50}",
            pattern in prop::sample::select(vec!["<script", "javascript:", "data:text/html"]),
            upper in any::<bool>(),
        ) {
            let pattern = if upper { pattern.to_uppercase() } else { pattern.to_string() };
            let idea = format!("{prefix}{pattern}");
            let result = validate_idea(&idea, IdeaLimit::Standard);
            prop_assert!(result.details.iter().any(|d| d == IDEA_HARMFUL));
        }
    }
}
