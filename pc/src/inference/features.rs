//! Feature extraction

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::dedup_preserving_order;

/// Returned when no feature family matches
pub const GENERIC_FEATURES: [&str; 3] = ["Core Application Logic", "User Interface", "Data Management"];

/// Keyword family -> feature label, in scan order
const FEATURE_FAMILIES: [(&str, &str); 14] = [
    (r"\b(regist\w*|sign[- ]?up|create (an )?accounts?|onboard\w*)\b", "User Registration"),
    (r"\b(log ?in|sign[- ]?in|authenticat\w*|passwords?)\b", "User Authentication"),
    (r"\b(dashboards?|profiles?)\b", "User Dashboard & Profile"),
    (r"\b(search\w*|filter\w*|lookup|discover\w*|browse|browsing)\b", "Search & Filtering"),
    (r"\b(chat\w*|messag\w*|conversations?|inbox)\b", "Real-time Chat"),
    (r"\b(payments?|pay|checkout|subscriptions?|billing|purchases?)\b", "Payment Processing"),
    (r"\b(upload\w*|shar(e|es|ed|ing)|attachments?)\b", "File Upload & Sharing"),
    (r"\b(notif\w*|alerts?|reminders?|emails?)\b", "Notifications"),
    (r"\b(admins?|administrat\w*|moderat\w*)\b", "Admin Panel"),
    (r"\b(mobile|responsive|smartphones?|tablets?)\b", "Mobile-Responsive Design"),
    (r"\b(api|apis|integrat\w*|webhooks?|third[- ]party)\b", "API Integration"),
    (r"\b(social|follow\w*|friends?|likes?|communit(y|ies))\b", "Social Features"),
    (r"\b(analytics?|reports?|reporting|metrics?|insights?|statistics?|track\w*)\b", "Analytics & Reporting"),
    (r"\b(reviews?|ratings?|rate|feedback|testimonials?)\b", "Reviews & Ratings"),
];

static FEATURE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    FEATURE_FAMILIES
        .iter()
        .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
        .collect()
});

fn matched_labels(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    FEATURE_PATTERNS
        .iter()
        .filter(|(regex, _)| regex.is_match(&lowered))
        .map(|(_, label)| label.to_string())
        .collect()
}

fn generic_features() -> Vec<String> {
    GENERIC_FEATURES.iter().map(|s| s.to_string()).collect()
}

/// Human-readable feature names for an idea, in table order
///
/// Falls back to [`GENERIC_FEATURES`] when nothing matches.
pub fn extract_features(idea: &str) -> Vec<String> {
    debug!(idea_len = idea.len(), "extract_features: called");
    extract_features_with(idea, "")
}

/// Like [`extract_features`], additionally scanning `extra_text`
///
/// Labels found in the idea come first; labels only found in the extra text
/// follow. The combined list has no duplicates.
pub fn extract_features_with(idea: &str, extra_text: &str) -> Vec<String> {
    let mut labels = matched_labels(idea);
    if !extra_text.is_empty() {
        labels.extend(matched_labels(extra_text));
    }

    let labels = dedup_preserving_order(labels);
    if labels.is_empty() {
        debug!("extract_features_with: no family matched, using generic features");
        return generic_features();
    }

    debug!(count = labels.len(), "extract_features_with: matched");
    labels
}
