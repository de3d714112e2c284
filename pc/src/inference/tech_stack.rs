//! Tech-stack inference

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::dedup_preserving_order;

/// Default stack: data store, server framework, UI framework, runtime, styling
pub const BASELINE_STACK: [&str; 5] = ["MongoDB", "Express.js", "React", "Node.js", "Tailwind CSS"];

/// Documentation and developer tooling, always appended last
pub const CLOSING_STACK: [&str; 3] = ["Swagger", "ESLint", "Jest"];

/// Keyword family -> technologies it pulls in, in scan order
const FAMILIES: [(&str, &str, &[&str]); 5] = [
    (
        "auth",
        r"\b(auth\w*|log ?in|sign[- ]?(up|in)|register\w*|registration|accounts?|passwords?)\b",
        &["JWT", "bcrypt"],
    ),
    (
        "payment",
        r"\b(payments?|pay|paid|checkout|subscriptions?|billing|stripe|purchases?)\b",
        &["Stripe"],
    ),
    (
        "realtime",
        r"\b(real[- ]?time|chat\w*|messag\w*|live|instant)\b",
        &["Socket.io"],
    ),
    (
        "upload",
        r"\b(upload\w*|images?|photos?|files?|media|videos?|attachments?)\b",
        &["Multer", "Cloudinary"],
    ),
    (
        "notification",
        r"\b(notif\w*|emails?|mail\w*|newsletters?|reminders?|alerts?)\b",
        &["Nodemailer"],
    ),
];

static FAMILY_PATTERNS: LazyLock<Vec<(&'static str, Regex, &'static [&'static str])>> = LazyLock::new(|| {
    FAMILIES
        .iter()
        .map(|(name, pattern, techs)| (*name, Regex::new(pattern).unwrap(), *techs))
        .collect()
});

/// Recommend technologies for an idea
///
/// `extra_text` (e.g. generated output) is scanned together with the idea.
/// Output is baseline, then matched families in table order, then the closing
/// set, with duplicates removed.
pub fn infer_tech_stack(idea: &str, extra_text: &str) -> Vec<String> {
    debug!(idea_len = idea.len(), extra_len = extra_text.len(), "infer_tech_stack: called");
    let haystack = format!("{} {}", idea, extra_text).to_lowercase();

    let mut stack: Vec<String> = BASELINE_STACK.iter().map(|s| s.to_string()).collect();

    for (name, regex, techs) in FAMILY_PATTERNS.iter() {
        if regex.is_match(&haystack) {
            debug!(family = %name, "infer_tech_stack: family matched");
            stack.extend(techs.iter().map(|t| t.to_string()));
        }
    }

    stack.extend(CLOSING_STACK.iter().map(|s| s.to_string()));
    dedup_preserving_order(stack)
}
