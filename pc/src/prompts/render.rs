//! Template Renderer
//!
//! Builds the scaffolding documents used when remote generation is unavailable
//! or its output can't be used, plus the user prompt sent to the remote
//! service. Every public function here is total: a template that fails to
//! render degrades to a plain built-in document rather than an error.

use serde::Serialize;
use tracing::{debug, warn};

use super::PromptLoader;
use crate::domain::{PitchContext, default_file_structure, render_tree};
use crate::parser::truncate_chars;

/// Word ceiling for the condensed document
pub const QUICK_MAX_WORDS: usize = 800;

/// Feature count range for the condensed document
pub const QUICK_FEATURE_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Everything a scaffolding document is built from
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldInput<'a> {
    pub idea: &'a str,
    pub context: Option<&'a PitchContext>,
    pub tech_stack: &'a [String],
    pub features: &'a [String],
    pub summary: &'a str,
}

/// What a technology adds to models, endpoints, dependencies and env vars
struct StackAddon {
    tech: &'static str,
    models: &'static [&'static str],
    endpoints: &'static [&'static str],
    backend: &'static [&'static str],
    frontend: &'static [&'static str],
    env: &'static [&'static str],
}

const BASE_BACKEND_DEPS: &[&str] = &["express", "mongoose", "cors", "helmet", "dotenv", "express-rate-limit"];
const BASE_FRONTEND_DEPS: &[&str] = &["react", "react-dom", "react-router-dom", "axios", "tailwindcss"];
const BASE_DEV_DEPS: &[&str] = &["nodemon", "eslint", "jest", "supertest"];
const BASE_ENV: &[&str] = &["PORT", "NODE_ENV", "MONGODB_URI", "CLIENT_URL"];
const BASE_ENDPOINTS: &[&str] = &[
    "GET /api/health - service health check",
    "GET /api/items - list items (paginated)",
    "POST /api/items - create an item",
    "GET /api/items/:id - fetch one item",
    "PUT /api/items/:id - update an item",
    "DELETE /api/items/:id - delete an item",
];

const STACK_ADDONS: &[StackAddon] = &[
    StackAddon {
        tech: "JWT",
        models: &["User: name, email (unique), passwordHash, role, createdAt"],
        endpoints: &[
            "POST /api/auth/register - create an account",
            "POST /api/auth/login - exchange credentials for a token",
            "GET /api/auth/me - current user profile",
        ],
        backend: &["jsonwebtoken"],
        frontend: &[],
        env: &["JWT_SECRET", "JWT_EXPIRES_IN"],
    },
    StackAddon {
        tech: "bcrypt",
        models: &[],
        endpoints: &[],
        backend: &["bcryptjs"],
        frontend: &[],
        env: &[],
    },
    StackAddon {
        tech: "Stripe",
        models: &["Payment: user, amount, currency, status, stripePaymentIntentId, createdAt"],
        endpoints: &[
            "POST /api/payments/intent - create a payment intent",
            "POST /api/payments/webhook - receive Stripe events",
        ],
        backend: &["stripe"],
        frontend: &["@stripe/stripe-js", "@stripe/react-stripe-js"],
        env: &["STRIPE_SECRET_KEY", "STRIPE_WEBHOOK_SECRET", "STRIPE_PUBLISHABLE_KEY"],
    },
    StackAddon {
        tech: "Socket.io",
        models: &["Message: sender, room, body, readAt, createdAt"],
        endpoints: &["GET /api/messages/:room - message history", "WS message:send / message:new - live messaging"],
        backend: &["socket.io"],
        frontend: &["socket.io-client"],
        env: &[],
    },
    StackAddon {
        tech: "Multer",
        models: &["File: owner, url, publicId, mimeType, size, createdAt"],
        endpoints: &["POST /api/uploads - upload a file", "DELETE /api/uploads/:id - remove a file"],
        backend: &["multer"],
        frontend: &[],
        env: &[],
    },
    StackAddon {
        tech: "Cloudinary",
        models: &[],
        endpoints: &[],
        backend: &["cloudinary"],
        frontend: &[],
        env: &["CLOUDINARY_CLOUD_NAME", "CLOUDINARY_API_KEY", "CLOUDINARY_API_SECRET"],
    },
    StackAddon {
        tech: "Nodemailer",
        models: &["Notification: user, type, message, read, createdAt"],
        endpoints: &[
            "GET /api/notifications - list notifications",
            "PATCH /api/notifications/:id/read - mark as read",
        ],
        backend: &["nodemailer"],
        frontend: &[],
        env: &["SMTP_HOST", "SMTP_PORT", "SMTP_USER", "SMTP_PASS"],
    },
    StackAddon {
        tech: "Swagger",
        models: &[],
        endpoints: &[],
        backend: &["swagger-ui-express", "swagger-jsdoc"],
        frontend: &[],
        env: &[],
    },
];

/// Handlebars context for `scaffold` and `scaffold-quick`
#[derive(Debug, Clone, Serialize)]
struct ScaffoldContext {
    idea: String,
    project_name: String,
    elevator: Option<String>,
    summary: String,
    features: Vec<String>,
    tech_stack: Vec<String>,
    stack_line: String,
    file_tree: String,
    models: Vec<String>,
    endpoints: Vec<String>,
    env_vars: Vec<String>,
    env_line: String,
    backend_line: String,
    frontend_line: String,
    dev_line: String,
    has_auth: bool,
    has_payments: bool,
    has_realtime: bool,
    has_uploads: bool,
}

impl ScaffoldContext {
    fn build(input: &ScaffoldInput<'_>, features: Vec<String>) -> Self {
        let addons: Vec<&StackAddon> = STACK_ADDONS
            .iter()
            .filter(|addon| input.tech_stack.iter().any(|t| t == addon.tech))
            .collect();
        debug!(addons = addons.len(), "ScaffoldContext::build: matched stack addons");

        let has = |tech: &str| input.tech_stack.iter().any(|t| t == tech);

        let mut models: Vec<String> = addons.iter().flat_map(|a| a.models).map(|s| s.to_string()).collect();
        models.push("Item: owner, title, description, status, createdAt, updatedAt".to_string());

        let endpoints = collect(BASE_ENDPOINTS, addons.iter().map(|a| a.endpoints));
        let env_vars = collect(BASE_ENV, addons.iter().map(|a| a.env));
        let backend = collect(BASE_BACKEND_DEPS, addons.iter().map(|a| a.backend));
        let frontend = collect(BASE_FRONTEND_DEPS, addons.iter().map(|a| a.frontend));

        Self {
            idea: input.idea.trim().to_string(),
            project_name: project_name(input),
            elevator: input.context.and_then(PitchContext::elevator).map(str::to_string),
            summary: input.summary.to_string(),
            stack_line: input.tech_stack.join(", "),
            tech_stack: input.tech_stack.to_vec(),
            features,
            file_tree: render_tree(&default_file_structure()),
            models,
            endpoints,
            env_line: env_vars.join(", "),
            env_vars,
            backend_line: backend.join(", "),
            frontend_line: frontend.join(", "),
            dev_line: BASE_DEV_DEPS.join(", "),
            has_auth: has("JWT"),
            has_payments: has("Stripe"),
            has_realtime: has("Socket.io"),
            has_uploads: has("Multer") || has("Cloudinary"),
        }
    }
}

fn collect<'a>(base: &[&str], extra: impl Iterator<Item = &'a [&'static str]>) -> Vec<String> {
    let mut out: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    for item in extra.flatten() {
        if !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn project_name(input: &ScaffoldInput<'_>) -> String {
    match input.context.and_then(PitchContext::name) {
        Some(name) => name.to_string(),
        None => "the application".to_string(),
    }
}

/// Render the full scaffolding document
pub fn render_scaffold(loader: &PromptLoader, input: &ScaffoldInput<'_>) -> String {
    debug!(
        idea_len = input.idea.len(),
        stack = input.tech_stack.len(),
        features = input.features.len(),
        "render_scaffold: called"
    );
    let ctx = ScaffoldContext::build(input, input.features.to_vec());

    match loader.render("scaffold", &ctx) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Scaffold template failed, using built-in document: {}", e);
            minimal_document(&ctx)
        }
    }
}

/// Render the condensed scaffolding document for quick requests
///
/// Features are padded from the generic list or cut to fit
/// [`QUICK_FEATURE_RANGE`], and the result is capped at [`QUICK_MAX_WORDS`].
pub fn render_quick_scaffold(loader: &PromptLoader, input: &ScaffoldInput<'_>) -> String {
    debug!(idea_len = input.idea.len(), "render_quick_scaffold: called");
    let ctx = ScaffoldContext::build(input, quick_features(input.features));

    let doc = match loader.render("scaffold-quick", &ctx) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Quick scaffold template failed, using built-in document: {}", e);
            minimal_document(&ctx)
        }
    };
    cap_words(&doc, QUICK_MAX_WORDS)
}

fn quick_features(features: &[String]) -> Vec<String> {
    let mut out: Vec<String> = features.iter().take(*QUICK_FEATURE_RANGE.end()).cloned().collect();
    for generic in crate::inference::GENERIC_FEATURES {
        if out.len() >= *QUICK_FEATURE_RANGE.start() {
            break;
        }
        if !out.iter().any(|f| f == generic) {
            out.push(generic.to_string());
        }
    }
    out
}

/// Keep at most `max_words` words, preserving the line structure of what remains
pub fn cap_words(text: &str, max_words: usize) -> String {
    let total = text.split_whitespace().count();
    if total <= max_words {
        return text.to_string();
    }
    debug!(total, max_words, "cap_words: truncating");

    let mut out = String::new();
    let mut seen = 0;
    for line in text.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if seen + words.len() > max_words {
            let remaining = max_words - seen;
            if remaining > 0 {
                out.push_str(&words[..remaining].join(" "));
            } else {
                // Cap hit on a line break: the ellipsis joins the last kept word
                out.truncate(out.trim_end().len());
            }
            out.push_str("...\n");
            break;
        }
        seen += words.len();
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn minimal_document(ctx: &ScaffoldContext) -> String {
    let bullets = |items: &[String]| items.iter().map(|i| format!("- {}\n", i)).collect::<String>();
    format!(
        "# Build {}\n\n{}\n\nIdea: {}\n\n## Features\n{}\n## Tech Stack\n{}\n## File Structure\n{}\n## Environment\n{}\n",
        ctx.project_name,
        ctx.summary,
        ctx.idea,
        bullets(&ctx.features),
        bullets(&ctx.tech_stack),
        ctx.file_tree,
        ctx.env_line,
    )
}

#[derive(Debug, Serialize)]
struct SlideExcerpt {
    number: usize,
    text: String,
}

#[derive(Debug, Serialize)]
struct UserPromptContext<'a> {
    idea: &'a str,
    name: Option<&'a str>,
    elevator: Option<&'a str>,
    slides: Vec<SlideExcerpt>,
}

/// Build the user prompt for a code-prompt request
///
/// Slide markup is reduced to at most `excerpt_chars` characters of text each.
pub fn code_user_prompt(
    loader: &PromptLoader,
    idea: &str,
    context: Option<&PitchContext>,
    excerpt_chars: usize,
) -> String {
    debug!(idea_len = idea.len(), has_context = context.is_some(), "code_user_prompt: called");
    let slides = context
        .map(|ctx| ctx.slide_markup())
        .unwrap_or_default()
        .into_iter()
        .map(|markup| slide_excerpt(markup, excerpt_chars))
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(i, text)| SlideExcerpt { number: i + 1, text })
        .collect();

    let ctx = UserPromptContext {
        idea: idea.trim(),
        name: context.and_then(PitchContext::name),
        elevator: context.and_then(PitchContext::elevator),
        slides,
    };

    loader.render("code-user", &ctx).unwrap_or_else(|e| {
        warn!("User prompt template failed: {}", e);
        format!("Startup idea: {}\n\nWrite the scaffolding prompt for this application.", ctx.idea)
    })
}

/// Plain text of a slide's markup, cut to `max_chars` characters
pub fn slide_excerpt(markup: &str, max_chars: usize) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > max_chars {
        collapsed.chars().take(max_chars).collect()
    } else {
        collapsed
    }
}

/// Shorten an idea for log lines
pub fn idea_preview(idea: &str) -> String {
    truncate_chars(idea.trim(), 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{extract_features, infer_tech_stack};
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn render_for(idea: &str, context: Option<&PitchContext>) -> String {
        let stack = infer_tech_stack(idea, "");
        let features = extract_features(idea);
        let input = ScaffoldInput {
            idea,
            context,
            tech_stack: &stack,
            features: &features,
            summary: "A summary.",
        };
        render_scaffold(&PromptLoader::embedded_only(), &input)
    }

    #[test]
    fn test_scaffold_includes_inputs() {
        let doc = render_for("A marketplace with payment and login for renting camping gear", None);
        assert!(doc.contains("A marketplace with payment and login"));
        assert!(doc.contains("- Payment Processing"));
        assert!(doc.contains("- Stripe"));
        assert!(doc.contains("STRIPE_SECRET_KEY="));
        assert!(doc.contains("JWT_SECRET="));
        assert!(doc.contains("jsonwebtoken"));
        assert!(doc.contains("project-root/"));
        assert!(doc.contains("Build the application"));
    }

    #[test]
    fn test_scaffold_without_auth_uses_pass_through() {
        let doc = render_for("A recipe catalogue for home cooks and bakers", None);
        assert!(doc.contains("No user accounts are required"));
        assert!(!doc.contains("JWT_SECRET"));
    }

    #[test]
    fn test_scaffold_uses_pitch_context() {
        let ctx = PitchContext {
            name: Some("CampShare".to_string()),
            elevator: Some("Airbnb for tents.".to_string()),
            slides: None,
        };
        let doc = render_for("A marketplace for renting camping gear", Some(&ctx));
        assert!(doc.starts_with("# Build CampShare"));
        assert!(doc.contains("**Elevator pitch:** Airbnb for tents."));
    }

    #[test]
    fn test_quick_scaffold_pads_features() {
        let stack = strings(&["MongoDB", "React"]);
        let features = strings(&["Search & Filtering"]);
        let input = ScaffoldInput {
            idea: "A quick searchable directory of plant nurseries",
            context: None,
            tech_stack: &stack,
            features: &features,
            summary: "Plant nurseries directory.",
        };

        let doc = render_quick_scaffold(&PromptLoader::embedded_only(), &input);
        assert!(doc.contains("- Search & Filtering"));
        assert!(doc.contains("- Core Application Logic"));
        assert!(doc.contains("- User Interface"));
        assert!(!doc.contains("- Data Management"));
        assert!(doc.split_whitespace().count() <= QUICK_MAX_WORDS);
    }

    #[test]
    fn test_quick_features_cuts_to_five() {
        let features = strings(&["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(quick_features(&features), strings(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn test_cap_words() {
        assert_eq!(cap_words("one two\nthree", 10), "one two\nthree");
        assert_eq!(cap_words("one two\nthree four five", 3), "one two\nthree...\n");
    }

    #[test]
    fn test_cap_words_on_line_break() {
        let capped = cap_words("one two\nthree four", 2);
        assert_eq!(capped, "one two...\n");
        assert_eq!(capped.split_whitespace().count(), 2);
    }

    #[test]
    fn test_slide_excerpt_strips_and_decodes() {
        let html = r#"<div style="color: white"><h2>The&nbsp;Problem</h2>
            <p>Tents &amp; stoves sit   unused &lt;90% of the year&gt;</p></div>"#;
        assert_eq!(
            slide_excerpt(html, 200),
            "The Problem Tents & stoves sit unused <90% of the year>"
        );
        assert_eq!(slide_excerpt(html, 11), "The Problem");
        assert_eq!(slide_excerpt("<br/>", 200), "");
    }

    #[test]
    fn test_code_user_prompt_with_context() {
        let ctx = PitchContext {
            name: Some("CampShare".to_string()),
            elevator: Some("Airbnb for tents.".to_string()),
            slides: Some(vec![
                serde_json::json!("<h1>Problem</h1><p>Gear is expensive</p>"),
                serde_json::json!("<div></div>"),
                serde_json::json!({ "html": "<h1>Solution</h1>" }),
            ]),
        };
        let prompt = code_user_prompt(&PromptLoader::embedded_only(), "  Rent camping gear  ", Some(&ctx), 200);
        assert!(prompt.contains("Startup idea: Rent camping gear"));
        assert!(prompt.contains("Company name: CampShare"));
        assert!(prompt.contains("Elevator pitch: Airbnb for tents."));
        assert!(prompt.contains("- Slide 1: Problem Gear is expensive"));
        assert!(prompt.contains("- Slide 2: Solution"));
        assert!(!prompt.contains("Slide 3"));
    }

    #[test]
    fn test_code_user_prompt_without_context() {
        let prompt = code_user_prompt(&PromptLoader::embedded_only(), "Rent camping gear", None, 200);
        assert!(prompt.contains("Startup idea: Rent camping gear"));
        assert!(!prompt.contains("Company name"));
        assert!(!prompt.contains("Pitch slides"));
    }

    proptest! {
        #[test]
        fn prop_scaffold_is_deterministic(idea in "[a-zA-Z ,.]{10,200}") {
            let first = render_for(&idea, None);
            let second = render_for(&idea, None);
            prop_assert!(!first.is_empty());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_scaffold_total_for_any_text(idea in "\\PC{0,300}", name in proptest::option::of("\\PC{0,40}")) {
            let ctx = PitchContext { name, elevator: None, slides: None };
            let doc = render_for(&idea, Some(&ctx));
            prop_assert!(doc.contains("Project Overview"));
        }

        #[test]
        fn prop_slide_excerpt_respects_limit(markup in "\\PC{0,400}", max in 0usize..250) {
            prop_assert!(slide_excerpt(&markup, max).chars().count() <= max);
        }
    }
}
