//! Keyword-driven inference over idea text
//!
//! Both inferrers are ordered pattern tables scanned once, so their output
//! order is reproducible and each table can be tested on its own.

mod features;
mod tech_stack;

pub use features::{GENERIC_FEATURES, extract_features, extract_features_with};
pub use tech_stack::{BASELINE_STACK, CLOSING_STACK, infer_tech_stack};

/// Drop repeated entries, keeping the first occurrence of each
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
