//! Single-brace `{key}` template helpers.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern is valid"));

pub struct TemplateVars;

impl TemplateVars {
    pub const VERSION: &'static str = "version";
    pub const NAME: &'static str = "name";
}

/// Placeholder names in order of appearance. Repeats are kept.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace every `{key}` using `lookup`. Keys the lookup does not know are left untouched.
pub fn render_with<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    render_with(template, |key| {
        variables
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    })
}
