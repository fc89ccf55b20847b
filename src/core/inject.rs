//! Snippets a build integration injects into its artifacts.
//!
//! Values are emitted as JSON string literals so quotes and backslashes in a
//! version or name cannot break out of the generated script.

use serde::Serialize;

use crate::resolve::VersionMarkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectTo {
    HeadPrepend,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlTag {
    pub tag: String,
    pub inject_to: InjectTo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
}

impl HtmlTag {
    fn meta(name: &str, content: &str) -> Self {
        Self {
            tag: "meta".to_string(),
            inject_to: InjectTo::HeadPrepend,
            attrs: vec![
                ("name".to_string(), name.to_string()),
                ("content".to_string(), content.to_string()),
            ],
            children: None,
        }
    }

    fn script(children: String) -> Self {
        Self {
            tag: "script".to_string(),
            inject_to: InjectTo::Body,
            attrs: Vec::new(),
            children: Some(children),
        }
    }

    /// Render as markup. `meta` is a void element.
    pub fn to_html(&self) -> String {
        let attrs: String = self
            .attrs
            .iter()
            .map(|(key, value)| format!(" {}=\"{}\"", key, escape_attr(value)))
            .collect();

        match &self.children {
            Some(children) => format!("<{tag}{attrs}>{children}</{tag}>", tag = self.tag),
            None => format!("<{}{}>", self.tag, attrs),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn js_string(value: &str) -> String {
    // serde_json output is a valid JS string literal; `</` is split so it cannot close the script.
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

fn global_name(print_name: &str) -> String {
    format!("__{}__", print_name)
}

/// Tags for the HTML entry, in injection order: meta, log script, global script.
pub fn html_tags(config: &VersionMarkConfig) -> Vec<HtmlTag> {
    let version = config.print_version.as_deref().unwrap_or_default();
    let mut tags = Vec::new();

    if config.if_meta {
        tags.push(HtmlTag::meta("application-name", &config.print_info));
    }
    if config.if_log {
        tags.push(HtmlTag::script(format!(
            "console.log({})",
            js_string(&config.print_info)
        )));
    }
    if config.if_global {
        tags.push(HtmlTag::script(format!(
            "{} = {}",
            global_name(&config.print_name),
            js_string(version)
        )));
    }

    tags
}

/// `export const NAME_VERSION = "..."`, when exports are enabled.
pub fn export_statement(config: &VersionMarkConfig) -> Option<String> {
    config.if_export.then(|| {
        format!(
            "export const {} = {}",
            config.print_name,
            js_string(config.print_version.as_deref().unwrap_or_default())
        )
    })
}

/// Compile-time define: `__NAME_VERSION__` → JSON string literal of the version.
pub fn define_entries(config: &VersionMarkConfig) -> Vec<(String, String)> {
    vec![(
        global_name(&config.print_name),
        js_string(config.print_version.as_deref().unwrap_or_default()),
    )]
}
