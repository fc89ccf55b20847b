//! Command spec → execution plan.
//!
//! `parse` is pure: it either returns a fully validated plan or the first
//! validation error, never a partially applied plan.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::command_spec::{CommandEntry, CommandSpec, ErrorStrategy, MultiCommandSpec};
use crate::error::{Error, Result};
use crate::utils::{template, validation};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SEPARATOR: &str = "-";

/// One named command plus its execution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub alias: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_value: Option<String>,
    pub timeout_ms: u64,
}

impl CommandDescriptor {
    pub fn new(alias: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            command: command.into(),
            fallback_value: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_value = Some(fallback.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    /// Raw single-command behaviour: no formatting, the output is the version.
    pub is_single_command_mode: bool,
    pub descriptors: Vec<CommandDescriptor>,
    pub separator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_template: Option<String>,
    pub error_strategy: ErrorStrategy,
    pub parallel: bool,
}

impl ExecutionPlan {
    fn single(descriptors: Vec<CommandDescriptor>) -> Self {
        Self {
            is_single_command_mode: true,
            descriptors,
            separator: DEFAULT_SEPARATOR.to_string(),
            format_template: None,
            error_strategy: ErrorStrategy::default(),
            parallel: true,
        }
    }

    pub fn empty() -> Self {
        Self::single(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.alias.as_str())
    }
}

/// Normalize an optional command spec into a validated plan.
pub fn parse(spec: Option<&CommandSpec>) -> Result<ExecutionPlan> {
    match spec {
        None => Ok(ExecutionPlan::empty()),
        Some(CommandSpec::Single(command)) if command.is_empty() => Ok(ExecutionPlan::empty()),
        Some(CommandSpec::Single(command)) => Ok(ExecutionPlan::single(vec![
            CommandDescriptor::new("0", command.clone()),
        ])),
        Some(CommandSpec::Multi(multi)) => parse_multi(multi),
    }
}

/// Parse a raw config value (see `CommandSpec::from_value`) into a plan.
pub fn parse_value(value: Option<&Value>) -> Result<ExecutionPlan> {
    let spec = match value {
        Some(value) => CommandSpec::from_value(value)?,
        None => None,
    };
    parse(spec.as_ref())
}

fn parse_multi(multi: &MultiCommandSpec) -> Result<ExecutionPlan> {
    validation::require_non_empty_vec(
        &multi.commands,
        "commands",
        "commands array cannot be empty",
    )?;

    let descriptors = multi
        .commands
        .iter()
        .enumerate()
        .map(|(index, entry)| descriptor_from_entry(index, entry))
        .collect::<Result<Vec<_>>>()?;

    check_duplicate_aliases(&descriptors)?;

    let format_template = multi.format.clone().filter(|f| !f.is_empty());
    if let Some(format) = &format_template {
        validate_format_template(format, &descriptors)?;
    }

    let separator = multi
        .separator
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());

    Ok(ExecutionPlan {
        is_single_command_mode: false,
        descriptors,
        separator,
        format_template,
        error_strategy: multi.error_strategy.unwrap_or_default(),
        parallel: multi.parallel != Some(false),
    })
}

fn descriptor_from_entry(index: usize, entry: &CommandEntry) -> Result<CommandDescriptor> {
    match entry {
        CommandEntry::Bare(command) => {
            validation::require_non_empty(
                command,
                "cmd",
                &format!("Command at index {} must have a valid cmd", index),
            )?;
            Ok(CommandDescriptor::new(index.to_string(), command.clone()))
        }
        CommandEntry::Detailed(config) => {
            validation::require_non_empty(
                &config.alias,
                "alias",
                &format!("Command at index {} must have a valid alias", index),
            )?;
            validation::require_non_empty(
                &config.cmd,
                "cmd",
                &format!("Command at index {} must have a valid cmd", index),
            )?;

            let timeout_ms = match config.timeout {
                Some(0) => {
                    return Err(Error::config_validation(
                        Some("timeout"),
                        format!("Command at index {} timeout must be a positive number", index),
                    ))
                }
                Some(ms) => ms,
                None => DEFAULT_TIMEOUT_MS,
            };

            Ok(CommandDescriptor {
                alias: config.alias.clone(),
                command: config.cmd.clone(),
                fallback_value: config.fallback.clone(),
                timeout_ms,
            })
        }
    }
}

fn check_duplicate_aliases(descriptors: &[CommandDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for descriptor in descriptors {
        if !seen.insert(descriptor.alias.as_str()) {
            return Err(Error::config_validation(
                Some("alias"),
                format!("Duplicate command alias: {}", descriptor.alias),
            ));
        }
    }
    Ok(())
}

fn validate_format_template(format: &str, descriptors: &[CommandDescriptor]) -> Result<()> {
    let aliases: HashSet<&str> = descriptors.iter().map(|d| d.alias.as_str()).collect();

    for placeholder in template::placeholders(format) {
        if !aliases.contains(placeholder.as_str()) {
            return Err(Error::config_validation(
                Some("format"),
                format!(
                    "Format template contains undefined placeholder: {{{}}}",
                    placeholder
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_spec::CommandEntryConfig;
    use serde_json::json;

    fn parse_json(value: Value) -> Result<ExecutionPlan> {
        parse_value(Some(&value))
    }

    #[test]
    fn absent_spec_gives_empty_single_plan() {
        let plan = parse(None).unwrap();
        assert!(plan.is_single_command_mode);
        assert!(plan.is_empty());
        assert_eq!(plan.separator, "-");
        assert_eq!(plan.error_strategy, ErrorStrategy::Skip);
        assert!(plan.parallel);
    }

    #[test]
    fn empty_string_is_treated_as_absent() {
        let plan = parse(Some(&CommandSpec::from(""))).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn string_spec_gives_one_descriptor() {
        let plan = parse(Some(&CommandSpec::from("git describe --tags"))).unwrap();
        assert!(plan.is_single_command_mode);
        assert_eq!(
            plan.descriptors,
            vec![CommandDescriptor::new("0", "git describe --tags")]
        );
        assert_eq!(plan.descriptors[0].timeout_ms, 10_000);
    }

    #[test]
    fn bare_entries_get_positional_aliases() {
        let plan = parse_json(json!({ "commands": ["c1", "c2"], "separator": "_" })).unwrap();
        assert!(!plan.is_single_command_mode);
        assert_eq!(plan.aliases().collect::<Vec<_>>(), vec!["0", "1"]);
        assert_eq!(plan.separator, "_");
        assert_eq!(plan.format_template, None);
    }

    #[test]
    fn detailed_entries_keep_fallback_and_timeout() {
        let plan = parse_json(json!({
            "commands": [
                { "alias": "branch", "cmd": "git branch --show-current", "timeout": 5000 },
                { "alias": "sha", "cmd": "git rev-parse --short HEAD", "fallback": "unknown" }
            ],
            "format": "{branch}-{sha}",
            "errorStrategy": "fallback"
        }))
        .unwrap();

        assert_eq!(
            plan.descriptors,
            vec![
                CommandDescriptor::new("branch", "git branch --show-current").with_timeout(5000),
                CommandDescriptor::new("sha", "git rev-parse --short HEAD")
                    .with_fallback("unknown"),
            ]
        );
        assert_eq!(plan.format_template.as_deref(), Some("{branch}-{sha}"));
        assert_eq!(plan.error_strategy, ErrorStrategy::Fallback);
    }

    #[test]
    fn parallel_defaults_true_and_can_be_disabled() {
        assert!(parse_json(json!({ "commands": ["a"] })).unwrap().parallel);
        assert!(!parse_json(json!({ "commands": ["a"], "parallel": false })).unwrap().parallel);
    }

    #[test]
    fn empty_separator_and_format_fall_back_to_defaults() {
        let plan = parse_json(json!({ "commands": ["a"], "separator": "", "format": "" })).unwrap();
        assert_eq!(plan.separator, "-");
        assert_eq!(plan.format_template, None);
    }

    #[test]
    fn whitespace_command_is_valid() {
        let plan = parse_json(json!({ "commands": ["   "] })).unwrap();
        assert_eq!(plan.descriptors[0].command, "   ");
    }

    #[test]
    fn empty_commands_fail() {
        let err = parse_json(json!({ "commands": [] })).unwrap_err();
        assert_eq!(err.field(), Some("commands"));
        assert_eq!(err.message, "commands array cannot be empty");

        let typed = CommandSpec::Multi(MultiCommandSpec::default());
        let err = parse(Some(&typed)).unwrap_err();
        assert_eq!(err.field(), Some("commands"));
    }

    #[test]
    fn empty_alias_or_cmd_fail() {
        let err = parse_json(json!({ "commands": [{ "alias": "", "cmd": "a" }] })).unwrap_err();
        assert_eq!(err.field(), Some("alias"));

        let err = parse_json(json!({ "commands": [{ "alias": "x", "cmd": "" }] })).unwrap_err();
        assert_eq!(err.field(), Some("cmd"));
    }

    #[test]
    fn typed_zero_timeout_fails() {
        let spec = CommandSpec::Multi(MultiCommandSpec::new([CommandEntryConfig::new("a", "a")
            .timeout(0)]));
        let err = parse(Some(&spec)).unwrap_err();
        assert_eq!(err.field(), Some("timeout"));
    }

    #[test]
    fn duplicate_explicit_aliases_fail() {
        let err = parse_json(json!({
            "commands": [{ "alias": "x", "cmd": "a" }, { "alias": "x", "cmd": "b" }]
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("alias"));
        assert_eq!(err.message, "Duplicate command alias: x");
    }

    #[test]
    fn auto_alias_colliding_with_explicit_alias_fails() {
        let err = parse_json(json!({
            "commands": ["git status", { "alias": "0", "cmd": "git log" }]
        }))
        .unwrap_err();
        assert_eq!(err.message, "Duplicate command alias: 0");
    }

    #[test]
    fn unknown_placeholder_fails_at_parse_time() {
        let err = parse_json(json!({
            "commands": [{ "alias": "branch", "cmd": "a" }],
            "format": "{branch}-{sha}"
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("format"));
        assert_eq!(
            err.message,
            "Format template contains undefined placeholder: {sha}"
        );
    }

    #[test]
    fn positional_placeholders_resolve() {
        let plan = parse_json(json!({
            "commands": ["a", "b"],
            "format": "{0}+{1}"
        }))
        .unwrap();
        assert_eq!(plan.format_template.as_deref(), Some("{0}+{1}"));
    }

    #[test]
    fn plan_serializes_camel_case() {
        let plan = parse(Some(&CommandSpec::from("git rev-parse HEAD"))).unwrap();
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["isSingleCommandMode"], true);
        assert_eq!(value["errorStrategy"], "skip");
        assert_eq!(value["descriptors"][0]["timeoutMs"], 10_000);
    }
}
