//! User-facing command specification.
//!
//! A command spec arrives either typed (library callers) or as raw JSON from a
//! config file. `CommandSpec::from_value` does the type-level checks for the raw
//! form so every field error names the field; `parser::parse` then turns either
//! form into one canonical `ExecutionPlan`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::validation;

/// How a failing command is reported to the formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    /// Any failure aborts the whole resolution.
    Strict,
    /// Failures contribute an empty value.
    #[default]
    Skip,
    /// Failures contribute the descriptor's fallback value, if it has one.
    Fallback,
}

impl ErrorStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStrategy::Strict => "strict",
            ErrorStrategy::Skip => "skip",
            ErrorStrategy::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ErrorStrategy::Strict),
            "skip" => Ok(ErrorStrategy::Skip),
            "fallback" => Ok(ErrorStrategy::Fallback),
            _ => Err(invalid_error_strategy()),
        }
    }
}

fn invalid_error_strategy() -> Error {
    Error::config_validation(
        Some("errorStrategy"),
        "errorStrategy must be one of: strict, skip, fallback",
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// Backward-compatible single command; its trimmed output is the version.
    Single(String),
    Multi(MultiCommandSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCommandSpec {
    pub commands: Vec<CommandEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_strategy: Option<ErrorStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandEntry {
    /// Bare command; its alias is its position in the list.
    Bare(String),
    Detailed(CommandEntryConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEntryConfig {
    pub alias: String,
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl From<&str> for CommandSpec {
    fn from(command: &str) -> Self {
        CommandSpec::Single(command.to_string())
    }
}

impl From<MultiCommandSpec> for CommandSpec {
    fn from(spec: MultiCommandSpec) -> Self {
        CommandSpec::Multi(spec)
    }
}

impl From<&str> for CommandEntry {
    fn from(command: &str) -> Self {
        CommandEntry::Bare(command.to_string())
    }
}

impl CommandEntryConfig {
    pub fn new(alias: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            cmd: cmd.into(),
            ..Self::default()
        }
    }

    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }
}

impl From<CommandEntryConfig> for CommandEntry {
    fn from(config: CommandEntryConfig) -> Self {
        CommandEntry::Detailed(config)
    }
}

impl MultiCommandSpec {
    pub fn new<I, E>(commands: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<CommandEntry>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.error_strategy = Some(strategy);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }
}

impl CommandSpec {
    /// Convert a raw config value into a typed spec.
    ///
    /// Falsy values (`null`, `false`, `0`, `""`) mean "no command". Strings are single
    /// commands. Objects must carry a truthy `commands` field. Anything else is rejected.
    pub fn from_value(value: &Value) -> Result<Option<CommandSpec>> {
        if is_falsy(value) {
            return Ok(None);
        }

        match value {
            Value::String(command) => Ok(Some(CommandSpec::Single(command.clone()))),
            Value::Object(map) if map.get("commands").is_some_and(|c| !is_falsy(c)) => {
                multi_from_map(map).map(|spec| Some(CommandSpec::Multi(spec)))
            }
            _ => Err(Error::config_validation(
                None,
                "Invalid command configuration type",
            )),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn multi_from_map(map: &Map<String, Value>) -> Result<MultiCommandSpec> {
    let raw_commands = match map.get("commands") {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(Error::config_validation(
                Some("commands"),
                "commands must be an array",
            ))
        }
    };
    validation::require_non_empty_vec(raw_commands, "commands", "commands array cannot be empty")?;

    let error_strategy = match map.get("errorStrategy") {
        Some(value) if is_falsy(value) => None,
        Some(Value::String(s)) => Some(s.parse::<ErrorStrategy>()?),
        Some(_) => return Err(invalid_error_strategy()),
        None => None,
    };

    let separator = optional_string(map, "separator")?;
    let format = optional_string(map, "format")?;

    let parallel = match map.get("parallel") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            return Err(Error::config_validation(
                Some("parallel"),
                "parallel must be a boolean",
            ))
        }
    };

    let commands = raw_commands
        .iter()
        .enumerate()
        .map(|(index, entry)| entry_from_value(index, entry))
        .collect::<Result<Vec<_>>>()?;

    Ok(MultiCommandSpec {
        commands,
        format,
        separator,
        error_strategy,
        parallel,
    })
}

fn optional_string(map: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::config_validation(
            Some(field),
            format!("{} must be a string", field),
        )),
    }
}

fn entry_from_value(index: usize, entry: &Value) -> Result<CommandEntry> {
    let map = match entry {
        Value::String(command) => return Ok(CommandEntry::Bare(command.clone())),
        Value::Object(map) => map,
        _ => {
            return Err(Error::config_validation(
                Some("commands"),
                format!("Invalid command configuration at index {}", index),
            ))
        }
    };

    let alias = match map.get("alias") {
        Some(Value::String(alias)) => alias.clone(),
        _ => {
            return Err(Error::config_validation(
                Some("alias"),
                format!("Command at index {} must have a valid alias", index),
            ))
        }
    };

    let cmd = match map.get("cmd") {
        Some(Value::String(cmd)) => cmd.clone(),
        _ => {
            return Err(Error::config_validation(
                Some("cmd"),
                format!("Command at index {} must have a valid cmd", index),
            ))
        }
    };

    let fallback = match map.get("fallback") {
        None => None,
        Some(Value::String(fallback)) => Some(fallback.clone()),
        Some(_) => {
            return Err(Error::config_validation(
                Some("fallback"),
                format!("Command at index {} fallback must be a string", index),
            ))
        }
    };

    let timeout = match map.get("timeout") {
        None => None,
        Some(value) => Some(timeout_ms(index, value)?),
    };

    Ok(CommandEntry::Detailed(CommandEntryConfig {
        alias,
        cmd,
        fallback,
        timeout,
    }))
}

fn timeout_ms(index: usize, value: &Value) -> Result<u64> {
    match value.as_f64() {
        Some(ms) if ms > 0.0 => Ok(ms.ceil() as u64),
        _ => Err(Error::config_validation(
            Some("timeout"),
            format!("Command at index {} timeout must be a positive number", index),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_mean_no_command() {
        for value in [json!(null), json!(false), json!(""), json!(0)] {
            assert_eq!(CommandSpec::from_value(&value).unwrap(), None);
        }
    }

    #[test]
    fn string_is_single_command() {
        let spec = CommandSpec::from_value(&json!("git describe --tags")).unwrap();
        assert_eq!(spec, Some(CommandSpec::from("git describe --tags")));
    }

    #[test]
    fn object_without_commands_is_rejected() {
        let err = CommandSpec::from_value(&json!({ "format": "{a}" })).unwrap_err();
        assert_eq!(err.message, "Invalid command configuration type");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn truthy_scalars_are_rejected() {
        assert!(CommandSpec::from_value(&json!(true)).is_err());
        assert!(CommandSpec::from_value(&json!(42)).is_err());
        assert!(CommandSpec::from_value(&json!(["git status"])).is_err());
    }

    #[test]
    fn commands_must_be_array() {
        let err = CommandSpec::from_value(&json!({ "commands": "git status" })).unwrap_err();
        assert_eq!(err.field(), Some("commands"));
    }

    #[test]
    fn empty_commands_array_is_reported_before_other_options() {
        let cases = [
            json!({ "commands": [] }),
            json!({ "commands": [], "errorStrategy": "bogus" }),
            json!({ "commands": [], "separator": 5 }),
        ];
        for value in cases {
            let err = CommandSpec::from_value(&value).unwrap_err();
            assert_eq!(err.field(), Some("commands"));
            assert_eq!(err.message, "commands array cannot be empty");
        }
    }

    #[test]
    fn rejects_unknown_error_strategy() {
        let err = CommandSpec::from_value(&json!({
            "commands": ["a"],
            "errorStrategy": "retry"
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("errorStrategy"));
    }

    #[test]
    fn rejects_wrongly_typed_options() {
        let cases = [
            (json!({ "commands": ["a"], "separator": 1 }), "separator"),
            (json!({ "commands": ["a"], "format": false }), "format"),
            (json!({ "commands": ["a"], "parallel": "yes" }), "parallel"),
        ];
        for (value, field) in cases {
            let err = CommandSpec::from_value(&value).unwrap_err();
            assert_eq!(err.field(), Some(field));
        }
    }

    #[test]
    fn detailed_entry_fields_are_type_checked() {
        let cases = [
            (json!({ "cmd": "a" }), "alias"),
            (json!({ "alias": 3, "cmd": "a" }), "alias"),
            (json!({ "alias": "x" }), "cmd"),
            (json!({ "alias": "x", "cmd": "a", "fallback": 1 }), "fallback"),
            (json!({ "alias": "x", "cmd": "a", "timeout": 0 }), "timeout"),
            (json!({ "alias": "x", "cmd": "a", "timeout": -5 }), "timeout"),
            (json!({ "alias": "x", "cmd": "a", "timeout": "5s" }), "timeout"),
        ];
        for (entry, field) in cases {
            let err = CommandSpec::from_value(&json!({ "commands": [entry] })).unwrap_err();
            assert_eq!(err.field(), Some(field), "entry should fail on {}", field);
        }
    }

    #[test]
    fn mixed_entries_convert() {
        let spec = CommandSpec::from_value(&json!({
            "commands": [
                "git branch --show-current",
                { "alias": "sha", "cmd": "git rev-parse --short HEAD", "fallback": "unknown", "timeout": 5000 }
            ],
            "format": "{0}-{sha}",
            "errorStrategy": "fallback",
            "parallel": false
        }))
        .unwrap();

        let expected = MultiCommandSpec::new([
            CommandEntry::from("git branch --show-current"),
            CommandEntryConfig::new("sha", "git rev-parse --short HEAD")
                .fallback("unknown")
                .timeout(5000)
                .into(),
        ])
        .format("{0}-{sha}")
        .error_strategy(ErrorStrategy::Fallback)
        .parallel(false);

        assert_eq!(spec, Some(CommandSpec::Multi(expected)));
    }

    #[test]
    fn fractional_timeout_rounds_up() {
        let spec = CommandSpec::from_value(&json!({
            "commands": [{ "alias": "a", "cmd": "a", "timeout": 0.5 }]
        }))
        .unwrap();
        let Some(CommandSpec::Multi(multi)) = spec else {
            panic!("expected multi spec");
        };
        assert_eq!(
            multi.commands[0],
            CommandEntry::Detailed(CommandEntryConfig::new("a", "a").timeout(1))
        );
    }

    #[test]
    fn typed_spec_deserializes_untagged() {
        let spec: CommandSpec = serde_json::from_value(json!({
            "commands": ["a", { "alias": "b", "cmd": "b" }],
            "separator": "_"
        }))
        .unwrap();
        assert_eq!(
            spec,
            CommandSpec::Multi(
                MultiCommandSpec::new([
                    CommandEntry::from("a"),
                    CommandEntryConfig::new("b", "b").into()
                ])
                .separator("_")
            )
        );
    }
}
