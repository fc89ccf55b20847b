//! Per-command outcomes and the insertion-ordered container that holds them.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::error::Error;

/// Outcome of one descriptor. Built once by the executor, read once by the formatter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub alias: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error_message"
    )]
    pub error: Option<Error>,
    pub duration_ms: u64,
    pub success: bool,
}

fn serialize_error_message<S: Serializer>(
    error: &Option<Error>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_str(&err.message),
        None => serializer.serialize_none(),
    }
}

impl CommandResult {
    pub fn succeeded(
        alias: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            alias: alias.into(),
            command: command.into(),
            output: Some(output.into()),
            error: None,
            duration_ms,
            success: true,
        }
    }

    pub fn failed(
        alias: impl Into<String>,
        command: impl Into<String>,
        error: Error,
        duration_ms: u64,
    ) -> Self {
        Self {
            alias: alias.into(),
            command: command.into(),
            output: None,
            error: Some(error),
            duration_ms,
            success: false,
        }
    }

    /// Output if present and non-empty.
    pub fn value(&self) -> Option<&str> {
        self.output.as_deref().filter(|output| !output.is_empty())
    }
}

/// Results keyed by alias, iterated in insertion order.
///
/// Iteration order is the order results were inserted, which the executor keeps
/// equal to descriptor order. Default-separator formatting depends on it.
#[derive(Debug, Clone, Default)]
pub struct CommandResults {
    entries: Vec<CommandResult>,
    index: HashMap<String, usize>,
}

impl CommandResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result. A result with an alias already present replaces it in place.
    pub fn insert(&mut self, result: CommandResult) {
        match self.index.get(&result.alias) {
            Some(&position) => self.entries[position] = result,
            None => {
                self.index.insert(result.alias.clone(), self.entries.len());
                self.entries.push(result);
            }
        }
    }

    pub fn get(&self, alias: &str) -> Option<&CommandResult> {
        self.index.get(alias).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.index.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandResult> {
        self.entries.iter()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.alias.as_str())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CommandResult> {
        self.entries.iter().filter(|r| !r.success)
    }
}

impl FromIterator<CommandResult> for CommandResults {
    fn from_iter<I: IntoIterator<Item = CommandResult>>(iter: I) -> Self {
        let mut results = CommandResults::new();
        for result in iter {
            results.insert(result);
        }
        results
    }
}

impl<'a> IntoIterator for &'a CommandResults {
    type Item = &'a CommandResult;
    type IntoIter = std::slice::Iter<'a, CommandResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for CommandResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}
