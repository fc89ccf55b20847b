#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use versionmark::{CommandRunner, Error, Result};

/// Runner that answers from a fixed table and records every command it was asked to run.
/// Commands missing from the table fail like a missing binary.
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str, _timeout_ms: u64) -> Result<String> {
        self.calls.lock().unwrap().push(command.to_string());
        self.outputs.get(command).cloned().ok_or_else(|| {
            Error::command_failed(command, Some("command not found".to_string()), Some(127))
        })
    }
}

/// Environment lookup with nothing set.
pub fn no_env(_key: &str) -> Option<String> {
    None
}
