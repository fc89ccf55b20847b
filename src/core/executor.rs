//! Command execution.
//!
//! `CommandRunner` is the only OS boundary: one shell command in, trimmed stdout
//! or an error out. Everything above it (parallel vs serial dispatch, error
//! strategies, strict aggregation) lives in `run_many` and is tested against a
//! scripted runner.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::command_spec::ErrorStrategy;
use crate::error::{Error, Result};
use crate::parser::{CommandDescriptor, ExecutionPlan};
use crate::results::{CommandResult, CommandResults};
use crate::utils::shell;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in a shell and return its trimmed stdout.
    ///
    /// Fails with `command.timeout` if the command has not exited after `timeout_ms`
    /// (the process is killed), or `command.failed` on spawn errors and non-zero exits.
    async fn run(&self, command: &str, timeout_ms: u64) -> Result<String>;
}

/// Runs commands through the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, timeout_ms: u64) -> Result<String> {
        let mut child = shell::shell_command(command).spawn().map_err(|e| {
            Error::command_failed(command, Some(format!("Failed to spawn: {}", e)), None)
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let settled = {
            let collect = async {
                tokio::join!(
                    read_pipe(stdout_pipe),
                    read_pipe(stderr_pipe),
                    child.wait()
                )
            };
            tokio::time::timeout(Duration::from_millis(timeout_ms), collect).await
        };

        let (stdout, stderr, status) = match settled {
            Ok(outputs) => outputs,
            Err(_) => {
                log_status!("exec", "Timed out after {}ms, killing: {}", timeout_ms, command);
                let _ = child.kill().await;
                return Err(Error::command_timeout(command, timeout_ms));
            }
        };

        let status = status.map_err(|e| Error::command_failed(command, Some(e.to_string()), None))?;
        let stdout = stdout.map_err(|e| Error::command_failed(command, Some(e.to_string()), None))?;
        let stderr = stderr.unwrap_or_default();

        if !status.success() {
            return Err(Error::command_failed(
                command,
                Some(shell::error_text(&stdout, &stderr)).filter(|text| !text.is_empty()),
                status.code(),
            ));
        }

        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub error_strategy: ErrorStrategy,
    pub parallel: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            error_strategy: ErrorStrategy::Skip,
            parallel: true,
        }
    }
}

impl From<&ExecutionPlan> for ExecutionOptions {
    fn from(plan: &ExecutionPlan) -> Self {
        Self {
            error_strategy: plan.error_strategy,
            parallel: plan.parallel,
        }
    }
}

/// Run a single command with no error strategy; failures propagate as-is.
pub async fn run_one(runner: &dyn CommandRunner, command: &str, timeout_ms: u64) -> Result<String> {
    runner.run(command, timeout_ms).await
}

/// Run every descriptor and collect results keyed by alias, in descriptor order.
///
/// Parallel mode dispatches everything at once on the current task; a hanging command
/// only costs its own timeout. Serial mode runs in order and, under `strict`, stops at
/// the first failure with that command's error. Under `strict` any remaining failure
/// aborts with an aggregate error once all commands have settled.
pub async fn run_many(
    runner: &dyn CommandRunner,
    descriptors: &[CommandDescriptor],
    options: ExecutionOptions,
) -> Result<CommandResults> {
    let mut results = CommandResults::new();
    if descriptors.is_empty() {
        return Ok(results);
    }

    let strict = options.error_strategy == ErrorStrategy::Strict;

    if options.parallel {
        let settled = join_all(
            descriptors
                .iter()
                .map(|descriptor| execute_descriptor(runner, descriptor)),
        )
        .await;

        for (descriptor, result) in descriptors.iter().zip(settled) {
            results.insert(apply_error_strategy(result, descriptor, options.error_strategy));
        }
    } else {
        for descriptor in descriptors {
            let result = execute_descriptor(runner, descriptor).await;

            if strict && !result.success {
                return Err(result
                    .error
                    .unwrap_or_else(|| Error::command_failed(&descriptor.command, None, None)));
            }

            results.insert(apply_error_strategy(result, descriptor, options.error_strategy));
        }
    }

    if strict {
        let failed: Vec<String> = results.failed().map(|r| r.command.clone()).collect();
        if !failed.is_empty() {
            return Err(Error::command_strict_failure(&failed));
        }
    }

    Ok(results)
}

async fn execute_descriptor(
    runner: &dyn CommandRunner,
    descriptor: &CommandDescriptor,
) -> CommandResult {
    let started = Instant::now();
    let outcome = runner.run(&descriptor.command, descriptor.timeout_ms).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(output) => CommandResult::succeeded(
            &descriptor.alias,
            &descriptor.command,
            output,
            duration_ms,
        ),
        Err(err) => {
            log_status!("exec", "[{}] {}", descriptor.alias, err);
            CommandResult::failed(&descriptor.alias, &descriptor.command, err, duration_ms)
        }
    }
}

fn apply_error_strategy(
    result: CommandResult,
    descriptor: &CommandDescriptor,
    strategy: ErrorStrategy,
) -> CommandResult {
    if result.success {
        return result;
    }

    match strategy {
        ErrorStrategy::Fallback => match &descriptor.fallback_value {
            Some(fallback) => CommandResult {
                output: Some(fallback.clone()),
                error: None,
                success: true,
                ..result
            },
            None => CommandResult {
                output: Some(String::new()),
                ..result
            },
        },
        ErrorStrategy::Skip => CommandResult {
            output: Some(String::new()),
            ..result
        },
        ErrorStrategy::Strict => result,
    }
}
