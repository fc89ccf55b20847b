//! Version resolution: pick the first applicable strategy and derive the print fields.
//!
//! Order is fixed: explicit command spec, short SHA, full SHA, static version.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::command_spec::CommandSpec;
use crate::error::Result;
use crate::executor::{self, CommandRunner, ExecutionOptions};
use crate::formatter;
use crate::output_files::{OutputFile, OutputFileSpec};
use crate::parser::{self, DEFAULT_TIMEOUT_MS};
use crate::results::CommandResults;

pub const SHORT_SHA_COMMAND: &str = "git rev-parse --short HEAD";
pub const FULL_SHA_COMMAND: &str = "git rev-parse HEAD";

pub const ENV_PACKAGE_NAME: &str = "npm_package_name";
pub const ENV_PACKAGE_VERSION: &str = "npm_package_version";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("non-word pattern is valid"));

/// Everything a build needs to produce one version mark.
#[derive(Debug, Clone)]
pub struct VersionMarkOptions {
    pub name: Option<String>,
    pub version: Option<String>,
    pub command: Option<CommandSpec>,
    pub if_short_sha: bool,
    pub if_git_sha: bool,
    pub if_meta: bool,
    pub if_log: bool,
    pub if_global: bool,
    pub if_export: bool,
    pub output_file: OutputFileSpec,
}

impl Default for VersionMarkOptions {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            command: None,
            if_short_sha: false,
            if_git_sha: false,
            if_meta: true,
            if_log: true,
            if_global: true,
            if_export: false,
            output_file: OutputFileSpec::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionSource {
    Command,
    MultiCommand,
    ShortSha,
    GitSha,
    Static,
}

impl VersionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSource::Command => "command",
            VersionSource::MultiCommand => "multiCommand",
            VersionSource::ShortSha => "shortSha",
            VersionSource::GitSha => "gitSha",
            VersionSource::Static => "static",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedVersion {
    pub version: Option<String>,
    pub source: VersionSource,
    /// Per-command results, only for multi-command specs.
    pub results: Option<CommandResults>,
}

/// Resolved output consumed by the injection layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMarkConfig {
    pub if_meta: bool,
    pub if_log: bool,
    pub if_global: bool,
    pub if_export: bool,
    pub print_version: Option<String>,
    pub print_name: String,
    pub print_info: String,
    pub file_list: Vec<OutputFile>,
    pub source: VersionSource,
    #[serde(skip)]
    pub results: Option<CommandResults>,
}

/// `@scope/my-package` → `_SCOPE_MY_PACKAGE_VERSION`.
pub fn print_name(name: Option<&str>) -> String {
    let name = name.unwrap_or_default();
    format!("{}_VERSION", NON_WORD.replace_all(name, "_").to_uppercase())
}

pub fn print_info(print_name: &str, print_version: Option<&str>) -> String {
    format!("{}: {}", print_name, print_version.unwrap_or_default())
}

/// Resolve only the version string. `version` must already carry any environment default.
pub async fn resolve_version(
    runner: &dyn CommandRunner,
    command: Option<&CommandSpec>,
    if_short_sha: bool,
    if_git_sha: bool,
    version: Option<&str>,
) -> Result<ResolvedVersion> {
    let plan = parser::parse(command)?;

    if !plan.is_empty() {
        if plan.is_single_command_mode {
            let descriptor = &plan.descriptors[0];
            log_status!("resolve", "Running command: {}", descriptor.command);
            let output =
                executor::run_one(runner, &descriptor.command, descriptor.timeout_ms).await?;
            return Ok(ResolvedVersion {
                version: Some(output),
                source: VersionSource::Command,
                results: None,
            });
        }

        log_status!(
            "resolve",
            "Running {} command(s) ({}, {})",
            plan.descriptors.len(),
            if plan.parallel { "parallel" } else { "serial" },
            plan.error_strategy
        );
        let results =
            executor::run_many(runner, &plan.descriptors, ExecutionOptions::from(&plan)).await?;
        let formatted = formatter::format_for_plan(&results, &plan)?;
        return Ok(ResolvedVersion {
            version: Some(formatted),
            source: VersionSource::MultiCommand,
            results: Some(results),
        });
    }

    if if_short_sha {
        log_status!("resolve", "Using short git SHA");
        let sha = executor::run_one(runner, SHORT_SHA_COMMAND, DEFAULT_TIMEOUT_MS).await?;
        return Ok(ResolvedVersion {
            version: Some(sha),
            source: VersionSource::ShortSha,
            results: None,
        });
    }

    if if_git_sha {
        log_status!("resolve", "Using full git SHA");
        let sha = executor::run_one(runner, FULL_SHA_COMMAND, DEFAULT_TIMEOUT_MS).await?;
        return Ok(ResolvedVersion {
            version: Some(sha),
            source: VersionSource::GitSha,
            results: None,
        });
    }

    Ok(ResolvedVersion {
        version: version.map(str::to_string),
        source: VersionSource::Static,
        results: None,
    })
}

/// Resolve against the process environment.
pub async fn resolve(
    runner: &dyn CommandRunner,
    options: &VersionMarkOptions,
) -> Result<VersionMarkConfig> {
    resolve_with_env(runner, options, |key| std::env::var(key).ok()).await
}

/// Resolve with an explicit environment lookup for the name/version defaults.
pub async fn resolve_with_env<F>(
    runner: &dyn CommandRunner,
    options: &VersionMarkOptions,
    env: F,
) -> Result<VersionMarkConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let name = options.name.clone().or_else(|| env(ENV_PACKAGE_NAME));
    let version = options.version.clone().or_else(|| env(ENV_PACKAGE_VERSION));

    let resolved = resolve_version(
        runner,
        options.command.as_ref(),
        options.if_short_sha,
        options.if_git_sha,
        version.as_deref(),
    )
    .await?;

    let print_name = print_name(name.as_deref());
    let print_info = print_info(&print_name, resolved.version.as_deref());
    let file_list = options.output_file.build(
        name.as_deref().unwrap_or_default(),
        resolved.version.as_deref().unwrap_or_default(),
    );

    log_status!("resolve", "{} ({})", print_info, resolved.source.as_str());

    Ok(VersionMarkConfig {
        if_meta: options.if_meta,
        if_log: options.if_log,
        if_global: options.if_global,
        if_export: options.if_export,
        print_version: resolved.version,
        print_name,
        print_info,
        file_list,
        source: resolved.source,
        results: resolved.results,
    })
}
