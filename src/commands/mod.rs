use clap::Args;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use versionmark::config::{self, ConfigFile};
use versionmark::{CommandSpec, VersionMarkOptions};

pub type CmdResult<T> = versionmark::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub cwd: PathBuf,
}

/// Where the version comes from. Flags override values from the config file.
#[derive(Args, Default, Debug)]
pub struct SourceArgs {
    /// Config file (default: versionmark.{json,yaml,yml,toml} in the current directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<String>,

    /// Application name (default: $npm_package_name)
    #[arg(long)]
    pub name: Option<String>,

    /// Static version (default: $npm_package_version)
    #[arg(long = "version", value_name = "VERSION")]
    pub static_version: Option<String>,

    /// Command spec: a shell command, a JSON object, @file, or - for stdin
    #[arg(long, value_name = "SPEC", allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Use the short git SHA when no command is given
    #[arg(long)]
    pub short_sha: bool,

    /// Use the full git SHA when no command is given
    #[arg(long)]
    pub git_sha: bool,
}

impl SourceArgs {
    /// Config file values with command-line overrides applied.
    pub fn load_options(&self, global: &GlobalArgs) -> versionmark::Result<VersionMarkOptions> {
        self.apply(self.load_config_file(global)?)
    }

    /// The explicit or discovered config file, before any override.
    pub fn load_config_file(&self, global: &GlobalArgs) -> versionmark::Result<ConfigFile> {
        config::load_or_discover(self.config.as_deref(), &global.cwd)
    }

    pub fn apply(&self, file: ConfigFile) -> versionmark::Result<VersionMarkOptions> {
        let mut options = file.into_options()?;

        if let Some(name) = &self.name {
            options.name = Some(name.clone());
        }
        if let Some(version) = &self.static_version {
            options.version = Some(version.clone());
        }
        if let Some(spec) = &self.command {
            options.command = parse_command_arg(spec)?;
        }
        options.if_short_sha |= self.short_sha;
        options.if_git_sha |= self.git_sha;

        Ok(options)
    }
}

// ============================================================================
// Command spec input (CLI layer)
// ============================================================================

/// A `--command` value that is a JSON object is a structured spec; anything else is one
/// shell command, quotes included.
fn parse_command_arg(spec: &str) -> versionmark::Result<Option<CommandSpec>> {
    let raw = read_spec_to_string(spec)?;

    if raw.trim_start().starts_with('{') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw.trim()) {
            return CommandSpec::from_value(&value);
        }
    }

    CommandSpec::from_value(&Value::String(raw))
}

/// Read a spec from a string, a file (@path), or stdin (-).
fn read_spec_to_string(spec: &str) -> versionmark::Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(versionmark::Error::validation_invalid_argument(
                "command",
                "Cannot read command spec from stdin when stdin is a TTY",
            ));
        }
        stdin.read_to_string(&mut buf).map_err(|e| {
            versionmark::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(versionmark::Error::validation_invalid_argument(
                "command",
                "Invalid command spec '@' (missing file path)",
            ));
        }
        let path = config::expand_path(path)?;
        return std::fs::read_to_string(Path::new(&path)).map_err(|e| {
            versionmark::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
        });
    }

    Ok(spec.to_string())
}

/// Drive an async operation on a single-threaded runtime.
pub(crate) fn block_on<F: std::future::Future>(future: F) -> versionmark::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            versionmark::Error::internal_unexpected(format!("Failed to start runtime: {}", e))
        })?;
    Ok(runtime.block_on(future))
}

pub mod emit;
pub mod plan;
pub mod resolve;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (versionmark::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Resolve(args) => dispatch!(args, global, resolve),
        crate::Commands::Plan(args) => dispatch!(args, global, plan),
        crate::Commands::Emit(args) => dispatch!(args, global, emit),
    }
}
