use clap::Args;
use serde::Serialize;

use versionmark::parser;
use versionmark::resolve::{FULL_SHA_COMMAND, SHORT_SHA_COMMAND};
use versionmark::ExecutionPlan;

use super::{CmdResult, SourceArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub command: &'static str,
    /// Strategy that would produce the version.
    pub strategy: &'static str,
    pub plan: ExecutionPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha_command: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Validate the command spec and show what would run, without running anything.
pub fn run(args: PlanArgs, global: &super::GlobalArgs) -> CmdResult<PlanOutput> {
    let options = args.source.load_options(global)?;
    let plan = parser::parse(options.command.as_ref())?;

    let (strategy, sha_command) = if !plan.is_empty() {
        if plan.is_single_command_mode {
            ("command", None)
        } else {
            ("multiCommand", None)
        }
    } else if options.if_short_sha {
        ("shortSha", Some(SHORT_SHA_COMMAND))
    } else if options.if_git_sha {
        ("gitSha", Some(FULL_SHA_COMMAND))
    } else {
        ("static", None)
    };

    let version = if strategy == "static" {
        options.version.or_else(|| std::env::var(versionmark::resolve::ENV_PACKAGE_VERSION).ok())
    } else {
        None
    };

    Ok((
        PlanOutput {
            command: "plan",
            strategy,
            plan,
            sha_command,
            version,
        },
        0,
    ))
}
