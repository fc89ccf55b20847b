use clap::Args;
use serde::Serialize;

use versionmark::inject::{self, HtmlTag};
use versionmark::resolve;
use versionmark::{CommandResults, ShellRunner, VersionMarkConfig};

use super::{block_on, CmdResult, SourceArgs};

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include per-command results (multi-command specs only)
    #[arg(long)]
    pub results: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionOutput {
    pub html_tags: Vec<HtmlTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
    pub define: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput {
    pub command: &'static str,
    pub config: VersionMarkConfig,
    pub inject: InjectionOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<CommandResults>,
}

pub fn run(args: ResolveArgs, global: &super::GlobalArgs) -> CmdResult<ResolveOutput> {
    let options = args.source.load_options(global)?;
    let config = block_on(resolve::resolve(&ShellRunner, &options))??;

    let inject = InjectionOutput {
        html_tags: inject::html_tags(&config),
        export: inject::export_statement(&config),
        define: inject::define_entries(&config),
    };
    let results = if args.results {
        config.results.clone()
    } else {
        None
    };

    Ok((
        ResolveOutput {
            command: "resolve",
            config,
            inject,
            results,
        },
        0,
    ))
}
