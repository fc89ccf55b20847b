use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use versionmark::output_files::{self, OutputFileSpec};
use versionmark::resolve;
use versionmark::{config, ShellRunner};

use super::{block_on, CmdResult, SourceArgs};

#[derive(Args)]
pub struct EmitArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory the version files are written below
    #[arg(long, value_name = "DIR")]
    pub out_dir: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitOutput {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub out_dir: String,
    pub written: Vec<String>,
}

/// Resolve, then write the file list. Without any `outputFile` setting the default file is
/// written; an explicit `outputFile: false` writes nothing.
pub fn run(args: EmitArgs, global: &super::GlobalArgs) -> CmdResult<EmitOutput> {
    let file = args.source.load_config_file(global)?;
    let output_unset = file.output_file.is_none();
    let mut options = args.source.apply(file)?;
    if output_unset {
        options.output_file = OutputFileSpec::Default;
    }

    let config = block_on(resolve::resolve(&ShellRunner, &options))??;

    let out_dir: PathBuf = global.cwd.join(config::expand_path(&args.out_dir)?);
    let written = output_files::write_all(&out_dir, &config.file_list)?;

    Ok((
        EmitOutput {
            command: "emit",
            version: config.print_version,
            out_dir: out_dir.display().to_string(),
            written: written.iter().map(|p| p.display().to_string()).collect(),
        },
        0,
    ))
}
