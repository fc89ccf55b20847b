use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{emit, plan, resolve};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "versionmark")]
#[command(version = VERSION)]
#[command(about = "Resolve a build-time version string and emit it into build artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the version and print the injection config
    Resolve(resolve::ResolveArgs),
    /// Validate the command spec and print the execution plan without running it
    Plan(plan::PlanArgs),
    /// Resolve the version and write the version files
    Emit(emit::EmitArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            let err = versionmark::Error::internal_io(
                e.to_string(),
                Some("read current directory".to_string()),
            );
            let _ = output::print_json_result(Err(err));
            return std::process::ExitCode::from(1);
        }
    };
    let global = GlobalArgs { cwd };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
