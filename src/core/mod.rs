// Public modules
pub mod command_spec;
pub mod config;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod inject;
pub mod output_files;
pub mod parser;
pub mod resolve;
pub mod results;

// Re-export common types for convenience
pub use command_spec::{CommandEntry, CommandEntryConfig, CommandSpec, ErrorStrategy, MultiCommandSpec};
pub use error::{Error, ErrorCode, Result};
pub use executor::{CommandRunner, ExecutionOptions, ShellRunner};
pub use output_files::{OutputFile, OutputFileSpec};
pub use parser::{CommandDescriptor, ExecutionPlan};
pub use resolve::{VersionMarkConfig, VersionMarkOptions, VersionSource};
pub use results::{CommandResult, CommandResults};
