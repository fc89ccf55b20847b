//! Version files derived from the resolved version.
//!
//! Building the list is pure; `write_all` is the only place that touches disk and
//! only the CLI `emit` command calls it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::utils::template::{self, TemplateVars};

pub const DEFAULT_OUTPUT_PATH: &str = ".well-known/version";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub content: String,
}

impl OutputFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

pub type OutputFileGenerator = Arc<dyn Fn(&str) -> Vec<OutputFile> + Send + Sync>;

#[derive(Clone, Default)]
pub enum OutputFileSpec {
    #[default]
    Disabled,
    /// One file at `.well-known/version` holding the version.
    Default,
    /// Called with the version; may produce one or many files.
    Generator(OutputFileGenerator),
    /// Files whose path and content may use `{version}` and `{name}`.
    Templates(Vec<OutputFile>),
}

impl fmt::Debug for OutputFileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFileSpec::Disabled => f.write_str("Disabled"),
            OutputFileSpec::Default => f.write_str("Default"),
            OutputFileSpec::Generator(_) => f.write_str("Generator(..)"),
            OutputFileSpec::Templates(files) => f.debug_tuple("Templates").field(files).finish(),
        }
    }
}

impl From<bool> for OutputFileSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            OutputFileSpec::Default
        } else {
            OutputFileSpec::Disabled
        }
    }
}

impl OutputFileSpec {
    pub fn generator<F>(generate: F) -> Self
    where
        F: Fn(&str) -> Vec<OutputFile> + Send + Sync + 'static,
    {
        OutputFileSpec::Generator(Arc::new(generate))
    }

    /// Generator producing exactly one file.
    pub fn single<F>(generate: F) -> Self
    where
        F: Fn(&str) -> OutputFile + Send + Sync + 'static,
    {
        Self::generator(move |version| vec![generate(version)])
    }

    pub fn build(&self, name: &str, version: &str) -> Vec<OutputFile> {
        match self {
            OutputFileSpec::Disabled => Vec::new(),
            OutputFileSpec::Default => vec![OutputFile::new(DEFAULT_OUTPUT_PATH, version)],
            OutputFileSpec::Generator(generate) => generate(version),
            OutputFileSpec::Templates(files) => {
                let vars = [(TemplateVars::VERSION, version), (TemplateVars::NAME, name)];
                files
                    .iter()
                    .map(|file| {
                        OutputFile::new(
                            template::render(&file.path, &vars),
                            template::render(&file.content, &vars),
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Write files below `dir`, creating parent directories. Returns the written paths.
///
/// Paths must stay inside `dir`: absolute paths and `..` segments are rejected.
pub fn write_all(dir: &Path, files: &[OutputFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let relative = Path::new(&file.path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.path.is_empty() || escapes {
            return Err(Error::validation_invalid_argument(
                "outputFile",
                format!("Output path must be relative to the output directory: {}", file.path),
            ));
        }

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
            })?;
        }
        fs::write(&target, &file.content).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("write {}", target.display())))
        })?;

        log_status!("emit", "Wrote {}", target.display());
        written.push(target);
    }

    Ok(written)
}
