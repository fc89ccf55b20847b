//! Config file loading.
//!
//! Every format is parsed into a `serde_json::Value` first so JSON, YAML and TOML
//! share one schema and one set of field errors. `command` stays a raw value and is
//! checked by `CommandSpec::from_value`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command_spec::CommandSpec;
use crate::error::{Error, Result};
use crate::output_files::{OutputFile, OutputFileSpec};
use crate::resolve::VersionMarkOptions;

/// Looked up in this order by `discover`.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "versionmark.json",
    "versionmark.yaml",
    "versionmark.yml",
    "versionmark.toml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputFileSetting {
    Enabled(bool),
    Files(Vec<OutputFile>),
}

impl From<OutputFileSetting> for OutputFileSpec {
    fn from(setting: OutputFileSetting) -> Self {
        match setting {
            OutputFileSetting::Enabled(enabled) => OutputFileSpec::from(enabled),
            OutputFileSetting::Files(files) if files.is_empty() => OutputFileSpec::Disabled,
            OutputFileSetting::Files(files) => OutputFileSpec::Templates(files),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub command: Option<Value>,
    #[serde(default, rename = "ifShortSHA")]
    pub if_short_sha: Option<bool>,
    #[serde(default, rename = "ifGitSHA")]
    pub if_git_sha: Option<bool>,
    #[serde(default)]
    pub if_meta: Option<bool>,
    #[serde(default)]
    pub if_log: Option<bool>,
    #[serde(default)]
    pub if_global: Option<bool>,
    #[serde(default)]
    pub if_export: Option<bool>,
    #[serde(default)]
    pub output_file: Option<OutputFileSetting>,
}

impl ConfigFile {
    /// Convert to library options, validating the command spec shape.
    pub fn into_options(self) -> Result<VersionMarkOptions> {
        let defaults = VersionMarkOptions::default();
        let command = match &self.command {
            Some(value) => CommandSpec::from_value(value)?,
            None => None,
        };

        Ok(VersionMarkOptions {
            name: self.name,
            version: self.version,
            command,
            if_short_sha: self.if_short_sha.unwrap_or(defaults.if_short_sha),
            if_git_sha: self.if_git_sha.unwrap_or(defaults.if_git_sha),
            if_meta: self.if_meta.unwrap_or(defaults.if_meta),
            if_log: self.if_log.unwrap_or(defaults.if_log),
            if_global: self.if_global.unwrap_or(defaults.if_global),
            if_export: self.if_export.unwrap_or(defaults.if_export),
            output_file: self.output_file.map(Into::into).unwrap_or(defaults.output_file),
        })
    }
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    shellexpand::full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| Error::validation_invalid_argument("config", e.to_string()))
}

/// First known config file name present in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

pub fn parse_str(content: &str, path: &Path) -> Result<ConfigFile> {
    let display = path.display().to_string();
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        Error::validation_invalid_argument(
            "config",
            format!("Unsupported config file extension: {}", display),
        )
    })?;

    let value: Value = match format {
        ConfigFormat::Json => parse_as(&display, || serde_json::from_str(content))?,
        ConfigFormat::Yaml => parse_as(&display, || serde_yml::from_str(content))?,
        ConfigFormat::Toml => parse_as(&display, || toml::from_str(content))?,
    };

    // An empty YAML document parses to null.
    if value.is_null() {
        return Ok(ConfigFile::default());
    }

    parse_as(&display, || serde_json::from_value(value))
}

fn parse_as<T, E, F>(path: &str, parse: F) -> Result<T>
where
    T: DeserializeOwned,
    E: std::fmt::Display,
    F: FnOnce() -> std::result::Result<T, E>,
{
    parse().map_err(|e| Error::config_parse_failed(path, e.to_string()))
}

pub fn load(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;
    let config = parse_str(&content, path)?;
    log_status!("config", "Loaded {}", path.display());
    Ok(config)
}

/// Load an explicit path (expanded), or discover one in `dir`. No file → defaults.
pub fn load_or_discover(explicit: Option<&str>, dir: &Path) -> Result<ConfigFile> {
    match explicit {
        Some(path) => load(&expand_path(path)?),
        None => match discover(dir) {
            Some(path) => load(&path),
            None => Ok(ConfigFile::default()),
        },
    }
}
