use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigValidation,
    ConfigParseFailed,

    ValidationInvalidArgument,

    CommandFailed,
    CommandTimeout,
    CommandStrictFailure,

    FormatUndefinedPlaceholder,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigValidation => "config.validation_failed",
            ErrorCode::ConfigParseFailed => "config.parse_failed",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::CommandFailed => "command.failed",
            ErrorCode::CommandTimeout => "command.timeout",
            ErrorCode::CommandStrictFailure => "command.strict_failure",

            ErrorCode::FormatUndefinedPlaceholder => "format.undefined_placeholder",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValidationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParseDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandTimeoutDetails {
    pub command: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrictFailureDetails {
    pub command: String,
    pub failed_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatErrorDetails {
    pub template: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    /// Malformed or inconsistent command specification.
    ///
    /// The problem text doubles as the error message so it reads well when
    /// surfaced directly by a build tool.
    pub fn config_validation(field: Option<&str>, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        let details = to_details(ConfigValidationDetails {
            field: field.map(str::to_string),
            problem: problem.clone(),
        });

        Self::new(ErrorCode::ConfigValidation, problem, details)
    }

    pub fn config_parse_failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        let path = path.into();
        let details = to_details(ConfigParseDetails {
            path: path.clone(),
            error: error.into(),
        });

        Self::new(
            ErrorCode::ConfigParseFailed,
            format!("Failed to parse configuration file {}", path),
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn command_failed(
        command: impl Into<String>,
        cause: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        let command = command.into();
        let details = to_details(CommandFailedDetails {
            command: command.clone(),
            cause,
            exit_code,
        });

        Self::new(
            ErrorCode::CommandFailed,
            format!("Command failed: {}", command),
            details,
        )
    }

    pub fn command_timeout(command: impl Into<String>, timeout_ms: u64) -> Self {
        let command = command.into();
        let details = to_details(CommandTimeoutDetails {
            command: command.clone(),
            timeout_ms,
        });

        Self::new(
            ErrorCode::CommandTimeout,
            format!("Command timeout after {}ms: {}", timeout_ms, command),
            details,
        )
        .with_hint("Raise the command's timeout if it is expected to be slow")
    }

    /// Aggregate failure raised after a strict run; `commands` lists every failed command.
    pub fn command_strict_failure(commands: &[String]) -> Self {
        let details = to_details(StrictFailureDetails {
            command: commands.join(", "),
            failed_count: commands.len(),
        });

        Self::new(
            ErrorCode::CommandStrictFailure,
            format!("{} command(s) failed in strict mode", commands.len()),
            details,
        )
        .with_hint("Use errorStrategy 'skip' or 'fallback' to tolerate failing commands")
    }

    pub fn format_undefined_placeholder(template: impl Into<String>, missing: Vec<String>) -> Self {
        let message = format!(
            "Template contains undefined placeholders: {}",
            missing.join(", ")
        );
        let details = to_details(FormatErrorDetails {
            template: template.into(),
            missing,
        });

        Self::new(ErrorCode::FormatUndefinedPlaceholder, message, details)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Offending configuration field, when the error names one.
    pub fn field(&self) -> Option<&str> {
        self.details.get("field").and_then(Value::as_str)
    }

    /// Command text carried by command execution errors.
    pub fn command(&self) -> Option<&str> {
        self.details.get("command").and_then(Value::as_str)
    }

    pub fn template(&self) -> Option<&str> {
        self.details.get("template").and_then(Value::as_str)
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::CommandTimeout
    }
}
