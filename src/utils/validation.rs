//! Input validation primitives.
//!
//! Small helpers that turn common shape checks into `config.validation_failed`
//! errors carrying the offending field name.

use crate::error::{Error, Result};

/// Require a string to be non-empty.
///
/// Whitespace-only strings pass: a command of `" "` is still a command.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::config_validation(Some(field), message))
    } else {
        Ok(value)
    }
}

/// Require a collection to be non-empty.
pub fn require_non_empty_vec<'a, T>(vec: &'a [T], field: &str, message: &str) -> Result<&'a [T]> {
    if vec.is_empty() {
        Err(Error::config_validation(Some(field), message))
    } else {
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_non_empty_keeps_whitespace() {
        assert_eq!(require_non_empty("  ", "cmd", "msg").unwrap(), "  ");
    }

    #[test]
    fn require_non_empty_rejects_empty() {
        assert!(require_non_empty("", "cmd", "msg").is_err());
    }

    #[test]
    fn require_non_empty_vec_rejects_empty() {
        let empty: Vec<String> = Vec::new();
        let err = require_non_empty_vec(&empty, "commands", "commands array cannot be empty")
            .unwrap_err();
        assert_eq!(err.field(), Some("commands"));
    }
}
