//! Combine command results into one version string.

use crate::error::{Error, Result};
use crate::parser::ExecutionPlan;
use crate::results::CommandResults;
use crate::utils::template;

/// Format results either through `template` (`{alias}` placeholders) or by joining
/// the non-empty outputs with `separator`, in insertion order.
///
/// Placeholders are checked again here even though the parser already validated
/// them, so a hand-built result set cannot silently render a literal `{alias}`.
pub fn format(results: &CommandResults, template: Option<&str>, separator: &str) -> Result<String> {
    if results.is_empty() {
        return Ok(String::new());
    }

    match template.filter(|t| !t.is_empty()) {
        Some(template) => format_with_template(results, template),
        None => Ok(format_with_separator(results, separator)),
    }
}

/// Format using the plan's template and separator.
pub fn format_for_plan(results: &CommandResults, plan: &ExecutionPlan) -> Result<String> {
    format(results, plan.format_template.as_deref(), &plan.separator)
}

fn format_with_template(results: &CommandResults, template: &str) -> Result<String> {
    let mut missing: Vec<String> = Vec::new();
    for alias in template::placeholders(template) {
        if !results.contains(&alias) && !missing.contains(&alias) {
            missing.push(alias);
        }
    }

    if !missing.is_empty() {
        return Err(Error::format_undefined_placeholder(template, missing));
    }

    Ok(template::render_with(template, |alias| {
        results
            .get(alias)
            .map(|result| result.output.clone().unwrap_or_default())
    }))
}

fn format_with_separator(results: &CommandResults, separator: &str) -> String {
    results
        .iter()
        .filter_map(|result| result.value())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::results::CommandResult;

    fn ok(alias: &str, output: &str) -> CommandResult {
        CommandResult::succeeded(alias, format!("cmd-{}", alias), output, 1)
    }

    fn failed(alias: &str, output: Option<&str>) -> CommandResult {
        let mut result = CommandResult::failed(
            alias,
            format!("cmd-{}", alias),
            Error::command_failed(format!("cmd-{}", alias), None, Some(1)),
            1,
        );
        result.output = output.map(str::to_string);
        result
    }

    fn results(items: Vec<CommandResult>) -> CommandResults {
        items.into_iter().collect()
    }

    #[test]
    fn empty_results_give_empty_string_even_with_template() {
        let empty = CommandResults::new();
        assert_eq!(format(&empty, Some("{a}-{b}"), "-").unwrap(), "");
        assert_eq!(format(&empty, None, "-").unwrap(), "");
    }

    #[test]
    fn template_substitutes_each_alias() {
        let set = results(vec![ok("branch", "main"), ok("sha", "abc1234")]);
        assert_eq!(
            format(&set, Some("{branch}-{sha}"), "-").unwrap(),
            "main-abc1234"
        );
    }

    #[test]
    fn template_repeats_alias_identically() {
        let set = results(vec![ok("v", "1.0")]);
        assert_eq!(format(&set, Some("{v}/{v}@{v}"), "-").unwrap(), "1.0/1.0@1.0");
    }

    #[test]
    fn template_keeps_literal_text() {
        let set = results(vec![ok("tag", "1.2.0"), ok("branch", "dev")]);
        assert_eq!(
            format(&set, Some("v{tag} ({branch})"), "-").unwrap(),
            "v1.2.0 (dev)"
        );
    }

    #[test]
    fn failed_result_without_output_renders_empty() {
        let set = results(vec![ok("branch", "main"), failed("sha", None)]);
        assert_eq!(format(&set, Some("{branch}-{sha}"), "-").unwrap(), "main-");
    }

    #[test]
    fn missing_alias_is_a_format_error() {
        let set = results(vec![ok("branch", "main")]);
        let err = format(&set, Some("{branch}-{sha}-{sha}"), "-").unwrap_err();
        assert_eq!(err.code, ErrorCode::FormatUndefinedPlaceholder);
        assert_eq!(err.template(), Some("{branch}-{sha}-{sha}"));
        assert_eq!(err.details["missing"], serde_json::json!(["sha"]));
    }

    #[test]
    fn separator_join_skips_empty_and_absent_outputs() {
        let set = results(vec![
            ok("0", "main"),
            failed("1", Some("")),
            failed("2", None),
            ok("3", "abc1234"),
        ]);
        assert_eq!(format(&set, None, "_").unwrap(), "main_abc1234");
    }

    #[test]
    fn separator_join_uses_insertion_order() {
        let set = results(vec![ok("b", "second"), ok("a", "first"), ok("10", "x"), ok("9", "y")]);
        assert_eq!(format(&set, None, ".").unwrap(), "second.first.x.y");
    }

    #[test]
    fn empty_template_falls_back_to_separator() {
        let set = results(vec![ok("0", "a"), ok("1", "b")]);
        assert_eq!(format(&set, Some(""), "+").unwrap(), "a+b");
    }

    #[test]
    fn formatting_is_idempotent() {
        let set = results(vec![ok("branch", "main"), failed("sha", Some("unknown"))]);
        let first = format(&set, Some("{branch}:{sha}"), "-").unwrap();
        let second = format(&set, Some("{branch}:{sha}"), "-").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "main:unknown");
    }
}
