use serde_json::json;
use versionmark::formatter;
use versionmark::parser;
use versionmark::{CommandResult, CommandResults};

/// Parse a plan, fabricate a success for every descriptor, and join without a template.
fn round_trip(spec: serde_json::Value) -> (Vec<String>, String) {
    let plan = parser::parse_value(Some(&spec)).unwrap();
    let outputs: Vec<String> = plan
        .descriptors
        .iter()
        .map(|d| format!("out-{}", d.alias))
        .collect();
    let results: CommandResults = plan
        .descriptors
        .iter()
        .zip(&outputs)
        .map(|(d, out)| CommandResult::succeeded(&d.alias, &d.command, out, 0))
        .collect();
    (outputs, formatter::format_for_plan(&results, &plan).unwrap())
}

#[test]
fn separator_round_trip_reconstructs_outputs_in_order() {
    let specs = [
        json!({"commands": ["a", "b", "c"]}),
        json!({"commands": ["a", {"alias": "zz", "cmd": "b"}, "c"], "separator": "."}),
        json!({"commands": [{"alias": "10", "cmd": "x"}, {"alias": "9", "cmd": "y"}], "separator": "::"}),
    ];

    for spec in specs {
        let separator = spec["separator"].as_str().unwrap_or("-").to_string();
        let (outputs, joined) = round_trip(spec);
        assert_eq!(joined, outputs.join(&separator));
    }
}

#[test]
fn plan_serializes_camel_case() {
    let plan = parser::parse_value(Some(&json!({
        "commands": [{"alias": "sha", "cmd": "git rev-parse --short HEAD", "fallback": "dev", "timeout": 500}],
        "format": "v-{sha}",
        "errorStrategy": "fallback",
        "parallel": false
    })))
    .unwrap();

    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["isSingleCommandMode"], false);
    assert_eq!(value["formatTemplate"], "v-{sha}");
    assert_eq!(value["errorStrategy"], "fallback");
    assert_eq!(value["parallel"], false);
    assert_eq!(value["descriptors"][0]["fallbackValue"], "dev");
    assert_eq!(value["descriptors"][0]["timeoutMs"], 500);
}

#[test]
fn template_with_unknown_alias_fails_before_execution() {
    let err = parser::parse_value(Some(&json!({
        "commands": [{"alias": "branch", "cmd": "git branch --show-current"}],
        "format": "{branch}-{sha}"
    })))
    .unwrap_err();

    assert_eq!(err.code.as_str(), "config.validation_failed");
    assert_eq!(err.field(), Some("format"));
}
