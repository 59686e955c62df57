//! Engine loaded from a JSON description on disk: matching, commands, upstream queries, reload.

mod common;

use std::io::Write;

use symflow::app::dto::{CommandsRequest, MatchRequest, UpstreamRequest};
use symflow::app::{EngineConfig, MatchEngine};

use common::fixtures::SYSTEM_JSON;

fn write_json(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// The fixture plus a rule that needs every input of an addition to be constant.
fn system_with_all_constant_rule() -> String {
    let mut value: serde_json::Value = serde_json::from_str(SYSTEM_JSON).unwrap();
    value["patterns"].as_array_mut().unwrap().push(serde_json::json!({
        "id": "add-all-constant",
        "condition": {"type": "and", "operands": [
            {"type": "entity", "entity": "Std.Add"},
            {"type": "input_signals", "property": "Constant", "mode": "all"}
        ]}
    }));
    value.to_string()
}

fn request(signal: &str) -> MatchRequest {
    MatchRequest {
        signal: signal.into(),
        max_results: None,
    }
}

fn pattern_ids(engine: &MatchEngine, signal: &str) -> Vec<String> {
    engine
        .match_all(request(signal))
        .unwrap()
        .matches
        .into_iter()
        .map(|m| m.pattern)
        .collect()
}

#[test]
fn test_load_and_match() {
    let file = write_json(SYSTEM_JSON);
    let engine = MatchEngine::load_from_json(file.path(), EngineConfig::default()).unwrap();

    let health = engine.health().unwrap();
    assert_eq!(health.signal_count, 4);
    assert_eq!(health.port_count, 2);
    assert_eq!(health.pattern_count, 3);
    assert!(health.source_path.is_some());

    let sum = engine.match_all(request("sum")).unwrap();
    let ranked: Vec<(&str, u32)> = sum
        .matches
        .iter()
        .map(|m| (m.pattern.as_str(), m.score))
        .collect();
    assert_eq!(ranked, vec![("add-with-constant", 3), ("add", 2)]);

    let out = engine.match_all(request("out")).unwrap();
    assert_eq!(out.matches.len(), 1);
    let nested = &out.matches[0];
    assert_eq!(nested.pattern, "negated-sum");
    assert_eq!(nested.score, 4);
    let inner = &nested.groups["inner"];
    assert_eq!(inner[0].signal, "sum");
    assert_eq!(inner[0].port.as_ref().unwrap().entity, "Std.Add");

    let best = engine.match_first(request("sum")).unwrap().best.unwrap();
    assert_eq!(best.pattern, "add");
}

#[test]
fn test_commands_change_what_matches() {
    let file = write_json(&system_with_all_constant_rule());
    let engine = MatchEngine::load_from_json(file.path(), EngineConfig::default()).unwrap();
    assert!(!pattern_ids(&engine, "sum").contains(&"add-all-constant".to_string()));

    // Feed the addition from a constant port instead of `x`.
    let request: CommandsRequest = serde_json::from_value(serde_json::json!({
        "commands": [
            {"command": "new_signal", "label": "k"},
            {"command": "new_port", "entity": "Std.Constant", "outputs": [{"index": 4}]},
            {"command": "replace_input", "port": {"index": 0}, "slot": 0, "signal": {"index": 4}}
        ]
    }))
    .unwrap();
    let response = engine.post_commands(request).unwrap();
    assert_eq!(response.executed.len(), 3);
    assert!(response.aborted.is_empty());
    assert_eq!(response.rejected, 0);
    assert!(response.executed[0].created.is_some());

    assert!(pattern_ids(&engine, "sum").contains(&"add-all-constant".to_string()));

    let upstream = engine
        .upstream(UpstreamRequest {
            signals: vec!["out".into()],
            label_pattern: None,
            entity: None,
        })
        .unwrap();
    assert!(upstream.signals.contains(&"k".to_string()));
    assert!(!upstream.signals.contains(&"x".to_string()));
    assert_eq!(upstream.ports.len(), 3);
}

#[test]
fn test_disabled_channel_rejects_commands() {
    let file = write_json(SYSTEM_JSON);
    let mut config = EngineConfig::default();
    config.mediator.channel_enabled = false;
    let engine = MatchEngine::load_from_json(file.path(), config).unwrap();

    let request: CommandsRequest =
        serde_json::from_str(r#"{"commands": [{"command": "new_signal", "label": "k"}]}"#).unwrap();
    let response = engine.post_commands(request).unwrap();
    assert_eq!(response.rejected, 1);
    assert!(response.executed.is_empty());
    assert_eq!(engine.health().unwrap().signal_count, 4);
}

#[test]
fn test_config_caps_results() {
    let file = write_json(SYSTEM_JSON);
    let config: EngineConfig = serde_json::from_str(r#"{"matching": {"max_results": 1}}"#).unwrap();
    let engine = MatchEngine::load_from_json(file.path(), config).unwrap();

    let response = engine.match_all(request("sum")).unwrap();
    assert_eq!(response.total, 2);
    assert_eq!(response.matches.len(), 1);
}

#[test]
fn test_reload_picks_up_file_changes() {
    let file = write_json(SYSTEM_JSON);
    let engine = MatchEngine::load_from_json(file.path(), EngineConfig::default()).unwrap();
    let request = serde_json::from_str(r#"{"commands": [{"command": "new_signal"}]}"#).unwrap();
    engine.post_commands(request).unwrap();
    assert_eq!(engine.health().unwrap().signal_count, 5);

    std::fs::write(file.path(), system_with_all_constant_rule()).unwrap();
    let health = engine.reload().unwrap();
    assert_eq!(health.signal_count, 4);
    assert_eq!(health.pattern_count, 4);
    assert_eq!(health.observer_count, 1);
}

#[test]
fn test_invalid_description_is_reported() {
    let file = write_json(r#"{"signals": [{"label": "a"}], "outputs": ["b"]}"#);
    let err = MatchEngine::load_from_json(file.path(), EngineConfig::default())
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("Unknown signal label: b"));
}

#[test]
fn test_port_arity_is_checked_against_catalog() {
    let file = write_json(
        r#"{"signals": [{"label": "a"}, {"label": "b"}],
            "ports": [{"entity": "Std.Add", "inputs": ["a"], "outputs": ["b"]}]}"#,
    );
    let err = MatchEngine::load_from_json(file.path(), EngineConfig::default())
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("entity expects 2/1/0"));
}
