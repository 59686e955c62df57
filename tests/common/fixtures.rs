//! System descriptions used across integration tests.
#![allow(dead_code)]

use symflow::domain::builder::SystemBuilder;
use symflow::domain::description::{PortDescription, SignalDescription, SystemDescription};
use symflow::domain::graph::SignalSystem;
use symflow::domain::ids::{EntityId, SignalId};

pub fn signal(label: &str) -> SignalDescription {
    SignalDescription {
        label: label.to_string(),
        properties: Vec::new(),
        held: false,
    }
}

pub fn constant(label: &str) -> SignalDescription {
    SignalDescription {
        label: label.to_string(),
        properties: vec!["Constant".to_string()],
        held: false,
    }
}

pub fn held(label: &str) -> SignalDescription {
    SignalDescription {
        label: label.to_string(),
        properties: Vec::new(),
        held: true,
    }
}

pub fn port(entity: &str, inputs: &[&str], outputs: &[&str]) -> PortDescription {
    PortDescription {
        entity: EntityId::from(entity),
        architecture: None,
        inputs: inputs.iter().map(|label| Some(label.to_string())).collect(),
        outputs: outputs.iter().map(|label| Some(label.to_string())).collect(),
        buses: Vec::new(),
    }
}

pub fn build(description: &SystemDescription) -> SignalSystem {
    SystemBuilder::new().build(description).unwrap()
}

pub fn label(system: &SignalSystem, label: &str) -> SignalId {
    system.find_signal_by_label(label).unwrap()
}

/// `s = c1 + c2` over constant inputs and `t = c1 + v` with one variable input.
pub fn add_of_constants() -> SystemDescription {
    SystemDescription {
        signals: vec![constant("c1"), constant("c2"), signal("v"), signal("s"), signal("t")],
        ports: vec![
            port("Std.Add", &["c1", "c2"], &["s"]),
            port("Std.Add", &["c1", "v"], &["t"]),
        ],
        inputs: vec!["c1".into(), "c2".into(), "v".into()],
        outputs: vec!["s".into(), "t".into()],
        ..SystemDescription::default()
    }
}

/// `s = -a + sin(b)`
pub fn negate_plus_sine() -> SystemDescription {
    SystemDescription {
        signals: vec![signal("a"), signal("b"), signal("na"), signal("sb"), signal("s")],
        ports: vec![
            port("Std.Negate", &["a"], &["na"]),
            port("Std.Sine", &["b"], &["sb"]),
            port("Std.Add", &["na", "sb"], &["s"]),
        ],
        inputs: vec!["a".into(), "b".into()],
        outputs: vec!["s".into()],
        ..SystemDescription::default()
    }
}

/// `s = n + n` with `n = -x`: `x` and `n` are reachable from `s` twice.
pub fn diamond() -> SystemDescription {
    SystemDescription {
        signals: vec![signal("x"), signal("n"), signal("s")],
        ports: vec![port("Std.Negate", &["x"], &["n"]), port("Std.Add", &["n", "n"], &["s"])],
        inputs: vec!["x".into()],
        outputs: vec!["s".into()],
        ..SystemDescription::default()
    }
}

/// `y = -(-h)` where `h = -x` is held.
pub fn held_chain() -> SystemDescription {
    SystemDescription {
        signals: vec![signal("x"), held("h"), signal("m"), signal("y")],
        ports: vec![
            port("Std.Negate", &["x"], &["h"]),
            port("Std.Negate", &["h"], &["m"]),
            port("Std.Negate", &["m"], &["y"]),
        ],
        inputs: vec!["x".into()],
        outputs: vec!["y".into()],
        ..SystemDescription::default()
    }
}

pub const SYSTEM_JSON: &str = r#"{
    "signals": [
        {"label": "x"},
        {"label": "one", "properties": ["Constant"]},
        {"label": "sum"},
        {"label": "out"}
    ],
    "ports": [
        {"entity": "Std.Add", "inputs": ["x", "one"], "outputs": ["sum"]},
        {"entity": "Std.Negate", "inputs": ["sum"], "outputs": ["out"]}
    ],
    "inputs": ["x"],
    "outputs": ["out"],
    "patterns": [
        {"id": "add", "condition": {"type": "entity", "entity": "Std.Add"}},
        {"id": "add-with-constant", "condition": {"type": "and", "operands": [
            {"type": "entity", "entity": "Std.Add"},
            {"type": "input_signals", "property": "Constant", "mode": "at_least_one"}
        ]}},
        {"id": "negated-sum", "condition": {"type": "entity", "entity": "Std.Negate"},
         "children": [{"condition": {"type": "entity", "entity": "Std.Add"}, "group": "inner"}]}
    ]
}"#;
