//! Discrimination network behavior over built systems and hand-wired graphs.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use symflow::adapters::properties::ConstantEntityProvider;
use symflow::domain::condition::{ArchitecturePredicate, CombinationMode, Condition};
use symflow::domain::error::MatchError;
use symflow::domain::ids::PatternId;
use symflow::domain::network::DiscriminationNetwork;
use symflow::domain::pattern::{Pattern, PatternShape};
use symflow::domain::ports::GraphView;

use common::fixtures::{add_of_constants, build, label, negate_plus_sine};
use common::mock::MockGraphView;

fn add() -> Condition {
    Condition::entity("Std.Add")
}

fn all_inputs_constant() -> Condition {
    Condition::input_signals("Constant", CombinationMode::All)
}

fn network(patterns: Vec<Pattern>) -> DiscriminationNetwork {
    let mut network = DiscriminationNetwork::new();
    for pattern in patterns {
        network.register(pattern).unwrap();
    }
    network
}

#[test]
fn test_add_with_constant_inputs_matches_both_patterns() {
    let system = build(&add_of_constants());
    let network = network(vec![
        Pattern::leaf("P1", add()),
        Pattern::leaf("P2", Condition::and(vec![add(), all_inputs_constant()])),
    ]);

    let matches = network.match_signal(&system, label(&system, "s")).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches.get(&PatternId::from("P1")).unwrap().score, 2);
    assert_eq!(matches.get(&PatternId::from("P2")).unwrap().score, 3);
    assert_eq!(matches.best().unwrap().pattern.as_str(), "P2");
}

#[test]
fn test_variable_input_only_matches_entity_pattern() {
    let system = build(&add_of_constants());
    let network = network(vec![
        Pattern::leaf("P1", add()),
        Pattern::leaf("P2", Condition::and(vec![add(), all_inputs_constant()])),
    ]);

    let matches = network.match_signal(&system, label(&system, "t")).unwrap();
    assert_eq!(matches.pattern_ids().map(PatternId::as_str).collect::<Vec<_>>(), vec!["P1"]);
}

#[test]
fn test_tree_pattern_needs_every_child() {
    let system = build(&negate_plus_sine());
    let s = label(&system, "s");
    let network = network(vec![
        Pattern::tree(
            "neg-neg",
            add(),
            vec![
                PatternShape::new(Condition::entity("Std.Negate")),
                PatternShape::new(Condition::entity("Std.Negate")),
            ],
        ),
        Pattern::leaf("neg", Condition::entity("Std.Negate")),
    ]);

    assert!(network.match_signal(&system, s).unwrap().is_empty());
    // The first child alone still matches where it is asked directly.
    let na = label(&system, "na");
    assert!(network.match_signal(&system, na).unwrap().contains(&PatternId::from("neg")));
}

#[test]
fn test_tree_pattern_collects_groups_from_every_position() {
    let system = build(&negate_plus_sine());
    let network = network(vec![
        Pattern::tree(
            "neg-sin",
            add(),
            vec![
                PatternShape::new(Condition::entity("Std.Negate")).with_group("left"),
                PatternShape::new(Condition::entity("Std.Sine")).with_group("right"),
            ],
        )
        .with_group("sum"),
    ]);

    let s = label(&system, "s");
    let matches = network.match_signal(&system, s).unwrap();
    let m = matches.get(&PatternId::from("neg-sin")).unwrap();
    assert_eq!(m.score, 6);
    assert_eq!(m.group("left").unwrap()[0].signal, label(&system, "na"));
    assert_eq!(m.group("right").unwrap()[0].signal, label(&system, "sb"));
    assert_eq!(m.group("sum").unwrap()[0].signal, s);
    assert_eq!(m.group("sum").unwrap()[0].port, system.driven_by_port(s));
}

#[test]
fn test_shared_condition_is_evaluated_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let predicate = ArchitecturePredicate::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });

    let mut view = MockGraphView::new();
    let x = view.signal();
    let y = view.signal();
    let port = view.port("Std.Negate", &[x], y);
    view.set_architecture(port, "Std.NegateGeneric");

    let network = network(vec![
        Pattern::leaf("a", Condition::architecture(predicate.clone())),
        Pattern::leaf(
            "b",
            Condition::and(vec![
                Condition::architecture(predicate.clone()),
                Condition::entity("Std.Negate"),
            ]),
        ),
        Pattern::leaf("c", Condition::architecture(predicate)),
    ]);
    // root + shared architecture node + entity node
    assert_eq!(network.node_count(), 3);

    let matches = network.match_all(&view, y, Some(port)).unwrap();
    assert_eq!(matches.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_separately_built_predicates_do_not_coalesce() {
    let network = network(vec![
        Pattern::leaf("a", Condition::architecture(ArchitecturePredicate::new(|_| true))),
        Pattern::leaf("b", Condition::architecture(ArchitecturePredicate::new(|_| true))),
    ]);
    assert_eq!(network.node_count(), 3);
}

#[test]
fn test_failing_prefix_prunes_whole_subtree() {
    let mut view = MockGraphView::new();
    let x = view.signal_with(&["Constant"]);
    let y = view.signal();
    let port = view.port("Std.Sine", &[x], y);

    let network = network(vec![
        Pattern::leaf("add", add()),
        Pattern::leaf("add-const", Condition::and(vec![add(), all_inputs_constant()])),
    ]);
    assert!(network.match_all(&view, y, Some(port)).unwrap().is_empty());
    assert_eq!(network.match_first(&view, y, Some(port)).unwrap(), None);
}

#[test]
fn test_match_first_returns_local_subscription_score() {
    let system = build(&add_of_constants());
    let network = network(vec![
        Pattern::leaf("deep", Condition::and(vec![add(), all_inputs_constant()])),
        Pattern::leaf("shallow", add()),
    ]);
    let s = label(&system, "s");
    let best = network
        .match_first(&system, s, system.driven_by_port(s))
        .unwrap()
        .unwrap();
    assert_eq!(best.pattern.as_str(), "shallow");
    assert_eq!(best.score, 3);
}

#[test]
fn test_derived_constant_property() {
    let mut view = MockGraphView::new();
    let c = view.signal();
    view.port("Std.Constant", &[], c);
    let x = view.signal_with(&["Constant"]);
    let s = view.signal();
    let port = view.port("Std.Add", &[c, x], s);

    let provider = ConstantEntityProvider::standard();
    use symflow::domain::ports::PropertyProvider;
    assert!(provider.provides(&view, c, &"Constant".into()));
    assert!(!provider.provides(&view, x, &"Constant".into()));
    // The mock does not consult providers, so the derived property stays invisible to it.
    assert!(!all_inputs_constant().fulfills(&view, s, Some(port)));
}

#[test]
fn test_unordered_children_fail_loudly() {
    let system = build(&negate_plus_sine());
    let network = network(vec![Pattern::new(
        "unordered",
        PatternShape::new(add())
            .with_children(vec![
                PatternShape::new(Condition::entity("Std.Sine")),
                PatternShape::new(Condition::entity("Std.Negate")),
            ])
            .unordered(),
    )]);
    assert_eq!(
        network.match_signal(&system, label(&system, "s")),
        Err(MatchError::UnsupportedMode("unordered children"))
    );
}

#[test]
fn test_catch_all_children_fail_loudly() {
    let system = build(&negate_plus_sine());
    let network = network(vec![Pattern::new(
        "catch-all",
        PatternShape::new(add())
            .with_children(vec![PatternShape::new(Condition::entity("Std.Negate"))])
            .with_catch_all(PatternShape::new(Condition::always_true())),
    )]);
    assert!(matches!(
        network.match_signal(&system, label(&system, "s")),
        Err(MatchError::UnsupportedMode(_))
    ));
}

#[test]
fn test_arity_mismatch_is_no_match() {
    let system = build(&negate_plus_sine());
    let network = network(vec![Pattern::tree(
        "three",
        add(),
        vec![
            PatternShape::new(Condition::always_true()),
            PatternShape::new(Condition::always_true()),
            PatternShape::new(Condition::always_true()),
        ],
    )]);
    assert!(network.match_signal(&system, label(&system, "s")).unwrap().is_empty());
}
