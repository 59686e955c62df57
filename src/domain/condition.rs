//! Composable predicates over `(signal, port)` pairs.
//!
//! A condition never mutates the graph. Port-based variants evaluate to
//! `false` when no port is supplied.

use crate::domain::error::MatchError;
use crate::domain::ids::{ArchitectureId, EntityId, PortId, PropertyId, SignalId};
use crate::domain::ports::GraphView;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const ENTITY_SCORE: u32 = 2;
pub const ARCHITECTURE_SCORE: u32 = 2;
pub const PROPERTY_SCORE: u32 = 1;

/// How the per-signal property tests of a port's inputs (or outputs) are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinationMode {
    All,
    None,
    AtLeastOne,
    ExactlyOne,
    AtMostOne,
}

impl CombinationMode {
    /// Decide from the number of signals carrying the property out of `total`.
    pub fn accepts(self, hits: usize, total: usize) -> bool {
        match self {
            CombinationMode::All => hits == total,
            CombinationMode::None => hits == 0,
            CombinationMode::AtLeastOne => hits >= 1,
            CombinationMode::ExactlyOne => hits == 1,
            CombinationMode::AtMostOne => hits <= 1,
        }
    }
}

impl FromStr for CombinationMode {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "all" => Ok(CombinationMode::All),
            "none" => Ok(CombinationMode::None),
            "atleastone" => Ok(CombinationMode::AtLeastOne),
            "exactlyone" => Ok(CombinationMode::ExactlyOne),
            "atmostone" => Ok(CombinationMode::AtMostOne),
            _ => Err(MatchError::UnknownCombinationMode(s.to_string())),
        }
    }
}

/// Opaque architecture test.
///
/// Two predicates are equal only when they share the same allocation, so
/// conditions carrying separately built closures are never coalesced even if
/// they happen to compute the same thing.
#[derive(Clone)]
pub struct ArchitecturePredicate(Arc<dyn Fn(&ArchitectureId) -> bool + Send + Sync>);

impl ArchitecturePredicate {
    pub fn new(test: impl Fn(&ArchitectureId) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    pub fn test(&self, architecture: &ArchitectureId) -> bool {
        (self.0)(architecture)
    }
}

impl PartialEq for ArchitecturePredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ArchitecturePredicate {}

impl fmt::Debug for ArchitecturePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchitecturePredicate({:p})", Arc::as_ptr(&self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    AlwaysTrue,
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Entity(EntityId),
    Architecture(ArchitecturePredicate),
    InputSignalsProperty {
        property: PropertyId,
        mode: CombinationMode,
    },
    OutputSignalsProperty {
        property: PropertyId,
        mode: CombinationMode,
    },
}

/// Immutable predicate with a static ranking weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionKind,
    pub score: u32,
}

impl Default for Condition {
    fn default() -> Self {
        Self::always_true()
    }
}

impl Condition {
    pub fn always_true() -> Self {
        Self {
            kind: ConditionKind::AlwaysTrue,
            score: 0,
        }
    }

    pub fn entity(entity: impl Into<EntityId>) -> Self {
        Self {
            kind: ConditionKind::Entity(entity.into()),
            score: ENTITY_SCORE,
        }
    }

    pub fn architecture(predicate: ArchitecturePredicate) -> Self {
        Self {
            kind: ConditionKind::Architecture(predicate),
            score: ARCHITECTURE_SCORE,
        }
    }

    pub fn input_signals(property: impl Into<PropertyId>, mode: CombinationMode) -> Self {
        Self {
            kind: ConditionKind::InputSignalsProperty {
                property: property.into(),
                mode,
            },
            score: PROPERTY_SCORE,
        }
    }

    pub fn output_signals(property: impl Into<PropertyId>, mode: CombinationMode) -> Self {
        Self {
            kind: ConditionKind::OutputSignalsProperty {
                property: property.into(),
                mode,
            },
            score: PROPERTY_SCORE,
        }
    }

    /// Conjunction; its score is the sum of the operand scores.
    pub fn and(operands: Vec<Condition>) -> Self {
        let score = operands.iter().map(|c| c.score).sum();
        Self {
            kind: ConditionKind::And(operands),
            score,
        }
    }

    /// Disjunction; its score is the lowest operand score.
    pub fn or(operands: Vec<Condition>) -> Self {
        let score = operands.iter().map(|c| c.score).min().unwrap_or(0);
        Self {
            kind: ConditionKind::Or(operands),
            score,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Condition) -> Self {
        let score = operand.score;
        Self {
            kind: ConditionKind::Not(Box::new(operand)),
            score,
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn is_always_true(&self) -> bool {
        matches!(self.kind, ConditionKind::AlwaysTrue)
    }

    /// Evaluate against `signal`, optionally driven by `port`.
    pub fn fulfills(&self, view: &dyn GraphView, signal: SignalId, port: Option<PortId>) -> bool {
        match &self.kind {
            ConditionKind::AlwaysTrue => true,
            ConditionKind::And(operands) => operands.iter().all(|c| c.fulfills(view, signal, port)),
            ConditionKind::Or(operands) => operands.iter().any(|c| c.fulfills(view, signal, port)),
            ConditionKind::Not(operand) => !operand.fulfills(view, signal, port),
            ConditionKind::Entity(entity) => {
                port.and_then(|p| view.entity(p)).is_some_and(|e| e == entity)
            }
            ConditionKind::Architecture(predicate) => port
                .and_then(|p| view.architecture(p))
                .is_some_and(|a| predicate.test(a)),
            ConditionKind::InputSignalsProperty { property, mode } => match port {
                Some(port) => combine(view, &view.input_signals(port), property, *mode),
                None => false,
            },
            ConditionKind::OutputSignalsProperty { property, mode } => match port {
                Some(port) => combine(view, &view.output_signals(port), property, *mode),
                None => false,
            },
        }
    }
}

// Unbound slots count as lacking the property.
fn combine(
    view: &dyn GraphView,
    slots: &[Option<SignalId>],
    property: &PropertyId,
    mode: CombinationMode,
) -> bool {
    let hits = slots
        .iter()
        .flatten()
        .filter(|s| view.ask_for_property(**s, property))
        .count();
    mode.accepts(hits, slots.len())
}
