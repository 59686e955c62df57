//! Declarative description of a signal system and its rule set: the input
//! contract of [`SystemBuilder`](crate::domain::builder::SystemBuilder).
//!
//! Signals, buses and ports refer to each other by label. Patterns are
//! described as condition trees that compile into [`Pattern`]s.

use crate::domain::condition::{ArchitecturePredicate, CombinationMode, Condition};
use crate::domain::error::MatchError;
use crate::domain::ids::{ArchitectureId, EntityId};
use crate::domain::pattern::{Pattern, PatternShape};
use serde::{Deserialize, Serialize};

fn yes() -> bool {
    true
}

/// A whole system plus the patterns to match against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescription {
    #[serde(default)]
    pub signals: Vec<SignalDescription>,
    #[serde(default)]
    pub buses: Vec<BusDescription>,
    /// Ports in instantiation order.
    #[serde(default)]
    pub ports: Vec<PortDescription>,
    /// Labels of the signals promoted to system inputs.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Labels of the signals promoted to system outputs.
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Entity arities beyond the built-in catalog.
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
    /// Entities whose output signals carry the `Constant` property by derivation.
    #[serde(default)]
    pub constant_entities: Vec<EntityId>,
    #[serde(default)]
    pub patterns: Vec<PatternDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDescription {
    pub label: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusDescription {
    pub name: String,
    #[serde(default)]
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescription {
    pub entity: EntityId,
    #[serde(default)]
    pub architecture: Option<ArchitectureId>,
    /// Input signal labels by slot; `null` leaves a slot unbound.
    #[serde(default)]
    pub inputs: Vec<Option<String>>,
    /// Output signal labels by slot.
    #[serde(default)]
    pub outputs: Vec<Option<String>>,
    /// Bus names by slot.
    #[serde(default)]
    pub buses: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub id: EntityId,
    #[serde(default)]
    pub inputs: usize,
    #[serde(default)]
    pub outputs: usize,
    #[serde(default)]
    pub buses: usize,
}

/// A named rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDescription {
    pub id: String,
    #[serde(flatten)]
    pub shape: ShapeDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDescription {
    #[serde(default)]
    pub condition: ConditionDescription,
    #[serde(default)]
    pub children: Vec<ShapeDescription>,
    #[serde(default)]
    pub catch_all: Option<Box<ShapeDescription>>,
    #[serde(default = "yes")]
    pub exact: bool,
    #[serde(default = "yes")]
    pub ordered: bool,
    #[serde(default)]
    pub group: Option<String>,
}

/// Serializable condition tree.
///
/// Architecture tests are described as an accepted set; each description
/// compiles to its own predicate, so such conditions never coalesce across
/// patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDescription {
    #[default]
    AlwaysTrue,
    And {
        operands: Vec<ConditionDescription>,
    },
    Or {
        operands: Vec<ConditionDescription>,
    },
    Not {
        operand: Box<ConditionDescription>,
    },
    Entity {
        entity: EntityId,
    },
    Architecture {
        any_of: Vec<ArchitectureId>,
    },
    InputSignals {
        property: String,
        /// One of `all`, `none`, `at_least_one`, `exactly_one`, `at_most_one`.
        mode: String,
    },
    OutputSignals {
        property: String,
        mode: String,
    },
}

impl ConditionDescription {
    pub fn compile(&self) -> Result<Condition, MatchError> {
        Ok(match self {
            ConditionDescription::AlwaysTrue => Condition::always_true(),
            ConditionDescription::And { operands } => Condition::and(compile_all(operands)?),
            ConditionDescription::Or { operands } => Condition::or(compile_all(operands)?),
            ConditionDescription::Not { operand } => Condition::not(operand.compile()?),
            ConditionDescription::Entity { entity } => Condition::entity(entity.clone()),
            ConditionDescription::Architecture { any_of } => {
                let accepted = any_of.clone();
                Condition::architecture(ArchitecturePredicate::new(move |a| accepted.contains(a)))
            }
            ConditionDescription::InputSignals { property, mode } => {
                Condition::input_signals(property.as_str(), mode.parse::<CombinationMode>()?)
            }
            ConditionDescription::OutputSignals { property, mode } => {
                Condition::output_signals(property.as_str(), mode.parse::<CombinationMode>()?)
            }
        })
    }
}

fn compile_all(operands: &[ConditionDescription]) -> Result<Vec<Condition>, MatchError> {
    operands.iter().map(ConditionDescription::compile).collect()
}

impl ShapeDescription {
    pub fn compile(&self) -> Result<PatternShape, MatchError> {
        let children = self
            .children
            .iter()
            .map(ShapeDescription::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let catch_all = match &self.catch_all {
            Some(shape) => Some(Box::new(shape.compile()?)),
            None => None,
        };
        Ok(PatternShape {
            condition: self.condition.compile()?,
            children,
            catch_all,
            exact: self.exact,
            ordered: self.ordered,
            group: self.group.clone(),
        })
    }
}

impl PatternDescription {
    pub fn compile(&self) -> Result<Pattern, MatchError> {
        Ok(Pattern::new(self.id.as_str(), self.shape.compile()?))
    }
}
