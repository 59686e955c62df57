use crate::domain::ids::{ArchitectureId, BusId, EntityId, InstanceId, PortId, PropertyId, SignalId};
use std::collections::BTreeSet;

/// Value-carrying node
#[derive(Debug, Clone)]
pub struct SignalNode {
    pub id: SignalId,
    pub label: Option<String>,
    pub properties: BTreeSet<PropertyId>,
    /// Held signals are treated as leaves by traversals unless the hold is ignored.
    pub held: bool,
}

impl SignalNode {
    pub fn new(id: SignalId, label: Option<String>) -> Self {
        Self {
            id,
            label,
            properties: BTreeSet::new(),
            held: false,
        }
    }

    pub fn has_property(&self, property: &PropertyId) -> bool {
        self.properties.contains(property)
    }
}

/// Instantiated computation node
///
/// Arity is fixed at construction; the slots themselves live on the edges.
#[derive(Debug, Clone)]
pub struct PortNode {
    pub id: PortId,
    pub entity: EntityId,
    pub architecture: Option<ArchitectureId>,
    pub input_arity: usize,
    pub output_arity: usize,
    pub bus_arity: usize,
}

/// Named ordered group of signals
#[derive(Debug, Clone)]
pub struct BusNode {
    pub id: BusId,
    pub name: String,
    pub signals: Vec<SignalId>,
}

/// Polymorphic node type
#[derive(Debug, Clone)]
pub enum GraphNode {
    Signal(SignalNode),
    Port(PortNode),
    Bus(BusNode),
}

impl GraphNode {
    pub fn instance_id(&self) -> InstanceId {
        match self {
            GraphNode::Signal(s) => s.id.0,
            GraphNode::Port(p) => p.id.0,
            GraphNode::Bus(b) => b.id.0,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalNode> {
        match self {
            GraphNode::Signal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<&PortNode> {
        match self {
            GraphNode::Port(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_bus(&self) -> Option<&BusNode> {
        match self {
            GraphNode::Bus(b) => Some(b),
            _ => None,
        }
    }
}
