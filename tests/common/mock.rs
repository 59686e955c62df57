//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use symflow::domain::error::TraversalError;
use symflow::domain::ids::{ArchitectureId, EntityId, InstanceId, PortId, PropertyId, SignalId};
use symflow::domain::ports::GraphView;
use symflow::domain::traversal::{ScanVisitor, Visit};

struct MockPort {
    entity: EntityId,
    architecture: Option<ArchitectureId>,
    inputs: Vec<Option<SignalId>>,
    outputs: Vec<Option<SignalId>>,
}

/// Hand-wired graph for exercising conditions and walks without a `SignalSystem`.
#[derive(Default)]
pub struct MockGraphView {
    next: u64,
    drivers: HashMap<SignalId, PortId>,
    ports: HashMap<PortId, MockPort>,
    properties: HashMap<SignalId, HashSet<PropertyId>>,
    held: HashSet<SignalId>,
}

impl MockGraphView {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> InstanceId {
        self.next += 1;
        InstanceId(self.next)
    }

    pub fn signal(&mut self) -> SignalId {
        SignalId(self.next_id())
    }

    pub fn signal_with(&mut self, properties: &[&str]) -> SignalId {
        let signal = self.signal();
        self.properties
            .insert(signal, properties.iter().map(|p| PropertyId::from(*p)).collect());
        signal
    }

    /// Add a port of `entity` reading `inputs` and driving `output`.
    pub fn port(&mut self, entity: &str, inputs: &[SignalId], output: SignalId) -> PortId {
        let port = PortId(self.next_id());
        self.ports.insert(
            port,
            MockPort {
                entity: EntityId::from(entity),
                architecture: None,
                inputs: inputs.iter().copied().map(Some).collect(),
                outputs: vec![Some(output)],
            },
        );
        self.drivers.insert(output, port);
        port
    }

    pub fn set_architecture(&mut self, port: PortId, architecture: &str) {
        if let Some(p) = self.ports.get_mut(&port) {
            p.architecture = Some(ArchitectureId::from(architecture));
        }
    }

    pub fn hold(&mut self, signal: SignalId) {
        self.held.insert(signal);
    }
}

impl GraphView for MockGraphView {
    fn driven_by_port(&self, signal: SignalId) -> Option<PortId> {
        self.drivers.get(&signal).copied()
    }

    fn input_signals(&self, port: PortId) -> Vec<Option<SignalId>> {
        self.ports.get(&port).map(|p| p.inputs.clone()).unwrap_or_default()
    }

    fn output_signals(&self, port: PortId) -> Vec<Option<SignalId>> {
        self.ports.get(&port).map(|p| p.outputs.clone()).unwrap_or_default()
    }

    fn entity(&self, port: PortId) -> Option<&EntityId> {
        self.ports.get(&port).map(|p| &p.entity)
    }

    fn architecture(&self, port: PortId) -> Option<&ArchitectureId> {
        self.ports.get(&port).and_then(|p| p.architecture.as_ref())
    }

    fn has_property(&self, signal: SignalId, property: &PropertyId) -> bool {
        self.properties.get(&signal).is_some_and(|set| set.contains(property))
    }

    fn is_held(&self, signal: SignalId) -> bool {
        self.held.contains(&signal)
    }
}

/// Records first visits of signals and ports, in walk order.
#[derive(Debug, Default)]
pub struct RecordingVisitor {
    pub signals: Vec<SignalId>,
    pub leaves: Vec<SignalId>,
    pub ports: Vec<PortId>,
}

impl ScanVisitor for RecordingVisitor {
    fn enter_signal(
        &mut self,
        signal: SignalId,
        _parent: Option<PortId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        if !again {
            self.signals.push(signal);
        }
        Ok(Visit::Descend)
    }

    fn visit_leaf_signal(
        &mut self,
        signal: SignalId,
        _parent: Option<PortId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        if !again {
            self.leaves.push(signal);
        }
        Ok(Visit::Descend)
    }

    fn enter_port(
        &mut self,
        port: PortId,
        _parent: Option<SignalId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        if !again {
            self.ports.push(port);
        }
        Ok(Visit::Descend)
    }
}
