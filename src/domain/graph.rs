use crate::domain::edge::EdgeKind;
use crate::domain::error::{CommandError, ElementKind, NotFound, SlotKind};
use crate::domain::event::{EventSink, SystemEvent};
use crate::domain::ids::{ArchitectureId, BusId, EntityId, InstanceId, PortId, PropertyId, SignalId};
use crate::domain::node::{BusNode, GraphNode, PortNode, SignalNode};
use crate::domain::ports::{GraphView, PropertyProvider};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Signal System - the core data structure
///
/// Nodes live in a stable graph so that removals never invalidate the indices
/// of other nodes. The ordered lists are what observers and command
/// references see: removing an element shifts every later element down by one.
#[derive(Clone, Default)]
pub struct SignalSystem {
    /// Signals, ports and buses with their positional edges
    graph: StableDiGraph<GraphNode, EdgeKind>,

    /// Mapping from instance identity to graph node
    index_of: HashMap<InstanceId, NodeIndex>,

    signals: Vec<SignalId>,
    buses: Vec<BusId>,
    ports: Vec<PortId>,
    inputs: Vec<SignalId>,
    outputs: Vec<SignalId>,

    next_id: u64,
    providers: Vec<Arc<dyn PropertyProvider>>,
}

impl std::fmt::Debug for SignalSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSystem")
            .field("signals", &self.signals)
            .field("buses", &self.buses)
            .field("ports", &self.ports)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("edges", &self.graph.edge_count())
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl SignalSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property_provider(&mut self, provider: Arc<dyn PropertyProvider>) {
        self.providers.push(provider);
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn signals(&self) -> &[SignalId] {
        &self.signals
    }

    pub fn buses(&self) -> &[BusId] {
        &self.buses
    }

    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Signals promoted to system inputs, in promotion order.
    pub fn system_inputs(&self) -> &[SignalId] {
        &self.inputs
    }

    /// Signals promoted to system outputs, in promotion order.
    pub fn system_outputs(&self) -> &[SignalId] {
        &self.outputs
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn signal(&self, id: SignalId) -> Option<&SignalNode> {
        self.node(id.0).and_then(GraphNode::as_signal)
    }

    pub fn port(&self, id: PortId) -> Option<&PortNode> {
        self.node(id.0).and_then(GraphNode::as_port)
    }

    pub fn bus(&self, id: BusId) -> Option<&BusNode> {
        self.node(id.0).and_then(GraphNode::as_bus)
    }

    pub fn node(&self, id: InstanceId) -> Option<&GraphNode> {
        let idx = self.index_of.get(&id)?;
        self.graph.node_weight(*idx)
    }

    pub fn signal_position(&self, id: SignalId) -> Option<usize> {
        self.signals.iter().position(|s| *s == id)
    }

    pub fn port_position(&self, id: PortId) -> Option<usize> {
        self.ports.iter().position(|p| *p == id)
    }

    pub fn bus_position(&self, id: BusId) -> Option<usize> {
        self.buses.iter().position(|b| *b == id)
    }

    /// Ports consuming `signal`, with the input slot it is bound to.
    pub fn consumers(&self, signal: SignalId) -> Vec<(PortId, usize)> {
        let Some(&idx) = self.index_of.get(&signal.0) else {
            return Vec::new();
        };
        let mut consumers: Vec<(PortId, usize)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| match edge.weight() {
                EdgeKind::Feeds(slot) => self.port_id_at(edge.target()).map(|p| (p, *slot)),
                _ => None,
            })
            .collect();
        consumers.sort();
        consumers
    }

    /// Ordered bus slots of `port`.
    pub fn port_buses(&self, port: PortId) -> Vec<Option<BusId>> {
        let Some(node) = self.port(port) else {
            return Vec::new();
        };
        let mut slots = vec![None; node.bus_arity];
        if let Some(&idx) = self.index_of.get(&port.0) {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                if let EdgeKind::Attaches(slot) = edge.weight()
                    && let Some(GraphNode::Bus(bus)) = self.graph.node_weight(edge.source())
                    && *slot < slots.len()
                {
                    slots[*slot] = Some(bus.id);
                }
            }
        }
        slots
    }

    /// Look up a signal by its label.
    pub fn find_signal_by_label(&self, label: &str) -> Result<SignalId, NotFound> {
        self.signals
            .iter()
            .copied()
            .find(|id| {
                self.signal(*id)
                    .and_then(|s| s.label.as_deref())
                    .is_some_and(|l| l == label)
            })
            .ok_or_else(|| NotFound::Signal(label.to_string()))
    }

    pub fn find_bus_by_name(&self, name: &str) -> Result<BusId, NotFound> {
        self.buses
            .iter()
            .copied()
            .find(|id| self.bus(*id).is_some_and(|b| b.name == name))
            .ok_or_else(|| NotFound::Bus(name.to_string()))
    }

    fn port_id_at(&self, idx: NodeIndex) -> Option<PortId> {
        self.graph.node_weight(idx).and_then(GraphNode::as_port).map(|p| p.id)
    }

    fn signal_id_at(&self, idx: NodeIndex) -> Option<SignalId> {
        self.graph
            .node_weight(idx)
            .and_then(GraphNode::as_signal)
            .map(|s| s.id)
    }

    // ------------------------------------------------------------------
    // Mutators (driven by the command layer and the system builder)
    // ------------------------------------------------------------------

    fn allocate(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    fn require(&self, kind: ElementKind, id: InstanceId) -> Result<NodeIndex, CommandError> {
        let idx = self
            .index_of
            .get(&id)
            .copied()
            .ok_or(CommandError::UnknownElement { kind, id })?;
        let matches_kind = match (kind, self.graph.node_weight(idx)) {
            (ElementKind::Signal, Some(GraphNode::Signal(_)))
            | (ElementKind::Port, Some(GraphNode::Port(_)))
            | (ElementKind::Bus, Some(GraphNode::Bus(_))) => true,
            _ => false,
        };
        if matches_kind {
            Ok(idx)
        } else {
            Err(CommandError::UnknownElement { kind, id })
        }
    }

    fn require_port(&self, port: PortId) -> Result<(NodeIndex, &PortNode), CommandError> {
        let idx = self.require(ElementKind::Port, port.0)?;
        let node = self
            .graph
            .node_weight(idx)
            .and_then(GraphNode::as_port)
            .ok_or(CommandError::UnknownElement {
                kind: ElementKind::Port,
                id: port.0,
            })?;
        Ok((idx, node))
    }

    fn slot_edge(&self, node: NodeIndex, dir: Direction, wanted: EdgeKind) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(node, dir)
            .find(|edge| *edge.weight() == wanted)
            .map(|edge| edge.id())
    }

    pub(crate) fn add_signal(
        &mut self,
        label: Option<String>,
        sink: &mut dyn EventSink,
    ) -> SignalId {
        let id = SignalId(self.allocate());
        let idx = self.graph.add_node(GraphNode::Signal(SignalNode::new(id, label)));
        self.index_of.insert(id.0, idx);
        self.signals.push(id);
        sink.emit(SystemEvent::SignalAdded {
            signal: id,
            index: self.signals.len() - 1,
        });
        id
    }

    pub(crate) fn remove_signal(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let idx = self.require(ElementKind::Signal, signal.0)?;

        if self.driven_by_port(signal).is_some() {
            self.undrive_signal(signal, sink)?;
        }
        for (port, slot) in self.consumers(signal) {
            self.replace_input(port, slot, None, sink)?;
        }
        if self.inputs.contains(&signal) {
            self.remove_input(signal, sink)?;
        }
        if self.outputs.contains(&signal) {
            self.remove_output(signal, sink)?;
        }
        for bus in self.buses.clone() {
            if let Some(&bus_idx) = self.index_of.get(&bus.0)
                && let Some(GraphNode::Bus(node)) = self.graph.node_weight_mut(bus_idx)
            {
                // Highest position first so earlier indices stay valid.
                while let Some(index) = node.signals.iter().rposition(|s| *s == signal) {
                    sink.emit(SystemEvent::SignalLeftBus { bus, signal, index });
                    node.signals.remove(index);
                }
            }
        }

        let index = self
            .signal_position(signal)
            .ok_or(CommandError::UnknownElement {
                kind: ElementKind::Signal,
                id: signal.0,
            })?;
        sink.emit(SystemEvent::SignalRemoved { signal, index });
        self.signals.remove(index);
        self.graph.remove_node(idx);
        self.index_of.remove(&signal.0);
        for (after, moved) in self.signals.iter().enumerate().skip(index) {
            sink.emit(SystemEvent::SignalMoved {
                signal: *moved,
                before: after + 1,
                after,
            });
        }
        Ok(())
    }

    pub(crate) fn add_bus(
        &mut self,
        name: String,
        signals: Vec<SignalId>,
        sink: &mut dyn EventSink,
    ) -> Result<BusId, CommandError> {
        for signal in &signals {
            self.require(ElementKind::Signal, signal.0)?;
        }
        let id = BusId(self.allocate());
        let idx = self.graph.add_node(GraphNode::Bus(BusNode { id, name, signals }));
        self.index_of.insert(id.0, idx);
        self.buses.push(id);
        sink.emit(SystemEvent::BusAdded {
            bus: id,
            index: self.buses.len() - 1,
        });
        Ok(id)
    }

    pub(crate) fn remove_bus(
        &mut self,
        bus: BusId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let idx = self.require(ElementKind::Bus, bus.0)?;
        let attachments: Vec<(PortId, usize)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| match edge.weight() {
                EdgeKind::Attaches(slot) => self.port_id_at(edge.target()).map(|p| (p, *slot)),
                _ => None,
            })
            .collect();
        for (port, slot) in attachments {
            self.detach_bus(port, slot, sink)?;
        }

        let index = self.bus_position(bus).ok_or(CommandError::UnknownElement {
            kind: ElementKind::Bus,
            id: bus.0,
        })?;
        sink.emit(SystemEvent::BusRemoved { bus, index });
        self.buses.remove(index);
        self.graph.remove_node(idx);
        self.index_of.remove(&bus.0);
        for (after, moved) in self.buses.iter().enumerate().skip(index) {
            sink.emit(SystemEvent::BusMoved {
                bus: *moved,
                before: after + 1,
                after,
            });
        }
        Ok(())
    }

    /// Instantiate a port. Arity is taken from the slot vectors and fixed from here on.
    pub(crate) fn add_port(
        &mut self,
        entity: EntityId,
        architecture: Option<ArchitectureId>,
        inputs: Vec<Option<SignalId>>,
        outputs: Vec<Option<SignalId>>,
        buses: Vec<Option<BusId>>,
        sink: &mut dyn EventSink,
    ) -> Result<PortId, CommandError> {
        for signal in inputs.iter().chain(outputs.iter()).flatten() {
            self.require(ElementKind::Signal, signal.0)?;
        }
        for bus in buses.iter().flatten() {
            self.require(ElementKind::Bus, bus.0)?;
        }
        for (slot, signal) in outputs.iter().enumerate() {
            let Some(signal) = signal else { continue };
            if let Some(port) = self.driven_by_port(*signal) {
                return Err(CommandError::AlreadyDriven { signal: *signal, port });
            }
            if outputs[..slot].contains(&Some(*signal)) {
                return Err(CommandError::AlreadyDriven {
                    signal: *signal,
                    port: PortId(InstanceId::EMPTY),
                });
            }
        }

        let id = PortId(self.allocate());
        let idx = self.graph.add_node(GraphNode::Port(PortNode {
            id,
            entity,
            architecture,
            input_arity: inputs.len(),
            output_arity: outputs.len(),
            bus_arity: buses.len(),
        }));
        self.index_of.insert(id.0, idx);
        self.ports.push(id);
        sink.emit(SystemEvent::PortAdded {
            port: id,
            index: self.ports.len() - 1,
        });

        for (slot, signal) in inputs.into_iter().enumerate() {
            if let Some(signal) = signal {
                self.replace_input(id, slot, Some(signal), sink)?;
            }
        }
        for (slot, signal) in outputs.into_iter().enumerate() {
            if let Some(signal) = signal {
                self.drive_signal(id, slot, signal, sink)?;
            }
        }
        for (slot, bus) in buses.into_iter().enumerate() {
            if let Some(bus) = bus {
                self.attach_bus(id, slot, bus, sink)?;
            }
        }
        Ok(id)
    }

    /// Remove a port; every signal it drove is left explicitly undriven.
    pub(crate) fn remove_port(
        &mut self,
        port: PortId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let (idx, _) = self.require_port(port)?;

        for signal in self.output_signals(port).into_iter().flatten() {
            self.undrive_signal(signal, sink)?;
        }
        for (slot, signal) in self.input_signals(port).into_iter().enumerate() {
            if signal.is_some() {
                self.replace_input(port, slot, None, sink)?;
            }
        }
        for (slot, bus) in self.port_buses(port).into_iter().enumerate() {
            if bus.is_some() {
                self.detach_bus(port, slot, sink)?;
            }
        }

        let index = self.port_position(port).ok_or(CommandError::UnknownElement {
            kind: ElementKind::Port,
            id: port.0,
        })?;
        sink.emit(SystemEvent::PortRemoved { port, index });
        self.ports.remove(index);
        self.graph.remove_node(idx);
        self.index_of.remove(&port.0);
        for (after, moved) in self.ports.iter().enumerate().skip(index) {
            sink.emit(SystemEvent::PortMoved {
                port: *moved,
                before: after + 1,
                after,
            });
        }
        Ok(())
    }

    /// Rebind (or unbind, with `None`) input slot `slot` of `port`.
    pub(crate) fn replace_input(
        &mut self,
        port: PortId,
        slot: usize,
        signal: Option<SignalId>,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let (port_idx, node) = self.require_port(port)?;
        let arity = node.input_arity;
        if slot >= arity {
            return Err(CommandError::SlotOutOfRange {
                port,
                kind: SlotKind::Input,
                slot,
                arity,
            });
        }
        let new_idx = match signal {
            Some(signal) => Some(self.require(ElementKind::Signal, signal.0)?),
            None => None,
        };

        if let Some(edge) = self.slot_edge(port_idx, Direction::Incoming, EdgeKind::Feeds(slot))
            && let Some((source, _)) = self.graph.edge_endpoints(edge)
        {
            let previous = self.signal_id_at(source);
            self.graph.remove_edge(edge);
            if let Some(previous) = previous {
                sink.emit(SystemEvent::SignalDrivesPortNoLonger {
                    signal: previous,
                    port,
                    slot,
                });
            }
        }
        if let (Some(signal), Some(new_idx)) = (signal, new_idx) {
            self.graph.add_edge(new_idx, port_idx, EdgeKind::Feeds(slot));
            sink.emit(SystemEvent::SignalDrivesPort { signal, port, slot });
        }
        Ok(())
    }

    /// Bind `signal` to output slot `slot` of `port`, making the port its driver.
    pub(crate) fn drive_signal(
        &mut self,
        port: PortId,
        slot: usize,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let (port_idx, node) = self.require_port(port)?;
        let arity = node.output_arity;
        if slot >= arity {
            return Err(CommandError::SlotOutOfRange {
                port,
                kind: SlotKind::Output,
                slot,
                arity,
            });
        }
        let signal_idx = self.require(ElementKind::Signal, signal.0)?;
        if let Some(driver) = self.driven_by_port(signal) {
            return Err(CommandError::AlreadyDriven { signal, port: driver });
        }
        if let Some(edge) = self.slot_edge(port_idx, Direction::Outgoing, EdgeKind::Drives(slot))
            && let Some((_, target)) = self.graph.edge_endpoints(edge)
            && let Some(previous) = self.signal_id_at(target)
        {
            self.undrive_signal(previous, sink)?;
        }
        self.graph.add_edge(port_idx, signal_idx, EdgeKind::Drives(slot));
        sink.emit(SystemEvent::PortDrivesSignal { port, signal, slot });
        Ok(())
    }

    /// Remove the driving edge of `signal`; the signal is left undriven.
    pub(crate) fn undrive_signal(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let idx = self.require(ElementKind::Signal, signal.0)?;
        let driving = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                EdgeKind::Drives(slot) => {
                    self.port_id_at(edge.source()).map(|p| (edge.id(), p, *slot))
                }
                _ => None,
            });
        let Some((edge, port, slot)) = driving else {
            return Err(CommandError::NotDriven { signal });
        };
        sink.emit(SystemEvent::PortDrivesSignalNoLonger { port, signal, slot });
        self.graph.remove_edge(edge);
        Ok(())
    }

    pub(crate) fn attach_bus(
        &mut self,
        port: PortId,
        slot: usize,
        bus: BusId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let (port_idx, node) = self.require_port(port)?;
        let arity = node.bus_arity;
        if slot >= arity {
            return Err(CommandError::SlotOutOfRange {
                port,
                kind: SlotKind::Bus,
                slot,
                arity,
            });
        }
        let bus_idx = self.require(ElementKind::Bus, bus.0)?;
        if self
            .slot_edge(port_idx, Direction::Incoming, EdgeKind::Attaches(slot))
            .is_some()
        {
            self.detach_bus(port, slot, sink)?;
        }
        self.graph.add_edge(bus_idx, port_idx, EdgeKind::Attaches(slot));
        sink.emit(SystemEvent::BusAttachedToPort { bus, port, slot });
        Ok(())
    }

    pub(crate) fn detach_bus(
        &mut self,
        port: PortId,
        slot: usize,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let (port_idx, node) = self.require_port(port)?;
        let arity = node.bus_arity;
        let attached = self.slot_edge(port_idx, Direction::Incoming, EdgeKind::Attaches(slot));
        let Some(edge) = attached else {
            return Err(CommandError::SlotOutOfRange {
                port,
                kind: SlotKind::Bus,
                slot,
                arity,
            });
        };
        let bus = self
            .graph
            .edge_endpoints(edge)
            .and_then(|(source, _)| self.graph.node_weight(source))
            .and_then(GraphNode::as_bus)
            .map(|b| b.id);
        if let Some(bus) = bus {
            sink.emit(SystemEvent::BusAttachedToPortNoLonger { bus, port, slot });
        }
        self.graph.remove_edge(edge);
        Ok(())
    }

    pub(crate) fn add_input(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        self.require(ElementKind::Signal, signal.0)?;
        if self.inputs.contains(&signal) {
            return Err(CommandError::AlreadyPromoted {
                signal,
                kind: SlotKind::Input,
            });
        }
        self.inputs.push(signal);
        sink.emit(SystemEvent::InputAdded {
            signal,
            index: self.inputs.len() - 1,
        });
        Ok(())
    }

    pub(crate) fn remove_input(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let index = self
            .inputs
            .iter()
            .position(|s| *s == signal)
            .ok_or(CommandError::NotPromoted {
                signal,
                kind: SlotKind::Input,
            })?;
        sink.emit(SystemEvent::InputRemoved { signal, index });
        self.inputs.remove(index);
        for (after, moved) in self.inputs.iter().enumerate().skip(index) {
            sink.emit(SystemEvent::InputMoved {
                signal: *moved,
                before: after + 1,
                after,
            });
        }
        Ok(())
    }

    pub(crate) fn add_output(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        self.require(ElementKind::Signal, signal.0)?;
        if self.outputs.contains(&signal) {
            return Err(CommandError::AlreadyPromoted {
                signal,
                kind: SlotKind::Output,
            });
        }
        self.outputs.push(signal);
        sink.emit(SystemEvent::OutputAdded {
            signal,
            index: self.outputs.len() - 1,
        });
        Ok(())
    }

    pub(crate) fn remove_output(
        &mut self,
        signal: SignalId,
        sink: &mut dyn EventSink,
    ) -> Result<(), CommandError> {
        let index = self
            .outputs
            .iter()
            .position(|s| *s == signal)
            .ok_or(CommandError::NotPromoted {
                signal,
                kind: SlotKind::Output,
            })?;
        sink.emit(SystemEvent::OutputRemoved { signal, index });
        self.outputs.remove(index);
        for (after, moved) in self.outputs.iter().enumerate().skip(index) {
            sink.emit(SystemEvent::OutputMoved {
                signal: *moved,
                before: after + 1,
                after,
            });
        }
        Ok(())
    }

    pub(crate) fn set_property(
        &mut self,
        signal: SignalId,
        property: PropertyId,
        present: bool,
    ) -> Result<(), CommandError> {
        let node = self.signal_mut(signal)?;
        if present {
            node.properties.insert(property);
        } else {
            node.properties.remove(&property);
        }
        Ok(())
    }

    pub(crate) fn set_hold(&mut self, signal: SignalId, held: bool) -> Result<(), CommandError> {
        self.signal_mut(signal)?.held = held;
        Ok(())
    }

    fn signal_mut(&mut self, signal: SignalId) -> Result<&mut SignalNode, CommandError> {
        let idx = self.require(ElementKind::Signal, signal.0)?;
        match self.graph.node_weight_mut(idx) {
            Some(GraphNode::Signal(node)) => Ok(node),
            _ => Err(CommandError::UnknownElement {
                kind: ElementKind::Signal,
                id: signal.0,
            }),
        }
    }
}

impl GraphView for SignalSystem {
    fn driven_by_port(&self, signal: SignalId) -> Option<PortId> {
        let idx = *self.index_of.get(&signal.0)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .find(|edge| matches!(edge.weight(), EdgeKind::Drives(_)))
            .and_then(|edge| self.port_id_at(edge.source()))
    }

    fn input_signals(&self, port: PortId) -> Vec<Option<SignalId>> {
        let Some(node) = self.port(port) else {
            return Vec::new();
        };
        let mut slots = vec![None; node.input_arity];
        if let Some(&idx) = self.index_of.get(&port.0) {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                if let EdgeKind::Feeds(slot) = edge.weight()
                    && *slot < slots.len()
                {
                    slots[*slot] = self.signal_id_at(edge.source());
                }
            }
        }
        slots
    }

    fn output_signals(&self, port: PortId) -> Vec<Option<SignalId>> {
        let Some(node) = self.port(port) else {
            return Vec::new();
        };
        let mut slots = vec![None; node.output_arity];
        if let Some(&idx) = self.index_of.get(&port.0) {
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                if let EdgeKind::Drives(slot) = edge.weight()
                    && *slot < slots.len()
                {
                    slots[*slot] = self.signal_id_at(edge.target());
                }
            }
        }
        slots
    }

    fn entity(&self, port: PortId) -> Option<&EntityId> {
        self.port(port).map(|p| &p.entity)
    }

    fn architecture(&self, port: PortId) -> Option<&ArchitectureId> {
        self.port(port).and_then(|p| p.architecture.as_ref())
    }

    fn has_property(&self, signal: SignalId, property: &PropertyId) -> bool {
        self.signal(signal).is_some_and(|s| s.has_property(property))
    }

    fn ask_for_property(&self, signal: SignalId, property: &PropertyId) -> bool {
        self.has_property(signal, property)
            || self
                .providers
                .iter()
                .any(|provider| provider.provides(self, signal, property))
    }

    fn is_held(&self, signal: SignalId) -> bool {
        self.signal(signal).is_some_and(|s| s.held)
    }
}
