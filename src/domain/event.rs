//! Fine-grained mutation notifications raised by the signal system.

use crate::domain::ids::{BusId, PortId, SignalId};
use serde::Serialize;

/// One structural change of a `SignalSystem`.
///
/// Indices refer to the system's ordered lists (signals, buses, ports, system
/// inputs, system outputs) or to a port's positional slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SystemEvent {
    SignalAdded { signal: SignalId, index: usize },
    SignalRemoved { signal: SignalId, index: usize },
    SignalMoved { signal: SignalId, before: usize, after: usize },

    BusAdded { bus: BusId, index: usize },
    BusRemoved { bus: BusId, index: usize },
    BusMoved { bus: BusId, before: usize, after: usize },
    /// A removed signal left position `index` of the bus's member list.
    SignalLeftBus { bus: BusId, signal: SignalId, index: usize },

    PortAdded { port: PortId, index: usize },
    PortRemoved { port: PortId, index: usize },
    PortMoved { port: PortId, before: usize, after: usize },

    InputAdded { signal: SignalId, index: usize },
    InputRemoved { signal: SignalId, index: usize },
    InputMoved { signal: SignalId, before: usize, after: usize },

    OutputAdded { signal: SignalId, index: usize },
    OutputRemoved { signal: SignalId, index: usize },
    OutputMoved { signal: SignalId, before: usize, after: usize },

    PortDrivesSignal { port: PortId, signal: SignalId, slot: usize },
    PortDrivesSignalNoLonger { port: PortId, signal: SignalId, slot: usize },

    SignalDrivesPort { signal: SignalId, port: PortId, slot: usize },
    SignalDrivesPortNoLonger { signal: SignalId, port: PortId, slot: usize },

    BusAttachedToPort { bus: BusId, port: PortId, slot: usize },
    BusAttachedToPortNoLonger { bus: BusId, port: PortId, slot: usize },
}

/// Receiver of mutation notifications.
pub trait EventSink {
    fn emit(&mut self, event: SystemEvent);
}

impl EventSink for Vec<SystemEvent> {
    fn emit(&mut self, event: SystemEvent) {
        self.push(event);
    }
}

/// Sink used while nobody is listening (e.g. during initial construction).
pub struct DiscardEvents;

impl EventSink for DiscardEvents {
    fn emit(&mut self, _event: SystemEvent) {}
}
