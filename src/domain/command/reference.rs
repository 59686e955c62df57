use crate::domain::error::{CommandError, ElementKind};
use crate::domain::graph::SignalSystem;
use crate::domain::ids::{BusId, InstanceId, PortId, SignalId};
use serde::{Deserialize, Serialize};

/// Stand-in for a graph element inside a queued command.
///
/// `index` is the fast-path position in the system's ordered list; `id` is
/// the authoritative identity used to detect that the list was reordered
/// since the command was built. An empty `id` accepts whatever sits at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReference {
    #[serde(default = "empty_id")]
    pub id: InstanceId,
    pub index: usize,
}

fn empty_id() -> InstanceId {
    InstanceId::EMPTY
}

impl CommandReference {
    pub fn new(id: InstanceId, index: usize) -> Self {
        Self { id, index }
    }

    /// Reference by position only.
    pub fn at(index: usize) -> Self {
        Self::new(InstanceId::EMPTY, index)
    }

    pub fn signal(system: &SignalSystem, signal: SignalId) -> Option<Self> {
        system.signal_position(signal).map(|index| Self::new(signal.0, index))
    }

    pub fn port(system: &SignalSystem, port: PortId) -> Option<Self> {
        system.port_position(port).map(|index| Self::new(port.0, index))
    }

    pub fn bus(system: &SignalSystem, bus: BusId) -> Option<Self> {
        system.bus_position(bus).map(|index| Self::new(bus.0, index))
    }

    /// Accept `found` if `target` is the empty wildcard or equals it.
    pub fn lazy_verify(found: InstanceId, target: InstanceId) -> Result<(), CommandError> {
        if target.is_empty() || found == target {
            Ok(())
        } else {
            Err(CommandError::IdentityMismatch {
                expected: target,
                found,
            })
        }
    }

    pub fn resolve_signal(&self, system: &SignalSystem) -> Result<SignalId, CommandError> {
        let found = *self.lookup(system.signals(), ElementKind::Signal)?;
        Self::lazy_verify(found.0, self.id)?;
        Ok(found)
    }

    pub fn resolve_port(&self, system: &SignalSystem) -> Result<PortId, CommandError> {
        let found = *self.lookup(system.ports(), ElementKind::Port)?;
        Self::lazy_verify(found.0, self.id)?;
        Ok(found)
    }

    pub fn resolve_bus(&self, system: &SignalSystem) -> Result<BusId, CommandError> {
        let found = *self.lookup(system.buses(), ElementKind::Bus)?;
        Self::lazy_verify(found.0, self.id)?;
        Ok(found)
    }

    fn lookup<'a, T>(&self, list: &'a [T], kind: ElementKind) -> Result<&'a T, CommandError> {
        list.get(self.index).ok_or(CommandError::IndexOutOfRange {
            kind,
            index: self.index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::DiscardEvents;

    #[test]
    fn test_empty_target_is_a_wildcard() {
        assert!(CommandReference::lazy_verify(InstanceId(42), InstanceId::EMPTY).is_ok());
        assert!(CommandReference::lazy_verify(InstanceId(42), InstanceId(42)).is_ok());
        assert_eq!(
            CommandReference::lazy_verify(InstanceId(42), InstanceId(7)),
            Err(CommandError::IdentityMismatch {
                expected: InstanceId(7),
                found: InstanceId(42)
            })
        );
    }

    #[test]
    fn test_reordering_is_detected() {
        let mut system = SignalSystem::new();
        let a = system.add_signal(None, &mut DiscardEvents);
        let b = system.add_signal(None, &mut DiscardEvents);
        let to_b = CommandReference::signal(&system, b).unwrap();
        assert_eq!(to_b.resolve_signal(&system), Ok(b));

        system.remove_signal(a, &mut DiscardEvents).unwrap();
        assert!(matches!(
            to_b.resolve_signal(&system),
            Err(CommandError::IndexOutOfRange { index: 1, .. })
        ));
        assert_eq!(CommandReference::new(b.0, 0).resolve_signal(&system), Ok(b));
        assert_eq!(CommandReference::at(0).resolve_signal(&system), Ok(b));
    }
}
