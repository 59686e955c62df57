use crate::domain::description::SystemDescription;
use crate::domain::error::NotFound;
use crate::domain::ids::{ArchitectureId, EntityId, PortId, PropertyId, SignalId};
use anyhow::Result;

/// Read-only view of the dataflow graph (implemented by `SignalSystem`, mocked in tests).
///
/// This is everything the condition algebra, the discrimination network and the
/// traversal engine need from the graph. All methods are pure accessors.
pub trait GraphView {
    /// The port driving `signal`, if any.
    fn driven_by_port(&self, signal: SignalId) -> Option<PortId>;

    /// Ordered input slots of `port`; a slot is `None` when nothing is bound to it.
    fn input_signals(&self, port: PortId) -> Vec<Option<SignalId>>;

    /// Ordered output slots of `port`.
    fn output_signals(&self, port: PortId) -> Vec<Option<SignalId>>;

    fn entity(&self, port: PortId) -> Option<&EntityId>;

    fn architecture(&self, port: PortId) -> Option<&ArchitectureId>;

    /// Plain membership test on the signal's own property set.
    fn has_property(&self, signal: SignalId, property: &PropertyId) -> bool;

    /// Membership test that may also consult derived-property providers.
    fn ask_for_property(&self, signal: SignalId, property: &PropertyId) -> bool {
        self.has_property(signal, property)
    }

    fn is_held(&self, _signal: SignalId) -> bool {
        false
    }
}

/// Derived-property provider port (implemented by adapters)
pub trait PropertyProvider: Send + Sync {
    /// Returns true if `signal` carries `property` by derivation.
    ///
    /// Implementations must not recurse into `ask_for_property` along the graph;
    /// cyclic graphs would never terminate.
    fn provides(&self, view: &dyn GraphView, signal: SignalId, property: &PropertyId) -> bool;
}

/// Static description of an entity, as far as the core needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub id: EntityId,
    pub input_arity: usize,
    pub output_arity: usize,
    pub bus_arity: usize,
}

/// Entity catalog port (the template library is an external collaborator)
pub trait EntityCatalog: Send + Sync {
    fn lookup(&self, id: &EntityId) -> Option<&EntityDescriptor>;

    fn find_entity(&self, id: &EntityId) -> Result<&EntityDescriptor, NotFound> {
        self.lookup(id).ok_or_else(|| NotFound::Entity(id.clone()))
    }
}

/// System description source port (implemented by Infrastructure)
pub trait SystemSource {
    fn load(&self) -> Result<SystemDescription>;
}
