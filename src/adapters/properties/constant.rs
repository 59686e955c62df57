use crate::domain::ids::{EntityId, PropertyId, SignalId};
use crate::domain::ports::{GraphView, PropertyProvider};
use std::collections::BTreeSet;

/// Derives `property` for every signal driven by a port of one of `entities`.
///
/// Only the immediate driver is inspected.
#[derive(Debug, Clone)]
pub struct ConstantEntityProvider {
    property: PropertyId,
    entities: BTreeSet<EntityId>,
}

impl ConstantEntityProvider {
    pub fn new(
        property: impl Into<PropertyId>,
        entities: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        Self {
            property: property.into(),
            entities: entities.into_iter().collect(),
        }
    }

    /// `Constant` for outputs of `Std.Constant`.
    pub fn standard() -> Self {
        Self::new("Constant", [EntityId::from("Std.Constant")])
    }
}

impl PropertyProvider for ConstantEntityProvider {
    fn provides(&self, view: &dyn GraphView, signal: SignalId, property: &PropertyId) -> bool {
        *property == self.property
            && view
                .driven_by_port(signal)
                .and_then(|port| view.entity(port))
                .is_some_and(|entity| self.entities.contains(entity))
    }
}
