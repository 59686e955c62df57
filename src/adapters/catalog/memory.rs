use crate::domain::description::EntityDescription;
use crate::domain::ids::EntityId;
use crate::domain::ports::{EntityCatalog, EntityDescriptor};
use std::collections::HashMap;

/// In-memory entity catalog
#[derive(Debug, Clone, Default)]
pub struct MapEntityCatalog {
    entities: HashMap<EntityId, EntityDescriptor>,
}

impl MapEntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arithmetic entities every system can use.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (id, inputs, outputs) in [
            ("Std.Constant", 0, 1),
            ("Std.Add", 2, 1),
            ("Std.Subtract", 2, 1),
            ("Std.Multiply", 2, 1),
            ("Std.Divide", 2, 1),
            ("Std.Negate", 1, 1),
            ("Std.Power", 2, 1),
            ("Std.Sine", 1, 1),
            ("Std.Cosine", 1, 1),
        ] {
            catalog.insert(EntityDescriptor {
                id: EntityId::from(id),
                input_arity: inputs,
                output_arity: outputs,
                bus_arity: 0,
            });
        }
        catalog
    }

    pub fn insert(&mut self, descriptor: EntityDescriptor) {
        self.entities.insert(descriptor.id.clone(), descriptor);
    }

    pub fn extend_from(&mut self, descriptions: &[EntityDescription]) {
        for description in descriptions {
            self.insert(EntityDescriptor {
                id: description.id.clone(),
                input_arity: description.inputs,
                output_arity: description.outputs,
                bus_arity: description.buses,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityCatalog for MapEntityCatalog {
    fn lookup(&self, id: &EntityId) -> Option<&EntityDescriptor> {
        self.entities.get(id)
    }
}
