use crate::domain::description::SystemDescription;
use crate::domain::event::DiscardEvents;
use crate::domain::graph::SignalSystem;
use crate::domain::ids::{BusId, PropertyId, SignalId};
use crate::domain::network::DiscriminationNetwork;
use crate::domain::ports::EntityCatalog;
use anyhow::{Context as _, Result, anyhow, bail};
use std::collections::HashMap;
use tracing::debug;

/// System builder - Domain Service turning a [`SystemDescription`] into a [`SignalSystem`]
///
/// Construction runs before any observer exists, so no events are emitted.
pub struct SystemBuilder<'a> {
    catalog: Option<&'a dyn EntityCatalog>,
}

impl Default for SystemBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SystemBuilder<'a> {
    pub fn new() -> Self {
        Self { catalog: None }
    }

    /// Validate port arities against `catalog`.
    pub fn with_catalog(catalog: &'a dyn EntityCatalog) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    /// Three-pass build strategy
    pub fn build(&self, description: &SystemDescription) -> Result<SignalSystem> {
        let mut system = SignalSystem::new();
        let mut sink = DiscardEvents;

        // Pass 1: Signals
        let mut signals: HashMap<&str, SignalId> =
            HashMap::with_capacity(description.signals.len());
        for signal in &description.signals {
            if signals.contains_key(signal.label.as_str()) {
                bail!("Duplicate signal label: {}", signal.label);
            }
            let id = system.add_signal(Some(signal.label.clone()), &mut sink);
            for property in &signal.properties {
                system.set_property(id, PropertyId::new(property.as_str()), true)?;
            }
            system.set_hold(id, signal.held)?;
            signals.insert(signal.label.as_str(), id);
        }
        let lookup = |label: &str| -> Result<SignalId> {
            signals
                .get(label)
                .copied()
                .ok_or_else(|| anyhow!("Unknown signal label: {}", label))
        };

        // Pass 2: Buses
        let mut buses: HashMap<&str, BusId> = HashMap::with_capacity(description.buses.len());
        for bus in &description.buses {
            let members = bus
                .signals
                .iter()
                .map(|label| lookup(label.as_str()))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Failed to resolve bus {}", bus.name))?;
            let id = system.add_bus(bus.name.clone(), members, &mut sink)?;
            buses.insert(bus.name.as_str(), id);
        }

        // Pass 3: Ports and system boundary
        for (index, port) in description.ports.iter().enumerate() {
            if let Some(catalog) = self.catalog {
                let entity = catalog.find_entity(&port.entity)?;
                if entity.input_arity != port.inputs.len()
                    || entity.output_arity != port.outputs.len()
                    || entity.bus_arity != port.buses.len()
                {
                    bail!(
                        "Port #{} ({}) has arity {}/{}/{}, entity expects {}/{}/{}",
                        index,
                        port.entity,
                        port.inputs.len(),
                        port.outputs.len(),
                        port.buses.len(),
                        entity.input_arity,
                        entity.output_arity,
                        entity.bus_arity
                    );
                }
            }
            let inputs = port
                .inputs
                .iter()
                .map(|label| label.as_deref().map(lookup).transpose())
                .collect::<Result<Vec<_>>>()?;
            let outputs = port
                .outputs
                .iter()
                .map(|label| label.as_deref().map(lookup).transpose())
                .collect::<Result<Vec<_>>>()?;
            let port_buses = port
                .buses
                .iter()
                .map(|name| {
                    name.as_deref()
                        .map(|name| {
                            buses
                                .get(name)
                                .copied()
                                .ok_or_else(|| anyhow!("Unknown bus: {}", name))
                        })
                        .transpose()
                })
                .collect::<Result<Vec<_>>>()?;
            system
                .add_port(
                    port.entity.clone(),
                    port.architecture.clone(),
                    inputs,
                    outputs,
                    port_buses,
                    &mut sink,
                )
                .with_context(|| {
                    format!("Failed to instantiate port #{} ({})", index, port.entity)
                })?;
        }
        for label in &description.inputs {
            system.add_input(lookup(label.as_str())?, &mut sink)?;
        }
        for label in &description.outputs {
            system.add_output(lookup(label.as_str())?, &mut sink)?;
        }

        debug!(
            signals = system.signals().len(),
            buses = system.buses().len(),
            ports = system.ports().len(),
            "built signal system"
        );
        Ok(system)
    }

    /// Compile and register every pattern of `description`.
    pub fn build_network(&self, description: &SystemDescription) -> Result<DiscriminationNetwork> {
        let mut network = DiscriminationNetwork::new();
        for pattern in &description.patterns {
            let compiled = pattern
                .compile()
                .with_context(|| format!("Failed to compile pattern {}", pattern.id))?;
            network.register(compiled)?;
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::description::{PortDescription, SignalDescription};
    use crate::domain::ids::EntityId;
    use crate::domain::ports::GraphView;

    fn signal(label: &str) -> SignalDescription {
        SignalDescription {
            label: label.into(),
            properties: Vec::new(),
            held: false,
        }
    }

    #[test]
    fn test_build_resolves_labels() {
        let description = SystemDescription {
            signals: vec![signal("a"), signal("b")],
            ports: vec![PortDescription {
                entity: EntityId::from("Std.Negate"),
                architecture: None,
                inputs: vec![Some("a".into())],
                outputs: vec![Some("b".into())],
                buses: Vec::new(),
            }],
            inputs: vec!["a".into()],
            outputs: vec!["b".into()],
            ..SystemDescription::default()
        };
        let system = SystemBuilder::new().build(&description).unwrap();
        let a = system.find_signal_by_label("a").unwrap();
        let b = system.find_signal_by_label("b").unwrap();
        let port = system.driven_by_port(b).unwrap();
        assert_eq!(system.input_signals(port), vec![Some(a)]);
        assert_eq!(system.system_inputs(), &[a]);
        assert_eq!(system.system_outputs(), &[b]);
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let description = SystemDescription {
            signals: vec![signal("a")],
            outputs: vec!["missing".into()],
            ..SystemDescription::default()
        };
        let err = SystemBuilder::new().build(&description).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_duplicate_label_is_an_error() {
        let description = SystemDescription {
            signals: vec![signal("a"), signal("a")],
            ..SystemDescription::default()
        };
        assert!(SystemBuilder::new().build(&description).is_err());
    }
}
