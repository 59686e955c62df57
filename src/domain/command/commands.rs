use crate::domain::command::reference::CommandReference;
use crate::domain::error::CommandError;
use crate::domain::event::EventSink;
use crate::domain::graph::SignalSystem;
use crate::domain::ids::{ArchitectureId, EntityId, InstanceId, PropertyId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structural mutation, addressed through [`CommandReference`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandKind {
    NewSignal {
        #[serde(default)]
        label: Option<String>,
    },
    RemoveSignal {
        signal: CommandReference,
    },
    NewBus {
        name: String,
        #[serde(default)]
        signals: Vec<CommandReference>,
    },
    RemoveBus {
        bus: CommandReference,
    },
    NewPort {
        entity: EntityId,
        #[serde(default)]
        architecture: Option<ArchitectureId>,
        #[serde(default)]
        inputs: Vec<Option<CommandReference>>,
        #[serde(default)]
        outputs: Vec<Option<CommandReference>>,
        #[serde(default)]
        buses: Vec<Option<CommandReference>>,
    },
    RemovePort {
        port: CommandReference,
    },
    ReplaceInput {
        port: CommandReference,
        slot: usize,
        #[serde(default)]
        signal: Option<CommandReference>,
    },
    UndriveSignal {
        signal: CommandReference,
    },
    AttachBus {
        port: CommandReference,
        slot: usize,
        bus: CommandReference,
    },
    DetachBus {
        port: CommandReference,
        slot: usize,
    },
    AddInput {
        signal: CommandReference,
    },
    AddOutput {
        signal: CommandReference,
    },
    RemoveInput {
        signal: CommandReference,
    },
    RemoveOutput {
        signal: CommandReference,
    },
    SetSignalProperty {
        signal: CommandReference,
        property: PropertyId,
        present: bool,
    },
    SetSignalHold {
        signal: CommandReference,
        held: bool,
    },
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::NewSignal { .. } => "new_signal",
            CommandKind::RemoveSignal { .. } => "remove_signal",
            CommandKind::NewBus { .. } => "new_bus",
            CommandKind::RemoveBus { .. } => "remove_bus",
            CommandKind::NewPort { .. } => "new_port",
            CommandKind::RemovePort { .. } => "remove_port",
            CommandKind::ReplaceInput { .. } => "replace_input",
            CommandKind::UndriveSignal { .. } => "undrive_signal",
            CommandKind::AttachBus { .. } => "attach_bus",
            CommandKind::DetachBus { .. } => "detach_bus",
            CommandKind::AddInput { .. } => "add_input",
            CommandKind::AddOutput { .. } => "add_output",
            CommandKind::RemoveInput { .. } => "remove_input",
            CommandKind::RemoveOutput { .. } => "remove_output",
            CommandKind::SetSignalProperty { .. } => "set_signal_property",
            CommandKind::SetSignalHold { .. } => "set_signal_hold",
        }
    }

    /// Apply to `system`, returning the identity of a newly created element.
    fn apply(
        &self,
        system: &mut SignalSystem,
        sink: &mut dyn EventSink,
    ) -> Result<Option<InstanceId>, CommandError> {
        match self {
            CommandKind::NewSignal { label } => Ok(Some(system.add_signal(label.clone(), sink).0)),
            CommandKind::RemoveSignal { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.remove_signal(signal, sink).map(|_| None)
            }
            CommandKind::NewBus { name, signals } => {
                let signals = signals
                    .iter()
                    .map(|s| s.resolve_signal(system))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(system.add_bus(name.clone(), signals, sink)?.0))
            }
            CommandKind::RemoveBus { bus } => {
                let bus = bus.resolve_bus(system)?;
                system.remove_bus(bus, sink).map(|_| None)
            }
            CommandKind::NewPort {
                entity,
                architecture,
                inputs,
                outputs,
                buses,
            } => {
                let inputs = resolve_slots(inputs, |r| r.resolve_signal(system))?;
                let outputs = resolve_slots(outputs, |r| r.resolve_signal(system))?;
                let buses = resolve_slots(buses, |r| r.resolve_bus(system))?;
                let port = system.add_port(
                    entity.clone(),
                    architecture.clone(),
                    inputs,
                    outputs,
                    buses,
                    sink,
                )?;
                Ok(Some(port.0))
            }
            CommandKind::RemovePort { port } => {
                let port = port.resolve_port(system)?;
                system.remove_port(port, sink).map(|_| None)
            }
            CommandKind::ReplaceInput { port, slot, signal } => {
                let port = port.resolve_port(system)?;
                let signal = signal.map(|s| s.resolve_signal(system)).transpose()?;
                system.replace_input(port, *slot, signal, sink).map(|_| None)
            }
            CommandKind::UndriveSignal { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.undrive_signal(signal, sink).map(|_| None)
            }
            CommandKind::AttachBus { port, slot, bus } => {
                let port = port.resolve_port(system)?;
                let bus = bus.resolve_bus(system)?;
                system.attach_bus(port, *slot, bus, sink).map(|_| None)
            }
            CommandKind::DetachBus { port, slot } => {
                let port = port.resolve_port(system)?;
                system.detach_bus(port, *slot, sink).map(|_| None)
            }
            CommandKind::AddInput { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.add_input(signal, sink).map(|_| None)
            }
            CommandKind::AddOutput { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.add_output(signal, sink).map(|_| None)
            }
            CommandKind::RemoveInput { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.remove_input(signal, sink).map(|_| None)
            }
            CommandKind::RemoveOutput { signal } => {
                let signal = signal.resolve_signal(system)?;
                system.remove_output(signal, sink).map(|_| None)
            }
            CommandKind::SetSignalProperty {
                signal,
                property,
                present,
            } => {
                let signal = signal.resolve_signal(system)?;
                system.set_property(signal, property.clone(), *present).map(|_| None)
            }
            CommandKind::SetSignalHold { signal, held } => {
                let signal = signal.resolve_signal(system)?;
                system.set_hold(signal, *held).map(|_| None)
            }
        }
    }
}

fn resolve_slots<T>(
    slots: &[Option<CommandReference>],
    mut resolve: impl FnMut(&CommandReference) -> Result<T, CommandError>,
) -> Result<Vec<Option<T>>, CommandError> {
    slots
        .iter()
        .map(|slot| slot.as_ref().map(&mut resolve).transpose())
        .collect()
}

/// What [`Command::execute`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// The command had already run; nothing happened.
    AlreadyDone,
    Completed { created: Option<InstanceId> },
}

/// A queued mutation with at-most-once execution.
pub struct Command {
    kind: CommandKind,
    done: bool,
    on_completed: Option<Box<dyn FnOnce(Option<InstanceId>) + Send + Sync>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Self::new(kind)
    }
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            done: false,
            on_completed: None,
        }
    }

    /// Callback fired once, after the first successful execution.
    pub fn on_completed(
        mut self,
        callback: impl FnOnce(Option<InstanceId>) + Send + Sync + 'static,
    ) -> Self {
        self.on_completed = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// False once the command has run.
    pub fn begin_execute(&self) -> bool {
        !self.done
    }

    pub fn end_execute(&mut self, created: Option<InstanceId>) {
        self.done = true;
        if let Some(callback) = self.on_completed.take() {
            callback(created);
        }
    }

    /// Run against `system`. A failed command is left not done.
    pub fn execute(
        &mut self,
        system: &mut SignalSystem,
        sink: &mut dyn EventSink,
    ) -> Result<Execution, CommandError> {
        if !self.begin_execute() {
            return Ok(Execution::AlreadyDone);
        }
        let created = self.kind.apply(system, sink)?;
        self.end_execute(created);
        Ok(Execution::Completed { created })
    }
}
