use crate::domain::command::channel::{Channel, PushOutcome};
use crate::domain::command::commands::{Command, Execution};
use crate::domain::command::observer::{AttachOptions, ObserverHandle, SystemObserver};
use crate::domain::error::CommandError;
use crate::domain::event::{EventSink, SystemEvent};
use crate::domain::graph::SignalSystem;
use crate::domain::ids::InstanceId;
use crate::domain::ports::GraphView;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediatorOptions {
    /// Drain the channel as soon as it announces entries.
    pub auto_flush: bool,
    pub channel_enabled: bool,
}

impl Default for MediatorOptions {
    fn default() -> Self {
        Self {
            auto_flush: true,
            channel_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub command: &'static str,
    pub created: Option<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedCommand {
    pub command: &'static str,
    pub error: CommandError,
}

/// Outcome of draining the command channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub executed: Vec<ExecutedCommand>,
    pub aborted: Vec<AbortedCommand>,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.aborted.is_empty()
    }

    pub fn extend(&mut self, other: FlushReport) {
        self.executed.extend(other.executed);
        self.aborted.extend(other.aborted);
    }
}

struct ObserverSlot {
    handle: ObserverHandle,
    observer: Box<dyn SystemObserver>,
    options: AttachOptions,
}

struct Dispatcher<'a> {
    observers: &'a mut [ObserverSlot],
}

impl EventSink for Dispatcher<'_> {
    fn emit(&mut self, event: SystemEvent) {
        for slot in self.observers.iter_mut() {
            slot.observer.on_event(&event);
        }
    }
}

/// Owner of a [`SignalSystem`] that serializes its mutations through a
/// command channel and fans the resulting events out to observers.
pub struct Mediator {
    system: SignalSystem,
    channel: Channel<Command>,
    observers: Vec<ObserverSlot>,
    next_handle: u64,
    options: MediatorOptions,
    report: FlushReport,
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new(SignalSystem::new(), MediatorOptions::default())
    }
}

impl Mediator {
    pub fn new(system: SignalSystem, options: MediatorOptions) -> Self {
        Self {
            system,
            channel: Channel::new(options.channel_enabled),
            observers: Vec::new(),
            next_handle: 0,
            options,
            report: FlushReport::default(),
        }
    }

    pub fn system(&self) -> &SignalSystem {
        &self.system
    }

    pub fn options(&self) -> MediatorOptions {
        self.options
    }

    pub fn channel(&self) -> &Channel<Command> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut Channel<Command> {
        &mut self.channel
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Attach `observer`, replaying the current system into it if requested.
    pub fn attach(
        &mut self,
        mut observer: Box<dyn SystemObserver>,
        options: AttachOptions,
    ) -> ObserverHandle {
        self.next_handle += 1;
        let handle = ObserverHandle(self.next_handle);
        observer.attached_to_system(&self.system);
        if options.auto_initialize {
            replay(&self.system, observer.as_mut());
        }
        self.observers.push(ObserverSlot {
            handle,
            observer,
            options,
        });
        info!(observer = handle.0, observers = self.observers.len(), "observer attached");
        handle
    }

    pub fn detach(&mut self, handle: ObserverHandle) -> Option<Box<dyn SystemObserver>> {
        let position = self.observers.iter().position(|slot| slot.handle == handle)?;
        let mut slot = self.observers.remove(position);
        slot.observer.detached_from_system(&self.system);
        info!(observer = handle.0, observers = self.observers.len(), "observer detached");
        Some(slot.observer)
    }

    /// Queue `command`; drains right away when auto-flush is on and the
    /// channel just became non-empty.
    pub fn post_command(&mut self, command: impl Into<Command>) -> PushOutcome {
        let outcome = self.channel.push_entry(command.into());
        if outcome == PushOutcome::Notified && self.options.auto_flush {
            self.drain();
        }
        outcome
    }

    /// Drain the channel; reports every command run since the previous flush,
    /// including those drained automatically.
    pub fn flush(&mut self) -> FlushReport {
        self.drain();
        std::mem::take(&mut self.report)
    }

    fn drain(&mut self) {
        let mut batch = 0usize;
        while let Some(mut command) = self.channel.pop_entry() {
            batch += 1;
            let name = command.kind().name();
            let mut dispatcher = Dispatcher {
                observers: &mut self.observers,
            };
            match command.execute(&mut self.system, &mut dispatcher) {
                Ok(Execution::Completed { created }) => {
                    self.report.executed.push(ExecutedCommand { command: name, created });
                }
                Ok(Execution::AlreadyDone) => {}
                Err(error) => {
                    warn!(command = name, %error, "command aborted");
                    self.report.aborted.push(AbortedCommand { command: name, error });
                }
            }
        }
        if batch > 0 {
            debug!(commands = batch, "drained command channel");
        }
    }

    /// Swap in a new system.
    ///
    /// Pending commands run against the old system first. Observers attached
    /// with `auto_detach` are dropped; the others are moved over and, if they
    /// asked for it at attach time, re-initialized.
    pub fn replace_system(&mut self, system: SignalSystem) -> SignalSystem {
        self.drain();
        let old = std::mem::replace(&mut self.system, system);

        let mut kept = Vec::with_capacity(self.observers.len());
        for mut slot in std::mem::take(&mut self.observers) {
            slot.observer.detached_from_system(&old);
            if slot.options.auto_detach {
                debug!(observer = slot.handle.0, "observer auto-detached");
                continue;
            }
            slot.observer.attached_to_system(&self.system);
            if slot.options.auto_initialize {
                replay(&self.system, slot.observer.as_mut());
            }
            kept.push(slot);
        }
        self.observers = kept;
        info!(
            signals = self.system.signals().len(),
            ports = self.system.ports().len(),
            observers = self.observers.len(),
            "signal system replaced"
        );
        old
    }

    /// Hand the system back, detaching every observer.
    pub fn into_system(mut self) -> SignalSystem {
        for slot in &mut self.observers {
            slot.observer.detached_from_system(&self.system);
        }
        self.system
    }
}

/// Bring `observer` up to date with `system` as if it had watched it being built.
///
/// Order: signals, buses, ports, per-port edges (inputs, outputs, buses),
/// system inputs, system outputs.
pub fn replay(system: &SignalSystem, observer: &mut dyn SystemObserver) {
    observer.begin_initialize();
    for (index, signal) in system.signals().iter().enumerate() {
        observer.on_event(&SystemEvent::SignalAdded { signal: *signal, index });
    }
    for (index, bus) in system.buses().iter().enumerate() {
        observer.on_event(&SystemEvent::BusAdded { bus: *bus, index });
    }
    for (index, port) in system.ports().iter().enumerate() {
        observer.on_event(&SystemEvent::PortAdded { port: *port, index });
    }
    for port in system.ports().iter().copied() {
        for (slot, signal) in system.input_signals(port).into_iter().enumerate() {
            if let Some(signal) = signal {
                observer.on_event(&SystemEvent::SignalDrivesPort { signal, port, slot });
            }
        }
        for (slot, signal) in system.output_signals(port).into_iter().enumerate() {
            if let Some(signal) = signal {
                observer.on_event(&SystemEvent::PortDrivesSignal { port, signal, slot });
            }
        }
        for (slot, bus) in system.port_buses(port).into_iter().enumerate() {
            if let Some(bus) = bus {
                observer.on_event(&SystemEvent::BusAttachedToPort { bus, port, slot });
            }
        }
    }
    for (index, signal) in system.system_inputs().iter().enumerate() {
        observer.on_event(&SystemEvent::InputAdded { signal: *signal, index });
    }
    for (index, signal) in system.system_outputs().iter().enumerate() {
        observer.on_event(&SystemEvent::OutputAdded { signal: *signal, index });
    }
    observer.end_initialize();
}
