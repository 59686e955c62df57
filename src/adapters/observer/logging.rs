use crate::domain::command::SystemObserver;
use crate::domain::event::SystemEvent;
use crate::domain::graph::SignalSystem;
use tracing::{debug, trace};

/// Logs every event at trace level.
#[derive(Debug, Default)]
pub struct TracingObserver {
    replaying: bool,
    replayed: usize,
}

impl SystemObserver for TracingObserver {
    fn attached_to_system(&mut self, system: &SignalSystem) {
        debug!(
            signals = system.signals().len(),
            ports = system.ports().len(),
            "tracing observer attached"
        );
    }

    fn begin_initialize(&mut self) {
        self.replaying = true;
        self.replayed = 0;
    }

    fn end_initialize(&mut self) {
        self.replaying = false;
        debug!(events = self.replayed, "replay finished");
    }

    fn on_event(&mut self, event: &SystemEvent) {
        if self.replaying {
            self.replayed += 1;
        }
        trace!(?event, replay = self.replaying, "system event");
    }
}
