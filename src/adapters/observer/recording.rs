use crate::domain::command::SystemObserver;
use crate::domain::event::SystemEvent;
use crate::domain::graph::SignalSystem;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// One callback received by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObserverEntry {
    Attached,
    Detached,
    BeginInitialize,
    EndInitialize,
    Event(SystemEvent),
}

/// Records callbacks into a shared log; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<ObserverEntry>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ObserverEntry>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<ObserverEntry> {
        self.lock().clone()
    }

    /// Recorded system events, without the lifecycle callbacks.
    pub fn events(&self) -> Vec<SystemEvent> {
        self.lock()
            .iter()
            .filter_map(|entry| match entry {
                ObserverEntry::Event(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn take(&self) -> Vec<ObserverEntry> {
        std::mem::take(&mut *self.lock())
    }

    fn push(&self, entry: ObserverEntry) {
        self.lock().push(entry);
    }
}

impl SystemObserver for RecordingObserver {
    fn attached_to_system(&mut self, _system: &SignalSystem) {
        self.push(ObserverEntry::Attached);
    }

    fn detached_from_system(&mut self, _system: &SignalSystem) {
        self.push(ObserverEntry::Detached);
    }

    fn begin_initialize(&mut self) {
        self.push(ObserverEntry::BeginInitialize);
    }

    fn end_initialize(&mut self) {
        self.push(ObserverEntry::EndInitialize);
    }

    fn on_event(&mut self, event: &SystemEvent) {
        self.push(ObserverEntry::Event(event.clone()));
    }
}
