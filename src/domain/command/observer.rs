use crate::domain::event::SystemEvent;
use crate::domain::graph::SignalSystem;

/// External subscriber tracking a [`SignalSystem`] through a [`Mediator`].
///
/// During an initialization replay `on_event` receives the synthetic
/// `…Added` / edge events between `begin_initialize` and `end_initialize`.
///
/// [`Mediator`]: super::Mediator
pub trait SystemObserver: Send + Sync {
    fn attached_to_system(&mut self, _system: &SignalSystem) {}

    fn detached_from_system(&mut self, _system: &SignalSystem) {}

    fn begin_initialize(&mut self) {}

    fn end_initialize(&mut self) {}

    fn on_event(&mut self, event: &SystemEvent);
}

/// Handle returned by [`Mediator::attach`](super::Mediator::attach).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOptions {
    /// Replay the current system into the observer right away.
    pub auto_initialize: bool,
    /// Drop the observer when the mediator's system is replaced.
    pub auto_detach: bool,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            auto_initialize: true,
            auto_detach: false,
        }
    }
}
