//! Command/observer layer: every structural change to a signal system is
//! queued as a command and announced to observers as events.

pub mod channel;
pub mod commands;
pub mod mediator;
pub mod observer;
pub mod reference;

pub use crate::domain::event::SystemEvent;
pub use channel::{Channel, PushOutcome};
pub use commands::{Command, CommandKind, Execution};
pub use mediator::{AbortedCommand, ExecutedCommand, FlushReport, Mediator, MediatorOptions, replay};
pub use observer::{AttachOptions, ObserverHandle, SystemObserver};
pub use reference::CommandReference;
