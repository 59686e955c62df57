//! Error taxonomy of the core.
//!
//! Every error is synchronous and returned to the immediate caller; nothing
//! here is retried by the core.

use crate::domain::ids::{EntityId, InstanceId, PatternId, PortId, SignalId};
use std::fmt;
use thiserror::Error;

/// Kind of graph element a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Signal,
    Port,
    Bus,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Signal => "signal",
            ElementKind::Port => "port",
            ElementKind::Bus => "bus",
        })
    }
}

/// Positional slot family on a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Input,
    Output,
    Bus,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotKind::Input => "input",
            SlotKind::Output => "output",
            SlotKind::Bus => "bus",
        })
    }
}

/// Errors raised while executing a command. They abort the offending command only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("identity mismatch: reference expects {expected}, index resolves to {found}")]
    IdentityMismatch {
        expected: InstanceId,
        found: InstanceId,
    },

    #[error("{kind} index {index} is out of range")]
    IndexOutOfRange { kind: ElementKind, index: usize },

    #[error("{kind} {id} is not part of the system")]
    UnknownElement { kind: ElementKind, id: InstanceId },

    #[error("{signal} is already driven by {port}")]
    AlreadyDriven { signal: SignalId, port: PortId },

    #[error("{signal} is not driven by any port")]
    NotDriven { signal: SignalId },

    #[error("{port} has no {kind} slot {slot} (arity {arity})")]
    SlotOutOfRange {
        port: PortId,
        kind: SlotKind,
        slot: usize,
        arity: usize,
    },

    #[error("{signal} is already a system {kind}")]
    AlreadyPromoted { signal: SignalId, kind: SlotKind },

    #[error("{signal} is not a system {kind}")]
    NotPromoted { signal: SignalId, kind: SlotKind },
}

/// Errors raised by compilation into, or matching against, the discrimination network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("structural matching mode not implemented: {0}")]
    UnsupportedMode(&'static str),

    #[error("unknown property combination mode: {0}")]
    UnknownCombinationMode(String),

    #[error("pattern {0} is already registered")]
    DuplicatePattern(PatternId),
}

/// Lookup failures; distinct from `exists_*` queries, which answer `false` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("signal not found: {0}")]
    Signal(String),

    #[error("port not found: {0}")]
    Port(String),

    #[error("bus not found: {0}")]
    Bus(String),

    #[error("entity not found: {0}")]
    Entity(EntityId),

    #[error("pattern not found: {0}")]
    Pattern(PatternId),
}

/// Errors raised by the traversal engine.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A mutually exclusive strategy was entered while already active.
    #[error("strategy `{strategy}` is mutually exclusive and already active")]
    Busy { strategy: &'static str },

    #[error("visitor failed: {0}")]
    Visitor(#[source] anyhow::Error),

    #[error(transparent)]
    NotFound(#[from] NotFound),
}
