use crate::domain::error::TraversalError;
use crate::domain::ids::{PortId, SignalId};

/// Visitor verdict for one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the node's upstream neighbours.
    Descend,
    /// Continue the walk but not below this node.
    Skip,
    /// Abort the whole walk.
    Stop,
}

/// Starting point of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRoot {
    Signal(SignalId),
    Port(PortId),
}

/// Callbacks invoked by a [`ScanStrategy`](super::ScanStrategy) while walking upstream.
///
/// `again` is set when the strategy has already reported the node during
/// this walk (or, for path-based walks, when it closes a cycle); the walk
/// never descends below such a node. `root` is set for the walk's roots.
pub trait ScanVisitor {
    fn enter_signal(
        &mut self,
        _signal: SignalId,
        _parent: Option<PortId>,
        _again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        Ok(Visit::Descend)
    }

    fn leave_signal(
        &mut self,
        _signal: SignalId,
        _parent: Option<PortId>,
        _again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        Ok(Visit::Descend)
    }

    /// Undriven signals, and held signals unless the hold is ignored.
    fn visit_leaf_signal(
        &mut self,
        _signal: SignalId,
        _parent: Option<PortId>,
        _again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        Ok(Visit::Descend)
    }

    fn enter_port(
        &mut self,
        _port: PortId,
        _parent: Option<SignalId>,
        _again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        Ok(Visit::Descend)
    }

    fn leave_port(
        &mut self,
        _port: PortId,
        _parent: Option<SignalId>,
        _again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        Ok(Visit::Descend)
    }
}
