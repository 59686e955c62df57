use crate::domain::error::TraversalError;
use crate::domain::ids::{PortId, SignalId};
use crate::domain::ports::GraphView;
use crate::domain::traversal::visitor::{ScanRoot, ScanVisitor, Visit};
use std::collections::HashSet;
use std::ops::ControlFlow;

type Flow = Result<ControlFlow<()>, TraversalError>;

/// Pluggable graph walking algorithm.
///
/// Everything a walk mutates lives in `State`; the strategy value itself is
/// shared between concurrent walks.
pub trait ScanStrategy: Send + Sync {
    type State: Default + Send;

    fn name(&self) -> &'static str;

    /// Prepare a recycled state for a fresh walk.
    fn reset(&self, state: &mut Self::State) {
        *state = Self::State::default();
    }

    fn walk(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        visitor: &mut dyn ScanVisitor,
        state: &mut Self::State,
        ignore_hold: bool,
    ) -> Result<(), TraversalError>;
}

/// Which nodes a walk has seen.
trait Seen {
    /// Records `signal`; returns true if it was seen before.
    fn enter_signal(&mut self, signal: SignalId) -> bool;
    fn leave_signal(&mut self, _signal: SignalId) {}
    fn enter_port(&mut self, port: PortId) -> bool;
    fn leave_port(&mut self, _port: PortId) {}
}

/// Visits every node at most once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanningTreeStrategy;

#[derive(Debug, Default)]
pub struct VisitedSet {
    signals: HashSet<SignalId>,
    ports: HashSet<PortId>,
}

impl VisitedSet {
    pub fn contains_signal(&self, signal: SignalId) -> bool {
        self.signals.contains(&signal)
    }

    pub fn contains_port(&self, port: PortId) -> bool {
        self.ports.contains(&port)
    }
}

impl Seen for VisitedSet {
    fn enter_signal(&mut self, signal: SignalId) -> bool {
        !self.signals.insert(signal)
    }

    fn enter_port(&mut self, port: PortId) -> bool {
        !self.ports.insert(port)
    }
}

impl ScanStrategy for SpanningTreeStrategy {
    type State = VisitedSet;

    fn name(&self) -> &'static str {
        "spanning-tree"
    }

    fn reset(&self, state: &mut VisitedSet) {
        state.signals.clear();
        state.ports.clear();
    }

    fn walk(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        visitor: &mut dyn ScanVisitor,
        state: &mut VisitedSet,
        ignore_hold: bool,
    ) -> Result<(), TraversalError> {
        Walker {
            view,
            visitor,
            seen: state,
            ignore_hold,
        }
        .run(roots)
    }
}

/// Follows every upstream path; a node is reported once per path reaching it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPathsStrategy;

// Nodes on the current path only, so that cycles terminate.
#[derive(Default)]
struct OnPath {
    signals: HashSet<SignalId>,
    ports: HashSet<PortId>,
}

impl Seen for OnPath {
    fn enter_signal(&mut self, signal: SignalId) -> bool {
        !self.signals.insert(signal)
    }

    fn leave_signal(&mut self, signal: SignalId) {
        self.signals.remove(&signal);
    }

    fn enter_port(&mut self, port: PortId) -> bool {
        !self.ports.insert(port)
    }

    fn leave_port(&mut self, port: PortId) {
        self.ports.remove(&port);
    }
}

impl ScanStrategy for AllPathsStrategy {
    type State = ();

    fn name(&self) -> &'static str {
        "all-paths"
    }

    fn walk(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        visitor: &mut dyn ScanVisitor,
        _state: &mut (),
        ignore_hold: bool,
    ) -> Result<(), TraversalError> {
        Walker {
            view,
            visitor,
            seen: &mut OnPath::default(),
            ignore_hold,
        }
        .run(roots)
    }
}

struct Walker<'a, S: Seen> {
    view: &'a dyn GraphView,
    visitor: &'a mut dyn ScanVisitor,
    seen: &'a mut S,
    ignore_hold: bool,
}

fn flow(visit: Visit) -> ControlFlow<()> {
    match visit {
        Visit::Stop => ControlFlow::Break(()),
        Visit::Descend | Visit::Skip => ControlFlow::Continue(()),
    }
}

impl<S: Seen> Walker<'_, S> {
    fn run(mut self, roots: &[ScanRoot]) -> Result<(), TraversalError> {
        for root in roots {
            let step = match *root {
                ScanRoot::Signal(signal) => self.signal(signal, None, true)?,
                ScanRoot::Port(port) => self.port(port, None, true)?,
            };
            if step.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn signal(&mut self, signal: SignalId, parent: Option<PortId>, root: bool) -> Flow {
        let held = !self.ignore_hold && self.view.is_held(signal);
        let driver = if held { None } else { self.view.driven_by_port(signal) };
        let again = self.seen.enter_signal(signal);

        let Some(port) = driver else {
            let visit = self.visitor.visit_leaf_signal(signal, parent, again, root)?;
            if !again {
                self.seen.leave_signal(signal);
            }
            return Ok(flow(visit));
        };

        let visit = self.visitor.enter_signal(signal, parent, again, root)?;
        if visit == Visit::Stop {
            return Ok(ControlFlow::Break(()));
        }
        if visit == Visit::Descend && !again && self.port(port, Some(signal), false)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
        let visit = self.visitor.leave_signal(signal, parent, again, root)?;
        if !again {
            self.seen.leave_signal(signal);
        }
        Ok(flow(visit))
    }

    fn port(&mut self, port: PortId, parent: Option<SignalId>, root: bool) -> Flow {
        let again = self.seen.enter_port(port);
        let visit = self.visitor.enter_port(port, parent, again, root)?;
        if visit == Visit::Stop {
            return Ok(ControlFlow::Break(()));
        }
        if visit == Visit::Descend && !again {
            for input in self.view.input_signals(port).into_iter().flatten() {
                if self.signal(input, Some(port), false)?.is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        let visit = self.visitor.leave_port(port, parent, again, root)?;
        if !again {
            self.seen.leave_port(port);
        }
        Ok(flow(visit))
    }
}
