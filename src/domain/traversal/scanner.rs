use crate::domain::error::{NotFound, TraversalError};
use crate::domain::ids::{PortId, SignalId};
use crate::domain::ports::GraphView;
use crate::domain::traversal::engine::{ConcurrencyMode, TraversalEngine};
use crate::domain::traversal::strategy::{AllPathsStrategy, SpanningTreeStrategy};
use crate::domain::traversal::visitor::{ScanRoot, ScanVisitor, Visit};

/// Convenience queries over the upstream cone of a set of roots.
///
/// Queries that need each node once run on a pooled spanning-tree engine;
/// path-sensitive ones run on the stateless all-paths engine.
pub struct Scanner {
    spanning: TraversalEngine<SpanningTreeStrategy>,
    all_paths: TraversalEngine<AllPathsStrategy>,
    ignore_hold: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(false)
    }
}

struct SignalVisitor<F> {
    action: F,
}

impl<F: FnMut(SignalId) -> Visit> SignalVisitor<F> {
    fn report(&mut self, signal: SignalId, again: bool) -> Result<Visit, TraversalError> {
        if again {
            Ok(Visit::Skip)
        } else {
            Ok((self.action)(signal))
        }
    }
}

impl<F: FnMut(SignalId) -> Visit> ScanVisitor for SignalVisitor<F> {
    fn enter_signal(
        &mut self,
        signal: SignalId,
        _parent: Option<PortId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        self.report(signal, again)
    }

    fn visit_leaf_signal(
        &mut self,
        signal: SignalId,
        _parent: Option<PortId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        self.report(signal, again)
    }
}

struct PortVisitor<F> {
    action: F,
}

impl<F: FnMut(PortId) -> Visit> ScanVisitor for PortVisitor<F> {
    fn enter_port(
        &mut self,
        port: PortId,
        _parent: Option<SignalId>,
        again: bool,
        _root: bool,
    ) -> Result<Visit, TraversalError> {
        if again {
            return Ok(Visit::Skip);
        }
        Ok((self.action)(port))
    }
}

impl Scanner {
    pub fn new(ignore_hold: bool) -> Self {
        Self {
            spanning: TraversalEngine::new(SpanningTreeStrategy, ConcurrencyMode::ParallelStateful),
            all_paths: TraversalEngine::new(AllPathsStrategy, ConcurrencyMode::ParallelStateless),
            ignore_hold,
        }
    }

    pub fn ignore_hold(&self) -> bool {
        self.ignore_hold
    }

    pub fn spanning_engine(&self) -> &TraversalEngine<SpanningTreeStrategy> {
        &self.spanning
    }

    /// Spanning-tree walk with a caller-provided visitor.
    pub fn traverse(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        visitor: &mut dyn ScanVisitor,
    ) -> Result<(), TraversalError> {
        self.spanning.traverse(view, roots, visitor, self.ignore_hold)
    }

    pub fn for_each_signal(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut action: impl FnMut(SignalId),
    ) -> Result<(), TraversalError> {
        let mut visitor = SignalVisitor {
            action: |signal: SignalId| {
                action(signal);
                Visit::Descend
            },
        };
        self.traverse(view, roots, &mut visitor)
    }

    /// Like [`Scanner::for_each_signal`], but once per upstream path.
    pub fn for_each_signal_all_paths(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut action: impl FnMut(SignalId),
    ) -> Result<(), TraversalError> {
        let mut visitor = SignalVisitor {
            action: |signal: SignalId| {
                action(signal);
                Visit::Descend
            },
        };
        self.all_paths
            .traverse(view, roots, &mut visitor, self.ignore_hold)
    }

    pub fn for_each_port(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut action: impl FnMut(PortId),
    ) -> Result<(), TraversalError> {
        let mut visitor = PortVisitor {
            action: |port: PortId| {
                action(port);
                Visit::Descend
            },
        };
        self.traverse(view, roots, &mut visitor)
    }

    pub fn exists_signal(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(SignalId) -> bool,
    ) -> Result<bool, TraversalError> {
        Ok(self.first_signal(view, roots, &mut predicate)?.is_some())
    }

    pub fn exists_port(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(PortId) -> bool,
    ) -> Result<bool, TraversalError> {
        Ok(self.first_port(view, roots, &mut predicate)?.is_some())
    }

    /// First upstream signal satisfying `predicate`, or [`NotFound::Signal`].
    pub fn find_signal(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(SignalId) -> bool,
    ) -> Result<SignalId, TraversalError> {
        self.first_signal(view, roots, &mut predicate)?
            .ok_or_else(|| NotFound::Signal(describe(roots)).into())
    }

    /// First upstream port satisfying `predicate`, or [`NotFound::Port`].
    pub fn find_port(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(PortId) -> bool,
    ) -> Result<PortId, TraversalError> {
        self.first_port(view, roots, &mut predicate)?
            .ok_or_else(|| NotFound::Port(describe(roots)).into())
    }

    pub fn find_all_signals(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(SignalId) -> bool,
    ) -> Result<Vec<SignalId>, TraversalError> {
        let mut found = Vec::new();
        self.for_each_signal(view, roots, |signal| {
            if predicate(signal) {
                found.push(signal);
            }
        })?;
        Ok(found)
    }

    pub fn find_all_ports(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        mut predicate: impl FnMut(PortId) -> bool,
    ) -> Result<Vec<PortId>, TraversalError> {
        let mut found = Vec::new();
        self.for_each_port(view, roots, |port| {
            if predicate(port) {
                found.push(port);
            }
        })?;
        Ok(found)
    }

    fn first_signal(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        predicate: &mut dyn FnMut(SignalId) -> bool,
    ) -> Result<Option<SignalId>, TraversalError> {
        let mut found = None;
        let mut visitor = SignalVisitor {
            action: |signal: SignalId| {
                if predicate(signal) {
                    found = Some(signal);
                    Visit::Stop
                } else {
                    Visit::Descend
                }
            },
        };
        self.traverse(view, roots, &mut visitor)?;
        Ok(found)
    }

    fn first_port(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        predicate: &mut dyn FnMut(PortId) -> bool,
    ) -> Result<Option<PortId>, TraversalError> {
        let mut found = None;
        let mut visitor = PortVisitor {
            action: |port: PortId| {
                if predicate(port) {
                    found = Some(port);
                    Visit::Stop
                } else {
                    Visit::Descend
                }
            },
        };
        self.traverse(view, roots, &mut visitor)?;
        Ok(found)
    }
}

fn describe(roots: &[ScanRoot]) -> String {
    let roots: Vec<String> = roots
        .iter()
        .map(|root| match root {
            ScanRoot::Signal(signal) => signal.to_string(),
            ScanRoot::Port(port) => port.to_string(),
        })
        .collect();
    format!("no match upstream of [{}]", roots.join(", "))
}
