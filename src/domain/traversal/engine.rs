use crate::domain::error::TraversalError;
use crate::domain::ports::GraphView;
use crate::domain::traversal::strategy::ScanStrategy;
use crate::domain::traversal::visitor::{ScanRoot, ScanVisitor};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Reentrancy contract of a [`TraversalEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// The strategy keeps no per-walk state; every call gets a throwaway one.
    ParallelStateless,
    /// Each concurrent call checks out its own recycled state from a pool.
    ParallelStateful,
    /// A call made while another is active fails with [`TraversalError::Busy`].
    MutualExclusive,
}

enum Slot<T> {
    Idle(T),
    Busy { generation: u64 },
    Vacant,
}

/// Spare walk states, one per concurrently active call.
///
/// Slot `n + 1` is only populated once slot `n` was busy, so the pool grows
/// into a chain exactly as deep as the deepest nesting seen so far.
struct StatePool<T> {
    slots: Vec<Slot<T>>,
    generation: u64,
}

impl<T: Default> StatePool<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
        }
    }

    fn checkout(&mut self) -> (usize, u64, T) {
        self.generation += 1;
        let generation = self.generation;
        let busy = Slot::Busy { generation };

        if let Some(index) = self.slots.iter().position(|s| matches!(s, Slot::Idle(_)))
            && let Slot::Idle(state) = std::mem::replace(&mut self.slots[index], busy)
        {
            return (index, generation, state);
        }
        let busy = Slot::Busy { generation };
        let index = match self.slots.iter().position(|s| matches!(s, Slot::Vacant)) {
            Some(index) => {
                self.slots[index] = busy;
                index
            }
            None => {
                self.slots.push(busy);
                self.slots.len() - 1
            }
        };
        (index, generation, T::default())
    }

    fn checkin(&mut self, index: usize, generation: u64, state: T) {
        if let Some(slot) = self.slots.get_mut(index)
            && matches!(slot, Slot::Busy { generation: g } if *g == generation)
        {
            *slot = Slot::Idle(state);
        }
    }

    fn release_idle(&mut self) -> usize {
        let mut released = 0;
        for slot in &mut self.slots {
            if matches!(slot, Slot::Idle(_)) {
                *slot = Slot::Vacant;
                released += 1;
            }
        }
        released
    }

    fn idle(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Idle(_))).count()
    }
}

/// Dispatches walks to a strategy while enforcing its [`ConcurrencyMode`].
///
/// The active counter and the pool are the only shared state. Neither lock
/// nor counter is held across the visitor callbacks, so a visitor may call
/// back into the same engine.
pub struct TraversalEngine<S: ScanStrategy> {
    strategy: S,
    mode: ConcurrencyMode,
    active: AtomicUsize,
    pool: Mutex<StatePool<S::State>>,
}

/// Keeps the active count and the checked-out state consistent on every exit path.
struct ActiveScan<'a, S: ScanStrategy> {
    engine: &'a TraversalEngine<S>,
    lease: Option<(usize, u64)>,
    state: S::State,
}

impl<S: ScanStrategy> Drop for ActiveScan<'_, S> {
    fn drop(&mut self) {
        if let Some((index, generation)) = self.lease {
            let state = std::mem::take(&mut self.state);
            self.engine.lock_pool().checkin(index, generation, state);
        }
        self.engine.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: ScanStrategy> TraversalEngine<S> {
    pub fn new(strategy: S, mode: ConcurrencyMode) -> Self {
        Self {
            strategy,
            mode,
            active: AtomicUsize::new(0),
            pool: Mutex::new(StatePool::new()),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Number of walks currently in progress.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Number of recycled states waiting in the pool.
    pub fn idle_states(&self) -> usize {
        self.lock_pool().idle()
    }

    /// Drop every idle pooled state; busy ones are kept until their walk ends.
    pub fn release_idle_states(&self) -> usize {
        self.lock_pool().release_idle()
    }

    fn lock_pool(&self) -> std::sync::MutexGuard<'_, StatePool<S::State>> {
        self.pool.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<ActiveScan<'_, S>, TraversalError> {
        match self.mode {
            ConcurrencyMode::MutualExclusive => {
                if self
                    .active
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    debug!(strategy = self.strategy.name(), "rejected concurrent traversal");
                    return Err(TraversalError::Busy {
                        strategy: self.strategy.name(),
                    });
                }
            }
            ConcurrencyMode::ParallelStateless | ConcurrencyMode::ParallelStateful => {
                self.active.fetch_add(1, Ordering::SeqCst);
            }
        }

        let scan = match self.mode {
            ConcurrencyMode::ParallelStateless => ActiveScan {
                engine: self,
                lease: None,
                state: S::State::default(),
            },
            ConcurrencyMode::ParallelStateful | ConcurrencyMode::MutualExclusive => {
                let (index, generation, state) = self.lock_pool().checkout();
                ActiveScan {
                    engine: self,
                    lease: Some((index, generation)),
                    state,
                }
            }
        };
        Ok(scan)
    }

    /// Walk upstream from `roots`, reporting to `visitor`.
    pub fn traverse(
        &self,
        view: &dyn GraphView,
        roots: &[ScanRoot],
        visitor: &mut dyn ScanVisitor,
        ignore_hold: bool,
    ) -> Result<(), TraversalError> {
        let mut scan = self.begin()?;
        self.strategy.reset(&mut scan.state);
        self.strategy
            .walk(view, roots, visitor, &mut scan.state, ignore_hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::DiscardEvents;
    use crate::domain::graph::SignalSystem;
    use crate::domain::ids::{PortId, SignalId};
    use crate::domain::traversal::strategy::SpanningTreeStrategy;
    use crate::domain::traversal::visitor::Visit;

    struct Refuse;

    impl ScanVisitor for Refuse {
        fn visit_leaf_signal(
            &mut self,
            _signal: SignalId,
            _parent: Option<PortId>,
            _again: bool,
            _root: bool,
        ) -> Result<Visit, TraversalError> {
            Err(TraversalError::Visitor(anyhow::anyhow!("refused")))
        }
    }

    #[test]
    fn test_failed_walk_returns_its_state_to_the_pool() {
        let mut system = SignalSystem::new();
        let x = system.add_signal(None, &mut DiscardEvents);
        let engine = TraversalEngine::new(SpanningTreeStrategy, ConcurrencyMode::ParallelStateful);
        let roots = [ScanRoot::Signal(x)];

        assert!(engine.traverse(&system, &roots, &mut Refuse, false).is_err());
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.idle_states(), 1);

        struct Count(usize);
        impl ScanVisitor for Count {
            fn visit_leaf_signal(
                &mut self,
                _signal: SignalId,
                _parent: Option<PortId>,
                again: bool,
                _root: bool,
            ) -> Result<Visit, TraversalError> {
                if !again {
                    self.0 += 1;
                }
                Ok(Visit::Descend)
            }
        }
        // The recycled state is reset, so the signal is new to the second walk.
        let mut count = Count(0);
        engine.traverse(&system, &roots, &mut count, false).unwrap();
        assert_eq!(count.0, 1);
        assert_eq!(engine.idle_states(), 1);
    }

    #[test]
    fn test_pool_grows_into_a_chain_and_recycles() {
        let mut pool: StatePool<Vec<u8>> = StatePool::new();
        let (first, g1, _) = pool.checkout();
        let (second, g2, _) = pool.checkout();
        assert_eq!((first, second), (0, 1));

        pool.checkin(second, g2, vec![7]);
        pool.checkin(first, g1, vec![1]);
        assert_eq!(pool.idle(), 2);

        let (index, _, state) = pool.checkout();
        assert_eq!((index, state), (0, vec![1]));
    }

    #[test]
    fn test_stale_checkin_is_dropped() {
        let mut pool: StatePool<Vec<u8>> = StatePool::new();
        let (index, generation, _) = pool.checkout();
        pool.checkin(index, generation + 1, vec![1]);
        assert_eq!(pool.idle(), 0);

        pool.checkin(index, generation, vec![1]);
        assert_eq!(pool.release_idle(), 1);
        assert_eq!(pool.idle(), 0);
    }
}
