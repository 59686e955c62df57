use std::collections::VecDeque;

/// Result of [`Channel::push_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The channel is disabled; the entry was dropped.
    Rejected,
    /// Queued behind entries that were already announced.
    Queued,
    /// Queued into an empty channel; listeners were notified.
    Notified,
}

/// Edge-triggered, enable-gated FIFO mailbox.
///
/// Listeners fire once per empty to non-empty transition, so one
/// notification may stand for many entries. Consumers drain with
/// `while let Some(entry) = channel.pop_entry()`.
pub struct Channel<T> {
    enabled: bool,
    queue: VecDeque<T>,
    listeners: Vec<Box<dyn FnMut() + Send + Sync>>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<T> Channel<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            queue: VecDeque::new(),
            listeners: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Register a callback fired whenever entries become available.
    pub fn on_entry_available(&mut self, listener: impl FnMut() + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn push_entry(&mut self, entry: T) -> PushOutcome {
        if !self.enabled {
            return PushOutcome::Rejected;
        }
        let was_empty = self.queue.is_empty();
        self.queue.push_back(entry);
        if !was_empty {
            return PushOutcome::Queued;
        }
        for listener in &mut self.listeners {
            listener();
        }
        PushOutcome::Notified
    }

    pub fn pop_entry(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    pub fn has_entries(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued entry without processing it.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted(enabled: bool) -> (Channel<u32>, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut channel = Channel::new(enabled);
        channel.on_entry_available(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (channel, fired)
    }

    #[test]
    fn test_notifies_once_per_empty_transition() {
        let (mut channel, fired) = counted(true);
        assert_eq!(channel.push_entry(1), PushOutcome::Notified);
        assert_eq!(channel.push_entry(2), PushOutcome::Queued);
        assert_eq!(channel.push_entry(3), PushOutcome::Queued);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let drained: Vec<_> = std::iter::from_fn(|| channel.pop_entry()).collect();
        assert_eq!(drained, vec![1, 2, 3]);

        channel.push_entry(4);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disabled_channel_drops_silently() {
        let (mut channel, fired) = counted(false);
        assert_eq!(channel.push_entry(1), PushOutcome::Rejected);
        assert!(!channel.has_entries());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
