//! Bounded holding area for completed task results.
//!
//! Workers push results as they finish; a single consumer drains them in
//! completion order. When the cache is full the producing worker blocks until
//! the consumer drains (backpressure, never drop). Draining never blocks.

use crate::task::{Payload, TaskToken};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// How a task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The operation returned an output payload.
    Success(Payload),
    /// The operation reported an error or panicked; the reason is captured.
    Failed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// Output payload, if the task succeeded.
    pub fn output(&self) -> Option<&Payload> {
        match self {
            TaskOutcome::Success(payload) => Some(payload),
            TaskOutcome::Failed(_) => None,
        }
    }

    /// Failure reason, if the task failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// One completed task, as returned by `drain`.
#[derive(Debug, Clone)]
pub struct ResultEntry {
    /// Token of the task this result belongs to.
    pub token: TaskToken,
    /// Position in global completion order, starting at 0.
    pub completion_index: u64,
    /// Success output or captured failure.
    pub outcome: TaskOutcome,
}

struct CacheInner {
    entries: VecDeque<ResultEntry>,
    next_index: u64,
    closed: bool,
}

/// Bounded FIFO of [`ResultEntry`] values with blocking producers and a
/// non-blocking consumer.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    space: Condvar,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            inner: Mutex::new(CacheInner {
                entries: VecDeque::with_capacity(capacity),
                next_index: 0,
                closed: false,
            }),
            space: Condvar::new(),
            capacity,
        }
    }

    /// Store a result, stamping it with the next completion index.
    ///
    /// Blocks while the cache is full. Returns false if the cache was closed,
    /// in which case the entry is dropped.
    pub fn push(&self, token: TaskToken, outcome: TaskOutcome) -> bool {
        let mut inner = self.inner.lock();

        while inner.entries.len() >= self.capacity && !inner.closed {
            self.space.wait(&mut inner);
        }

        if inner.closed {
            return false;
        }

        let completion_index = inner.next_index;
        inner.next_index += 1;
        inner.entries.push_back(ResultEntry {
            token,
            completion_index,
            outcome,
        });
        true
    }

    /// Take every available entry, in completion order. Never blocks; an empty
    /// cache yields an empty vec.
    pub fn drain(&self) -> Vec<ResultEntry> {
        let mut inner = self.inner.lock();
        let drained: Vec<ResultEntry> = inner.entries.drain(..).collect();
        if !drained.is_empty() {
            self.space.notify_all();
        }
        drained
    }

    /// Stop accepting results and wake any blocked producers. Entries already
    /// stored remain drainable.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.space.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ResultCache")
            .field("len", &inner.entries.len())
            .field("capacity", &self.capacity)
            .field("closed", &inner.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn token() -> TaskToken {
        TaskToken::next()
    }

    #[test]
    fn test_drain_empty_is_empty() {
        let cache = ResultCache::new(4);
        assert!(cache.drain().is_empty());
        assert!(cache.drain().is_empty());
    }

    #[test]
    fn test_completion_order() {
        let cache = ResultCache::new(4);
        let (a, b, c) = (token(), token(), token());

        cache.push(a, TaskOutcome::Success(vec![1]));
        cache.push(b, TaskOutcome::Failed("nope".to_string()));
        cache.push(c, TaskOutcome::Success(vec![3]));

        let drained = cache.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].token, a);
        assert_eq!(drained[1].token, b);
        assert_eq!(drained[2].token, c);
        assert_eq!(drained[0].completion_index, 0);
        assert_eq!(drained[1].completion_index, 1);
        assert_eq!(drained[2].completion_index, 2);

        assert!(cache.drain().is_empty());
    }

    #[test]
    fn test_index_survives_drain() {
        let cache = ResultCache::new(4);

        cache.push(token(), TaskOutcome::Success(vec![]));
        assert_eq!(cache.drain()[0].completion_index, 0);

        cache.push(token(), TaskOutcome::Success(vec![]));
        assert_eq!(cache.drain()[0].completion_index, 1);
    }

    #[test]
    fn test_full_cache_blocks_producer() {
        let cache = Arc::new(ResultCache::new(1));
        cache.push(token(), TaskOutcome::Success(vec![]));

        let producer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.push(token(), TaskOutcome::Success(vec![])))
        };

        // Producer should be stuck behind the full cache.
        std::thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.drain().len(), 1);
        assert!(producer.join().unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_close_unblocks_producer() {
        let cache = Arc::new(ResultCache::new(1));
        cache.push(token(), TaskOutcome::Success(vec![]));

        let producer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.push(token(), TaskOutcome::Success(vec![])))
        };

        std::thread::sleep(Duration::from_millis(20));
        cache.close();

        // The blocked push reports rejection and the entry is dropped.
        assert!(!producer.join().unwrap());
        assert!(!cache.push(token(), TaskOutcome::Success(vec![])));

        // Whatever was stored before the close is still drainable.
        assert_eq!(cache.drain().len(), 1);
    }
}
