//! Bounded admission for the pending queue.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts tasks between admission and claim, rejecting past a fixed bound.
///
/// Rejection leaves the counter exactly where it was: the increment is rolled
/// back before reporting failure, so a burst of rejected submits cannot wedge
/// later valid ones.
#[derive(Debug)]
pub struct BackpressureGate {
    capacity: usize,
    pending: AtomicUsize,
}

impl BackpressureGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pending: AtomicUsize::new(0),
        }
    }

    /// Take one admission slot. Returns false (with no state change) when the
    /// gate is at capacity.
    pub fn try_acquire(&self) -> bool {
        let prev = self.pending.fetch_add(1, Ordering::Relaxed);
        if prev >= self.capacity {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Give a slot back: the task was claimed by a worker or cancelled.
    pub fn release(&self) {
        self.pending.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_capacity() {
        let gate = BackpressureGate::new(10);

        for _ in 0..10 {
            assert!(gate.try_acquire());
        }

        assert!(!gate.try_acquire());
        assert_eq!(gate.pending(), 10);

        gate.release();
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_rejection_rolls_back() {
        let gate = BackpressureGate::new(1);
        assert!(gate.try_acquire());

        for _ in 0..100 {
            assert!(!gate.try_acquire());
        }
        assert_eq!(gate.pending(), 1);

        gate.release();
        assert_eq!(gate.pending(), 0);
        assert!(gate.try_acquire());
    }
}
