//! Pending-task queue and status table.
//!
//! Both live under a single mutex: claiming a task, flipping its status, and
//! reaping cancelled tombstones are one atomic step with respect to `submit`
//! and `cancel`, so no interleaving can run a cancelled task or cancel a
//! running one.

use crate::task::{Priority, Task, TaskStatus, TaskToken};
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};

/// Heap entry: a task plus its ordering key.
struct PendingTask {
    task: Task,
    priority: Priority,
    seq: u64,
}

impl PartialEq for PendingTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PendingTask {}

impl PartialOrd for PendingTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTask {
    // BinaryHeap is a max-heap, so both comparisons are reversed: the most
    // urgent priority wins, and within a priority the lowest sequence
    // number (earliest submit) wins.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        let priority_cmp = other.priority.cmp(&self.priority);
        if priority_cmp != CmpOrdering::Equal {
            return priority_cmp;
        }

        other.seq.cmp(&self.seq)
    }
}

struct QueueInner {
    heap: BinaryHeap<PendingTask>,
    statuses: HashMap<TaskToken, TaskStatus>,
    next_seq: u64,
}

/// The dispatcher's only mutable shared structure: pending heap plus the
/// per-token status table.
pub(crate) struct DispatchQueue {
    inner: Mutex<QueueInner>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                statuses: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Queue a task. Its status becomes `Queued` and it receives the next
    /// submission sequence number for FIFO tie-breaking.
    pub fn enqueue(&self, task: Task) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        inner.statuses.insert(task.token, TaskStatus::Queued);
        let priority = task.priority;
        inner.heap.push(PendingTask {
            task,
            priority,
            seq,
        });
    }

    /// Pop the most urgent runnable task and mark it `Running`.
    ///
    /// Cancelled tombstones encountered on the way are reaped here: their heap
    /// entries are dropped and their status entries removed, without running
    /// anything.
    pub fn claim_next(&self) -> Option<Task> {
        let mut inner = self.inner.lock();

        while let Some(pending) = inner.heap.pop() {
            let token = pending.task.token;
            let status = inner.statuses.get(&token).copied();
            match status {
                Some(TaskStatus::Queued) => {
                    inner.statuses.insert(token, TaskStatus::Running);
                    return Some(pending.task);
                }
                Some(TaskStatus::Cancelled) => {
                    inner.statuses.remove(&token);
                }
                _ => {
                    // A token can only be queued or cancelled while its heap
                    // entry exists.
                    debug_assert!(false, "heap entry with non-pending status");
                }
            }
        }

        None
    }

    /// Cancel a still-queued task. Returns false for running, terminal, or
    /// unknown tokens. The heap entry stays behind as a tombstone.
    pub fn cancel(&self, token: TaskToken) -> bool {
        let mut inner = self.inner.lock();
        if inner.statuses.get(&token) == Some(&TaskStatus::Queued) {
            inner.statuses.insert(token, TaskStatus::Cancelled);
            true
        } else {
            false
        }
    }

    /// Record the terminal status of a task that ran.
    pub fn finish(&self, token: TaskToken, success: bool) {
        let mut inner = self.inner.lock();
        let status = if success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        debug_assert_eq!(inner.statuses.get(&token), Some(&TaskStatus::Running));
        inner.statuses.insert(token, status);
    }

    /// Drop the bookkeeping for a consumed result.
    pub fn forget(&self, token: TaskToken) {
        self.inner.lock().statuses.remove(&token);
    }

    pub fn status(&self, token: TaskToken) -> Option<TaskStatus> {
        self.inner.lock().statuses.get(&token).copied()
    }

    /// Tasks currently waiting in the heap, tombstones excluded.
    pub fn queued(&self) -> usize {
        let inner = self.inner.lock();
        inner
            .statuses
            .values()
            .filter(|status| **status == TaskStatus::Queued)
            .count()
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("DispatchQueue")
            .field("heap_len", &inner.heap.len())
            .field("tracked", &inner.statuses.len())
            .field("next_seq", &inner.next_seq)
            .finish()
    }
}
