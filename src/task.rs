//! Task representation: tokens, priorities, payloads, and status.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Global token counter. Starts at 1 so 0 can mean "no task".
static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique handle for a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(u64);

impl TaskToken {
    pub(crate) fn next() -> Self {
        TaskToken(TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        TaskToken(raw)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task #{}", self.0)
    }
}

/// Scheduling priority. Lower value runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Normal = 1,
    Low = 2,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Opaque task input/output buffer. Moved across the worker boundary, never
/// shared.
pub type Payload = Vec<u8>;

/// What a registered operation returns: an output payload, or a failure
/// reason that is reported without crashing the pool.
pub type OpResult = std::result::Result<Payload, String>;

/// A registered operation. Runs inside a worker against a payload it owns.
pub type OpFn = dyn Fn(Payload) -> OpResult + Send + Sync;

/// Observable lifecycle of a task.
///
/// `Queued -> Running -> {Completed | Failed | Cancelled}`. Terminal states
/// are immutable; `Cancelled` is only reachable from `Queued`. Entries vanish
/// (`status()` returns `None`) once the result is drained or a cancelled
/// tombstone is reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// Internal unit of work. Immutable once built; the payload moves with it.
pub(crate) struct Task {
    pub(crate) token: TaskToken,
    pub(crate) op_name: Arc<str>,
    pub(crate) op: Arc<OpFn>,
    pub(crate) payload: Payload,
    pub(crate) priority: Priority,
    pub(crate) submitted_at: Instant,
}

impl Task {
    pub(crate) fn new(
        op_name: Arc<str>,
        op: Arc<OpFn>,
        payload: Payload,
        priority: Priority,
    ) -> Self {
        Task {
            token: TaskToken::next(),
            op_name,
            op,
            payload,
            priority,
            submitted_at: Instant::now(),
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("token", &self.token)
            .field("op", &self.op_name)
            .field("priority", &self.priority)
            .field("payload_len", &self.payload.len())
            .field("submitted_at", &self.submitted_at)
            .finish()
    }
}
