// worker thread loop
use super::PoolShared;
use crate::task::Task;
use crate::util::IdleBackoff;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

/// Per-worker execution state, readable from outside the pool.
#[derive(Debug)]
pub struct WorkerState {
    pub busy: AtomicBool,
    /// Raw token of the task being run; 0 when idle.
    pub current: AtomicU64,
    pub tasks_executed: AtomicU64,
    pub tasks_failed: AtomicU64,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            current: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
        }
    }
}

pub(crate) struct Worker {
    pub id: WorkerId,
    pub state: Arc<WorkerState>,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            state: Arc::new(WorkerState::new()),
        }
    }

    // main loop: claim the most urgent pending task, run it in isolation,
    // relay the result. Idles through spin/yield/park when the queue is dry.
    pub fn run(&self, shared: Arc<PoolShared>, shutdown: Arc<AtomicBool>) {
        log::trace!("worker {} online", self.id);
        let mut backoff = IdleBackoff::new();

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            match shared.queue.claim_next() {
                Some(task) => {
                    backoff.reset();
                    // The task left the pending queue; free its admission slot.
                    shared.gate.release();
                    self.execute(task, &shared);
                }
                None => backoff.idle(),
            }
        }
    }

    fn execute(&self, task: Task, shared: &PoolShared) {
        let token = task.token;
        // current before busy, so a busy observation always sees the token
        self.state.current.store(token.raw(), Ordering::Release);
        self.state.busy.store(true, Ordering::Release);

        let start = Instant::now();
        // The payload moves into the operation; nothing is shared with the
        // submitting thread.
        let outcome = shared.fault.run(&*task.op, task.payload);
        let duration_ns = start.elapsed().as_nanos() as u64;

        self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
        if outcome.is_success() {
            shared.metrics.record_completed(duration_ns);
        } else {
            self.state.tasks_failed.fetch_add(1, Ordering::Relaxed);
            shared.metrics.record_failed(duration_ns);
            log::debug!("{token} ({}) failed", task.op_name);
        }

        shared.queue.finish(token, outcome.is_success());

        // May block until the consumer drains. Returns false only when the
        // cache was closed for shutdown, in which case the result is dropped.
        shared.cache.push(token, outcome);

        self.state.current.store(0, Ordering::Relaxed);
        self.state.busy.store(false, Ordering::Relaxed);
    }
}
