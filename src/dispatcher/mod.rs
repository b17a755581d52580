//! Task intake, ordering, and result consumption.
//!
//! The [`Dispatcher`] is the crate's front door: it admits tasks against a
//! bounded pending queue, hands them to the worker pool in (priority,
//! submission) order, and exposes the drained results.

pub(crate) mod queue;

use crate::cache::{ResultCache, ResultEntry};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pool::{FaultBarrier, PoolShared, WorkerPool, WorkerSnapshot};
use crate::registry::OperationRegistry;
use crate::task::{OpResult, Payload, Priority, Task, TaskStatus, TaskToken};
use crate::telemetry::{Metrics, MetricsSnapshot};
use crate::util::BackpressureGate;
use queue::DispatchQueue;
use std::sync::Arc;

/// Priority task dispatcher with an isolated worker pool and a bounded
/// result cache.
///
/// Construction spawns the workers; dropping the dispatcher (or calling
/// [`shutdown`](Dispatcher::shutdown)) joins them.
pub struct Dispatcher {
    registry: OperationRegistry,
    queue: Arc<DispatchQueue>,
    cache: Arc<ResultCache>,
    gate: Arc<BackpressureGate>,
    metrics: Arc<Metrics>,
    pool: WorkerPool,
}

impl Dispatcher {
    /// Build a dispatcher and start its workers.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(DispatchQueue::new());
        let cache = Arc::new(ResultCache::new(config.cache_capacity));
        let gate = Arc::new(BackpressureGate::new(config.queue_capacity));
        let metrics = Arc::new(Metrics::new());

        let shared = Arc::new(PoolShared {
            queue: Arc::clone(&queue),
            cache: Arc::clone(&cache),
            gate: Arc::clone(&gate),
            fault: FaultBarrier::new(),
            metrics: Arc::clone(&metrics),
        });

        let pool = WorkerPool::spawn(&config, shared)?;

        Ok(Self {
            registry: OperationRegistry::new(),
            queue,
            cache,
            gate,
            metrics,
            pool,
        })
    }

    /// Shorthand for `Dispatcher::new(Config::default())`.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Config::default())
    }

    /// Install a named operation. Names are single-assignment; re-registering
    /// returns [`Error::OperationExists`].
    pub fn register<F>(&self, name: &str, op: F) -> Result<()>
    where
        F: Fn(Payload) -> OpResult + Send + Sync + 'static,
    {
        self.registry.register(name, op)
    }

    /// Submit a task: run the operation registered under `op` against
    /// `payload` at the given priority.
    ///
    /// The payload moves into the task and crosses into a worker untouched;
    /// no reference to it stays behind. Fails synchronously with
    /// [`Error::UnknownOperation`] for unregistered names,
    /// [`Error::CapacityExceeded`] when the pending queue is at its bound, and
    /// [`Error::ShutDown`] after shutdown. A rejected submit leaves the queue
    /// exactly as it was.
    pub fn submit(&self, op: &str, payload: Payload, priority: Priority) -> Result<TaskToken> {
        if self.pool.is_shut_down() {
            return Err(Error::ShutDown);
        }

        let (op_name, op) = self
            .registry
            .resolve(op)
            .ok_or_else(|| Error::UnknownOperation(op.to_string()))?;

        if !self.gate.try_acquire() {
            self.metrics.record_rejected();
            log::debug!("submit rejected, pending queue at {}", self.gate.capacity());
            return Err(Error::CapacityExceeded(self.gate.capacity()));
        }

        let task = Task::new(op_name, op, payload, priority);
        let token = task.token;

        self.queue.enqueue(task);
        self.metrics.record_submitted();
        self.pool.wake_one();

        Ok(token)
    }

    /// Cancel a still-queued task.
    ///
    /// Cooperative and best-effort: a task that already reached a worker is
    /// not interrupted, and `cancel` reports [`Error::NotFound`] for it; its
    /// result will still show up in [`drain`](Dispatcher::drain). A
    /// successfully cancelled task never runs and never produces a result.
    pub fn cancel(&self, token: TaskToken) -> Result<()> {
        if self.queue.cancel(token) {
            self.gate.release();
            self.metrics.record_cancelled();
            Ok(())
        } else {
            Err(Error::NotFound(token))
        }
    }

    /// Take every completed result, in completion order. Never blocks; an
    /// empty cache yields an empty vec.
    ///
    /// Consuming a result is the end of its task's lifecycle: the token's
    /// status becomes unknown and the dispatcher forgets it entirely.
    pub fn drain(&self) -> Vec<ResultEntry> {
        let drained = self.cache.drain();
        for entry in &drained {
            self.queue.forget(entry.token);
        }
        drained
    }

    /// Where a task currently is in its lifecycle, or `None` for unknown,
    /// consumed, or reaped-after-cancel tokens.
    pub fn status(&self, token: TaskToken) -> Option<TaskStatus> {
        self.queue.status(token)
    }

    /// Tasks admitted but not yet claimed by a worker.
    pub fn pending(&self) -> usize {
        self.gate.pending()
    }

    /// Completed results waiting to be drained.
    pub fn results_waiting(&self) -> usize {
        self.cache.len()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.num_workers()
    }

    /// Busy/current-task view of every worker.
    pub fn workers(&self) -> Vec<WorkerSnapshot> {
        self.pool.snapshot()
    }

    /// Panics captured by the fault barrier across the pool's lifetime.
    pub fn panic_count(&self) -> usize {
        self.pool.panic_count()
    }

    /// Snapshot of the runtime counters. A no-op default when the `telemetry`
    /// feature is disabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop the pool. Queued tasks are discarded, in-flight tasks run to
    /// completion behind the fault barrier, and their results are dropped.
    /// Results already in the cache stay drainable. Subsequent submits return
    /// [`Error::ShutDown`]. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.pool.num_workers())
            .field("pending", &self.pending())
            .field("results_waiting", &self.results_waiting())
            .field("registry", &self.registry)
            .finish()
    }
}
