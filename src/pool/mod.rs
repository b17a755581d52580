//! Fixed-size pool of isolated worker threads.
//!
//! Workers own no references into caller memory; every task they touch arrives
//! by move through the dispatch queue and leaves by move through the result
//! cache.

pub mod fault;
pub mod worker;

pub use fault::FaultBarrier;
pub use worker::{WorkerId, WorkerState};

use crate::cache::ResultCache;
use crate::config::Config;
use crate::dispatcher::queue::DispatchQueue;
use crate::error::{Error, Result};
use crate::task::TaskToken;
use crate::telemetry::Metrics;
use crate::util::BackpressureGate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use worker::Worker;

/// Everything a worker thread needs, bundled for cloning into the spawn.
pub(crate) struct PoolShared {
    pub queue: Arc<DispatchQueue>,
    pub cache: Arc<ResultCache>,
    pub gate: Arc<BackpressureGate>,
    pub fault: FaultBarrier,
    pub metrics: Arc<Metrics>,
}

#[cfg(target_os = "linux")]
fn pin_thread_to_core(core_id: usize) {
    unsafe {
        let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core_id % libc::CPU_SETSIZE as usize, &mut cpuset);
        let result = libc::sched_setaffinity(
            0, // current thread
            std::mem::size_of::<libc::cpu_set_t>(),
            &cpuset,
        );
        if result != 0 {
            log::warn!(
                "failed to pin worker {} to core {}",
                thread::current().name().unwrap_or("unknown"),
                core_id
            );
        }
    }
}

struct WorkerHandle {
    state: Arc<WorkerState>,
    thread: Option<JoinHandle<()>>,
    unparker: thread::Thread,
}

/// Point-in-time view of one worker, as reported by [`WorkerPool::snapshot`].
#[derive(Debug, Clone)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub busy: bool,
    /// Token of the task being run, if any.
    pub current: Option<TaskToken>,
    pub tasks_executed: u64,
    pub tasks_failed: u64,
}

/// Fixed set of worker threads draining the dispatch queue.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    shared: Arc<PoolShared>,
    shutdown: Arc<AtomicBool>,
    wake_cursor: AtomicUsize,
    num_workers: usize,
}

impl WorkerPool {
    pub(crate) fn spawn(config: &Config, shared: Arc<PoolShared>) -> Result<Self> {
        let num_workers = config.worker_threads();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let worker = Worker::new(id);
            let state = Arc::clone(&worker.state);
            let shared = Arc::clone(&shared);
            let shutdown = Arc::clone(&shutdown);
            let name = format!("{}-{}", config.thread_name_prefix, id);
            let pin_workers = config.pin_workers;

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let thread = builder
                .spawn(move || {
                    #[cfg(target_os = "linux")]
                    if pin_workers {
                        pin_thread_to_core(id);
                    }
                    #[cfg(not(target_os = "linux"))]
                    let _ = pin_workers;

                    worker.run(shared, shutdown);
                })
                .map_err(|e| Error::pool(format!("spawn failed: {e}")))?;

            let unparker = thread.thread().clone();

            workers.push(WorkerHandle {
                state,
                thread: Some(thread),
                unparker,
            });
        }

        log::debug!("worker pool started with {num_workers} workers");

        Ok(Self {
            workers,
            shared,
            shutdown,
            wake_cursor: AtomicUsize::new(0),
            num_workers,
        })
    }

    /// Unpark one worker, round-robin. Parked workers also wake on their own
    /// park timeout, so a missed wake only costs latency, not progress.
    pub fn wake_one(&self) {
        let idx = self.wake_cursor.fetch_add(1, Ordering::Relaxed) % self.num_workers;
        self.workers[idx].unparker.unpark();
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Panics captured across the pool's lifetime.
    pub fn panic_count(&self) -> usize {
        self.shared.fault.panic_count()
    }

    /// Current state of every worker.
    pub fn snapshot(&self) -> Vec<WorkerSnapshot> {
        self.workers
            .iter()
            .enumerate()
            .map(|(id, handle)| {
                // busy first: its Acquire pairs with the worker's Release, so
                // a busy observation sees the current token
                let busy = handle.state.busy.load(Ordering::Acquire);
                let current = handle.state.current.load(Ordering::Relaxed);
                WorkerSnapshot {
                    id,
                    busy,
                    current: (current != 0).then(|| TaskToken::from_raw(current)),
                    tasks_executed: handle.state.tasks_executed.load(Ordering::Relaxed),
                    tasks_failed: handle.state.tasks_failed.load(Ordering::Relaxed),
                }
            })
            .collect()
    }

    /// Stop the pool: close the cache so blocked producers exit, wake every
    /// worker, join them all. Queued tasks are discarded; in-flight tasks
    /// finish but their results are dropped with the cache closed.
    pub fn shutdown(&mut self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        self.shared.cache.close();

        for worker in &self.workers {
            worker.unparker.unpark();
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }

        log::debug!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_workers", &self.num_workers)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
