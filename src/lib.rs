//! FERRY - prioritized background task dispatch
//!
//! A cooperative background task dispatcher: named operations run on a fixed
//! pool of isolated worker threads, ordered by priority, with completed
//! results relayed through a bounded cache that a single consumer drains.
//!
//! # Quick Start
//!
//! ```no_run
//! use ferrypool::prelude::*;
//!
//! let config = Config::builder().num_workers(2).build().unwrap();
//! let dispatcher = Dispatcher::new(config).unwrap();
//!
//! // Operations are registered once, by name.
//! dispatcher
//!     .register("double", |payload| Ok(payload.iter().map(|b| b * 2).collect()))
//!     .unwrap();
//!
//! // Submit work; higher priority starts first.
//! let token = dispatcher.submit("double", vec![1, 2, 3], Priority::High).unwrap();
//!
//! // Results arrive asynchronously; drain never blocks.
//! for entry in dispatcher.drain() {
//!     println!("{}: {:?}", entry.token, entry.outcome);
//! }
//! # let _ = token;
//! ```
//!
//! # Guarantees
//!
//! - **One result per task**: every admitted task ends as exactly one drained
//!   entry or one successful cancellation, never both, never neither.
//! - **Priority order**: pending high-priority tasks always start before
//!   pending lower-priority ones; FIFO within a priority level.
//! - **Isolation**: payloads move into workers and back out; no shared
//!   mutable state crosses the boundary.
//! - **Fault capture**: a panicking or failing operation becomes a `Failed`
//!   result entry, never a pool crash.
//! - **Backpressure**: submits past the queue bound are rejected; workers
//!   block when the result cache is full rather than dropping results.

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod registry;
pub mod task;
pub mod telemetry;
pub mod util;

// Re-export key types at crate root
pub use cache::{ResultEntry, TaskOutcome};
pub use config::{Config, ConfigBuilder};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use task::{OpResult, Payload, Priority, TaskStatus, TaskToken};

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::time::{Duration, Instant};

    fn wait_for(dispatcher: &Dispatcher, count: usize) -> Vec<ResultEntry> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut entries = Vec::new();
        while entries.len() < count {
            entries.extend(dispatcher.drain());
            assert!(Instant::now() < deadline, "timed out waiting for results");
            std::thread::sleep(Duration::from_millis(1));
        }
        entries
    }

    #[test]
    fn test_basic_roundtrip() {
        let dispatcher = Dispatcher::with_defaults().unwrap();
        dispatcher
            .register("reverse", |mut payload| {
                payload.reverse();
                Ok(payload)
            })
            .unwrap();

        let token = dispatcher
            .submit("reverse", vec![1, 2, 3], Priority::Normal)
            .unwrap();

        let entries = wait_for(&dispatcher, 1);
        assert_eq!(entries[0].token, token);
        assert_eq!(entries[0].outcome.output().unwrap(), &vec![3, 2, 1]);
    }

    #[test]
    fn test_failure_is_reported_not_fatal() {
        let dispatcher = Dispatcher::with_defaults().unwrap();
        dispatcher.register("echo", Ok).unwrap();
        dispatcher
            .register("boom", |_| panic!("decode failure"))
            .unwrap();

        dispatcher.submit("boom", Vec::new(), Priority::Normal).unwrap();
        let entries = wait_for(&dispatcher, 1);
        assert!(entries[0].outcome.failure().unwrap().contains("decode failure"));

        // Pool survives and keeps serving.
        dispatcher.submit("echo", vec![9], Priority::Normal).unwrap();
        let entries = wait_for(&dispatcher, 1);
        assert!(entries[0].outcome.is_success());
    }
}
