//! One-stop imports for dispatcher users.

pub use crate::cache::{ResultEntry, TaskOutcome};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{Error, Result};
pub use crate::pool::WorkerSnapshot;
pub use crate::task::{OpResult, Payload, Priority, TaskStatus, TaskToken};

pub use crate::telemetry::{Metrics, MetricsSnapshot};
