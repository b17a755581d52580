//! Error taxonomy for the dispatcher.

use crate::task::TaskToken;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced synchronously by the dispatcher API.
///
/// Task-execution faults are not part of this enum: they are captured inside
/// the worker and reported asynchronously as failed result entries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pending queue is at its configured bound; the task was rejected.
    #[error("pending queue at capacity ({0})")]
    CapacityExceeded(usize),

    /// The token does not name a still-queued task (unknown, already running,
    /// already terminal, or already consumed).
    #[error("no pending task for {0}")]
    NotFound(TaskToken),

    /// No operation is registered under this name.
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    /// An operation is already registered under this name.
    #[error("operation {0:?} already registered")]
    OperationExists(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Worker pool setup failure (thread spawn, etc).
    #[error("worker pool error: {0}")]
    Pool(String),

    /// The dispatcher has been shut down.
    #[error("dispatcher is shut down")]
    ShutDown,
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn pool<S: Into<String>>(msg: S) -> Self {
        Error::Pool(msg.into())
    }
}
