pub mod backoff;
pub mod backpressure;

pub use backoff::IdleBackoff;
pub use backpressure::BackpressureGate;
