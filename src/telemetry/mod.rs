//! Runtime counters and latency tracking.
//!
//! Gated behind the `telemetry` feature (on by default). With the feature
//! disabled a zero-cost stub keeps call sites unchanged.

#[cfg(feature = "telemetry")]
pub mod metrics;

#[cfg(feature = "telemetry")]
pub use metrics::{Metrics, MetricsSnapshot};

// Stub implementations when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub mod metrics {
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct Metrics;

    impl Metrics {
        pub fn new() -> Self {
            Self
        }
        pub fn record_submitted(&self) {}
        pub fn record_rejected(&self) {}
        pub fn record_cancelled(&self) {}
        pub fn record_completed(&self, _duration_ns: u64) {}
        pub fn record_failed(&self, _duration_ns: u64) {}
        pub fn snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot::default()
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct MetricsSnapshot {
        pub uptime: Duration,
        pub tasks_submitted: u64,
        pub tasks_completed: u64,
        pub tasks_failed: u64,
        pub tasks_cancelled: u64,
        pub tasks_rejected: u64,
        pub avg_latency_ns: u64,
        pub p50_latency_ns: u64,
        pub p95_latency_ns: u64,
        pub p99_latency_ns: u64,
        pub max_latency_ns: u64,
    }

    impl MetricsSnapshot {
        pub fn tasks_finished(&self) -> u64 {
            self.tasks_completed + self.tasks_failed
        }

        pub fn completed_per_second(&self) -> f64 {
            0.0
        }
    }
}

#[cfg(not(feature = "telemetry"))]
pub use metrics::{Metrics, MetricsSnapshot};
