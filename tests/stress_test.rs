//! Stress tests for the dispatcher.

use ferrypool::prelude::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn drain_exactly(d: &Dispatcher, count: usize, timeout: Duration) -> Vec<ResultEntry> {
    let deadline = Instant::now() + timeout;
    let mut entries = Vec::new();
    while entries.len() < count {
        entries.extend(d.drain());
        assert!(Instant::now() < deadline, "timed out waiting for results");
        std::thread::sleep(Duration::from_millis(1));
    }
    entries
}

#[test]
#[ignore] // Run with --ignored flag
fn stress_many_tasks_all_accounted() {
    let config = Config::builder()
        .num_workers(4)
        .queue_capacity(20_000)
        .cache_capacity(1_000)
        .build()
        .unwrap();
    let d = Dispatcher::new(config).unwrap();
    d.register("checksum", |payload| {
        let sum = payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        Ok(vec![sum])
    })
    .unwrap();

    let mut tokens = HashSet::new();
    for i in 0..10_000u32 {
        let priority = match i % 3 {
            0 => Priority::High,
            1 => Priority::Normal,
            _ => Priority::Low,
        };
        let token = d
            .submit("checksum", i.to_le_bytes().to_vec(), priority)
            .unwrap();
        tokens.insert(token);
    }

    let entries = drain_exactly(&d, 10_000, Duration::from_secs(60));
    assert_eq!(entries.len(), 10_000);

    let drained: HashSet<TaskToken> = entries.iter().map(|e| e.token).collect();
    assert_eq!(drained, tokens);

    // Completion indexes are unique and ordered.
    for pair in entries.windows(2) {
        assert!(pair[0].completion_index < pair[1].completion_index);
    }

    #[cfg(feature = "telemetry")]
    {
        let metrics = d.metrics();
        assert_eq!(metrics.tasks_submitted, 10_000);
        assert_eq!(metrics.tasks_finished(), 10_000);
    }
}

#[test]
#[ignore]
fn stress_cancel_storm() {
    let config = Config::builder()
        .num_workers(2)
        .queue_capacity(20_000)
        .cache_capacity(1_000)
        .build()
        .unwrap();
    let d = Dispatcher::new(config).unwrap();
    d.register("spin", |payload| {
        std::thread::sleep(Duration::from_micros(50));
        Ok(payload)
    })
    .unwrap();

    let mut tokens = Vec::new();
    for _ in 0..5_000 {
        tokens.push(d.submit("spin", Vec::new(), Priority::Normal).unwrap());
    }

    // Race cancellations against the workers. Each task either cancels
    // exactly once or completes exactly once.
    let mut cancelled = 0;
    for token in tokens.iter().step_by(2) {
        if d.cancel(*token).is_ok() {
            cancelled += 1;
        }
    }

    let entries = drain_exactly(&d, 5_000 - cancelled, Duration::from_secs(60));

    let drained: HashSet<TaskToken> = entries.iter().map(|e| e.token).collect();
    assert_eq!(drained.len(), entries.len(), "duplicate results");
    for token in &tokens {
        // Not drained means cancelled (possibly an unreaped tombstone).
        assert!(
            drained.contains(token)
                || matches!(d.status(*token), None | Some(TaskStatus::Cancelled))
        );
    }

    #[cfg(feature = "telemetry")]
    {
        let metrics = d.metrics();
        assert_eq!(metrics.tasks_cancelled as usize, cancelled);
        assert_eq!(metrics.tasks_finished() as usize, 5_000 - cancelled);
    }

    // Nothing straggles in.
    std::thread::sleep(Duration::from_millis(50));
    assert!(d.drain().is_empty());
}

#[test]
#[ignore]
fn stress_concurrent_submitters() {
    let config = Config::builder()
        .num_workers(4)
        .queue_capacity(50_000)
        .cache_capacity(2_000)
        .build()
        .unwrap();
    let d = Arc::new({
        let d = Dispatcher::new(config).unwrap();
        d.register("echo", Ok).unwrap();
        d
    });

    let submitted = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let d = Arc::clone(&d);
            let submitted = Arc::clone(&submitted);
            std::thread::spawn(move || {
                for _ in 0..1_000 {
                    let token = d.submit("echo", Vec::new(), Priority::Normal).unwrap();
                    submitted.lock().insert(token);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let entries = drain_exactly(&d, 8_000, Duration::from_secs(60));
    let drained: HashSet<TaskToken> = entries.iter().map(|e| e.token).collect();
    assert_eq!(drained, *submitted.lock());
}
