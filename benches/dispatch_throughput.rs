//! Benchmarks for submit/drain throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrypool::prelude::*;
use std::time::Duration;

fn dispatcher(workers: usize) -> Dispatcher {
    let config = Config::builder()
        .num_workers(workers)
        .queue_capacity(100_000)
        .cache_capacity(100_000)
        .build()
        .unwrap();

    let d = Dispatcher::new(config).unwrap();
    d.register("checksum", |payload| {
        let sum = payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        Ok(vec![sum])
    })
    .unwrap();
    d
}

fn run_batch(d: &Dispatcher, count: usize) -> usize {
    for i in 0..count {
        d.submit("checksum", vec![i as u8; 64], Priority::Normal)
            .unwrap();
    }

    let mut drained = 0;
    while drained < count {
        let batch = d.drain();
        drained += batch.len();
        if batch.is_empty() {
            std::thread::sleep(Duration::from_micros(10));
        }
    }
    drained
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_throughput");

    for workers in [1, 2, 4].iter() {
        let d = dispatcher(*workers);
        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            workers,
            |b, _workers| b.iter(|| run_batch(&d, black_box(1_000))),
        );
    }

    group.finish();
}

fn bench_priority_mix(c: &mut Criterion) {
    let d = dispatcher(2);

    c.bench_function("priority_mix_1000", |b| {
        b.iter(|| {
            for i in 0..1_000u32 {
                let priority = match i % 3 {
                    0 => Priority::High,
                    1 => Priority::Normal,
                    _ => Priority::Low,
                };
                d.submit("checksum", vec![1, 2, 3, 4], priority).unwrap();
            }

            let mut drained = 0;
            while drained < 1_000 {
                drained += d.drain().len();
            }
            black_box(drained)
        })
    });
}

criterion_group!(benches, bench_throughput, bench_priority_mix);
criterion_main!(benches);
