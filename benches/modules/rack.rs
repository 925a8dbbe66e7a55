//! Benchmarks for both modules behind the runtime bridge.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use reelpeet::runtime::{ControlMessage, Rack};
use reelpeet::{Phrasing, PhrasingConfig, ProcessCtx, ReelPeet, ReelPeetConfig};

use crate::BLOCK_SIZES;

pub fn bench_rack(c: &mut Criterion) {
    let mut group = c.benchmark_group("rack");
    let ctx = ProcessCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        let (mut rack, mut handle) = Rack::new(
            Phrasing::with_seed(PhrasingConfig::default(), 1),
            ReelPeet::with_seed(ReelPeetConfig::default(), 2),
            800,
        );
        handle.send(ControlMessage::ToggleRun(0));
        handle.send(ControlMessage::ToggleRun(1));

        group.bench_with_input(BenchmarkId::new("frame", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(rack.process_frame(black_box(&ctx)));
                }
                // Keep the snapshot queue from filling up
                black_box(handle.latest());
            })
        });
    }

    group.finish();
}
