//! Benchmarks for the presence lane engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use reelpeet::modules::phrasing::PhrasingControls;
use reelpeet::{CvModule, Phrasing, PhrasingConfig, ProcessCtx};

use crate::BLOCK_SIZES;

pub fn bench_phrasing(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/phrasing");
    let ctx = ProcessCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        // Slow re-rolls: mostly slewing
        let mut module = Phrasing::with_seed(PhrasingConfig::default(), 1);
        let mut controls = PhrasingControls::default();
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(module.process(black_box(&mut controls), &ctx));
                }
            })
        });

        // Shortest interval, low density: frequent rolls and liveness fixes
        let mut module = Phrasing::with_seed(PhrasingConfig::default(), 2);
        let mut controls = PhrasingControls {
            density: 0.1,
            duration: 0.0,
            ..PhrasingControls::default()
        };
        group.bench_with_input(BenchmarkId::new("busy", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(module.process(black_box(&mut controls), &ctx));
                }
            })
        });
    }

    group.finish();
}
