//! Benchmarks for the dual-lane sequencer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use reelpeet::modules::reel_peet::ReelPeetControls;
use reelpeet::{CvModule, ProcessCtx, ReelPeet, ReelPeetConfig};

use crate::BLOCK_SIZES;

pub fn bench_reel_peet(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/reel_peet");
    let ctx = ProcessCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        // Both lanes stopped - edge detection only
        let mut module = ReelPeet::with_seed(ReelPeetConfig::default(), 1);
        let mut controls = ReelPeetControls::default();
        group.bench_with_input(BenchmarkId::new("stopped", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(module.process(black_box(&mut controls), &ctx));
                }
            })
        });

        // Both lanes running at full tempo under tempo CV
        let mut module = ReelPeet::with_seed(ReelPeetConfig::default(), 2);
        let mut controls = ReelPeetControls::default();
        for lane in controls.lanes.iter_mut() {
            lane.run_gate = Some(10.0);
            lane.tempo_cv = Some(10.0);
            lane.length = 16.0;
        }
        group.bench_with_input(BenchmarkId::new("running", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(module.process(black_box(&mut controls), &ctx));
                }
            })
        });
    }

    group.finish();
}
