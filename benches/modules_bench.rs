//! Benchmarks for the per-sample modules.
//!
//! Run with: cargo bench
//!
//! Each module is ticked once per sample, so these measure a block's worth
//! of ticks and should sit far below the real-time deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - modules/*    Phrasing and TheReelPeet in isolation
//!   - rack         Both modules behind the runtime bridge

use criterion::{criterion_group, criterion_main};

mod modules;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    modules::bench_phrasing,
    modules::bench_reel_peet,
    modules::bench_rack,
);
criterion_main!(benches);
