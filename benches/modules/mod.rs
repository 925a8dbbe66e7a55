//! Benchmarks for the control modules.

mod phrasing;
mod rack;
mod reel_peet;

pub use phrasing::bench_phrasing;
pub use rack::bench_rack;
pub use reel_peet::bench_reel_peet;
