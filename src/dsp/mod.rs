//! Low-level control-rate primitives used by the modules.
//!
//! Everything here is allocation-free and realtime-safe. The pieces stay
//! focused on one job each (edge detection, smoothing, timing math,
//! randomness) so the modules can compose them per lane.

/// Seedable uniform random source.
pub mod random;
/// Asymmetric one-pole smoothing.
pub mod slew;
/// Tempo, interval and step-count conversions.
pub mod timing;
/// Schmitt-trigger rising edge detection.
pub mod trigger;

pub use random::Dice;
pub use slew::Slew;
pub use trigger::{EdgeState, SchmittTrigger};
