pub mod config; // Tunables, builders and the host parameter table
pub mod dsp;
pub mod modules; // Phrasing and TheReelPeet
#[cfg(feature = "rtrb")]
pub mod runtime; // Audio-thread/UI-thread bridge

pub use config::{ConfigError, PhrasingConfig, ReelPeetConfig};
pub use modules::{CvModule, Phrasing, ProcessCtx, ReelPeet};
