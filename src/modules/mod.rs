//! The two control-voltage modules and the trait they share.
//!
//! Each module is a plain struct advanced one sample at a time through
//! [`CvModule::process`]. State lives in fixed-size lane arrays, so a tick
//! never allocates and always does the same amount of work.

/// Core trait and per-tick context shared by all modules.
pub mod node;
/// Four probabilistic presence lanes with slewed outputs.
pub mod phrasing;
/// Two-lane 16-step CV sequencer with hold and randomize.
pub mod reel_peet;

pub use node::{CvModule, ProcessCtx};
pub use phrasing::{Phrasing, PhrasingControls, PhrasingOutputs};
pub use reel_peet::{LaneControls, LaneOutputs, ReelPeet, ReelPeetControls, ReelPeetOutputs};
