//! Shared state types for UI communication
//!
//! Everything here is `Copy` so it can cross the ring buffers without
//! allocating on the audio thread.

use crate::modules::{
    phrasing::{self, PhrasingOutputs},
    reel_peet::{self, ReelPeetOutputs, STEPS},
};

/// Commands sent from UI thread to audio thread
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlMessage {
    /// Press a sequencer lane's run button
    ToggleRun(usize),
    /// Press a sequencer lane's randomize button
    Randomize(usize),
    /// Fire a trigger into a sequencer lane's hold jack
    Hold(usize),
    /// Press a presence lane's enable button
    ToggleLane(usize),
    SetDensity(f32),
    SetDuration(f32),
    SetPresence(usize, f32),
    SetBpm(usize, f32),
    SetLength(usize, f32),
    /// Patch (`Some`) or unpatch (`None`) a tempo CV
    SetTempoCv(usize, Option<f32>),
    /// Patch (`Some`) or unpatch (`None`) a run gate
    SetRunGate(usize, Option<f32>),
    /// Return both modules to their power-on state
    Reset,
}

/// Knob positions as the audio thread last saw them
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnobState {
    pub density: f32,
    pub duration: f32,
    pub presence: [f32; phrasing::LANES],
    /// BPM knobs after any tempo CV write-back
    pub bpm: [f32; reel_peet::LANES],
    pub length: [f32; reel_peet::LANES],
}

/// Dynamic state sent from the audio thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RackSnapshot {
    /// Frames processed since start
    pub frame: u64,
    pub sample_rate: f32,
    pub knobs: KnobState,
    pub phrasing: PhrasingOutputs,
    pub reel_peet: ReelPeetOutputs,
    /// Current sequence slots per lane
    pub sequences: [[f32; STEPS]; reel_peet::LANES],
    /// Snapshots that did not fit in the queue so far
    pub dropped: u32,
}

/// Momentary button emulation
///
/// A press drives the raw signal high for exactly one tick and low on the
/// next, so edge detectors see a clean rising edge. Presses that arrive
/// faster than that are queued. The very first tick is always low so
/// detectors that power on high get armed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Momentary {
    pending: u8,
    high: bool,
    armed: bool,
}

impl Momentary {
    pub fn press(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Signal level for the next tick, 0.0 or 1.0
    pub fn next(&mut self) -> f32 {
        self.high = self.armed && !self.high && self.pending > 0;
        self.armed = true;
        if self.high {
            self.pending -= 1;
            1.0
        } else {
            0.0
        }
    }
}
