#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Schmitt Trigger Edge Detection
==============================

Buttons and trigger jacks arrive as plain floats every sample. A button
reads 0.0 or 1.0, a trigger jack reads anything from 0 V to 10 V. To turn
these into discrete "it was pressed" events we compare against two
thresholds instead of one.

Vocabulary
----------

  edge        The moment a signal changes state. We only care about
              rising edges (low → high).

  hysteresis  Using separate thresholds for going high and going low.
              A noisy signal hovering near a single threshold would
              fire many edges; two thresholds make it fire once.

  state       What the detector currently believes: Low or High.


The Thresholds
--------------

      V
   1.0 ┼ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─   HIGH threshold (>= 1.0 fires)
       │        ┌──┐    ╱╲
       │        │  │   ╱  ╲
   0.0 ┼ ─ ─ ─ ─│─ ─│─ ─ ─ ─ ─ ─ ─   LOW threshold (<= 0.0 re-arms)
       └────────┴──┴──────────────→ t
                ↑
              fired

Between the thresholds the state does not change. A normalized button
(0/1) crosses both; a 10 V trigger crosses both with plenty of margin.


Initial State
-------------

Detectors start in the High state. A jack that is already high when the
module is created must fall below the low threshold before it can fire,
so a patched gate never produces a phantom edge at startup.
*/

/// Threshold at or above which a Low detector goes High and fires.
pub const HIGH_THRESHOLD: f32 = 1.0;
/// Threshold at or below which a High detector re-arms.
pub const LOW_THRESHOLD: f32 = 0.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Low,
    High,
}

/// Advance an edge detector by one sample.
///
/// Returns the new state and whether a rising edge fired on this sample.
///
/// # Example
/// ```
/// use reelpeet::dsp::trigger::{detect_rising_edge, EdgeState};
/// let (state, fired) = detect_rising_edge(EdgeState::Low, 1.0);
/// assert_eq!(state, EdgeState::High);
/// assert!(fired);
/// ```
#[inline]
pub fn detect_rising_edge(prev: EdgeState, signal: f32) -> (EdgeState, bool) {
    match prev {
        EdgeState::Low if signal >= HIGH_THRESHOLD => (EdgeState::High, true),
        EdgeState::High if signal <= LOW_THRESHOLD => (EdgeState::Low, false),
        // NaN compares false on both sides and leaves the state alone
        state => (state, false),
    }
}

/// Stateful wrapper around [`detect_rising_edge`].
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    state: EdgeState,
}

impl SchmittTrigger {
    pub fn new() -> Self {
        Self {
            state: EdgeState::High,
        }
    }

    /// Feed one sample, returning true on a rising edge.
    #[inline]
    pub fn process(&mut self, signal: f32) -> bool {
        let (state, fired) = detect_rising_edge(self.state, signal);
        self.state = state;
        fired
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = EdgeState::High;
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new()
    }
}
