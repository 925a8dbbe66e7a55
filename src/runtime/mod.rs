//! Bridge between the audio thread and a presentation thread.
//!
//! The audio thread owns a [`Rack`]: both modules, their panels, and the
//! receiving end of the control queue. Everything else talks to it through
//! a [`RackHandle`], which pushes [`ControlMessage`]s and reads back
//! decimated [`RackSnapshot`]s. Both directions are lock-free SPSC ring
//! buffers, so the audio callback never waits on the UI.
//!
//! # Example
//!
//! ```
//! use reelpeet::{
//!     runtime::{ControlMessage, Rack},
//!     Phrasing, PhrasingConfig, ProcessCtx, ReelPeet, ReelPeetConfig,
//! };
//!
//! let (mut rack, mut handle) = Rack::new(
//!     Phrasing::with_seed(PhrasingConfig::default(), 1),
//!     ReelPeet::with_seed(ReelPeetConfig::default(), 2),
//!     64,
//! );
//! handle.send(ControlMessage::ToggleRun(0));
//!
//! let ctx = ProcessCtx::new(48_000.0);
//! for _ in 0..128 {
//!     rack.process_frame(&ctx);
//! }
//! assert!(handle.latest().unwrap().reel_peet.lanes[0].running);
//! ```

mod state;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::modules::{
    phrasing::{self, PhrasingControls, PhrasingOutputs},
    reel_peet::{self, ReelPeetControls, ReelPeetOutputs},
    CvModule, Phrasing, ProcessCtx, ReelPeet,
};

pub use state::{ControlMessage, KnobState, Momentary, RackSnapshot};

const CONTROL_QUEUE_SIZE: usize = 256;
const SNAPSHOT_QUEUE_SIZE: usize = 64;

/// Outputs of both modules for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RackFrame {
    pub phrasing: PhrasingOutputs,
    pub reel_peet: ReelPeetOutputs,
}

/// Audio-thread side: both modules plus their host panels
pub struct Rack {
    phrasing: Phrasing,
    reel_peet: ReelPeet,
    phrasing_controls: PhrasingControls,
    reel_controls: ReelPeetControls,

    enable_buttons: [Momentary; phrasing::LANES],
    run_buttons: [Momentary; reel_peet::LANES],
    rand_buttons: [Momentary; reel_peet::LANES],
    hold_jacks: [Momentary; reel_peet::LANES],

    rx: Consumer<ControlMessage>,
    tx: Producer<RackSnapshot>,
    frame: u64,
    snapshot_interval: u64,
    dropped: u32,
}

/// UI-thread side of a [`Rack`]
pub struct RackHandle {
    tx: Producer<ControlMessage>,
    rx: Consumer<RackSnapshot>,
    latest: Option<RackSnapshot>,
}

impl Rack {
    /// Build a rack and its handle.
    ///
    /// A snapshot is published every `snapshot_interval` frames (at least 1).
    pub fn new(phrasing: Phrasing, reel_peet: ReelPeet, snapshot_interval: u32) -> (Self, RackHandle) {
        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);
        let (snapshot_tx, snapshot_rx) = RingBuffer::<RackSnapshot>::new(SNAPSHOT_QUEUE_SIZE);

        let mut reel_controls = ReelPeetControls::default();
        for lane in reel_controls.lanes.iter_mut() {
            // The UI fires holds through the jack
            lane.hold_trigger = Some(0.0);
        }

        let rack = Self {
            phrasing,
            reel_peet,
            phrasing_controls: PhrasingControls::default(),
            reel_controls,
            enable_buttons: Default::default(),
            run_buttons: Default::default(),
            rand_buttons: Default::default(),
            hold_jacks: Default::default(),
            rx: control_rx,
            tx: snapshot_tx,
            frame: 0,
            snapshot_interval: u64::from(snapshot_interval.max(1)),
            dropped: 0,
        };
        let handle = RackHandle {
            tx: control_tx,
            rx: snapshot_rx,
            latest: None,
        };

        log::info!("rack ready: snapshot every {} frames", rack.snapshot_interval);
        (rack, handle)
    }

    /// Drain pending controls, tick both modules once, maybe publish a snapshot.
    pub fn process_frame(&mut self, ctx: &ProcessCtx) -> RackFrame {
        while let Ok(msg) = self.rx.pop() {
            self.apply(msg);
        }

        for (signal, button) in self
            .phrasing_controls
            .enable_buttons
            .iter_mut()
            .zip(self.enable_buttons.iter_mut())
        {
            *signal = button.next();
        }
        for (i, lane) in self.reel_controls.lanes.iter_mut().enumerate() {
            lane.run_button = self.run_buttons[i].next();
            lane.rand_button = self.rand_buttons[i].next();
            lane.hold_trigger = Some(10.0 * self.hold_jacks[i].next());
        }

        let frame = RackFrame {
            phrasing: self.phrasing.process(&mut self.phrasing_controls, ctx),
            reel_peet: self.reel_peet.process(&mut self.reel_controls, ctx),
        };

        self.frame += 1;
        if self.frame % self.snapshot_interval == 0 {
            let snapshot = self.snapshot(&frame, ctx);
            if self.tx.push(snapshot).is_err() {
                self.dropped = self.dropped.saturating_add(1);
            }
        }

        frame
    }

    fn apply(&mut self, msg: ControlMessage) {
        let lanes = &mut self.reel_controls.lanes;
        match msg {
            ControlMessage::ToggleRun(i) => {
                if let Some(button) = self.run_buttons.get_mut(i) {
                    button.press();
                }
            }
            ControlMessage::Randomize(i) => {
                if let Some(button) = self.rand_buttons.get_mut(i) {
                    button.press();
                }
            }
            ControlMessage::Hold(i) => {
                if let Some(jack) = self.hold_jacks.get_mut(i) {
                    jack.press();
                }
            }
            ControlMessage::ToggleLane(i) => {
                if let Some(button) = self.enable_buttons.get_mut(i) {
                    button.press();
                }
            }
            ControlMessage::SetDensity(v) => self.phrasing_controls.density = v,
            ControlMessage::SetDuration(v) => self.phrasing_controls.duration = v,
            ControlMessage::SetPresence(i, v) => {
                if let Some(p) = self.phrasing_controls.presence.get_mut(i) {
                    *p = v;
                }
            }
            ControlMessage::SetBpm(i, v) => {
                if let Some(lane) = lanes.get_mut(i) {
                    lane.bpm = v;
                }
            }
            ControlMessage::SetLength(i, v) => {
                if let Some(lane) = lanes.get_mut(i) {
                    lane.length = v;
                }
            }
            ControlMessage::SetTempoCv(i, v) => {
                if let Some(lane) = lanes.get_mut(i) {
                    lane.tempo_cv = v;
                }
            }
            ControlMessage::SetRunGate(i, v) => {
                if let Some(lane) = lanes.get_mut(i) {
                    lane.run_gate = v;
                }
            }
            ControlMessage::Reset => {
                self.phrasing.reset();
                self.reel_peet.reset();
            }
        }
    }

    fn snapshot(&self, frame: &RackFrame, ctx: &ProcessCtx) -> RackSnapshot {
        let lanes = &self.reel_controls.lanes;
        let seq = self.reel_peet.lanes();
        RackSnapshot {
            frame: self.frame,
            sample_rate: ctx.sample_rate,
            knobs: KnobState {
                density: self.phrasing_controls.density,
                duration: self.phrasing_controls.duration,
                presence: self.phrasing_controls.presence,
                bpm: [lanes[0].bpm, lanes[1].bpm],
                length: [lanes[0].length, lanes[1].length],
            },
            phrasing: frame.phrasing,
            reel_peet: frame.reel_peet,
            sequences: [*seq[0].sequence(), *seq[1].sequence()],
            dropped: self.dropped,
        }
    }

    pub fn phrasing(&self) -> &Phrasing {
        &self.phrasing
    }

    pub fn reel_peet(&self) -> &ReelPeet {
        &self.reel_peet
    }

    /// Frames processed since construction
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl RackHandle {
    /// Queue a control message. Returns false if the queue is full.
    pub fn send(&mut self, msg: ControlMessage) -> bool {
        self.tx.push(msg).is_ok()
    }

    /// Drain the snapshot queue and return the newest one seen so far.
    pub fn latest(&mut self) -> Option<&RackSnapshot> {
        while let Ok(snapshot) = self.rx.pop() {
            self.latest = Some(snapshot);
        }
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhrasingConfig, ReelPeetConfig};

    const SAMPLE_RATE: f32 = 1_000.0;

    fn rack(interval: u32) -> (Rack, RackHandle) {
        Rack::new(
            Phrasing::with_seed(PhrasingConfig::default(), 1),
            ReelPeet::with_seed(ReelPeetConfig::default(), 2),
            interval,
        )
    }

    fn tick(rack: &mut Rack, frames: usize) -> RackFrame {
        let ctx = ProcessCtx::new(SAMPLE_RATE);
        let mut frame = RackFrame::default();
        for _ in 0..frames {
            frame = rack.process_frame(&ctx);
        }
        frame
    }

    #[test]
    fn snapshots_are_decimated() {
        let (mut rack, mut handle) = rack(10);
        tick(&mut rack, 9);
        assert!(handle.latest().is_none());
        tick(&mut rack, 1);
        let snap = handle.latest().copied().unwrap();
        assert_eq!(snap.frame, 10);
        assert_eq!(snap.sample_rate, SAMPLE_RATE);
        assert_eq!(snap.knobs.bpm, [120.0, 120.0]);
    }

    #[test]
    fn run_press_toggles_once() {
        let (mut rack, mut handle) = rack(1);
        assert!(handle.send(ControlMessage::ToggleRun(1)));
        let frame = tick(&mut rack, 5);
        assert!(frame.reel_peet.lanes[1].running);
        assert!(!frame.reel_peet.lanes[0].running);

        handle.send(ControlMessage::ToggleRun(1));
        let frame = tick(&mut rack, 5);
        assert!(!frame.reel_peet.lanes[1].running);
    }

    #[test]
    fn hold_message_freezes_running_lane() {
        let (mut rack, mut handle) = rack(1);
        handle.send(ControlMessage::ToggleRun(0));
        tick(&mut rack, 10);
        handle.send(ControlMessage::Hold(0));
        let frame = tick(&mut rack, 2);
        assert!(frame.reel_peet.lanes[0].held);
    }

    #[test]
    fn lane_toggle_disables_presence_lane() {
        let (mut rack, mut handle) = rack(1);
        tick(&mut rack, 1);
        handle.send(ControlMessage::ToggleLane(3));
        let frame = tick(&mut rack, 2);
        assert!(!frame.phrasing.enabled[3]);
        assert!(frame.phrasing.enabled[0]);
    }

    #[test]
    fn tempo_cv_write_back_reaches_snapshot() {
        let (mut rack, mut handle) = rack(1);
        handle.send(ControlMessage::SetTempoCv(0, Some(10.0)));
        tick(&mut rack, 1);
        let snap = handle.latest().copied().unwrap();
        assert_eq!(snap.knobs.bpm[0], 300.0);
        assert_eq!(snap.reel_peet.lanes[0].bpm, 300.0);
    }

    #[test]
    fn out_of_range_lane_is_ignored() {
        let (mut rack, mut handle) = rack(1);
        handle.send(ControlMessage::ToggleRun(7));
        handle.send(ControlMessage::SetPresence(9, 0.1));
        let frame = tick(&mut rack, 3);
        assert!(!frame.reel_peet.lanes[0].running);
        assert!(!frame.reel_peet.lanes[1].running);
    }

    #[test]
    fn full_snapshot_queue_counts_drops() {
        let (mut rack, mut handle) = rack(1);
        tick(&mut rack, SNAPSHOT_QUEUE_SIZE + 5);
        let snap = handle.latest().copied().unwrap();
        assert_eq!(snap.frame, SNAPSHOT_QUEUE_SIZE as u64);
        tick(&mut rack, 1);
        assert_eq!(handle.latest().unwrap().dropped, 5);
    }
}
