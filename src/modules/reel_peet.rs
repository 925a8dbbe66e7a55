#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{ReelPeetConfig, BPM, BUTTON, LENGTH},
    dsp::{
        timing::{bpm_from_cv, step_count, step_time, tempo_level},
        Dice, SchmittTrigger,
    },
    modules::node::{CvModule, ProcessCtx},
};

/*
TheReelPeet: Dual-Lane Step Sequencer
=====================================

Two independent 16-slot CV sequencers. Each lane has its own clock,
length, run state and hold, and emits a pitch CV plus a short trigger on
every step.

Vocabulary
----------

  step        Index of the slot currently being played.

  length      How many slots the lane cycles through (1 to 16).

  step time   Seconds per step: 60 / bpm. One step per beat.

  pulse       10 V for 10 ms on every step advance.

  hold        A timed freeze (~4 s). The lane keeps running and keeps
              its CV, but the step does not move and no pulses fire.


Controls
--------

  BPM knob    20..300. A patched tempo CV (0..10 V) overrides it AND
              moves the knob, so the panel shows the CV tempo.

  Run button  Toggles running on each press, unless the run gate jack is
              patched. A patched gate runs the lane while >= 1 V.

  Rand        Button or trigger jack. Redraws all 16 slots in [0, 5) V,
              running or not.

  Hold jack   Rising edge starts the freeze window.


The State Machine
-----------------

    ┌─────────┐  run edge / gate high   ┌─────────┐
    │ Stopped │ ──────────────────────→ │ Running │
    │         │ ←────────────────────── │         │
    └─────────┘  run edge / gate low    └─────────┘
         ↑                                │     ↑
         │                     hold edge  │     │  hold timer hits 0
         │                                ↓     │
         │    run edge / gate low    ┌──────────────┐
         └────────────────────────── │ Running+Held │
                                     └──────────────┘

Stopping from anywhere forces step, step timer, pulse timer and hold
timer back to zero, so a pending hold never survives a stop.


Timing Detail
-------------

The step timer is a phase accumulator. When it passes the step time we
SUBTRACT the step time rather than zeroing, so leftover fractions carry
into the next step and the tempo does not drift with the sample rate.

    stepTimer += dt
    if stepTimer >= stepTime:
        stepTimer -= stepTime
        step = (step + 1) mod length
        pulse = 10 ms
*/

/// Number of sequencer lanes.
pub const LANES: usize = 2;
/// Slots per sequence.
pub const STEPS: usize = 16;

/// Host panel for one sequencer lane
///
/// Jacks are `None` when unpatched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneControls {
    /// BPM knob. Overwritten while `tempo_cv` is patched.
    pub bpm: f32,
    /// Length knob, rounded and clamped to 1..=16
    pub length: f32,
    /// Raw run button signal
    pub run_button: f32,
    /// Raw randomize button signal
    pub rand_button: f32,
    pub tempo_cv: Option<f32>,
    pub run_gate: Option<f32>,
    pub rand_trigger: Option<f32>,
    pub hold_trigger: Option<f32>,
}

impl Default for LaneControls {
    fn default() -> Self {
        Self {
            bpm: BPM.default,
            length: LENGTH.default,
            run_button: BUTTON.default,
            rand_button: BUTTON.default,
            tempo_cv: None,
            run_gate: None,
            rand_trigger: None,
            hold_trigger: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReelPeetControls {
    pub lanes: [LaneControls; LANES],
}

/// One tick of sequencer output for a lane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaneOutputs {
    /// Current slot voltage while running, 0 while stopped
    pub pitch_cv: f32,
    /// Pulse voltage while a step pulse is in flight, else 0
    pub trigger: f32,
    /// Run indicator
    pub running: bool,
    pub held: bool,
    pub step: usize,
    /// Steps in the cycle (for the length display)
    pub length: usize,
    /// Effective, clamped tempo
    pub bpm: f32,
    /// Tempo as 0..1 of the BPM range (for the tempo meter)
    pub tempo_level: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReelPeetOutputs {
    pub lanes: [LaneOutputs; LANES],
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    Stopped,
    Running,
    RunningHeld,
}

#[derive(Debug, Clone, Copy)]
pub struct SequencerLane {
    sequence: [f32; STEPS],
    length: usize,
    step: usize,
    running: bool,
    step_timer: f32,
    trig_timer: f32,
    hold_timer: f32,
    hold_duration: f32,

    run_trig: SchmittTrigger,
    rand_trig: SchmittTrigger,
    rand_in_trig: SchmittTrigger,
    hold_trig: SchmittTrigger,
}

impl SequencerLane {
    fn new(config: &ReelPeetConfig, dice: &mut Dice) -> Self {
        let mut lane = Self {
            sequence: [0.0; STEPS],
            length: step_count(LENGTH.default, 1, STEPS),
            step: 0,
            running: false,
            step_timer: 0.0,
            trig_timer: 0.0,
            hold_timer: 0.0,
            hold_duration: config.hold_duration,
            run_trig: SchmittTrigger::new(),
            rand_trig: SchmittTrigger::new(),
            rand_in_trig: SchmittTrigger::new(),
            hold_trig: SchmittTrigger::new(),
        };
        lane.randomize(dice, config.sequence_range);
        lane
    }

    fn randomize(&mut self, dice: &mut Dice, range: f32) {
        for slot in self.sequence.iter_mut() {
            *slot = dice.range(0.0, range);
        }
    }

    fn stop(&mut self) {
        self.step = 0;
        self.step_timer = 0.0;
        self.trig_timer = 0.0;
        self.hold_timer = 0.0;
    }

    fn process(
        &mut self,
        controls: &mut LaneControls,
        config: &ReelPeetConfig,
        dice: &mut Dice,
        dt: f32,
    ) -> LaneOutputs {
        if let Some(volts) = controls.tempo_cv {
            // CV drives the knob so the panel follows
            controls.bpm = bpm_from_cv(volts, config.tempo_cv_max, config.bpm_min, config.bpm_max);
        }
        let bpm = if controls.bpm.is_nan() {
            config.bpm_min
        } else {
            controls.bpm.clamp(config.bpm_min, config.bpm_max)
        };
        self.length = step_count(controls.length, 1, STEPS);

        match controls.run_gate {
            Some(volts) => self.running = volts >= config.run_threshold,
            None => {
                if self.run_trig.process(controls.run_button) {
                    self.running = !self.running;
                }
            }
        }

        if self.hold_duration > 0.0 && self.hold_trig.process(controls.hold_trigger.unwrap_or(0.0)) {
            self.hold_timer = self.hold_duration;
        }
        if self.hold_timer > 0.0 {
            self.hold_timer = (self.hold_timer - dt).max(0.0);
        }

        // Evaluate both detectors every tick so neither misses its edge
        let button = self.rand_trig.process(controls.rand_button);
        let jack = self.rand_in_trig.process(controls.rand_trigger.unwrap_or(0.0));
        if button || jack {
            self.randomize(dice, config.sequence_range);
        }

        if self.trig_timer > 0.0 {
            self.trig_timer = (self.trig_timer - dt).max(0.0);
        }

        let mut pitch_cv = 0.0;
        if self.running {
            // Length may have shrunk under the playhead
            self.step %= self.length;
            if self.hold_timer <= 0.0 {
                let step_time = step_time(bpm);
                self.step_timer += dt;
                if self.step_timer >= step_time {
                    self.step_timer -= step_time;
                    self.step = (self.step + 1) % self.length;
                    self.trig_timer = config.pulse_width;
                }
            }
            pitch_cv = self.sequence[self.step];
        } else {
            self.stop();
        }

        LaneOutputs {
            pitch_cv,
            trigger: if self.trig_timer > 0.0 {
                config.pulse_volts
            } else {
                0.0
            },
            running: self.running,
            held: self.is_held(),
            step: self.step,
            length: self.length,
            bpm,
            tempo_level: tempo_level(bpm, config.bpm_min, config.bpm_max),
        }
    }

    pub fn sequence(&self) -> &[f32; STEPS] {
        &self.sequence
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_held(&self) -> bool {
        self.running && self.hold_timer > 0.0
    }

    pub fn step_timer(&self) -> f32 {
        self.step_timer
    }

    pub fn trig_timer(&self) -> f32 {
        self.trig_timer
    }

    pub fn hold_timer(&self) -> f32 {
        self.hold_timer
    }

    pub fn hold_duration(&self) -> f32 {
        self.hold_duration
    }

    pub fn state(&self) -> LaneState {
        match (self.running, self.hold_timer > 0.0) {
            (false, _) => LaneState::Stopped,
            (true, false) => LaneState::Running,
            (true, true) => LaneState::RunningHeld,
        }
    }
}

/// Two-lane step sequencer
pub struct ReelPeet {
    config: ReelPeetConfig,
    lanes: [SequencerLane; LANES],
    dice: Dice,
}

impl ReelPeet {
    /// Create with an OS-seeded random source. Call off the audio thread.
    pub fn new(config: ReelPeetConfig) -> Self {
        Self::with_dice(config, Dice::from_entropy())
    }

    /// Create with a fixed seed for reproducible sequences.
    pub fn with_seed(config: ReelPeetConfig, seed: u64) -> Self {
        Self::with_dice(config, Dice::seeded(seed))
    }

    pub fn with_dice(config: ReelPeetConfig, mut dice: Dice) -> Self {
        let lanes = [
            SequencerLane::new(&config, &mut dice),
            SequencerLane::new(&config, &mut dice),
        ];
        log::debug!("reel peet: {} lanes, hold {} s", LANES, config.hold_duration);
        Self {
            config,
            lanes,
            dice,
        }
    }

    pub fn lanes(&self) -> &[SequencerLane; LANES] {
        &self.lanes
    }

    pub fn config(&self) -> &ReelPeetConfig {
        &self.config
    }
}

impl CvModule for ReelPeet {
    type Controls = ReelPeetControls;
    type Outputs = ReelPeetOutputs;

    fn process(&mut self, controls: &mut ReelPeetControls, ctx: &ProcessCtx) -> ReelPeetOutputs {
        let mut outputs = ReelPeetOutputs::default();
        for ((lane, lane_controls), out) in self
            .lanes
            .iter_mut()
            .zip(controls.lanes.iter_mut())
            .zip(outputs.lanes.iter_mut())
        {
            *out = lane.process(lane_controls, &self.config, &mut self.dice, ctx.sample_time);
        }
        outputs
    }

    fn reset(&mut self) {
        for lane in self.lanes.iter_mut() {
            *lane = SequencerLane::new(&self.config, &mut self.dice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Power of two so sample time sums exactly
    const SAMPLE_RATE: f32 = 1_024.0;

    fn ctx() -> ProcessCtx {
        ProcessCtx::new(SAMPLE_RATE)
    }

    fn reel(seed: u64) -> ReelPeet {
        ReelPeet::with_seed(ReelPeetConfig::default(), seed)
    }

    fn run(module: &mut ReelPeet, controls: &mut ReelPeetControls, ticks: usize) -> ReelPeetOutputs {
        let mut out = ReelPeetOutputs::default();
        for _ in 0..ticks {
            out = module.process(controls, &ctx());
        }
        out
    }

    fn gated(length: f32) -> ReelPeetControls {
        let mut controls = ReelPeetControls::default();
        controls.lanes[0].run_gate = Some(5.0);
        controls.lanes[0].length = length;
        controls
    }

    #[test]
    fn starts_stopped_with_random_sequences() {
        let module = reel(1);
        for lane in module.lanes() {
            assert_eq!(lane.state(), LaneState::Stopped);
            assert!(lane.sequence().iter().all(|v| (0.0..5.0).contains(v)));
        }
        assert_ne!(module.lanes()[0].sequence(), module.lanes()[1].sequence());
    }

    #[test]
    fn step_advances_on_the_beat() {
        let mut module = reel(2);
        let mut controls = gated(4.0);

        let out = run(&mut module, &mut controls, 511);
        assert_eq!(out.lanes[0].step, 0);
        assert_eq!(out.lanes[0].trigger, 0.0);
        assert!(out.lanes[0].running);

        // 512 ticks at 1024 Hz is exactly 0.5 s
        let out = run(&mut module, &mut controls, 1);
        assert_eq!(out.lanes[0].step, 1);
        assert_eq!(out.lanes[0].trigger, 10.0);
        assert_eq!(out.lanes[0].pitch_cv, module.lanes()[0].sequence()[1]);

        let out = run(&mut module, &mut controls, 9);
        assert_eq!(out.lanes[0].trigger, 10.0, "pulse lasts ~10 ms");
        let out = run(&mut module, &mut controls, 10);
        assert_eq!(out.lanes[0].trigger, 0.0);
    }

    #[test]
    fn step_wraps_at_length() {
        let mut module = reel(3);
        let mut controls = gated(4.0);
        let mut seen = Vec::new();
        for _ in 0..(6 * 512) {
            let out = module.process(&mut controls, &ctx());
            assert!(out.lanes[0].step < out.lanes[0].length);
            if seen.last() != Some(&out.lanes[0].step) {
                seen.push(out.lanes[0].step);
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 0, 1, 2]);
    }

    #[test]
    fn shrinking_length_keeps_step_in_range() {
        let mut module = reel(4);
        let mut controls = gated(16.0);
        run(&mut module, &mut controls, 512 * 10);
        assert_eq!(module.lanes()[0].step(), 10);

        controls.lanes[0].length = 3.0;
        let out = run(&mut module, &mut controls, 1);
        assert_eq!(out.lanes[0].length, 3);
        assert!(out.lanes[0].step < 3);
    }

    #[test]
    fn length_is_rounded_and_clamped() {
        let mut module = reel(5);
        let mut controls = ReelPeetControls::default();
        for (knob, expected) in [(0.0, 1), (2.4, 2), (2.6, 3), (16.0, 16), (99.0, 16)] {
            controls.lanes[1].length = knob;
            let out = module.process(&mut controls, &ctx());
            assert_eq!(out.lanes[1].length, expected, "knob {knob}");
        }
    }

    #[test]
    fn run_button_toggles_on_edges() {
        let mut module = reel(6);
        let mut controls = ReelPeetControls::default();

        let presses = [0.0, 1.0, 1.0, 0.0, 1.0];
        let expected = [false, true, true, true, false];
        for (&signal, &running) in presses.iter().zip(&expected) {
            controls.lanes[0].run_button = signal;
            let out = module.process(&mut controls, &ctx());
            assert_eq!(out.lanes[0].running, running);
        }
        assert!(!module.lanes()[1].is_running(), "lanes are independent");
    }

    #[test]
    fn run_gate_overrides_button() {
        let mut module = reel(7);
        let mut controls = ReelPeetControls::default();
        controls.lanes[0].run_gate = Some(0.99);
        controls.lanes[0].run_button = 0.0;
        run(&mut module, &mut controls, 1);
        controls.lanes[0].run_button = 1.0;
        let out = run(&mut module, &mut controls, 1);
        assert!(!out.lanes[0].running, "button ignored while gate is patched");

        controls.lanes[0].run_gate = Some(1.0);
        let out = run(&mut module, &mut controls, 1);
        assert!(out.lanes[0].running);
    }

    #[test]
    fn stopping_clears_everything() {
        let mut module = reel(8);
        let mut controls = gated(8.0);
        controls.lanes[0].hold_trigger = Some(0.0);
        run(&mut module, &mut controls, 512 * 3 + 100);
        controls.lanes[0].hold_trigger = Some(10.0);
        run(&mut module, &mut controls, 1);
        assert!(module.lanes()[0].hold_timer() > 0.0);

        controls.lanes[0].run_gate = Some(0.0);
        let out = run(&mut module, &mut controls, 1);
        let lane = module.lanes()[0];
        assert_eq!(lane.state(), LaneState::Stopped);
        assert_eq!(lane.step(), 0);
        assert_eq!(lane.step_timer(), 0.0);
        assert_eq!(lane.trig_timer(), 0.0);
        assert_eq!(lane.hold_timer(), 0.0);
        assert_eq!(out.lanes[0].pitch_cv, 0.0);
        assert_eq!(out.lanes[0].trigger, 0.0);
    }

    #[test]
    fn hold_freezes_the_step() {
        let mut module = reel(9);
        let mut controls = gated(16.0);
        controls.lanes[0].hold_trigger = Some(0.0);
        run(&mut module, &mut controls, 512 * 2 + 10);
        assert_eq!(module.lanes()[0].step(), 2);

        controls.lanes[0].hold_trigger = Some(10.0);
        let out = run(&mut module, &mut controls, 1);
        let hold = module.lanes()[0].hold_timer();
        assert!((hold - 4.0).abs() < 0.01, "hold timer {hold}");
        assert!(out.lanes[0].held);
        assert_eq!(module.lanes()[0].state(), LaneState::RunningHeld);
        let frozen_cv = out.lanes[0].pitch_cv;

        // 3.9 s later still frozen, no pulses, CV steady
        for _ in 0..(3.9 * SAMPLE_RATE) as usize {
            let out = module.process(&mut controls, &ctx());
            assert_eq!(out.lanes[0].step, 2);
            assert_eq!(out.lanes[0].trigger, 0.0);
            assert_eq!(out.lanes[0].pitch_cv, frozen_cv);
        }

        // Hold expires and the lane moves on
        let out = run(&mut module, &mut controls, SAMPLE_RATE as usize);
        assert!(!out.lanes[0].held);
        assert_eq!(out.lanes[0].step, 3);
    }

    #[test]
    fn pulse_in_flight_finishes_during_hold() {
        let mut module = reel(15);
        let mut controls = gated(16.0);
        controls.lanes[0].hold_trigger = Some(0.0);
        let out = run(&mut module, &mut controls, 512);
        assert_eq!(out.lanes[0].step, 1);
        assert_eq!(out.lanes[0].trigger, 10.0);
        run(&mut module, &mut controls, 2);

        // Hold lands 3 ticks into the ~10 ms pulse
        controls.lanes[0].hold_trigger = Some(10.0);
        let mut pulse_ticks = 0;
        let mut pulse_over = false;
        for _ in 0..(3.9 * SAMPLE_RATE) as usize {
            let out = module.process(&mut controls, &ctx()).lanes[0];
            assert!(out.held);
            assert_eq!(out.step, 1);
            if out.trigger > 0.0 {
                assert!(!pulse_over, "no new pulse while held");
                assert_eq!(out.trigger, 10.0);
                pulse_ticks += 1;
            } else {
                pulse_over = true;
            }
        }
        // Ticks 3 through 10 of the pulse
        assert_eq!(pulse_ticks, 8);
        assert_eq!(module.lanes()[0].trig_timer(), 0.0);
    }

    #[test]
    fn zero_hold_duration_disables_hold() {
        let config = ReelPeetConfig::builder().hold_duration(0.0).build().unwrap();
        let mut module = ReelPeet::with_seed(config, 10);
        let mut controls = gated(16.0);
        controls.lanes[0].hold_trigger = Some(0.0);
        run(&mut module, &mut controls, 10);
        controls.lanes[0].hold_trigger = Some(10.0);
        let out = run(&mut module, &mut controls, 1);
        assert!(!out.lanes[0].held);
        assert_eq!(module.lanes()[0].hold_timer(), 0.0);
    }

    #[test]
    fn randomize_redraws_without_touching_run_state() {
        let mut module = reel(11);
        let mut controls = ReelPeetControls::default();
        controls.lanes[1].rand_trigger = Some(0.0);
        run(&mut module, &mut controls, 1);
        let before = *module.lanes()[1].sequence();
        let lane0 = *module.lanes()[0].sequence();

        controls.lanes[1].rand_trigger = Some(10.0);
        let out = run(&mut module, &mut controls, 1);
        let after = *module.lanes()[1].sequence();
        assert_ne!(before, after);
        assert!(after.iter().all(|v| (0.0..5.0).contains(v)));
        assert!(!out.lanes[1].running);
        assert_eq!(*module.lanes()[0].sequence(), lane0, "other lane untouched");

        // Button path, while running
        controls.lanes[1].run_gate = Some(10.0);
        controls.lanes[1].rand_button = 1.0;
        let out = run(&mut module, &mut controls, 1);
        assert_ne!(*module.lanes()[1].sequence(), after);
        assert!(out.lanes[1].running);
    }

    #[test]
    fn tempo_cv_overrides_and_moves_knob() {
        let mut module = reel(12);
        let mut controls = ReelPeetControls::default();
        controls.lanes[0].tempo_cv = Some(5.0);
        let out = run(&mut module, &mut controls, 1);
        assert!((out.lanes[0].bpm - 160.0).abs() < 1e-4);
        assert!((controls.lanes[0].bpm - 160.0).abs() < 1e-4);
        assert!((out.lanes[0].tempo_level - 0.5).abs() < 1e-6);
        assert_eq!(controls.lanes[1].bpm, 120.0);

        controls.lanes[0].tempo_cv = Some(42.0);
        run(&mut module, &mut controls, 1);
        assert_eq!(controls.lanes[0].bpm, 300.0);
    }

    #[test]
    fn bpm_knob_is_clamped() {
        let mut module = reel(13);
        let mut controls = ReelPeetControls::default();
        controls.lanes[0].bpm = 5.0;
        controls.lanes[1].bpm = f32::NAN;
        let out = run(&mut module, &mut controls, 1);
        assert_eq!(out.lanes[0].bpm, 20.0);
        assert_eq!(out.lanes[1].bpm, 20.0);
    }

    #[test]
    fn reset_stops_lanes() {
        let mut module = reel(14);
        let mut controls = gated(4.0);
        run(&mut module, &mut controls, 600);
        module.reset();
        assert_eq!(module.lanes()[0].state(), LaneState::Stopped);
        assert_eq!(module.lanes()[0].step(), 0);
    }
}
