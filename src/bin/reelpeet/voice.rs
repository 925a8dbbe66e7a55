//! Sonifier - makes the control voltages audible
//!
//! Sequencer lanes play a sine blip at 1 V/oct from C3 on every trigger.
//! Presence lanes fade four drone partials in and out.

use std::f32::consts::TAU;

use reelpeet::{
    dsp::slew::one_pole_coefficient,
    modules::{phrasing, reel_peet},
    runtime::RackFrame,
};

const C3_HZ: f32 = 130.81;
const DRONE_ROOT_HZ: f32 = 65.41;
const BLIP_DECAY_S: f32 = 0.15;
const BLIP_GAIN: f32 = 0.2;
const DRONE_GAIN: f32 = 0.04;

pub struct Sonifier {
    sample_rate: f32,
    decay: f32,
    blip_phase: [f32; reel_peet::LANES],
    blip_level: [f32; reel_peet::LANES],
    drone_phase: [f32; phrasing::LANES],
}

impl Sonifier {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            decay: one_pole_coefficient(BLIP_DECAY_S, sample_rate),
            blip_phase: [0.0; reel_peet::LANES],
            blip_level: [0.0; reel_peet::LANES],
            drone_phase: [0.0; phrasing::LANES],
        }
    }

    pub fn next(&mut self, frame: &RackFrame) -> f32 {
        let mut out = 0.0;

        for (i, lane) in frame.reel_peet.lanes.iter().enumerate() {
            if lane.trigger > 0.0 {
                self.blip_level[i] = 1.0;
            } else {
                self.blip_level[i] *= self.decay;
            }
            let freq = C3_HZ * lane.pitch_cv.exp2();
            self.blip_phase[i] = (self.blip_phase[i] + freq / self.sample_rate).fract();
            out += (TAU * self.blip_phase[i]).sin() * self.blip_level[i] * BLIP_GAIN;
        }

        for (i, &volts) in frame.phrasing.voltages.iter().enumerate() {
            let freq = DRONE_ROOT_HZ * (i + 2) as f32;
            self.drone_phase[i] = (self.drone_phase[i] + freq / self.sample_rate).fract();
            out += (TAU * self.drone_phase[i]).sin() * (volts / 5.0) * DRONE_GAIN;
        }

        out.clamp(-1.0, 1.0)
    }
}
