use crate::{
    config::{PhrasingConfig, DENSITY, DURATION, PRESENCE},
    dsp::{
        timing::{exp_interval, scaled_time},
        Dice, SchmittTrigger, Slew,
    },
    modules::node::{CvModule, ProcessCtx},
};

/*
Phrasing: Probabilistic Presence Lanes
======================================

Four lanes, each a voltage that fades in and out on its own schedule.
Think of them as "is this part of the arrangement playing right now?"
switches with a hand on the fader.

Vocabulary
----------

  target      What the lane wants to be right now: on or off.

  re-roll     Drawing a new target. Happens when the lane's countdown
              timer runs out.

  density     Global knob. Scales every lane's chance of being on.

  presence    Per-lane knob. That lane's share of the density.

  duration    How long a target is kept before the next re-roll.

  streak      Consecutive time a lane has spent on.


One Tick
--------

   buttons ──→ [1 enable latch] ──→ [2 re-roll expired lanes]
                                            │
                                            ↓
   voltages ←── [5 slew] ←── [4 anti-streak] ←── [3 liveness]

The order matters. Liveness looks at every lane after ALL of this
tick's re-rolls, and anti-streak runs after the roll so a forced drop
lands on the NEXT tick's roll rather than snapping the lane off
mid-tick.


Interval Mapping
----------------

    interval = 0.5 s * (60 / 0.5) ^ duration

    duration  0.0   0.25   0.5    0.75    1.0
    interval  0.5s  1.7s   5.5s   18.1s   60s

Every re-roll multiplies the interval by a jitter drawn from 0.85..1.15
so the four lanes drift apart instead of switching in lockstep.


Probability Curve
-----------------

    p_on = sqrt(density * presence)

The square root lifts small products: density 0.5 with presence 0.5 is
on half the time instead of a quarter. Both knobs above 0.95 skips the
dice entirely and every roll comes up on, except a roll forced off by
anti-streak.


Guarantees
----------

  liveness     After any tick with a re-roll, if any lane is enabled, at
               least one enabled lane is on. If the dice left them all
               off, the enabled lane with the best odds is switched on
               (lowest index wins ties). Lanes forced off this tick are
               passed over, even for a lower-scored lane, so the drop
               is audible. Only when every enabled lane was forced off
               does the one with the shortest cut streak come back on.

  anti-streak  A lane on for longer than 2 intervals is flagged; its
               timer is zeroed and the next roll forces it off. Applies
               to full-on lanes too.

  power-on     First rolls are staggered over the shortest interval so
               lanes do not build identical streaks.

  disabled     target off, timer and streak zeroed. The output still
               fades out through the release slew.


Slew Times
----------

  attack   = clamp(0.10 * interval, 30 ms, 2 s)
  release  = clamp(0.40 * interval, 300 ms, 25 s)

See `dsp/slew.rs` for the one-pole math.
*/

/// Number of presence lanes.
pub const LANES: usize = 4;

/// Host panel for the presence engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhrasingControls {
    pub density: f32,
    pub duration: f32,
    pub presence: [f32; LANES],
    /// Raw enable button signals (edge detected)
    pub enable_buttons: [f32; LANES],
}

impl Default for PhrasingControls {
    fn default() -> Self {
        Self {
            density: DENSITY.default,
            duration: DURATION.default,
            presence: PRESENCE.map(|spec| spec.default),
            enable_buttons: [0.0; LANES],
        }
    }
}

/// One tick of presence output
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhrasingOutputs {
    /// Lane voltages, 0 to `output_scale`
    pub voltages: [f32; LANES],
    /// Enable indicators
    pub enabled: [bool; LANES],
    /// Current boolean targets (display only)
    pub targets: [bool; LANES],
}

/// Chance that a lane rolls on.
///
/// # Example
/// ```
/// use reelpeet::modules::phrasing::presence_probability;
/// assert!((presence_probability(0.25, 1.0) - 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn presence_probability(density: f32, presence: f32) -> f32 {
    (density * presence).sqrt().clamp(0.0, 1.0)
}

#[inline]
fn unit(v: f32) -> f32 {
    DENSITY.clamp(v)
}

#[derive(Debug, Clone, Copy)]
pub struct PresenceLane {
    target: bool,
    slew: Slew,
    timer: f32,
    high_time: f32,
    enabled: bool,
    prev_enabled: bool,
    button: SchmittTrigger,
    drop_pending: bool,
}

impl PresenceLane {
    fn new() -> Self {
        Self {
            target: false,
            slew: Slew::new(0.0),
            timer: 0.0,
            high_time: 0.0,
            enabled: true,
            prev_enabled: true,
            button: SchmittTrigger::new(),
            drop_pending: false,
        }
    }

    /// Edge-detect the enable button and apply the enabled/disabled rules.
    fn latch(&mut self, button: f32) {
        if self.button.process(button) {
            self.enabled = !self.enabled;
        }

        if self.enabled && !self.prev_enabled {
            // Re-enabled: roll on this very tick with a fresh streak
            self.timer = 0.0;
            self.high_time = 0.0;
            self.drop_pending = false;
        }
        self.prev_enabled = self.enabled;

        if !self.enabled {
            self.target = false;
            self.timer = 0.0;
            self.high_time = 0.0;
            self.drop_pending = false;
        }
    }

    pub fn target(&self) -> bool {
        self.target
    }

    /// Smoothed level, 0.0 to 1.0
    pub fn value(&self) -> f32 {
        self.slew.value()
    }

    /// Seconds until the next re-roll
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Consecutive seconds spent with the target on
    pub fn high_time(&self) -> f32 {
        self.high_time
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when the next roll is forced off by anti-streak
    pub fn drop_pending(&self) -> bool {
        self.drop_pending
    }
}

/// Per-tick values derived from the knobs, shared by every lane.
struct Shape {
    interval: f32,
    attack: f32,
    release: f32,
    scores: [f32; LANES],
    full_on: [bool; LANES],
}

impl Shape {
    fn from_controls(config: &PhrasingConfig, controls: &PhrasingControls) -> Self {
        let density = unit(controls.density);
        let interval = exp_interval(
            unit(controls.duration),
            config.min_interval,
            config.max_interval,
        );
        let presence = controls.presence.map(unit);
        let full_on = presence
            .map(|p| density > config.full_on_threshold && p > config.full_on_threshold);
        let mut scores = presence.map(|p| presence_probability(density, p));
        for (score, &on) in scores.iter_mut().zip(&full_on) {
            if on {
                *score = 1.0;
            }
        }

        Self {
            interval,
            attack: scaled_time(interval, config.attack.scale, config.attack.min, config.attack.max),
            release: scaled_time(
                interval,
                config.release.scale,
                config.release.min,
                config.release.max,
            ),
            scores,
            full_on,
        }
    }
}

/// Switch on the best enabled lane if every enabled lane is off.
///
/// `dropped[i]` holds the streak a forced drop cut short this tick. Those
/// lanes never win while any other enabled lane is available, even one
/// with worse odds. If every enabled lane was dropped, the one with the
/// shortest cut streak comes back on. Ties go to the lowest index.
fn ensure_liveness(
    lanes: &mut [PresenceLane; LANES],
    scores: &[f32; LANES],
    dropped: &[Option<f32>; LANES],
) {
    if lanes.iter().any(|lane| lane.enabled && lane.target) {
        return;
    }

    let mut best: Option<usize> = None;
    for i in 0..LANES {
        if !lanes[i].enabled || dropped[i].is_some() {
            continue;
        }
        if best.map_or(true, |b| scores[i] > scores[b]) {
            best = Some(i);
        }
    }

    if best.is_none() {
        let mut shortest = f32::INFINITY;
        for i in 0..LANES {
            if let Some(streak) = dropped[i].filter(|_| lanes[i].enabled) {
                if streak < shortest {
                    shortest = streak;
                    best = Some(i);
                }
            }
        }
    }

    if let Some(i) = best {
        lanes[i].target = true;
    }
}

/// Four-lane probabilistic presence generator
pub struct Phrasing {
    config: PhrasingConfig,
    lanes: [PresenceLane; LANES],
    dice: Dice,
}

impl Phrasing {
    /// Create with an OS-seeded random source. Call off the audio thread.
    pub fn new(config: PhrasingConfig) -> Self {
        Self::with_dice(config, Dice::from_entropy())
    }

    /// Create with a fixed seed for reproducible output.
    pub fn with_seed(config: PhrasingConfig, seed: u64) -> Self {
        Self::with_dice(config, Dice::seeded(seed))
    }

    pub fn with_dice(config: PhrasingConfig, dice: Dice) -> Self {
        let mut module = Self {
            config,
            lanes: [PresenceLane::new(); LANES],
            dice,
        };
        module.power_on();
        log::debug!("phrasing: {} lanes, interval {}..{} s", LANES, config.min_interval, config.max_interval);
        module
    }

    fn power_on(&mut self) {
        self.lanes = [PresenceLane::new(); LANES];
        for lane in self.lanes.iter_mut() {
            lane.timer = self.config.min_interval * self.dice.unit();
        }
        let shape = Shape::from_controls(&self.config, &PhrasingControls::default());
        ensure_liveness(&mut self.lanes, &shape.scores, &[None; LANES]);
    }

    pub fn lanes(&self) -> &[PresenceLane; LANES] {
        &self.lanes
    }

    pub fn config(&self) -> &PhrasingConfig {
        &self.config
    }

    /// Re-roll interval for a duration knob position.
    pub fn base_interval(&self, duration: f32) -> f32 {
        exp_interval(unit(duration), self.config.min_interval, self.config.max_interval)
    }
}

impl CvModule for Phrasing {
    type Controls = PhrasingControls;
    type Outputs = PhrasingOutputs;

    fn process(&mut self, controls: &mut PhrasingControls, ctx: &ProcessCtx) -> PhrasingOutputs {
        let dt = ctx.sample_time;
        let config = self.config;
        let shape = Shape::from_controls(&config, controls);

        for (lane, &button) in self.lanes.iter_mut().zip(&controls.enable_buttons) {
            lane.latch(button);
        }

        // Re-roll pass. Must finish for every lane before liveness runs.
        let mut rolled = false;
        let mut dropped = [None; LANES];
        for (i, lane) in self.lanes.iter_mut().enumerate() {
            if !lane.enabled {
                continue;
            }
            lane.timer -= dt;
            if lane.timer > 0.0 {
                continue;
            }

            rolled = true;
            if lane.drop_pending {
                dropped[i] = Some(lane.high_time);
                lane.target = false;
                lane.high_time = 0.0;
                lane.drop_pending = false;
            } else if shape.full_on[i] {
                lane.target = true;
            } else {
                lane.target = self.dice.chance(shape.scores[i]);
            }
            lane.timer = shape.interval * self.dice.range(1.0 - config.jitter, 1.0 + config.jitter);
        }

        if rolled {
            ensure_liveness(&mut self.lanes, &shape.scores, &dropped);
        }

        let streak_limit = config.streak_limit * shape.interval;
        let mut outputs = PhrasingOutputs::default();
        for (i, lane) in self.lanes.iter_mut().enumerate() {
            if lane.enabled && lane.target {
                lane.high_time += dt;
                if lane.high_time > streak_limit && !lane.drop_pending {
                    lane.drop_pending = true;
                    lane.timer = 0.0;
                }
            } else {
                lane.high_time = 0.0;
            }

            let target = if lane.target { 1.0 } else { 0.0 };
            let value = lane.slew.next(target, shape.attack, shape.release, ctx.sample_rate);

            outputs.voltages[i] = config.output_scale * value;
            outputs.enabled[i] = lane.enabled;
            outputs.targets[i] = lane.target;
        }

        outputs
    }

    fn reset(&mut self) {
        self.power_on();
    }
}
