/*
One-Pole Slew
=============

A one-pole lowpass is the digital cousin of an RC circuit: the output
chases its target and covers a fixed fraction of the remaining distance
every sample. On a scope it looks like the lag/slew you get from an
analog slew limiter.

Vocabulary
----------

  time constant   Seconds for the output to cover ~63% of a jump.
                  After 5 time constants the output is within 1%.

  coefficient     Fraction of the remaining distance that SURVIVES one
                  sample. Close to 1.0 means slow, close to 0.0 fast.

  attack          Time constant used while rising toward the target.

  release         Time constant used while falling toward the target.


The Math
--------

    coefficient = exp(-1 / (time_constant * sample_rate))
    value       = target + (value - target) * coefficient

Example: 100 ms at 48 kHz
  - time_constant * sample_rate = 4800 samples
  - coefficient = exp(-1/4800) ≈ 0.999792
  - after 4800 samples the gap has shrunk to exp(-1) ≈ 36.8%


Asymmetric Response
-------------------

   1.0 ┤      ╭──────────╮
       │     ╱            ╲
       │    ╱              ╲___
   0.0 ┼───╯                   ‾‾‾────
        fast attack      slow release

Choosing the time constant from the direction of travel lets a lane
appear quickly but fade away gently.
*/

/// Per-sample decay coefficient for a one-pole filter.
///
/// A non-positive time constant collapses to an instant jump.
///
/// # Example
/// ```
/// use reelpeet::dsp::slew::one_pole_coefficient;
/// let coeff = one_pole_coefficient(1.0, 1000.0);
/// assert!((coeff - (-1.0f32 / 1000.0).exp()).abs() < 1e-7);
/// ```
#[inline]
pub fn one_pole_coefficient(time_constant: f32, sample_rate: f32) -> f32 {
    if time_constant <= 0.0 {
        return 0.0;
    }
    (-1.0 / (time_constant * sample_rate)).exp()
}

/// Asymmetric one-pole smoother clamped to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct Slew {
    value: f32,
}

impl Slew {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }

    /// Advance one sample toward `target`.
    #[inline]
    pub fn next(&mut self, target: f32, attack: f32, release: f32, sample_rate: f32) -> f32 {
        let time_constant = if target > self.value { attack } else { release };
        let coeff = one_pole_coefficient(time_constant, sample_rate);
        self.value = (target + (self.value - target) * coeff).clamp(0.0, 1.0);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
