//! Time and tempo conversions shared by the modules.

/// Map a unit knob onto `[min_s, max_s]` exponentially.
///
/// Equal knob travel multiplies the interval by the same factor, which
/// reads as linear to the ear. Both bounds must be positive.
///
/// # Example
/// ```
/// use reelpeet::dsp::timing::exp_interval;
/// assert!((exp_interval(0.0, 0.5, 60.0) - 0.5).abs() < 1e-6);
/// assert!((exp_interval(1.0, 0.5, 60.0) - 60.0).abs() < 1e-3);
/// ```
#[inline]
pub fn exp_interval(knob: f32, min_s: f32, max_s: f32) -> f32 {
    min_s * (max_s / min_s).powf(knob.clamp(0.0, 1.0))
}

/// Scale `base` by a fraction and keep it inside `[lo, hi]`.
///
/// Used to derive slew times from the presence interval.
#[inline]
pub fn scaled_time(base: f32, scale: f32, lo: f32, hi: f32) -> f32 {
    (base * scale).clamp(lo, hi)
}

/// Map a tempo CV onto a BPM range linearly.
///
/// # Example
/// ```
/// use reelpeet::dsp::timing::bpm_from_cv;
/// assert!((bpm_from_cv(5.0, 10.0, 20.0, 300.0) - 160.0).abs() < 1e-4);
/// ```
#[inline]
pub fn bpm_from_cv(volts: f32, cv_max: f32, bpm_min: f32, bpm_max: f32) -> f32 {
    let v = volts.clamp(0.0, cv_max);
    bpm_min + (v / cv_max) * (bpm_max - bpm_min)
}

/// Seconds per step at a given tempo (one step per beat).
///
/// # Example
/// ```
/// use reelpeet::dsp::timing::step_time;
/// assert_eq!(step_time(120.0), 0.5);
/// ```
#[inline]
pub fn step_time(bpm: f32) -> f32 {
    60.0 / bpm
}

/// Normalized position of `bpm` inside `[bpm_min, bpm_max]`, for meters.
#[inline]
pub fn tempo_level(bpm: f32, bpm_min: f32, bpm_max: f32) -> f32 {
    ((bpm - bpm_min) / (bpm_max - bpm_min)).clamp(0.0, 1.0)
}

/// Clamp a length knob to a whole number of steps.
///
/// Non-finite input falls back to `min`.
#[inline]
pub fn step_count(knob: f32, min: usize, max: usize) -> usize {
    if !knob.is_finite() {
        return min;
    }
    (knob.round().max(0.0) as usize).clamp(min, max)
}
