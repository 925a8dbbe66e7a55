//! Tunable constants for both modules and the host parameter table.
//!
//! The defaults reproduce the stock module behaviour. Builders validate
//! overrides up front so the per-tick code never has to.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Range, default and label of one host-facing knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: &'static str,
}

impl ParamSpec {
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32, unit: &'static str) -> Self {
        Self {
            name,
            min,
            max,
            default,
            unit,
        }
    }

    /// Clamp into range. NaN maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the range, 0.0 to 1.0.
    pub fn normalize(&self, value: f32) -> f32 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }
}

pub const DENSITY: ParamSpec = ParamSpec::new("Density", 0.0, 1.0, 0.7, "%");
pub const DURATION: ParamSpec = ParamSpec::new("Duration", 0.0, 1.0, 0.5, "%");
pub const PRESENCE: [ParamSpec; 4] = [
    ParamSpec::new("Presence I", 0.0, 1.0, 0.8, "%"),
    ParamSpec::new("Presence II", 0.0, 1.0, 0.8, "%"),
    ParamSpec::new("Presence III", 0.0, 1.0, 0.8, "%"),
    ParamSpec::new("Presence IV", 0.0, 1.0, 0.8, "%"),
];

pub const BPM: ParamSpec = ParamSpec::new("BPM", 20.0, 300.0, 120.0, "bpm");
pub const LENGTH: ParamSpec = ParamSpec::new("Length", 2.0, 16.0, 3.0, "steps");
pub const BUTTON: ParamSpec = ParamSpec::new("Button", 0.0, 1.0, 0.0, "");

/// Errors raised while validating a configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value was NaN or infinite
    NotFinite { field: &'static str },
    /// A value that must be positive was zero or negative
    NotPositive { field: &'static str, value: f32 },
    /// A value that must not be negative was
    Negative { field: &'static str, value: f32 },
    /// A range whose lower bound is not below its upper bound
    EmptyRange { field: &'static str, min: f32, max: f32 },
    /// Jitter spread outside [0, 1)
    JitterOutOfRange { value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFinite { field } => write!(f, "{} must be finite", field),
            ConfigError::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            ConfigError::EmptyRange { field, min, max } => {
                write!(f, "{} range is empty: min {} is not below max {}", field, min, max)
            }
            ConfigError::JitterOutOfRange { value } => {
                write!(f, "jitter spread must be within [0, 1), got {}", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn range(field: &'static str, min: f32, max: f32) -> Result<(f32, f32), ConfigError> {
    finite(field, min)?;
    finite(field, max)?;
    if min < max {
        Ok((min, max))
    } else {
        Err(ConfigError::EmptyRange { field, min, max })
    }
}

/// Slew time derived from the re-roll interval: `clamp(scale * interval, min, max)`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlewTime {
    pub scale: f32,
    pub min: f32,
    pub max: f32,
}

/// Constants for the presence engine
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhrasingConfig {
    /// Re-roll interval at Duration = 0 (seconds)
    pub min_interval: f32,
    /// Re-roll interval at Duration = 1 (seconds)
    pub max_interval: f32,
    /// Each interval is multiplied by a uniform draw from 1 ± jitter
    pub jitter: f32,
    pub attack: SlewTime,
    pub release: SlewTime,
    /// A lane held high longer than this many intervals is forced to drop
    pub streak_limit: f32,
    /// Density and presence both above this force the lane on
    pub full_on_threshold: f32,
    /// Output volts at full presence
    pub output_scale: f32,
}

impl PhrasingConfig {
    pub fn builder() -> PhrasingConfigBuilder {
        PhrasingConfigBuilder {
            config: Self::default(),
        }
    }
}

impl Default for PhrasingConfig {
    fn default() -> Self {
        Self {
            min_interval: 0.5,
            max_interval: 60.0,
            jitter: 0.15,
            attack: SlewTime {
                scale: 0.10,
                min: 0.030,
                max: 2.0,
            },
            release: SlewTime {
                scale: 0.40,
                min: 0.300,
                max: 25.0,
            },
            streak_limit: 2.0,
            full_on_threshold: 0.95,
            output_scale: 5.0,
        }
    }
}

pub struct PhrasingConfigBuilder {
    config: PhrasingConfig,
}

impl PhrasingConfigBuilder {
    pub fn interval_range(mut self, min_s: f32, max_s: f32) -> Self {
        self.config.min_interval = min_s;
        self.config.max_interval = max_s;
        self
    }

    pub fn jitter(mut self, spread: f32) -> Self {
        self.config.jitter = spread;
        self
    }

    pub fn attack(mut self, scale: f32, min_s: f32, max_s: f32) -> Self {
        self.config.attack = SlewTime {
            scale,
            min: min_s,
            max: max_s,
        };
        self
    }

    pub fn release(mut self, scale: f32, min_s: f32, max_s: f32) -> Self {
        self.config.release = SlewTime {
            scale,
            min: min_s,
            max: max_s,
        };
        self
    }

    pub fn streak_limit(mut self, intervals: f32) -> Self {
        self.config.streak_limit = intervals;
        self
    }

    pub fn output_scale(mut self, volts: f32) -> Self {
        self.config.output_scale = volts;
        self
    }

    pub fn build(self) -> Result<PhrasingConfig, ConfigError> {
        let c = self.config;
        positive("min_interval", c.min_interval)?;
        range("interval", c.min_interval, c.max_interval)?;
        finite("jitter", c.jitter)?;
        if !(0.0..1.0).contains(&c.jitter) {
            return Err(ConfigError::JitterOutOfRange { value: c.jitter });
        }
        for (field, slew) in [("attack", c.attack), ("release", c.release)] {
            non_negative(field, slew.scale)?;
            non_negative(field, slew.min)?;
            range(field, slew.min, slew.max)?;
        }
        positive("streak_limit", c.streak_limit)?;
        finite("full_on_threshold", c.full_on_threshold)?;
        positive("output_scale", c.output_scale)?;
        log::debug!(
            "phrasing config: interval {}..{} s, jitter ±{}",
            c.min_interval,
            c.max_interval,
            c.jitter
        );
        Ok(c)
    }
}

/// Constants for the dual-lane sequencer
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelPeetConfig {
    /// Freeze window started by a hold trigger (seconds, 0 disables hold)
    pub hold_duration: f32,
    /// Width of the step trigger pulse (seconds)
    pub pulse_width: f32,
    /// Trigger output level while a pulse is in flight
    pub pulse_volts: f32,
    /// Randomized step values are drawn from [0, sequence_range)
    pub sequence_range: f32,
    /// Run gate voltage at or above which the lane runs
    pub run_threshold: f32,
    pub bpm_min: f32,
    pub bpm_max: f32,
    /// Tempo CV voltage that maps to `bpm_max`
    pub tempo_cv_max: f32,
}

impl ReelPeetConfig {
    pub fn builder() -> ReelPeetConfigBuilder {
        ReelPeetConfigBuilder {
            config: Self::default(),
        }
    }
}

impl Default for ReelPeetConfig {
    fn default() -> Self {
        Self {
            hold_duration: 4.0,
            pulse_width: 0.01,
            pulse_volts: 10.0,
            sequence_range: 5.0,
            run_threshold: 1.0,
            bpm_min: BPM.min,
            bpm_max: BPM.max,
            tempo_cv_max: 10.0,
        }
    }
}

pub struct ReelPeetConfigBuilder {
    config: ReelPeetConfig,
}

impl ReelPeetConfigBuilder {
    pub fn hold_duration(mut self, seconds: f32) -> Self {
        self.config.hold_duration = seconds;
        self
    }

    pub fn pulse(mut self, width_s: f32, volts: f32) -> Self {
        self.config.pulse_width = width_s;
        self.config.pulse_volts = volts;
        self
    }

    pub fn sequence_range(mut self, volts: f32) -> Self {
        self.config.sequence_range = volts;
        self
    }

    pub fn run_threshold(mut self, volts: f32) -> Self {
        self.config.run_threshold = volts;
        self
    }

    pub fn bpm_range(mut self, min: f32, max: f32) -> Self {
        self.config.bpm_min = min;
        self.config.bpm_max = max;
        self
    }

    pub fn build(self) -> Result<ReelPeetConfig, ConfigError> {
        let c = self.config;
        non_negative("hold_duration", c.hold_duration)?;
        positive("pulse_width", c.pulse_width)?;
        finite("pulse_volts", c.pulse_volts)?;
        positive("sequence_range", c.sequence_range)?;
        finite("run_threshold", c.run_threshold)?;
        positive("bpm_min", c.bpm_min)?;
        range("bpm", c.bpm_min, c.bpm_max)?;
        positive("tempo_cv_max", c.tempo_cv_max)?;
        if c.hold_duration == 0.0 {
            log::info!("reel peet config: hold disabled");
        }
        Ok(c)
    }
}
