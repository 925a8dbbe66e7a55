/// Context passed to modules on every tick
///
/// Contains the host's timing information:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - sample_time: Seconds per sample (1 / sample_rate)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessCtx {
    pub sample_rate: f32,
    pub sample_time: f32,
}

impl ProcessCtx {
    /// The host guarantees a positive sample rate; it is not re-checked.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sample_time: 1.0 / sample_rate,
        }
    }
}

/// Core trait for per-sample control modules
///
/// `Controls` is the host-owned panel: knob positions, raw button signals
/// and jack voltages. Modules read it every tick and may write back into
/// it (a knob that follows a CV input). `Outputs` is a plain snapshot of
/// voltages and indicator state.
pub trait CvModule: Send {
    type Controls;
    type Outputs: Copy;

    /// Advance exactly one sample. Must not allocate or block.
    fn process(&mut self, controls: &mut Self::Controls, ctx: &ProcessCtx) -> Self::Outputs;

    /// Return to the power-on state without reallocating.
    ///
    /// Default implementation does nothing.
    fn reset(&mut self) {
        // Default: do nothing
    }
}

/// Allow boxed modules to be used as modules (for dynamic dispatch)
impl<C, O: Copy> CvModule for Box<dyn CvModule<Controls = C, Outputs = O>> {
    type Controls = C;
    type Outputs = O;

    fn process(&mut self, controls: &mut C, ctx: &ProcessCtx) -> O {
        (**self).process(controls, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
