//! ReelPeetApp - audio setup and the UI loop

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use reelpeet::{
    runtime::Rack, Phrasing, PhrasingConfig, ProcessCtx, ReelPeet, ReelPeetConfig,
};

use super::ui::UiApp;
use super::voice::Sonifier;

/// Main application builder
pub struct ReelPeetApp {
    seed: Option<u64>,
    snapshot_hz: f32,
    phrasing: PhrasingConfig,
    reel_peet: ReelPeetConfig,
}

impl ReelPeetApp {
    pub fn new() -> Self {
        Self {
            seed: None,
            snapshot_hz: 60.0,
            phrasing: PhrasingConfig::default(),
            reel_peet: ReelPeetConfig::default(),
        }
    }

    /// Seed both modules for a reproducible session
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// How often the audio thread publishes a snapshot
    pub fn snapshot_rate(mut self, hz: f32) -> Self {
        self.snapshot_hz = hz;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("audio: {} Hz, {} channels", sample_rate, channels);

        let (phrasing, reel_peet) = match self.seed {
            Some(seed) => (
                Phrasing::with_seed(self.phrasing, seed),
                ReelPeet::with_seed(self.reel_peet, seed.wrapping_add(1)),
            ),
            None => (Phrasing::new(self.phrasing), ReelPeet::new(self.reel_peet)),
        };

        let interval = (sample_rate / self.snapshot_hz.max(1.0)).round().max(1.0) as u32;
        let (mut rack, handle) = Rack::new(phrasing, reel_peet, interval);
        let mut voice = Sonifier::new(sample_rate);
        let ctx = ProcessCtx::new(sample_rate);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    // One rack tick per frame; the same sample on every channel
                    for frame in data.chunks_mut(channels) {
                        let outputs = rack.process_frame(&ctx);
                        let sample = voice.next(&outputs);
                        frame.fill(sample);
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        let result = quiet_logs(|| {
            let mut terminal = ratatui::init();
            let result = UiApp::new(handle).run(&mut terminal);
            ratatui::restore();
            result
        });

        log::info!("session ended");
        result
    }
}

/// Run `f` with logging off, then restore the previous level.
///
/// env_logger writes to stderr, which the TUI shares with its frame buffer.
fn quiet_logs<T>(f: impl FnOnce() -> T) -> T {
    let level = log::max_level();
    log::set_max_level(log::LevelFilter::Off);
    let out = f();
    log::set_max_level(level);
    out
}

impl Default for ReelPeetApp {
    fn default() -> Self {
        Self::new()
    }
}
