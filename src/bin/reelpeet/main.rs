//! reelpeet - terminal host for the Phrasing and TheReelPeet modules
//!
//! Run with: cargo run
//!
//! Set `REELPEET_SEED` for a reproducible session and `RUST_LOG` for logs.

mod app;
mod ui;
mod voice;

use app::ReelPeetApp;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut app = ReelPeetApp::new().snapshot_rate(60.0);
    if let Some(seed) = std::env::var("REELPEET_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        app = app.seed(seed);
    }
    app.run()
}
