/// TiltFx Terminal Demo - Layered Tilt
///
/// Draws the tilt layer stack as ASCII outlines that follow the mouse.
/// Usage: tiltfx-terminal [config.toml]
/// Controls:
///   - Mouse: Tilt the layers
///   - R: Reset to rest
///   - Q/ESC: Quit
use std::env;
use std::io;
use std::path::Path;

use tiltfx_core::LayerConfig;
use tiltfx_terminal::{load_config, TerminalApp};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // Logs go to stderr so they stay out of the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => LayerConfig::default(),
    };
    tracing::info!(layers = config.extra_layers(), "starting terminal tilt demo");

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    println!("Thank you for using TiltFx Terminal!");
    Ok(())
}
