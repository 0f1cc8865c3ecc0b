//! Native entry point.
//!
//! ```text
//! parallax-viewer [MODEL]
//! ```
//!
//! `MODEL` is a glTF/GLB path or `http(s)://` URL; without it the bundled
//! car is loaded. Log verbosity follows `RUST_LOG` (default `info`).

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use parallax::{App, ShowcaseApp, ShowcaseConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ShowcaseConfig::default();
    if let Some(source) = std::env::args().nth(1) {
        log::info!("Model source overridden: {source}");
        config = config.with_model_source(source);
    }
    if !ShowcaseApp::configure(config) {
        log::warn!("Showcase already configured, ignoring the new configuration");
    }

    App::new().with_title("Car Showcase").run::<ShowcaseApp>()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
