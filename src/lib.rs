#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod showcase;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use app::{App, AppHandler};
pub use assets::{AssetServer, PendingLoad, Prefab};
pub use engine::{Engine, FrameState};
pub use errors::{Result, ViewerError};
pub use renderer::settings::RenderSettings;
pub use renderer::{Renderer, WgpuContext};
pub use resources::{Geometry, Material, Mesh};
pub use scene::{Camera, Fog, Light, Node, NodeHandle, Scene, Transform};
pub use showcase::{Showcase, ShowcaseApp, ShowcaseConfig};
pub use utils::OrbitControls;

/// Browser entry point: renders into the `parallax-canvas` element.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Already initialised when the module is instantiated twice
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(e) = App::new().with_title("Car Showcase").run::<ShowcaseApp>() {
        log::error!("Showcase failed to start: {e}");
    }
}
