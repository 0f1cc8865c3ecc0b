//! Engine Core Module
//!
//! [`Engine`] ties the subsystems of the viewer together without owning a
//! window, so the winit runner, tests and headless tools can all drive it.
//!
//! - **Renderer**: GPU context and the forward pass
//! - **Scene**: the single scene being shown
//! - **AssetServer**: background glTF loading
//! - **Input**: mouse state for the current frame
//!
//! ```rust,ignore
//! let mut engine = Engine::new(RenderSettings::default());
//! engine.init(window, 1280, 720).await?;
//!
//! loop {
//!     engine.update(dt);
//!     if let Some(composer) = engine.renderer.begin_frame(&engine.scene) {
//!         composer.render();
//!     }
//! }
//! ```

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::app::input::Input;
use crate::assets::AssetServer;
use crate::renderer::Renderer;
use crate::renderer::settings::RenderSettings;
use crate::scene::Scene;

/// # Lifecycle
///
/// 1. Create with [`Engine::new`] or [`Engine::default`]
/// 2. Initialize the GPU with [`Engine::init`]
/// 3. Call [`Engine::update`] once per frame
/// 4. Render with [`Renderer::begin_frame`]
pub struct Engine {
    pub renderer: Renderer,
    pub scene: Scene,
    pub assets: AssetServer,
    pub input: Input,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// Creates the engine. GPU resources are allocated by [`init`](Self::init).
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: Renderer::new(settings),
            scene: Scene::new(),
            assets: AssetServer::new(),
            input: Input::new(),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Initializes GPU resources for `window`.
    ///
    /// # Errors
    ///
    /// Fails when no compatible adapter exists, the device request is
    /// rejected or the surface cannot be configured.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> crate::errors::Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        self.renderer.init(window, width, height).await
    }

    /// Total elapsed time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Surface size in physical pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }

    /// Handles a window resize: surface, input bounds and the aspect ratio
    /// of the active camera.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.renderer.resize(width, height, scale_factor);
        self.input.inject_resize(width, height);

        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized resize for the camera aspect");
            return;
        }
        if let Some((_, camera)) = self.scene.query_main_camera_bundle() {
            camera.aspect = width as f32 / height as f32;
            camera.update_projection_matrix();
        }
    }

    /// Advances time, runs the scene systems and resets per-frame input.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;

        self.scene.update();

        self.input.start_frame();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

/// Per-frame timing handed to [`AppHandler::update`](crate::app::AppHandler::update).
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Seconds since the application started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    pub frame_count: u64,
}
