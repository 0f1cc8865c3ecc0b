//! Rendering System
//!
//! A single forward pass over the scene followed by any user-supplied
//! [`RenderNode`]s (the debug UI overlay), all recorded into one command
//! buffer per frame.
//!
//! # Frame flow
//!
//! 1. [`Renderer::begin_frame`] extracts draws, lights and fog from the scene
//!    and uploads what changed
//! 2. The returned [`FrameComposer`] collects extra nodes
//! 3. [`FrameComposer::render`] acquires the swapchain image, records and
//!    presents
//!
//! The renderer exists before a window does: until [`Renderer::init`]
//! succeeds it only tracks the requested size, and `begin_frame` yields
//! nothing.

pub mod composer;
pub mod context;
pub mod forward;
pub mod node;
pub mod settings;
pub mod uniforms;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::Result;
use crate::scene::Scene;

pub use composer::FrameComposer;
pub use context::WgpuContext;
pub use forward::ForwardPass;
pub use node::{ExecuteContext, PrepareContext, RenderNode};
use settings::RenderSettings;

struct GpuState {
    ctx: WgpuContext,
    forward: ForwardPass,
}

pub struct Renderer {
    settings: RenderSettings,
    size: (u32, u32),
    scale_factor: f32,
    gpu: Option<GpuState>,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            size: (0, 0),
            scale_factor: 1.0,
            gpu: None,
        }
    }

    /// Creates the device, surface and scene pipelines for `window`.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let ctx = WgpuContext::new(window, &self.settings, width, height).await?;
        let forward = ForwardPass::new(&ctx);

        log::info!(
            "Renderer initialized: {}x{}, {:?}, MSAA x{}",
            width,
            height,
            ctx.view_format,
            ctx.msaa_samples
        );

        self.size = (width, height);
        self.gpu = Some(GpuState { ctx, forward });
        Ok(())
    }

    /// Records the new size and reconfigures the surface when one exists.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.size = (width, height);
        self.scale_factor = scale_factor;
        if let Some(gpu) = &mut self.gpu {
            gpu.ctx.resize(width, height);
        }
    }

    /// Extracts and uploads `scene`, returning a composer for the frame.
    ///
    /// Returns `None` before [`init`](Self::init), while the surface has zero
    /// area, or when the scene has no active camera.
    pub fn begin_frame(&mut self, scene: &Scene) -> Option<FrameComposer<'_>> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return None;
        }
        let GpuState { ctx, forward } = self.gpu.as_mut()?;
        let camera = scene.main_camera()?;

        forward.prepare(ctx, scene, camera, self.settings.exposure);
        Some(FrameComposer::new(ctx, forward))
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    #[must_use]
    pub fn wgpu_ctx(&self) -> Option<&WgpuContext> {
        self.gpu.as_ref().map(|gpu| &gpu.ctx)
    }

    /// Format the frame is rendered through, once initialized.
    #[must_use]
    pub fn surface_format(&self) -> Option<wgpu::TextureFormat> {
        self.wgpu_ctx().map(|ctx| ctx.view_format)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}
