//! Renderer Settings
//!
//! ```rust,ignore
//! use parallax::renderer::settings::RenderSettings;
//!
//! let settings = RenderSettings {
//!     msaa_samples: 1,
//!     vsync: false,
//!     ..Default::default()
//! };
//!
//! App::new().with_settings(settings).run::<ShowcaseApp>()?;
//! ```

/// GPU and output configuration, fixed for the lifetime of the renderer.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// `AutoVsync` when set, `AutoNoVsync` otherwise.
    pub vsync: bool,

    /// MSAA sample count for the scene pass. Common values: 1 (off), 4.
    pub msaa_samples: u32,

    // === GPU / Backend Configuration ===
    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    pub depth_format: wgpu::TextureFormat,

    // === Output ===
    /// Linear exposure multiplier applied before ACES filmic tone mapping.
    pub exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            msaa_samples: 4,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            exposure: 1.0,
        }
    }
}

impl RenderSettings {
    #[inline]
    #[must_use]
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    /// Sample count clamped to the values every backend accepts (1 or 4).
    #[inline]
    #[must_use]
    pub fn effective_msaa_samples(&self) -> u32 {
        if self.msaa_samples >= 4 { 4 } else { 1 }
    }
}
