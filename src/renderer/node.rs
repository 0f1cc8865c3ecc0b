//! Render Node Trait
//!
//! A [`RenderNode`] is one pass recorded after the built-in scene pass, such
//! as the debug UI overlay.
//!
//! - `prepare` gets mutable access to itself plus the device and queue, for
//!   uploads and pipeline creation
//! - `run` records commands only

/// Device access during the prepare phase.
pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Surface size in physical pixels.
    pub size: (u32, u32),
    pub surface_format: wgpu::TextureFormat,
}

/// Read-only state during the execute phase.
pub struct ExecuteContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// View of the swapchain image being presented this frame.
    pub surface_view: &'a wgpu::TextureView,
}

pub trait RenderNode {
    /// Used as the debug group label.
    fn name(&self) -> &str;

    fn prepare(&mut self, _ctx: &mut PrepareContext) {}

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
