//! Frame Composer
//!
//! [`FrameComposer`] glues the prepare and execute phases of one frame
//! together. The scene has already been extracted and uploaded by
//! [`Renderer::begin_frame`](crate::renderer::Renderer::begin_frame); the
//! composer collects extra [`RenderNode`]s and, on [`render`](FrameComposer::render),
//! acquires the swapchain image, records everything and presents.
//!
//! ```rust,ignore
//! if let Some(composer) = renderer.begin_frame(&scene) {
//!     composer.add_node(&mut ui_pass).render();
//! }
//! ```

use crate::renderer::context::WgpuContext;
use crate::renderer::forward::ForwardPass;
use crate::renderer::node::{ExecuteContext, PrepareContext, RenderNode};

pub struct FrameComposer<'a> {
    wgpu_ctx: &'a mut WgpuContext,
    forward: &'a ForwardPass,
    nodes: Vec<&'a mut dyn RenderNode>,
}

impl<'a> FrameComposer<'a> {
    pub(crate) fn new(wgpu_ctx: &'a mut WgpuContext, forward: &'a ForwardPass) -> Self {
        Self {
            wgpu_ctx,
            forward,
            nodes: Vec::with_capacity(4),
        }
    }

    /// Appends a node recorded after the scene pass, in call order.
    #[inline]
    #[must_use]
    pub fn add_node(mut self, node: &'a mut dyn RenderNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Renders and presents the frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped;
    /// timeouts and occlusion just skip the frame.
    pub fn render(mut self) {
        let output = match self.wgpu_ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.wgpu_ctx.reconfigure();
                return;
            }
            e => {
                log::warn!("Skipping frame: {e:?}");
                return;
            }
        };

        let ctx = &*self.wgpu_ctx;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(ctx.view_format),
            ..Default::default()
        });

        let mut prepare_ctx = PrepareContext {
            device: &ctx.device,
            queue: &ctx.queue,
            size: ctx.size(),
            surface_format: ctx.view_format,
        };
        for node in &mut self.nodes {
            node.prepare(&mut prepare_ctx);
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.forward.run(ctx, &view, &mut encoder);

        let execute_ctx = ExecuteContext {
            device: &ctx.device,
            queue: &ctx.queue,
            surface_view: &view,
        };
        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            node.run(&execute_ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
