//! Forward Render Pass
//!
//! Draws every visible mesh of the scene in one render pass:
//! clear to the scene background, then shade with the lights and fog
//! gathered in [`FrameUniforms`]. With MSAA enabled the pass renders into
//! the multisampled target and resolves into the swapchain image.
//!
//! GPU copies of geometry, materials and textures are cached by asset id and
//! dropped once the CPU-side asset is gone. Per-node uniforms are dropped as
//! soon as the node stops being drawn.

use std::borrow::Cow;
use std::sync::{Arc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::renderer::context::WgpuContext;
use crate::renderer::uniforms::{FrameUniforms, MaterialUniforms, ObjectUniforms};
use crate::resources::{Geometry, ImageData, Material, Vertex};
use crate::scene::{Camera, NodeHandle, Scene};

const JOINT_MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

struct GpuGeometry {
    source: Weak<Geometry>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_count: u32,
}

struct GpuMaterial {
    source: Weak<Material>,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuTexture {
    source: Weak<ImageData>,
    view: wgpu::TextureView,
}

struct GpuObject {
    uniforms: wgpu::Buffer,
    joints: wgpu::Buffer,
    joint_capacity: usize,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone, Copy)]
struct DrawCommand {
    node: NodeHandle,
    geometry: Uuid,
    material: Uuid,
    double_sided: bool,
}

pub struct ForwardPass {
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,

    /// Back-face culled pipeline.
    pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    white_texture: wgpu::TextureView,

    geometries: FxHashMap<Uuid, GpuGeometry>,
    materials: FxHashMap<Uuid, GpuMaterial>,
    textures: FxHashMap<Uuid, GpuTexture>,
    objects: FxHashMap<NodeHandle, GpuObject>,

    commands: Vec<DrawCommand>,
    clear_color: wgpu::Color,
}

impl ForwardPass {
    #[must_use]
    pub fn new(ctx: &WgpuContext) -> Self {
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/forward.wgsl"))),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[Some(&frame_layout), Some(&object_layout), Some(&material_layout)],
            immediate_size: 0,
        });

        let pipeline = create_pipeline(ctx, &layout, &shader, Some(wgpu::Face::Back));
        let double_sided_pipeline = create_pipeline(ctx, &layout, &shader, None);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = upload_texture(
            &ctx.device,
            &ctx.queue,
            "White Texture",
            &ImageData::new(1, 1, vec![255; 4]),
        );

        Self {
            object_layout,
            material_layout,
            pipeline,
            double_sided_pipeline,
            frame_buffer,
            frame_bind_group,
            sampler,
            white_texture,
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            textures: FxHashMap::default(),
            objects: FxHashMap::default(),
            commands: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// Uploads this frame's uniforms and any newly seen assets, and records
    /// the draw list consumed by [`run`](Self::run).
    pub fn prepare(&mut self, ctx: &WgpuContext, scene: &Scene, camera: &Camera, exposure: f32) {
        let frame = FrameUniforms::from_scene(scene, camera, exposure);
        ctx.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        self.clear_color = wgpu::Color {
            r: f64::from(scene.background.x),
            g: f64::from(scene.background.y),
            b: f64::from(scene.background.z),
            a: 1.0,
        };

        self.commands.clear();
        let mut drawn = FxHashSet::default();

        for item in scene.collect_draws() {
            let geometry = &item.mesh.geometry;
            let material = &item.mesh.material;
            if geometry.draw_count() == 0 {
                continue;
            }

            self.ensure_geometry(ctx, geometry);
            self.ensure_material(ctx, material);

            let skinned = geometry.skinned && item.joints.is_some();
            let uniforms = ObjectUniforms::new(item.world_matrix, skinned);
            let joints = item.joints.filter(|_| skinned).unwrap_or(&[]);
            self.write_object(ctx, item.node, &uniforms, joints);

            drawn.insert(item.node);
            self.commands.push(DrawCommand {
                node: item.node,
                geometry: geometry.id,
                material: material.id,
                double_sided: material.double_sided,
            });
        }

        self.objects.retain(|node, _| drawn.contains(node));
        self.geometries.retain(|_, g| g.source.strong_count() > 0);
        self.materials.retain(|_, m| m.source.strong_count() > 0);
        self.textures.retain(|_, t| t.source.strong_count() > 0);
    }

    fn ensure_geometry(&mut self, ctx: &WgpuContext, geometry: &Arc<Geometry>) {
        if self.geometries.contains_key(&geometry.id) {
            return;
        }

        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice::<Vertex, u8>(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = geometry.indices.as_ref().map(|indices| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        self.geometries.insert(
            geometry.id,
            GpuGeometry {
                source: Arc::downgrade(geometry),
                vertex_buffer,
                index_buffer,
                draw_count: geometry.draw_count(),
            },
        );
    }

    fn ensure_material(&mut self, ctx: &WgpuContext, material: &Arc<Material>) {
        let uniforms = MaterialUniforms::from(material.as_ref());
        if let Some(gpu) = self.materials.get(&material.id) {
            ctx.queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&uniforms));
            return;
        }

        let view = match &material.base_color_texture {
            Some(image) => {
                let entry = self.textures.entry(image.id).or_insert_with(|| GpuTexture {
                    source: Arc::downgrade(image),
                    view: upload_texture(&ctx.device, &ctx.queue, "Base Color Texture", image),
                });
                &entry.view
            }
            None => &self.white_texture,
        };

        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: material.name.as_deref(),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.materials.insert(
            material.id,
            GpuMaterial {
                source: Arc::downgrade(material),
                buffer,
                bind_group,
            },
        );
    }

    fn write_object(
        &mut self,
        ctx: &WgpuContext,
        node: NodeHandle,
        uniforms: &ObjectUniforms,
        joints: &[glam::Mat4],
    ) {
        let needed = joints.len().max(1);
        let stale = self
            .objects
            .get(&node)
            .is_none_or(|object| object.joint_capacity < needed);

        if stale {
            let object = self.create_object(ctx, needed);
            self.objects.insert(node, object);
        }
        let Some(object) = self.objects.get(&node) else {
            return;
        };

        ctx.queue.write_buffer(&object.uniforms, 0, bytemuck::bytes_of(uniforms));
        if joints.is_empty() {
            ctx.queue.write_buffer(
                &object.joints,
                0,
                bytemuck::bytes_of(&glam::Mat4::IDENTITY.to_cols_array_2d()),
            );
        } else {
            let palette: Vec<[[f32; 4]; 4]> = joints.iter().map(glam::Mat4::to_cols_array_2d).collect();
            ctx.queue.write_buffer(&object.joints, 0, bytemuck::cast_slice(&palette));
        }
    }

    fn create_object(&self, ctx: &WgpuContext, joint_capacity: usize) -> GpuObject {
        let uniforms = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: std::mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let joints = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Joint Matrices"),
            size: joint_capacity as u64 * JOINT_MATRIX_SIZE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: joints.as_entire_binding(),
                },
            ],
        });

        GpuObject {
            uniforms,
            joints,
            joint_capacity,
            bind_group,
        }
    }

    /// Records the scene pass into `encoder`, presenting into `surface_view`.
    pub fn run(
        &self,
        ctx: &WgpuContext,
        surface_view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let (color_view, resolve_target, store_op) = match ctx.msaa_view() {
            Some(msaa) => (msaa, Some(surface_view), wgpu::StoreOp::Discard),
            None => (surface_view, None, wgpu::StoreOp::Store),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: store_op,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for command in &self.commands {
            let (Some(geometry), Some(material), Some(object)) = (
                self.geometries.get(&command.geometry),
                self.materials.get(&command.material),
                self.objects.get(&command.node),
            ) else {
                continue;
            };

            pass.set_pipeline(if command.double_sided {
                &self.double_sided_pipeline
            } else {
                &self.pipeline
            });
            pass.set_bind_group(1, &object.bind_group, &[]);
            pass.set_bind_group(2, &material.bind_group, &[]);
            pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));

            match &geometry.index_buffer {
                Some(indices) => {
                    pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..geometry.draw_count, 0, 0..1);
                }
                None => pass.draw(0..geometry.draw_count, 0..1),
            }
        }
    }

    /// Number of meshes recorded by the last [`prepare`](Self::prepare).
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands.len()
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_pipeline(
    ctx: &WgpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if cull_mode.is_some() {
            "Forward Pipeline"
        } else {
            "Forward Pipeline (Double Sided)"
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: ctx.depth_format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: ctx.msaa_samples,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.view_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview_mask: None,
        cache: None,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &ImageData,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
