//! Two-pass stencil shadow volume pipeline
//!
//! Draws shadow volumes into the stencil of an existing depth buffer. The
//! scene must be rendered with `ViewVolume::shadow_projection` in every
//! pass so the volume's far vertices are never clipped and depth values
//! agree between passes.
//!
//! Frame order: ambient pass writing depth (`ambient_pass_depth_stencil`),
//! then `render_shadow_pass`, then the lit pass with
//! `lit_pass_depth_stencil` and `stencil_reference` blended on top.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use super::vertex::ShadowVertex;
use crate::shadow::{StencilConfig, shadows_disabled};

/// Stencil bits in every format we render to
const STENCIL_BITS: u32 = 8;
/// Smallest vertex buffer allocated, in vertices
const MIN_VERTEX_CAPACITY: u64 = 1024;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowUniform {
    view_proj: [[f32; 4]; 4],
}

/// Shadow volume renderer
pub struct ShadowRenderer {
    format: wgpu::TextureFormat,
    stencil: StencilConfig,
    /// Cull front, decrement where back faces pass the depth test
    back_pipeline: wgpu::RenderPipeline,
    /// Cull back, increment where front faces pass the depth test
    front_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    /// Vertex buffer capacity in vertices
    vertex_capacity: u64,
}

impl ShadowRenderer {
    /// Probe the adapter for a usable depth-stencil format and build the
    /// pipelines, or `None` (with a warning) when shadows cannot be drawn
    pub fn new(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Option<Self> {
        let Some(format) = probe_depth_stencil_format(adapter, device) else {
            shadows_disabled("No renderable depth-stencil format");
            return None;
        };
        let stencil = StencilConfig::from_bits(STENCIL_BITS)?;
        log::info!(
            "Shadow volumes using {format:?} ({} stencil bits)",
            stencil.bits()
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow_uniforms"),
            size: std::mem::size_of::<ShadowUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str, cull: wgpu::Face, stencil_state: wgpu::StencilState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[ShadowVertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(cull),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: stencil_state,
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let back_pipeline = make_pipeline(
            "shadow_back_pipeline",
            wgpu::Face::Front,
            volume_stencil(&stencil, wgpu::StencilOperation::DecrementWrap),
        );
        let front_pipeline = make_pipeline(
            "shadow_front_pipeline",
            wgpu::Face::Back,
            volume_stencil(&stencil, wgpu::StencilOperation::IncrementWrap),
        );

        let vertex_capacity = MIN_VERTEX_CAPACITY;
        let vertex_buffer = create_vertex_buffer(device, vertex_capacity);

        Some(Self {
            format,
            stencil,
            back_pipeline,
            front_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            vertex_capacity,
        })
    }

    /// Depth-stencil format chosen by the probe
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn stencil(&self) -> StencilConfig {
        self.stencil
    }

    /// Reference value for the lit pass
    pub fn stencil_reference(&self) -> u32 {
        self.stencil.mid()
    }

    /// Depth-stencil state for the ambient pass that lays down depth
    pub fn ambient_pass_depth_stencil(&self) -> wgpu::DepthStencilState {
        ambient_depth_stencil(self.format)
    }

    /// Depth-stencil state for the lit pass: only where the stencil is `M`
    pub fn lit_pass_depth_stencil(&self) -> wgpu::DepthStencilState {
        lit_depth_stencil(self.format, &self.stencil)
    }

    /// Depth-stencil target sized for the surface
    pub fn create_depth_stencil(
        &self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_depth_stencil"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Clear the stencil to `M` and count `volume` into it
    ///
    /// `depth_view` must already hold the scene depth from the ambient pass;
    /// depth is loaded and never written.
    pub fn render_shadow_pass(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        depth_view: &wgpu::TextureView,
        view_proj: Mat4,
        volume: &[Vec4],
    ) {
        let needed = volume.len() as u64;
        if needed > self.vertex_capacity {
            self.vertex_capacity = needed.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
            log::debug!("Shadow vertex buffer grown to {} vertices", self.vertex_capacity);
        }
        if needed > 0 {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(volume));
        }
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&ShadowUniform {
                view_proj: view_proj.to_cols_array_2d(),
            }),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.stencil.mid()),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if needed == 0 {
            return;
        }

        let count = needed as u32;
        let bytes = needed * std::mem::size_of::<ShadowVertex>() as u64;
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..bytes));

        render_pass.set_pipeline(&self.back_pipeline);
        render_pass.draw(0..count, 0..1);
        render_pass.set_pipeline(&self.front_pipeline);
        render_pass.draw(0..count, 0..1);
    }
}

/// Prefer the packed format WebGPU guarantees; fall back to 32-bit float
/// depth when the device enabled it
fn probe_depth_stencil_format(
    adapter: &wgpu::Adapter,
    device: &wgpu::Device,
) -> Option<wgpu::TextureFormat> {
    let renderable = |format: wgpu::TextureFormat| {
        adapter
            .get_texture_format_features(format)
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    };

    if renderable(wgpu::TextureFormat::Depth24PlusStencil8) {
        return Some(wgpu::TextureFormat::Depth24PlusStencil8);
    }
    if device
        .features()
        .contains(wgpu::Features::DEPTH32FLOAT_STENCIL8)
        && renderable(wgpu::TextureFormat::Depth32FloatStencil8)
    {
        return Some(wgpu::TextureFormat::Depth32FloatStencil8);
    }
    None
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("shadow_vertices"),
        size: capacity * std::mem::size_of::<ShadowVertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Stencil state for one volume pass; culling leaves only one facing, so
/// both faces share the operation
fn volume_stencil(config: &StencilConfig, pass_op: wgpu::StencilOperation) -> wgpu::StencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Always,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: config.mask(),
        write_mask: config.mask(),
    }
}

fn ambient_depth_stencil(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn lit_depth_stencil(format: wgpu::TextureFormat, config: &StencilConfig) -> wgpu::DepthStencilState {
    let face = wgpu::StencilFaceState {
        compare: wgpu::CompareFunction::Equal,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op: wgpu::StencilOperation::Keep,
    };
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: false,
        // Same geometry as the ambient pass, so equal depth must pass
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask: config.mask(),
            write_mask: 0,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}
