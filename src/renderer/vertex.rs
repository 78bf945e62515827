//! Vertex types for shadow volume rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Homogeneous shadow volume vertex; `w = 0` marks a vertex at infinity
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShadowVertex {
    pub position: [f32; 4],
}

// Volumes are uploaded straight from `&[Vec4]`
const _: () = assert!(std::mem::size_of::<ShadowVertex>() == std::mem::size_of::<Vec4>());

impl ShadowVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShadowVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            }],
        }
    }
}

impl From<Vec4> for ShadowVertex {
    fn from(v: Vec4) -> Self {
        Self {
            position: v.to_array(),
        }
    }
}
