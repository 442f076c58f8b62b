pub(crate) mod skin;
pub use skin::Skin;

use super::util::{GpuVec3, GpuVec4};
use zerocopy::{AsBytes, FromBytes};

/// A single vertex of a triangle mesh.
///
/// Joints and weights are zeroed for meshes without a skin;
/// the shader only reads them when skinning is enabled for the draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, AsBytes, FromBytes)]
pub struct Vertex {
    pub position: GpuVec3,
    pub normal: GpuVec3,
    pub joints: [u16; 4],
    pub weights: GpuVec4,
}

/// CPU-side vertex data of a mesh, produced by the asset loader.
///
/// Uploaded to the GPU with [`upload`][Self::upload] on first draw,
/// so that loading can happen on a thread with no GPU access.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn upload(&self, label: Option<&str>) -> GpuMesh {
        use wgpu::util::DeviceExt;
        let device = super::Renderer::device();
        let vert_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: self.vertices.as_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let idx_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: self.indices.as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vert_buf,
            idx_buf,
            idx_count: self.indices.len() as u32,
            uniforms: None,
        }
    }
}

/// GPU-side resources of a mesh.
#[derive(Debug)]
pub struct GpuMesh {
    pub vert_buf: wgpu::Buffer,
    pub idx_buf: wgpu::Buffer,
    pub idx_count: u32,
    /// Per-mesh uniform buffer and bind group,
    /// created by the scene renderer on first draw.
    pub(crate) uniforms: Option<MeshUniformBinding>,
}

/// Uniform binding created lazily per mesh by the scene renderer.
#[derive(Debug)]
pub(crate) struct MeshUniformBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}
