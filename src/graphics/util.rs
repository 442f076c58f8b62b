//! Utilities for communicating with the GPU.

use crate::math::uv;
use zerocopy::{AsBytes, FromBytes};

/// A 3D vector laid out for use in vertex buffers.
#[derive(Clone, Copy, Debug, Default, AsBytes, FromBytes)]
#[repr(transparent)]
pub struct GpuVec3(pub [f32; 3]);

impl From<uv::Vec3> for GpuVec3 {
    fn from(v: uv::Vec3) -> Self {
        Self(v.into())
    }
}

impl From<[f32; 3]> for GpuVec3 {
    fn from(v: [f32; 3]) -> Self {
        Self(v)
    }
}

impl From<GpuVec3> for uv::Vec3 {
    fn from(v: GpuVec3) -> Self {
        v.0.into()
    }
}

/// A 4D vector laid out for use in uniform and vertex buffers.
#[derive(Clone, Copy, Debug, Default, AsBytes, FromBytes)]
#[repr(transparent)]
pub struct GpuVec4(pub [f32; 4]);

impl From<[f32; 4]> for GpuVec4 {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

/// A 4x4 matrix laid out for use in uniform and storage buffers.
#[derive(Clone, Copy, Debug, Default, AsBytes, FromBytes)]
#[repr(transparent)]
pub struct GpuMat4([[f32; 4]; 4]);

impl From<uv::Mat4> for GpuMat4 {
    fn from(mat: uv::Mat4) -> Self {
        Self([
            mat.cols[0].into(),
            mat.cols[1].into(),
            mat.cols[2].into(),
            mat.cols[3].into(),
        ])
    }
}
