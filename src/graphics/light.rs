//! Light sources and their GPU-side representation.
//!
//! The viewer's lighting is a fixed rig built once at startup;
//! light nodes in the scene graph carry these values
//! and the scene renderer gathers them into one uniform buffer per frame.

use crate::math::uv;

use super::util::GpuMat4;
use zerocopy::{AsBytes, FromBytes};

/// A light source carried by a scene-graph node.
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
    Spot(SpotLight),
    Ambient(AmbientLight),
}

/// Sky/ground gradient light covering the whole scene.
#[derive(Debug, Clone, Copy)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

/// Parallel rays from a distant source, like the sun.
/// The only light that renders into the shadow map.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Rays travel from this position toward the world origin.
    pub position: uv::Vec3,
    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
}

/// Shadow map parameters of a shadow-casting light.
#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    /// Shadow map resolution (width and height).
    pub map_size: u32,
    /// Near plane of the shadow frustum.
    pub z_near: f32,
    /// Far plane of the shadow frustum.
    pub z_far: f32,
    /// Half-width of the orthographic shadow frustum in world units.
    pub extent: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 2048,
            z_near: 0.5,
            z_far: 50.0,
            extent: 15.0,
        }
    }
}

impl DirectionalLight {
    /// View-projection matrix of the shadow frustum.
    pub fn light_matrix(&self) -> uv::Mat4 {
        let e = self.shadow.extent;
        let proj =
            uv::projection::orthographic_wgpu_dx(-e, e, -e, e, self.shadow.z_near, self.shadow.z_far);
        let view = uv::Mat4::look_at(self.position, uv::Vec3::zero(), uv::Vec3::unit_y());
        proj * view
    }
}

/// A cone of light from a point, with a soft edge.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: uv::Vec3,
    /// Maximum distance the light reaches.
    pub range: f32,
    /// Half-angle of the cone in radians.
    pub angle: f32,
    /// Fraction of the cone over which the edge fades out, 0 for a hard edge.
    pub penumbra: f32,
    /// Only the directional light renders a shadow map;
    /// this flag records the rig's setting but is not consulted yet.
    pub cast_shadows: bool,
}

/// Flat fill light applied to every surface equally.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Gpu-side representation of the whole light rig.
///
/// One uniform struct rather than per-light buffers:
/// the rig is fixed at startup and tiny.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, AsBytes, FromBytes)]
pub(crate) struct LightUniforms {
    pub light_matrix: GpuMat4,
    pub hemi_sky_color: [f32; 3],
    pub hemi_intensity: f32,
    pub hemi_ground_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_shadows: u32,
    /// Direction sun rays travel in (normalized).
    pub sun_direction: [f32; 3],
    pub spot_intensity: f32,
    pub spot_color: [f32; 3],
    pub spot_range: f32,
    pub spot_position: [f32; 3],
    pub spot_cos_outer: f32,
    /// Direction the spot cone points in (normalized).
    pub spot_direction: [f32; 3],
    pub spot_cos_inner: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl LightUniforms {
    /// Fold one light into the rig uniforms.
    /// Later lights of the same kind overwrite earlier ones;
    /// the startup rig has exactly one of each.
    pub fn add(&mut self, light: &Light) {
        match *light {
            Light::Hemisphere(l) => {
                self.hemi_sky_color = l.sky_color;
                self.hemi_ground_color = l.ground_color;
                self.hemi_intensity = l.intensity;
            }
            Light::Directional(l) => {
                self.sun_color = l.color;
                self.sun_intensity = l.intensity;
                self.sun_direction = (-l.position).normalized().into();
                self.sun_shadows = l.cast_shadows as u32;
                self.light_matrix = l.light_matrix().into();
            }
            Light::Spot(l) => {
                self.spot_color = l.color;
                self.spot_intensity = l.intensity;
                self.spot_position = l.position.into();
                self.spot_range = l.range;
                // the cone points at the world origin, matching the source scene
                self.spot_direction = (-l.position).normalized().into();
                self.spot_cos_outer = l.angle.cos();
                self.spot_cos_inner = (l.angle * (1.0 - l.penumbra)).cos();
            }
            Light::Ambient(l) => {
                self.ambient_color = l.color;
                self.ambient_intensity = l.intensity;
            }
        }
    }
}
