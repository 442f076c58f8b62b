/// Surface shading parameters for a mesh node.
///
/// This is a deliberately small model: base color plus the flags
/// the viewer actually manipulates after load
/// (sidedness, transparency, opacity, depth-write).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    /// Render both faces of every triangle.
    pub double_sided: bool,
    /// Blend the surface over what's behind it instead of replacing it.
    pub transparent: bool,
    /// Blend factor used when `transparent` is set.
    pub opacity: f32,
    /// Write fragment depths to the depth buffer.
    pub depth_write: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0; 4],
            double_sided: false,
            transparent: false,
            opacity: 1.0,
            depth_write: true,
        }
    }
}
