//! Small math helpers on top of `ultraviolet`.

pub use ultraviolet as uv;

/// Decomposed local transform of a scene node or skin joint.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: uv::Vec3,
    pub rotation: uv::Rotor3,
    pub scale: uv::Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: uv::Vec3::zero(),
            rotation: uv::Rotor3::identity(),
            scale: uv::Vec3::one(),
        }
    }

    /// Build a transform from the parts glTF node transforms decompose into.
    pub fn from_parts((pos, rot_quat, scale): ([f32; 3], [f32; 4], [f32; 3])) -> Self {
        Self {
            position: pos.into(),
            rotation: uv::Rotor3::from_quaternion_array(rot_quat),
            scale: scale.into(),
        }
    }

    pub fn as_matrix(&self) -> uv::Mat4 {
        uv::Mat4::from_translation(self.position)
            * self.rotation.into_matrix().into_homogeneous()
            * uv::Mat4::from_nonuniform_scale(self.scale)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: uv::Vec3,
    pub max: uv::Vec3,
}

impl Aabb {
    /// An empty box that any point or box can be merged into.
    pub fn empty() -> Self {
        Self {
            min: uv::Vec3::broadcast(f32::MAX),
            max: uv::Vec3::broadcast(f32::MIN),
        }
    }

    /// Whether any point has been merged into the box yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow the box to contain the given point.
    pub fn insert(&mut self, point: uv::Vec3) {
        self.min = self.min.min_by_component(point);
        self.max = self.max.max_by_component(point);
    }

    pub fn center(&self) -> uv::Vec3 {
        (self.min + self.max) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_center() {
        let mut aabb = Aabb::empty();
        assert!(aabb.is_empty());
        aabb.insert(uv::Vec3::new(-1.0, 2.0, 3.0));
        aabb.insert(uv::Vec3::new(5.0, -4.0, 1.0));
        aabb.insert(uv::Vec3::new(0.0, 0.0, 2.0));
        assert!(!aabb.is_empty());
        let center = aabb.center();
        assert_eq!(center.x, 2.0);
        assert_eq!(center.y, -1.0);
        assert_eq!(center.z, 2.0);
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let tf = Transform {
            position: uv::Vec3::new(0.0, -1.2, 0.0),
            rotation: uv::Rotor3::identity(),
            scale: uv::Vec3::broadcast(3.0),
        };
        let p = tf.as_matrix() * uv::Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(p.x, 3.0);
        assert_eq!(p.y, 1.8);
        assert_eq!(p.z, 3.0);
    }
}
