use crate::math::{uv, Transform};

/// A hierarchy of joints used for deforming and animating meshes.
#[derive(Debug, Clone)]
pub struct Skin {
    pub root_transform: uv::Mat4,
    pub joints: Vec<Joint>,
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub name: Option<String>,
    /// index of the joint's parent joint in the skin's `joints` array
    pub parent_idx: Option<usize>,
    /// inverse bind matrix, stays constant
    pub inv_bind_matrix: uv::Mat4,
    /// pose relative to the parent joint, updated by animations
    pub local_pose: Transform,
    /// the final joint transform for use in rendering, also updated by animations
    pub joint_matrix: uv::Mat4,
}

impl Skin {
    /// Recompute every joint's final matrix from the current local poses.
    ///
    /// Called after animation sampling, and once at load time
    /// so the skin is usable before (or without) any animation playing.
    pub fn update_joint_matrices(&mut self) {
        // cache global poses so we only compute each of them once
        // (rather than every time a child joint is computed)
        let mut global_poses: Vec<Option<uv::Mat4>> = vec![None; self.joints.len()];
        for joint_idx in 0..self.joints.len() {
            // traverse recursively until an already computed global parent transform is found
            fn populate_parents(
                joint_idx: usize,
                joints: &[Joint],
                global_poses: &mut [Option<uv::Mat4>],
            ) {
                if let Some(parent_idx) = joints[joint_idx].parent_idx {
                    if global_poses[parent_idx].is_none() {
                        populate_parents(parent_idx, joints, global_poses);
                    }
                    global_poses[joint_idx] = Some(
                        // global pose is guaranteed to exist because we just called
                        // populate_parents if it didn't
                        global_poses[parent_idx].unwrap()
                            * joints[joint_idx].local_pose.as_matrix(),
                    );
                } else {
                    global_poses[joint_idx] = Some(joints[joint_idx].local_pose.as_matrix());
                }
            }
            populate_parents(joint_idx, &self.joints, &mut global_poses);
            let joint_pose = global_poses[joint_idx].unwrap();

            self.joints[joint_idx].joint_matrix =
                self.root_transform * joint_pose * self.joints[joint_idx].inv_bind_matrix;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_joint(parent_idx: Option<usize>, y_offset: f32) -> Joint {
        Joint {
            name: None,
            parent_idx,
            inv_bind_matrix: uv::Mat4::identity(),
            local_pose: Transform {
                position: uv::Vec3::new(0.0, y_offset, 0.0),
                ..Transform::identity()
            },
            joint_matrix: uv::Mat4::identity(),
        }
    }

    #[test]
    fn joint_matrices_accumulate_down_the_hierarchy() {
        let mut skin = Skin {
            root_transform: uv::Mat4::identity(),
            joints: vec![test_joint(None, 1.0), test_joint(Some(0), 2.0)],
        };
        skin.update_joint_matrices();
        let child_translation = skin.joints[1].joint_matrix.cols[3];
        assert_eq!(child_translation.y, 3.0);
    }
}
