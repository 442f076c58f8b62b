use super::interpolation as interp;
use crate::math::uv;

/// A named, time-parameterized animation bound to a skeleton.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: Option<String>,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: Option<String>, channels: Vec<Channel>) -> Self {
        Self {
            name,
            duration: channels
                .iter()
                .map(|c| c.duration())
                .max_by(f32::total_cmp)
                .unwrap_or(0.0),
            channels,
        }
    }
}

/// Part of the skeleton operated on by an animation channel.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Joint {
        id: usize,
        property: AnimatedProperty,
    },
    // morph targets would go here, but neither model uses them
}

/// Property of the part operated on by the animation.
#[derive(Debug, Clone, Copy)]
pub enum AnimatedProperty {
    Translation,
    Rotation,
    Scale,
}

/// One stream of keyframes animating a single property of a single target.
#[derive(Debug, Clone)]
pub struct Channel {
    pub target: Target,
    pub ty: ChannelType,
    pub interpolation: InterpolationMode,
    pub keyframe_ts: Vec<f32>,
    pub data: Vec<f32>,
}

#[derive(Debug, Clone)]
pub enum InterpolationMode {
    Step,
    Linear,
    CubicSpline,
}

#[derive(Debug, Clone)]
pub enum ChannelType {
    Vector3,
    Rotor3,
}

impl Channel {
    #[inline]
    pub fn duration(&self) -> f32 {
        self.keyframe_ts.last().copied().unwrap_or(0.0)
    }

    /// Get the value of this animation channel at the given time t as a 3D vector.
    /// # Panics
    /// Panics if the channel type isn't Vector3.
    pub fn sample_vec3(&self, t: f32) -> uv::Vec3 {
        assert!(
            matches!(self.ty, ChannelType::Vector3),
            "Sample type mismatch"
        );
        let read = |first_data: usize| {
            let v = &self.data[first_data..first_data + 3];
            uv::Vec3::new(v[0], v[1], v[2])
        };
        let [prev_idx, next_idx] = self.current_window(t);

        match self.interpolation {
            InterpolationMode::Step | InterpolationMode::Linear => {
                if prev_idx == next_idx {
                    // outside the animation's span, don't interpolate anything
                    return read(prev_idx * 3);
                }
                let v_prev = read(prev_idx * 3);
                let v_next = read(next_idx * 3);
                interp::lerp(v_prev, v_next, self.normalized_t(t, prev_idx, next_idx))
            }
            InterpolationMode::CubicSpline => {
                // cubic spline interpolation comes with two tangents per value,
                // so we need to step through the data differently
                if prev_idx == next_idx {
                    return read(prev_idx * 9 + 3);
                }
                let val_prev = read(prev_idx * 9 + 3);
                let tan_prev = read(prev_idx * 9 + 6);
                let tan_next = read(next_idx * 9);
                let val_next = read(next_idx * 9 + 3);
                interp::cubic_spline(
                    val_prev,
                    tan_prev,
                    val_next,
                    tan_next,
                    self.normalized_t(t, prev_idx, next_idx),
                )
            }
        }
    }

    /// Get the value of this animation channel at the given time t as a 3D rotor.
    /// # Panics
    /// Panics if the channel type isn't Rotor3.
    pub fn sample_rotor3(&self, t: f32) -> uv::Rotor3 {
        assert!(
            matches!(self.ty, ChannelType::Rotor3),
            "Sample type mismatch"
        );
        let read = |first_data: usize| {
            let v: [f32; 4] = self.data[first_data..first_data + 4]
                .try_into()
                .expect("channel data too short");
            uv::Rotor3::from_quaternion_array(v)
        };
        let [prev_idx, next_idx] = self.current_window(t);

        match self.interpolation {
            InterpolationMode::Step | InterpolationMode::Linear => {
                if prev_idx == next_idx {
                    // outside the animation's span, don't interpolate anything
                    return read(prev_idx * 4);
                }
                let v_prev = read(prev_idx * 4);
                let v_next = read(next_idx * 4);
                // nlerp instead of slerp,
                // see http://number-none.com/product/Understanding%20Slerp,%20Then%20Not%20Using%20It/
                use uv::interp::Lerp;
                v_prev
                    .lerp(v_next, self.normalized_t(t, prev_idx, next_idx))
                    .normalized()
            }
            InterpolationMode::CubicSpline => {
                // cubic spline interpolation comes with two tangents per value,
                // so we need to step through the data differently
                if prev_idx == next_idx {
                    return read(prev_idx * 12 + 4);
                }
                let val_prev = read(prev_idx * 12 + 4);
                let tan_prev = read(prev_idx * 12 + 8);
                let tan_next = read(next_idx * 12);
                let val_next = read(next_idx * 12 + 4);
                let spline_val = interp::cubic_spline(
                    val_prev,
                    tan_prev,
                    val_next,
                    tan_next,
                    self.normalized_t(t, prev_idx, next_idx),
                );
                spline_val.normalized()
            }
        }
    }

    fn normalized_t(&self, t: f32, prev_idx: usize, next_idx: usize) -> f32 {
        (t - self.keyframe_ts[prev_idx]) / (self.keyframe_ts[next_idx] - self.keyframe_ts[prev_idx])
    }

    /// Get the keyframe before and the keyframe after the given time.
    /// Returns 0 or keyframe_ts.len twice if outside the entire span of the animation.
    /// It is assumed the animation has at least one keyframe.
    fn current_window(&self, t: f32) -> [usize; 2] {
        if t <= self.keyframe_ts[0] {
            return [0, 0];
        }
        if let Some((i, _)) = self.keyframe_ts.iter().enumerate().find(|(_, kf)| t < **kf) {
            return [i - 1, i];
        }
        let end = self.keyframe_ts.len() - 1;
        [end, end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation_channel() -> Channel {
        Channel {
            target: Target::Joint {
                id: 0,
                property: AnimatedProperty::Translation,
            },
            ty: ChannelType::Vector3,
            interpolation: InterpolationMode::Linear,
            keyframe_ts: vec![0.0, 1.0, 2.0],
            data: vec![
                0.0, 0.0, 0.0, //
                2.0, 0.0, 0.0, //
                2.0, 4.0, 0.0,
            ],
        }
    }

    #[test]
    fn linear_sampling_interpolates_between_keyframes() {
        let chan = translation_channel();
        let mid = chan.sample_vec3(0.5);
        assert_eq!(mid.x, 1.0);
        assert_eq!(mid.y, 0.0);
        let later = chan.sample_vec3(1.5);
        assert_eq!(later.x, 2.0);
        assert_eq!(later.y, 2.0);
    }

    #[test]
    fn sampling_clamps_outside_the_keyframe_span() {
        let chan = translation_channel();
        assert_eq!(chan.sample_vec3(-1.0).x, 0.0);
        assert_eq!(chan.sample_vec3(10.0).y, 4.0);
    }

    #[test]
    fn clip_duration_is_longest_channel() {
        let clip = AnimationClip::new(Some("Walk".to_string()), vec![translation_channel()]);
        assert_eq!(clip.duration, 2.0);
    }
}
