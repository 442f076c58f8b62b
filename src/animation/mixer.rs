use super::clip::{AnimatedProperty, AnimationClip, Target};
use crate::graphics::mesh::Skin;

/// Playback state for one loaded model's animation set.
///
/// At most one mixer exists per process (the tiger's).
/// It owns the model's clips, plays one of them at a time,
/// and poses the target skin once per frame.
#[derive(Debug)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    active: usize,
    t: f32,
    looping: bool,
    /// Index of the target skin in [`Scene::skins`][crate::Scene].
    /// None when the document had clips but no skin to apply them to.
    target_skin: Option<usize>,
}

impl AnimationMixer {
    /// Build a mixer for a loaded clip set and start playback.
    ///
    /// The clip to play is the first one whose name contains "walk"
    /// (case-insensitive), or the first clip in the set if none matches.
    /// Returns None when the model has no animations at all.
    pub fn new(clips: Vec<AnimationClip>, target_skin: Option<usize>) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        let active = pick_clip(&clips);
        Some(Self {
            clips,
            active,
            t: 0.0,
            looping: true,
            target_skin,
        })
    }

    pub fn active_clip(&self) -> &AnimationClip {
        &self.clips[self.active]
    }

    /// Advance playback by `dt` seconds and pose the target skin.
    pub fn update(&mut self, dt: f32, skins: &mut [Skin]) {
        let clip = &self.clips[self.active];

        self.t += dt;
        if self.looping {
            // loop back to the start if we're past the end,
            // including when a long dt skips whole loops
            if clip.duration > 0.0 {
                self.t %= clip.duration;
            } else {
                self.t = 0.0;
            }
        } else {
            self.t = self.t.min(clip.duration);
        }

        let Some(skin) = self.target_skin.and_then(|idx| skins.get_mut(idx)) else {
            return;
        };
        for channel in &clip.channels {
            let Target::Joint { id, property } = channel.target;
            let joint = &mut skin.joints[id];
            match property {
                AnimatedProperty::Translation => {
                    joint.local_pose.position = channel.sample_vec3(self.t);
                }
                AnimatedProperty::Rotation => {
                    joint.local_pose.rotation = channel.sample_rotor3(self.t);
                }
                AnimatedProperty::Scale => {
                    joint.local_pose.scale = channel.sample_vec3(self.t);
                }
            }
        }
        skin.update_joint_matrices();
    }
}

/// Index of the clip to play: a "walk" by name if there is one, else the first.
fn pick_clip(clips: &[AnimationClip]) -> usize {
    clips
        .iter()
        .position(|clip| {
            clip.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains("walk"))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{Channel, ChannelType, InterpolationMode};

    fn named_clip(name: &str) -> AnimationClip {
        AnimationClip::new(
            Some(name.to_string()),
            vec![Channel {
                target: Target::Joint {
                    id: 0,
                    property: AnimatedProperty::Translation,
                },
                ty: ChannelType::Vector3,
                interpolation: InterpolationMode::Linear,
                keyframe_ts: vec![0.0, 1.0],
                data: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            }],
        )
    }

    #[test]
    fn prefers_clip_named_walk_case_insensitively() {
        let mixer =
            AnimationMixer::new(vec![named_clip("Idle"), named_clip("Walk_Cycle")], None).unwrap();
        assert_eq!(mixer.active_clip().name.as_deref(), Some("Walk_Cycle"));
    }

    #[test]
    fn falls_back_to_first_clip_without_a_walk_match() {
        let mixer = AnimationMixer::new(vec![named_clip("Run"), named_clip("Idle")], None).unwrap();
        assert_eq!(mixer.active_clip().name.as_deref(), Some("Run"));
    }

    #[test]
    fn no_mixer_for_an_empty_clip_set() {
        assert!(AnimationMixer::new(Vec::new(), None).is_none());
    }

    #[test]
    fn looping_playback_wraps_past_the_clip_end() {
        let mut mixer = AnimationMixer::new(vec![named_clip("Walk")], None).unwrap();
        mixer.update(0.75, &mut []);
        assert!((mixer.t - 0.75).abs() < 1e-6);
        mixer.update(0.75, &mut []);
        // duration is 1.0, so 1.5 wraps to 0.5
        assert!((mixer.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn looping_playback_stays_in_range_for_a_dt_spanning_multiple_loops() {
        let mut mixer = AnimationMixer::new(vec![named_clip("Walk")], None).unwrap();
        // duration is 1.0; 2.6 seconds skips two full loops
        mixer.update(2.6, &mut []);
        assert!((mixer.t - 0.6).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_clip_keeps_playback_time_at_zero() {
        let mut mixer = AnimationMixer::new(
            vec![AnimationClip::new(Some("Walk".to_string()), Vec::new())],
            None,
        )
        .unwrap();
        mixer.update(1.0, &mut []);
        mixer.update(1.0, &mut []);
        assert_eq!(mixer.t, 0.0);
    }

    #[test]
    fn update_without_a_target_skin_still_advances_time() {
        let mut mixer = AnimationMixer::new(vec![named_clip("Walk")], Some(3)).unwrap();
        // skin index out of range: playback continues, posing is skipped
        mixer.update(0.25, &mut []);
        assert!((mixer.t - 0.25).abs() < 1e-6);
    }
}
