pub mod clip;
pub use clip::{AnimatedProperty, AnimationClip, Channel, ChannelType, InterpolationMode, Target};

pub mod mixer;
pub use mixer::AnimationMixer;

pub mod interpolation;
