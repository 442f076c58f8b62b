pub mod animation;
pub use animation::{AnimationClip, AnimationMixer};

pub mod app;
pub use app::AppError;

pub mod assets;
pub use assets::{begin_load, LoadError, LoadedModel, PendingLoad};

pub mod graphics;
pub use graphics::{
    Color, Frame, GpuMesh, Light, MeshData, OrbitControls, PerspectiveCamera, Renderer,
    RendererInitError, SceneRenderer, Skin,
};

pub mod input;
pub use input::{Input, MouseButton};

pub mod math;
pub use math::{uv, Aabb, Transform};

pub mod scene;
pub use scene::{Material, MeshNode, Node, NodeKind, Scene};

// Re-exported wgpu and winit to guarantee versions match
pub use wgpu;
pub use winit;
