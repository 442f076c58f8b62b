pub mod camera;
pub use camera::{OrbitControls, PerspectiveCamera};

pub mod light;
pub use light::{AmbientLight, DirectionalLight, HemisphereLight, Light, SpotLight};

pub mod mesh;
pub use mesh::{GpuMesh, MeshData, Skin};

pub mod renderer;
pub use renderer::{Frame, Renderer, RendererInitError};

pub mod scene_renderer;
pub use scene_renderer::SceneRenderer;

pub mod util;

/// An RGBA color in linear space.
pub type Color = [f32; 4];
