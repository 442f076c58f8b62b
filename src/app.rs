//! The viewer application: window, frame loop, and scene setup.

use std::sync::Arc;

use instant::Instant;
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use crate::{
    animation::AnimationMixer,
    assets::{self, LoadedModel, PendingLoad},
    graphics::{
        light::{AmbientLight, DirectionalLight, HemisphereLight, Light, ShadowConfig, SpotLight},
        Color, OrbitControls, PerspectiveCamera, Renderer, RendererInitError, SceneRenderer,
    },
    input::Input,
    math::uv,
    scene::{Node, NodeKind, Scene},
};

const WINDOW_TITLE: &str = "tiger walk";

// models live under public/ next to the executable,
// each glTF document with its buffer files beside it
const ROAD_PATH: &str = "public/road_with_substance_designer/scene.gltf";
const TIGER_PATH: &str = "public/running_tiger/scene.gltf";

const ROAD_SCALE: f32 = 3.0;
const ROAD_Y: f32 = -1.2;
const TIGER_SCALE: f32 = 0.015;
const TIGER_Y: f32 = -1.05;

const CAMERA_FOV_DEG: f32 = 60.0;
const CAMERA_Z_NEAR: f32 = 0.1;
const CAMERA_Z_FAR: f32 = 1000.0;

const EXPOSURE: f32 = 1.2;

/// An error that prevented the viewer from starting.
/// Errors after startup (failed model loads) are logged instead,
/// leaving the rest of the scene running.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("failed to run the event loop")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create the window")]
    Window(#[from] winit::error::OsError),
    #[error("failed to initialize graphics")]
    Renderer(#[from] RendererInitError),
}

/// Which scene slot a pending model load fills once it completes.
#[derive(Clone, Copy, Debug)]
enum ModelSlot {
    Road,
    Tiger,
}

/// Open the window and run the viewer until it's closed.
pub fn run() -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .build(&event_loop)?,
    );
    let mut app = App::init(window.clone())?;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => {
                app.input.track_window_event(&event);
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(new_size) => app.resize(new_size),
                    WindowEvent::RedrawRequested => app.frame(),
                    _ => (),
                }
            }
            Event::AboutToWait => window.request_redraw(),
            _ => (),
        }
    })?;
    Ok(())
}

struct App {
    renderer: Renderer,
    scene_renderer: SceneRenderer,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    input: Input,
    mixer: Option<AnimationMixer>,
    pending_loads: Vec<(ModelSlot, PendingLoad)>,
    last_frame_t: Instant,
}

impl App {
    fn init(window: Arc<winit::window::Window>) -> Result<Self, AppError> {
        let renderer = futures::executor::block_on(Renderer::init(window))?;
        let mut scene_renderer = SceneRenderer::new(&renderer);
        scene_renderer.exposure = EXPOSURE;

        let mut scene = Scene::new(background_color());
        for light in light_rig() {
            scene.add(Node::new(NodeKind::Light(light)));
        }

        let window_size = renderer.window_size();
        let camera = PerspectiveCamera::new(
            CAMERA_FOV_DEG,
            (window_size.width, window_size.height),
            CAMERA_Z_NEAR,
            CAMERA_Z_FAR,
        );
        let controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());

        log::info!("loading {ROAD_PATH} and {TIGER_PATH}");
        let pending_loads = vec![
            (ModelSlot::Road, assets::begin_load(ROAD_PATH)),
            (ModelSlot::Tiger, assets::begin_load(TIGER_PATH)),
        ];

        Ok(Self {
            renderer,
            scene_renderer,
            scene,
            camera,
            controls,
            input: Input::new(),
            mixer: None,
            pending_loads,
            last_frame_t: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
        let actual = self.renderer.window_size();
        self.camera.set_viewport_size((actual.width, actual.height));
    }

    /// Advance and draw one frame.
    fn frame(&mut self) {
        let dt = self.last_frame_t.elapsed().as_secs_f32();
        self.last_frame_t = Instant::now();

        drain_loads(
            &mut self.pending_loads,
            &mut self.scene,
            &mut self.controls,
            &mut self.mixer,
        );

        if let Some(mixer) = &mut self.mixer {
            mixer.update(dt, &mut self.scene.skins);
        }

        self.controls.handle_input(&self.input);
        self.controls.update(dt);
        self.camera.position = self.controls.camera_position();

        let frame = self.renderer.begin_frame();
        self.scene_renderer.draw(
            &self.renderer,
            &frame,
            &self.camera,
            self.controls.target,
            &mut self.scene,
        );
        self.renderer.present_frame(frame);

        self.input.tick();
    }

}

/// Install any model loads that completed since the last frame.
/// A failed load only logs; the other load and the frame loop keep going.
fn drain_loads(
    pending_loads: &mut Vec<(ModelSlot, PendingLoad)>,
    scene: &mut Scene,
    controls: &mut OrbitControls,
    mixer: &mut Option<AnimationMixer>,
) {
    let mut completed = Vec::new();
    pending_loads.retain_mut(|(slot, pending)| {
        match pending.poll() {
            None => true,
            Some(Ok(model)) => {
                log::info!("loaded {}", pending.path().display());
                completed.push((*slot, model));
                false
            }
            Some(Err(err)) => {
                log::error!("error loading {}: {err}", pending.path().display());
                false
            }
        }
    });
    for (slot, model) in completed {
        match slot {
            ModelSlot::Road => install_road(scene, model),
            ModelSlot::Tiger => {
                *mixer = install_tiger(scene, controls, model);
            }
        }
    }
}

fn background_color() -> Color {
    let [r, g, b] = rgb(0x0d0d0d);
    [r, g, b, 1.0]
}

fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// The fixed light rig every scene gets:
/// a hemisphere gradient, a shadow-casting sun,
/// a warm spotlight above the model and a flat ambient fill.
fn light_rig() -> [Light; 4] {
    [
        Light::Hemisphere(HemisphereLight {
            sky_color: rgb(0xffffff),
            ground_color: rgb(0x444444),
            intensity: 1.2,
        }),
        Light::Directional(DirectionalLight {
            color: rgb(0xffffff),
            intensity: 2.0,
            position: uv::Vec3::new(5.0, 10.0, 5.0),
            cast_shadows: true,
            shadow: ShadowConfig::default(),
        }),
        Light::Spot(SpotLight {
            color: rgb(0xffcc88),
            intensity: 1.5,
            position: uv::Vec3::new(0.0, 5.0, 5.0),
            range: 50.0,
            angle: std::f32::consts::FRAC_PI_6,
            penumbra: 0.3,
            cast_shadows: true,
        }),
        Light::Ambient(AmbientLight {
            color: rgb(0xffffff),
            intensity: 0.6,
        }),
    ]
}

/// Force every mesh in a loaded fragment solid, double-sided and shadowed,
/// overriding whatever the exported materials say.
/// Both models ship with materials that look wrong without this.
fn normalize_materials(root: &mut Node, force_depth_write: bool) {
    root.walk_mut(&mut |node| {
        if let NodeKind::Mesh(mesh) = &mut node.kind {
            mesh.material.double_sided = true;
            mesh.material.transparent = false;
            mesh.material.opacity = 1.0;
            if force_depth_write {
                mesh.material.depth_write = true;
            }
        }
        if matches!(node.kind, NodeKind::Mesh(_)) {
            node.cast_shadows = true;
            node.receive_shadows = true;
        }
    });
}

fn install_road(scene: &mut Scene, model: LoadedModel) {
    let mut root = model.root;
    root.name = Some("road".into());
    root.transform.scale = uv::Vec3::broadcast(ROAD_SCALE);
    root.transform.position = uv::Vec3::new(0.0, ROAD_Y, 0.0);
    normalize_materials(&mut root, false);
    scene.add(root);
}

/// Add the tiger to the scene, re-aim the camera at its center
/// and start its walk animation if it has one.
fn install_tiger(
    scene: &mut Scene,
    controls: &mut OrbitControls,
    model: LoadedModel,
) -> Option<AnimationMixer> {
    let LoadedModel {
        mut root,
        skin,
        clips,
    } = model;
    root.name = Some("tiger".into());
    root.transform.scale = uv::Vec3::broadcast(TIGER_SCALE);
    root.transform.position = uv::Vec3::new(0.0, TIGER_Y, 0.0);
    normalize_materials(&mut root, true);

    let skin_idx = skin.map(|skin| scene.add_skin(skin));
    // the loader marks deformed meshes with a placeholder skin index;
    // point them at where the skin actually landed in the scene
    root.walk_mut(&mut |node| {
        if let NodeKind::Mesh(mesh) = &mut node.kind {
            if mesh.skin.is_some() {
                mesh.skin = skin_idx;
            }
        }
    });

    let aabb = root.compute_aabb();
    if !aabb.is_empty() {
        controls.set_target(aabb.center());
        controls.snap();
    }

    scene.add(root);
    AnimationMixer::new(clips, skin_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animation::AnimationClip,
        graphics::mesh::{MeshData, Skin, Vertex},
        scene::{Material, MeshNode},
    };

    fn test_fragment(material: Material) -> Node {
        let data = MeshData {
            vertices: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
                .into_iter()
                .map(|position| Vertex {
                    position: position.into(),
                    ..Vertex::default()
                })
                .collect(),
            indices: vec![0, 1, 2],
        };
        let mut root = Node::group();
        root.children
            .push(Node::new(NodeKind::Mesh(MeshNode::new(data, material))));
        root
    }

    fn named_clip(name: &str) -> AnimationClip {
        AnimationClip::new(Some(name.to_string()), Vec::new())
    }

    #[test]
    fn normalization_forces_solid_double_sided_shadowed_meshes() {
        let exported = Material {
            base_color: [0.5, 0.5, 0.5, 0.3],
            double_sided: false,
            transparent: true,
            opacity: 0.3,
            depth_write: false,
        };
        let mut root = test_fragment(exported);
        normalize_materials(&mut root, true);
        root.walk(&mut |node| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                assert!(mesh.material.double_sided);
                assert!(!mesh.material.transparent);
                assert_eq!(mesh.material.opacity, 1.0);
                assert!(mesh.material.depth_write);
                assert!(node.cast_shadows);
                assert!(node.receive_shadows);
            }
        });
    }

    #[test]
    fn normalization_leaves_depth_write_alone_when_not_forced() {
        let mut exported = Material::default();
        exported.depth_write = false;
        let mut root = test_fragment(exported);
        normalize_materials(&mut root, false);
        root.walk(&mut |node| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                assert!(!mesh.material.depth_write);
            }
        });
    }

    #[test]
    fn tiger_install_aims_the_camera_and_starts_a_walk_clip() {
        let mut scene = Scene::new([0.0; 4]);
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());
        let model = LoadedModel {
            root: test_fragment(Material::default()),
            skin: None,
            clips: vec![named_clip("Idle"), named_clip("Forest_Walk")],
        };
        let mixer = install_tiger(&mut scene, &mut controls, model);

        let mixer = mixer.expect("clips were present, a mixer should start");
        assert_eq!(mixer.active_clip().name.as_deref(), Some("Forest_Walk"));

        // the camera target snapped to the scaled model's center
        let expected = scene.root.children[0].compute_aabb().center();
        assert!((controls.target - expected).mag() < 1e-5);
    }

    #[test]
    fn tiger_without_clips_installs_without_a_mixer() {
        let mut scene = Scene::new([0.0; 4]);
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());
        let model = LoadedModel {
            root: test_fragment(Material::default()),
            skin: None,
            clips: Vec::new(),
        };
        assert!(install_tiger(&mut scene, &mut controls, model).is_none());
    }

    #[test]
    fn a_failed_road_load_does_not_block_the_tiger_install() {
        use futures::channel::oneshot;

        let mut scene = Scene::new([0.0; 4]);
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());
        let mut mixer = None;

        let (road_tx, road_rx) = oneshot::channel();
        let (tiger_tx, tiger_rx) = oneshot::channel();
        let mut pending = vec![
            (ModelSlot::Road, PendingLoad::from_channel("road.gltf", road_rx)),
            (ModelSlot::Tiger, PendingLoad::from_channel("tiger.gltf", tiger_rx)),
        ];

        // the road load dies while the tiger load completes
        drop(road_tx);
        tiger_tx
            .send(Ok(LoadedModel {
                root: test_fragment(Material::default()),
                skin: None,
                clips: vec![named_clip("Walk")],
            }))
            .unwrap();

        drain_loads(&mut pending, &mut scene, &mut controls, &mut mixer);

        assert!(pending.is_empty());
        // the tiger still made it into the scene with its animation playing
        assert_eq!(scene.root.children.len(), 1);
        assert_eq!(scene.root.children[0].name.as_deref(), Some("tiger"));
        assert!(mixer.is_some());
    }

    #[test]
    fn skinned_meshes_are_repointed_at_the_installed_skin() {
        let mut scene = Scene::new([0.0; 4]);
        // another skin already occupies index 0
        scene.add_skin(Skin {
            root_transform: uv::Mat4::identity(),
            joints: Vec::new(),
        });
        let mut controls = OrbitControls::new(uv::Vec3::new(0.0, 2.0, 6.0), uv::Vec3::zero());

        let mut root = test_fragment(Material::default());
        if let NodeKind::Mesh(mesh) = &mut root.children[0].kind {
            mesh.skin = Some(0);
        }
        let model = LoadedModel {
            root,
            skin: Some(Skin {
                root_transform: uv::Mat4::identity(),
                joints: Vec::new(),
            }),
            clips: Vec::new(),
        };
        install_tiger(&mut scene, &mut controls, model);

        let tiger = scene.root.children.last().unwrap();
        if let NodeKind::Mesh(mesh) = &tiger.children[0].kind {
            assert_eq!(mesh.skin, Some(1));
        } else {
            panic!("expected a mesh node");
        }
    }
}
