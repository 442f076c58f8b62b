//! The forward renderer drawing the scene graph into the window.

use std::{borrow::Cow, mem::size_of};

use zerocopy::{AsBytes, FromBytes};

use crate::{
    math::uv,
    scene::{Material, Node, NodeKind, Scene},
};

use super::{
    camera::PerspectiveCamera,
    light::{LightUniforms, ShadowConfig},
    mesh::{MeshUniformBinding, Vertex},
    renderer::{Frame, Renderer, DEPTH_FORMAT, SWAPCHAIN_FORMAT},
    util::{GpuMat4, GpuVec3, GpuVec4},
};

//
// uniform types
//

/// Per-frame values shared by every draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes)]
struct FrameUniforms {
    view_proj: GpuMat4,
    camera_position: GpuVec3,
    exposure: f32,
}

/// Per-mesh values, written into each mesh's own uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes)]
struct MeshUniforms {
    model: GpuMat4,
    base_color: GpuVec4,
    opacity: f32,
    receive_shadows: u32,
    /// offset into the global joint matrix buffer
    joint_offset: u32,
    /// whether the vertex shader applies joint matrices at all
    skinned: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes)]
struct ShadowUniforms {
    light_matrix: GpuMat4,
}

//
// renderer
//

/// One pipeline per combination of material state the scene can contain.
struct ScenePipelines {
    opaque: wgpu::RenderPipeline,
    opaque_double_sided: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    transparent_no_depth: wgpu::RenderPipeline,
}

impl ScenePipelines {
    fn select(&self, material: &Material) -> &wgpu::RenderPipeline {
        match (material.transparent, material.depth_write, material.double_sided) {
            (true, true, _) => &self.transparent,
            (true, false, _) => &self.transparent_no_depth,
            (false, _, true) => &self.opaque_double_sided,
            (false, _, false) => &self.opaque,
        }
    }
}

/// Which meshes a render pass traversal draws and how.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DrawPhase {
    /// Depth-only pass into the shadow map; only shadow casters.
    Shadow,
    /// Main pass, opaque materials only.
    Opaque,
    /// Main pass, alpha-blended materials, drawn after everything opaque.
    Transparent,
}

/// Draws the scene graph: a depth-only pass into the sun's shadow map,
/// then a forward pass with the full light rig into the window.
pub struct SceneRenderer {
    /// Exposure applied when tonemapping.
    pub exposure: f32,
    pipelines: ScenePipelines,
    shadow_pipeline: wgpu::RenderPipeline,

    frame_unif_buf: wgpu::Buffer,
    light_unif_buf: wgpu::Buffer,
    shadow_unif_buf: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,

    // layout for per-mesh uniforms, actual bind groups are made
    // lazily when a mesh is first drawn
    mesh_bind_group_layout: wgpu::BindGroupLayout,

    // joint storage which grows if needed,
    // requiring the bind group to be remade
    joints_bind_group_layout: wgpu::BindGroupLayout,
    joints_bind_group: wgpu::BindGroup,
    joint_storage: wgpu::Buffer,
    joint_capacity: usize,
}

impl SceneRenderer {
    pub fn new(renderer: &Renderer) -> Self {
        let device = Renderer::device();

        // shaders

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/scene.wgsl"))),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/shadow.wgsl"))),
        });

        //
        // bind groups & buffers
        //

        // per-frame uniforms, light rig and the sun's shadow map

        let frame_unif_buf = device.create_buffer(&wgpu::BufferDescriptor {
            size: size_of::<FrameUniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label: Some("frame uniforms"),
            mapped_at_creation: false,
        });
        let light_unif_buf = device.create_buffer(&wgpu::BufferDescriptor {
            size: size_of::<LightUniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label: Some("lights"),
            mapped_at_creation: false,
        });

        let shadow_config = ShadowConfig::default();
        let shadow_map = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow map"),
            size: wgpu::Extent3d {
                width: shadow_config.map_size,
                height: shadow_config.map_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_map.create_view(&wgpu::TextureViewDescriptor::default());
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow map"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    // frame uniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                size_of::<FrameUniforms>() as _
                            ),
                        },
                        count: None,
                    },
                    // light rig
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                size_of::<LightUniforms>() as _
                            ),
                        },
                        count: None,
                    },
                    // shadow map
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
                label: Some("frame"),
            });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_unif_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_unif_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
            label: Some("frame"),
        });

        // the shadow pass only needs the light's matrix

        let shadow_unif_buf = device.create_buffer(&wgpu::BufferDescriptor {
            size: size_of::<ShadowUniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label: Some("shadow uniforms"),
            mapped_at_creation: false,
        });
        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<ShadowUniforms>() as _),
                    },
                    count: None,
                }],
                label: Some("shadow"),
            });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_unif_buf.as_entire_binding(),
            }],
            label: Some("shadow"),
        });

        // per-mesh uniforms

        let mesh_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<MeshUniforms>() as _),
                    },
                    count: None,
                }],
                label: Some("mesh uniforms"),
            });

        // joints

        let joint_storage = device.create_buffer(&wgpu::BufferDescriptor {
            size: size_of::<GpuMat4>() as _,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            label: Some("joints"),
            mapped_at_creation: false,
        });
        let joints_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<GpuMat4>() as _),
                    },
                    count: None,
                }],
                label: Some("joints"),
            });
        let joints_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &joints_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: joint_storage.as_entire_binding(),
            }],
            label: Some("joints"),
        });

        // vertices

        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // normal
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: size_of::<GpuVec3>() as wgpu::BufferAddress,
                    shader_location: 1,
                },
                // joints
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint16x4,
                    offset: size_of::<[GpuVec3; 2]>() as wgpu::BufferAddress,
                    shader_location: 2,
                },
                // weights
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: (size_of::<[GpuVec3; 2]>() + size_of::<[u16; 4]>())
                        as wgpu::BufferAddress,
                    shader_location: 3,
                },
            ],
        }];

        //
        // pipelines
        //

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &mesh_bind_group_layout,
                &joints_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str,
                             cull_mode: Option<wgpu::Face>,
                             blend: Option<wgpu::BlendState>,
                             depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &scene_shader,
                    entry_point: "vs_main",
                    buffers: &vertex_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &scene_shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: SWAPCHAIN_FORMAT,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: renderer.multisample_state(),
                multiview: None,
            })
        };

        let alpha = Some(wgpu::BlendState::ALPHA_BLENDING);
        let pipelines = ScenePipelines {
            opaque: make_pipeline("scene opaque", Some(wgpu::Face::Back), None, true),
            opaque_double_sided: make_pipeline("scene opaque double-sided", None, None, true),
            transparent: make_pipeline("scene transparent", None, alpha, true),
            transparent_no_depth: make_pipeline("scene transparent no-depth", None, alpha, false),
        };

        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow"),
                bind_group_layouts: &[
                    &shadow_bind_group_layout,
                    &mesh_bind_group_layout,
                    &joints_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: "vs_main",
                buffers: &vertex_buffers,
            },
            // depth-only pass
            fragment: None,
            primitive: Self::shadow_primitive_state(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                // slope-scaled bias against shadow acne
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            exposure: 1.0,
            pipelines,
            shadow_pipeline,
            frame_unif_buf,
            light_unif_buf,
            shadow_unif_buf,
            frame_bind_group,
            shadow_bind_group,
            shadow_view,
            mesh_bind_group_layout,
            joints_bind_group_layout,
            joints_bind_group,
            joint_storage,
            joint_capacity: 0,
        }
    }

    /// Primitive state for the shadow pass.
    /// Casters are forced double-sided on load,
    /// so the depth-only pass must draw both faces too
    /// or thin geometry would cast nothing.
    fn shadow_primitive_state() -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        }
    }

    /// Draw the scene for this frame: shadow pass, then the main forward pass.
    ///
    /// Uploads mesh buffers and creates uniform bindings for meshes
    /// drawn for the first time.
    pub fn draw(
        &mut self,
        renderer: &Renderer,
        frame: &Frame,
        camera: &PerspectiveCamera,
        look_target: uv::Vec3,
        scene: &mut Scene,
    ) {
        let device = Renderer::device();
        let queue = Renderer::queue();

        //
        // gather frame-wide state
        //

        let frame_uniforms = FrameUniforms {
            view_proj: camera.view_proj_matrix(look_target).into(),
            camera_position: camera.position.into(),
            exposure: self.exposure,
        };
        queue.write_buffer(&self.frame_unif_buf, 0, frame_uniforms.as_bytes());

        let mut lights = LightUniforms::default();
        scene.root.walk(&mut |node| {
            if let NodeKind::Light(light) = &node.kind {
                if node.visible {
                    lights.add(light);
                }
            }
        });
        queue.write_buffer(&self.light_unif_buf, 0, lights.as_bytes());

        let shadow_uniforms = ShadowUniforms {
            light_matrix: lights.light_matrix,
        };
        queue.write_buffer(&self.shadow_unif_buf, 0, shadow_uniforms.as_bytes());

        // collect all joint matrices in the scene,
        // we'll shove them all in the storage buffer in one go
        let mut joint_matrices: Vec<GpuMat4> = Vec::new();
        let mut skin_offsets: Vec<u32> = Vec::with_capacity(scene.skins.len());
        for skin in &scene.skins {
            skin_offsets.push(joint_matrices.len() as u32);
            joint_matrices.extend(skin.joints.iter().map(|joint| GpuMat4::from(joint.joint_matrix)));
        }
        // empty bindings not allowed by vulkan,
        // put in one dummy matrix to pass validation
        if joint_matrices.is_empty() {
            joint_matrices.push(uv::Mat4::identity().into());
        }

        // resize joint buffer if needed
        if joint_matrices.len() > self.joint_capacity {
            self.joint_storage = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("joints"),
                size: (size_of::<GpuMat4>() * joint_matrices.len()) as _,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.joints_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.joints_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.joint_storage.as_entire_binding(),
                }],
                label: Some("joints"),
            });
            self.joint_capacity = joint_matrices.len();
        }
        queue.write_buffer(&self.joint_storage, 0, joint_matrices.as_bytes());

        //
        // upload meshes and write their uniforms
        //

        Self::prep_node(
            &mut scene.root,
            uv::Mat4::identity(),
            &skin_offsets,
            &self.mesh_bind_group_layout,
        );

        //
        // render passes
        //

        let scene: &Scene = scene;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            pass.set_bind_group(2, &self.joints_bind_group, &[]);
            Self::draw_node(&scene.root, &mut pass, DrawPhase::Shadow, &self.pipelines);
        }

        {
            let [r, g, b, a] = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: renderer.msaa_view(),
                    resolve_target: Some(&frame.view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: renderer.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_bind_group(2, &self.joints_bind_group, &[]);
            Self::draw_node(&scene.root, &mut pass, DrawPhase::Opaque, &self.pipelines);
            Self::draw_node(
                &scene.root,
                &mut pass,
                DrawPhase::Transparent,
                &self.pipelines,
            );
        }

        queue.submit(Some(encoder.finish()));
    }

    /// Upload GPU buffers and uniform values for every visible mesh
    /// in the subtree, creating bindings on first encounter.
    fn prep_node(
        node: &mut Node,
        parent_matrix: uv::Mat4,
        skin_offsets: &[u32],
        mesh_bind_group_layout: &wgpu::BindGroupLayout,
    ) {
        if !node.visible {
            return;
        }
        let world = parent_matrix * node.transform.as_matrix();

        if let NodeKind::Mesh(mesh) = &mut node.kind {
            let device = Renderer::device();
            let queue = Renderer::queue();

            let gpu = mesh
                .gpu
                .get_or_insert_with(|| mesh.data.upload(node.name.as_deref()));

            // initialize the per-mesh uniform bind group on first render
            if gpu.uniforms.is_none() {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    size: size_of::<MeshUniforms>() as _,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    label: Some("mesh uniforms"),
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: mesh_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some("mesh uniforms"),
                });
                gpu.uniforms = Some(MeshUniformBinding { buffer, bind_group });
            }

            let uniforms = MeshUniforms {
                model: world.into(),
                base_color: mesh.material.base_color.into(),
                opacity: mesh.material.opacity,
                receive_shadows: node.receive_shadows as u32,
                joint_offset: mesh.skin.map(|idx| skin_offsets[idx]).unwrap_or(0),
                skinned: mesh.skin.is_some() as u32,
            };
            // uniforms were just created so they can't be None anymore
            let binding = gpu.uniforms.as_ref().unwrap();
            queue.write_buffer(&binding.buffer, 0, uniforms.as_bytes());
        }

        for child in &mut node.children {
            Self::prep_node(child, world, skin_offsets, mesh_bind_group_layout);
        }
    }

    /// Record draws for every mesh in the subtree that belongs to `phase`.
    /// Invisible nodes hide their whole subtree.
    fn draw_node<'s>(
        node: &'s Node,
        pass: &mut wgpu::RenderPass<'s>,
        phase: DrawPhase,
        pipelines: &'s ScenePipelines,
    ) {
        if !node.visible {
            return;
        }
        if let NodeKind::Mesh(mesh) = &node.kind {
            let in_phase = match phase {
                DrawPhase::Shadow => node.cast_shadows,
                DrawPhase::Opaque => !mesh.material.transparent,
                DrawPhase::Transparent => mesh.material.transparent,
            };
            // meshes not yet prepped this frame (e.g. in an invisible subtree
            // last frame) have no gpu resources and are skipped
            if in_phase {
                if let Some(gpu) = &mesh.gpu {
                    if let Some(binding) = &gpu.uniforms {
                        if phase != DrawPhase::Shadow {
                            pass.set_pipeline(pipelines.select(&mesh.material));
                        }
                        pass.set_bind_group(1, &binding.bind_group, &[]);
                        pass.set_vertex_buffer(0, gpu.vert_buf.slice(..));
                        pass.set_index_buffer(gpu.idx_buf.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..gpu.idx_count, 0, 0..1);
                    }
                }
            }
        }
        for child in &node.children {
            Self::draw_node(child, pass, phase, pipelines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_pass_draws_both_faces_of_casters() {
        let prim = SceneRenderer::shadow_primitive_state();
        assert!(prim.cull_mode.is_none());
    }
}
