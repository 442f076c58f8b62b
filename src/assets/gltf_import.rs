//! Conversion of glTF documents into scene-graph fragments,
//! skins and animation clips.

use itertools::izip;

use super::LoadedModel;
use crate::{
    animation::{clip, AnimationClip},
    graphics::mesh::{skin, MeshData, Skin, Vertex},
    math::{uv, Transform},
    scene::{Material, MeshNode, Node, NodeKind},
};

/// Convert an entire parsed document into a scene fragment.
///
/// Mesh nodes that are deformed by the document's skin get a placeholder
/// skin index of 0; the caller re-points it at wherever the skin actually
/// lands in the scene's skin list.
pub(super) fn load_model(doc: &gltf::Document, buffers: &[&[u8]]) -> LoadedModel {
    let mut root = Node::group();
    for scene in doc.scenes() {
        for gltf_node in scene.nodes() {
            root.children.push(load_node(gltf_node, buffers));
        }
    }

    LoadedModel {
        root,
        skin: load_skin(doc, buffers),
        clips: load_clips(doc, buffers),
    }
}

fn load_node(gltf_node: gltf::Node<'_>, buffers: &[&[u8]]) -> Node {
    let mut node = Node::group();
    node.name = gltf_node.name().map(String::from);
    node.transform = Transform::from_parts(gltf_node.transform().decomposed());

    // a glTF mesh is a list of primitives; each becomes its own mesh node
    // so that every drawable carries exactly one material
    if let Some(gltf_mesh) = gltf_node.mesh() {
        let skinned = gltf_node.skin().is_some();
        for gltf_prim in gltf_mesh.primitives() {
            let mut mesh = MeshNode::new(
                load_primitive(&gltf_prim, buffers),
                load_material(&gltf_prim.material()),
            );
            if skinned {
                mesh.skin = Some(0);
            }
            let mut mesh_node = Node::new(NodeKind::Mesh(mesh));
            mesh_node.name = gltf_mesh.name().map(String::from);
            node.children.push(mesh_node);
        }
    }

    for child in gltf_node.children() {
        node.children.push(load_node(child, buffers));
    }
    node
}

fn load_primitive(gltf_prim: &gltf::Primitive<'_>, buffers: &[&[u8]]) -> MeshData {
    // helper for constructing gltf readers
    let read_buf = |b: gltf::Buffer| Some(&buffers[b.index()][..b.length()]);
    let reader = gltf_prim.reader(read_buf);

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .expect("glTF mesh must have vertices")
        .collect();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vec![[0.0, 1.0, 0.0]; positions.len()],
    };
    let joints = reader.read_joints(0);
    let weights = reader.read_weights(0);

    let vertices: Vec<Vertex> = match (joints, weights) {
        (Some(joints), Some(weights)) => {
            izip!(positions, normals, joints.into_u16(), weights.into_f32())
                .map(|(position, normal, joints, weights)| Vertex {
                    position: position.into(),
                    normal: normal.into(),
                    joints,
                    weights: weights.into(),
                })
                .collect()
        }
        _ => izip!(positions, normals)
            .map(|(position, normal)| Vertex {
                position: position.into(),
                normal: normal.into(),
                joints: [0; 4],
                weights: [0.0; 4].into(),
            })
            .collect(),
    };

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    MeshData { vertices, indices }
}

fn load_material(gltf_mat: &gltf::Material<'_>) -> Material {
    let base_color = gltf_mat.pbr_metallic_roughness().base_color_factor();
    Material {
        base_color,
        double_sided: gltf_mat.double_sided(),
        transparent: matches!(gltf_mat.alpha_mode(), gltf::material::AlphaMode::Blend),
        opacity: base_color[3],
        depth_write: true,
    }
}

/// Load a skin from a glTF document.
///
/// Returns None if there are no skins in the document.
/// Otherwise, returns the first one;
/// neither model here has more than one.
fn load_skin(doc: &gltf::Document, buffers: &[&[u8]]) -> Option<Skin> {
    let read_buf = |b: gltf::Buffer| Some(&buffers[b.index()][..b.length()]);

    let gltf_skin = doc.skins().next()?;
    let mut skin = Skin {
        root_transform: uv::Mat4::identity(),
        joints: Vec::new(),
    };

    // inverse bind matrices; if they're not provided
    // they are premultiplied into vertices and identity is correct
    let reader = gltf_skin.reader(read_buf);
    let mut inv_binds = reader.read_inverse_bind_matrices();
    skin.joints = gltf_skin
        .joints()
        .map(|joint| skin::Joint {
            name: joint.name().map(String::from),
            // parents will be computed once we have all joints
            parent_idx: None,
            inv_bind_matrix: inv_binds
                .as_mut()
                .and_then(|invs| invs.next())
                .map(uv::Mat4::from)
                .unwrap_or_else(uv::Mat4::identity),
            local_pose: Transform::from_parts(joint.transform().decomposed()),
            joint_matrix: uv::Mat4::identity(),
        })
        .collect();

    // joint parents
    for (parent_idx, joint) in gltf_skin.joints().enumerate() {
        for child in joint.children() {
            let child_gltf_id = child.index();
            if let Some((child_joint_idx, _)) = gltf_skin
                .joints()
                .enumerate()
                .find(|(_, joint)| joint.index() == child_gltf_id)
            {
                skin.joints[child_joint_idx].parent_idx = Some(parent_idx);
            }
        }
    }

    // root transform of the skin:
    // traverse the node hierarchy for nodes above the root joint,
    // because the inverse bind matrices in glTF are relative to the scene root
    // and we want them relative to the skin root
    if let Some(mut curr_search_node) = gltf_skin.joints().next() {
        loop {
            let parent = doc.nodes().find(|node| {
                node.children()
                    .any(|child| child.index() == curr_search_node.index())
            });
            if let Some(parent) = parent {
                skin.root_transform =
                    skin.root_transform * uv::Mat4::from(parent.transform().matrix());
                curr_search_node = parent;
            } else {
                break;
            }
        }
    }

    // evaluate the initial joint matrices
    // in case the skin is used without any animation playing
    skin.update_joint_matrices();

    Some(skin)
}

/// Load every animation in the document as a clip
/// targeting joints of the document's (first) skin.
/// Channels that don't target a joint of that skin are skipped.
fn load_clips(doc: &gltf::Document, buffers: &[&[u8]]) -> Vec<AnimationClip> {
    let read_buf = |b: gltf::Buffer| Some(&buffers[b.index()][..b.length()]);

    let Some(gltf_skin) = doc.skins().next() else {
        return Vec::new();
    };

    let mut clips = Vec::new();
    for gltf_anim in doc.animations() {
        let channels = gltf_anim
            .channels()
            .filter_map(|gltf_chan| {
                use gltf::animation::util::ReadOutputs as Out;
                use gltf::animation::Interpolation as Interp;
                use gltf::animation::Property as Prop;

                let target = gltf_chan.target();
                let (target_joint, _) = gltf_skin
                    .joints()
                    .enumerate()
                    .find(|(_, joint)| joint.index() == target.node().index())?;

                let property = match target.property() {
                    Prop::Translation => clip::AnimatedProperty::Translation,
                    Prop::Rotation => clip::AnimatedProperty::Rotation,
                    Prop::Scale => clip::AnimatedProperty::Scale,
                    // neither model animates morph target weights
                    Prop::MorphTargetWeights => return None,
                };

                let chan_reader = gltf_chan.reader(read_buf);
                let inputs = chan_reader
                    .read_inputs()
                    .expect("Channel with no inputs")
                    .collect();
                let mut outputs: Vec<f32> = Vec::new();
                match chan_reader.read_outputs().expect("Channel with no outputs") {
                    Out::Translations(t) => outputs.extend(t.flatten()),
                    Out::Rotations(r) => outputs.extend(r.into_f32().flatten()),
                    Out::Scales(s) => outputs.extend(s.flatten()),
                    Out::MorphTargetWeights(_) => return None,
                }

                Some(clip::Channel {
                    target: clip::Target::Joint {
                        id: target_joint,
                        property,
                    },
                    ty: match target.property() {
                        Prop::Rotation => clip::ChannelType::Rotor3,
                        _ => clip::ChannelType::Vector3,
                    },
                    interpolation: match gltf_chan.sampler().interpolation() {
                        Interp::Linear => clip::InterpolationMode::Linear,
                        Interp::Step => clip::InterpolationMode::Step,
                        Interp::CubicSpline => clip::InterpolationMode::CubicSpline,
                    },
                    keyframe_ts: inputs,
                    data: outputs,
                })
            })
            .collect();

        clips.push(AnimationClip::new(
            gltf_anim.name().map(String::from),
            channels,
        ));
    }
    clips
}
