pub mod node;
pub use node::{MeshNode, Node, NodeKind};

mod material;
pub use material::Material;

use crate::graphics::{mesh::Skin, Color};

/// The renderable world: one root node owning the whole graph,
/// plus the skins its skinned meshes and animations refer to.
///
/// Exactly one scene exists for the lifetime of the process.
/// It is mutated only at initialization and from completed asset loads,
/// and read when rendering, all on the main thread.
pub struct Scene {
    pub background: Color,
    pub root: Node,
    pub skins: Vec<Skin>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            root: Node::group(),
            skins: Vec::new(),
        }
    }

    /// Attach a node (typically a loaded model fragment) to the scene root.
    pub fn add(&mut self, node: Node) {
        self.root.children.push(node);
    }

    /// Store a skin, returning the index mesh nodes and mixers refer to it by.
    pub fn add_skin(&mut self, skin: Skin) -> usize {
        self.skins.push(skin);
        self.skins.len() - 1
    }
}
