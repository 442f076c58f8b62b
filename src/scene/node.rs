use crate::{
    graphics::{light::Light, mesh::GpuMesh, mesh::MeshData},
    math::{uv, Aabb, Transform},
    scene::Material,
};

/// A drawable or organizational unit in the scene graph.
///
/// Nodes exclusively own their children;
/// the root node is owned by the [`Scene`][crate::Scene].
#[derive(Debug)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub visible: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

/// What a node contributes to the rendered scene,
/// discriminated explicitly so traversals can match on it.
#[derive(Debug)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
    Light(Light),
}

/// Payload of a mesh node.
#[derive(Debug)]
pub struct MeshNode {
    pub data: MeshData,
    pub material: Material,
    /// Index of the skin deforming this mesh in [`Scene::skins`][crate::Scene],
    /// if it has one.
    pub skin: Option<usize>,
    /// GPU buffers, uploaded by the renderer on first draw.
    pub(crate) gpu: Option<GpuMesh>,
}

impl MeshNode {
    pub fn new(data: MeshData, material: Material) -> Self {
        Self {
            data,
            material,
            skin: None,
            gpu: None,
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::identity(),
            visible: true,
            cast_shadows: false,
            receive_shadows: false,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    /// Visit this node and every descendant, depth-first.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Visit this node and every descendant, depth-first, with mutable access.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Compute the bounds of all mesh vertices in this subtree,
    /// in the space this node's transform maps into (its parent's space).
    pub fn compute_aabb(&self) -> Aabb {
        fn visit(node: &Node, parent_matrix: uv::Mat4, out: &mut Aabb) {
            let world = parent_matrix * node.transform.as_matrix();
            if let NodeKind::Mesh(mesh) = &node.kind {
                for vert in &mesh.data.vertices {
                    let pos: uv::Vec3 = vert.position.into();
                    out.insert((world * pos.into_homogeneous_point()).xyz());
                }
            }
            for child in &node.children {
                visit(child, world, out);
            }
        }
        let mut aabb = Aabb::empty();
        visit(self, uv::Mat4::identity(), &mut aabb);
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mesh::Vertex;

    fn unit_quad_mesh() -> MeshNode {
        let data = MeshData {
            vertices: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
                .into_iter()
                .map(|position| Vertex {
                    position: position.into(),
                    ..Vertex::default()
                })
                .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        MeshNode::new(data, Material::default())
    }

    #[test]
    fn visitor_reaches_every_node() {
        let mut root = Node::group();
        let mut mid = Node::group();
        mid.children.push(Node::new(NodeKind::Mesh(unit_quad_mesh())));
        root.children.push(mid);
        root.children.push(Node::new(NodeKind::Mesh(unit_quad_mesh())));

        let mut total = 0;
        let mut meshes = 0;
        root.walk(&mut |node| {
            total += 1;
            if matches!(node.kind, NodeKind::Mesh(_)) {
                meshes += 1;
            }
        });
        assert_eq!(total, 4);
        assert_eq!(meshes, 2);
    }

    #[test]
    fn aabb_respects_nested_transforms() {
        let mut mesh = Node::new(NodeKind::Mesh(unit_quad_mesh()));
        mesh.transform.position = uv::Vec3::new(1.0, 0.0, 0.0);
        let mut root = Node::group();
        root.transform.scale = uv::Vec3::broadcast(2.0);
        root.transform.position.y = -1.0;
        root.children.push(mesh);

        let aabb = root.compute_aabb();
        assert_eq!(aabb.min.x, 2.0);
        assert_eq!(aabb.max.x, 4.0);
        assert_eq!(aabb.min.y, -1.0);
        assert_eq!(aabb.max.y, 1.0);
        let center = aabb.center();
        assert_eq!(center.x, 3.0);
        assert_eq!(center.y, 0.0);
    }
}
