use glam::{Quat, Vec3};

use crate::scene::node::NodeFlags;
use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, SceneGraph, SceneKey};

/// Fluent node construction.
///
/// Everything staged here is applied to the fresh node before it joins a
/// hierarchy or scene, so the scene's `node_added` already sees the final
/// transform, flags and modules.
///
/// ```ignore
/// let lamp = graph
///     .build_node("Lamp")
///     .with_position(0.0, 3.0, 0.0)
///     .with_component("PointLight")
///     .with_parent(room)
///     .build();
/// ```
pub struct NodeBuilder<'a> {
    graph: &'a mut SceneGraph,
    name: String,
    transform: Transform,
    flags: NodeFlags,
    layer: u32,
    components: Vec<String>,
    parent: Option<NodeHandle>,
    scene: Option<SceneKey>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(graph: &'a mut SceneGraph, name: &str) -> Self {
        Self {
            graph,
            name: name.to_owned(),
            transform: Transform::IDENTITY,
            flags: NodeFlags::empty(),
            layer: 0,
            components: Vec::new(),
            parent: None,
            scene: None,
        }
    }

    // === Chained configuration ===

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }

    /// Stages `rotation`, normalized. A zero-length or non-finite
    /// quaternion is ignored with a warning.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        if !self.transform.set_rotation(rotation) {
            log::warn!("Ignoring degenerate rotation {rotation} for node '{}'", self.name);
        }
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.transform.scale = Vec3::splat(s);
        self
    }

    #[must_use]
    pub fn with_scale_xyz(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.scale = Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Adds a module by name. Unknown names are skipped with a warning at
    /// build time.
    #[must_use]
    pub fn with_component(mut self, name: &str) -> Self {
        self.components.push(name.to_owned());
        self
    }

    /// Parent to attach to. Takes precedence over [`with_scene`](Self::with_scene):
    /// the node joins the parent's scene.
    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_scene(mut self, scene: SceneKey) -> Self {
        self.scene = Some(scene);
        self
    }

    // === Finish ===

    pub fn build(self) -> NodeHandle {
        let graph = self.graph;
        let handle = graph.create_node_with_name(&self.name);

        let node = &mut graph.nodes[handle];
        node.transform = self.transform;
        node.flags = self.flags;
        node.layer = self.layer;

        for name in &self.components {
            graph.add_component(handle, name);
        }

        match (self.parent, self.scene) {
            (Some(parent), _) => {
                if !graph.attach_child(parent, handle, false) {
                    log::warn!("Node '{}' could not be attached to {parent:?}", self.name);
                }
            }
            (None, Some(scene)) => {
                graph.add_to_scene(handle, scene);
            }
            (None, None) => {}
        }

        handle
    }
}
