//! Chainable node operation wrapper.
//!
//! [`SceneNode`] borrows a [`SceneGraph`] mutably and provides a fluent API
//! over one node, routing every edit through the graph so notifications and
//! cascades fire as usual.
//!
//! All methods silently no-op when the handle is stale.
//!
//! # Example
//!
//! ```rust,ignore
//! graph.scene_node(handle)
//!     .set_position(0.0, 3.0, 0.0)
//!     .set_scale(2.0)
//!     .look_at(Vec3::ZERO)
//!     .set_visible(false);
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::{Quat, Vec3};

use crate::scene::transform_system::TransformSpace;
use crate::scene::{NodeHandle, SceneGraph};

/// Temporary mutable borrow of a graph node for chainable operations.
pub struct SceneNode<'a> {
    graph: &'a mut SceneGraph,
    handle: NodeHandle,
}

impl SceneGraph {
    pub fn scene_node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(graph: &'a mut SceneGraph, handle: NodeHandle) -> Self {
        Self { graph, handle }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Whether the handle still refers to a live node.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.graph.contains(self.handle)
    }

    // -- Transform --

    #[inline]
    pub fn set_position(self, x: f32, y: f32, z: f32) -> Self {
        self.set_position_vec(Vec3::new(x, y, z))
    }

    #[inline]
    pub fn set_position_vec(self, position: Vec3) -> Self {
        self.graph.set_position(self.handle, position);
        self
    }

    #[inline]
    pub fn set_world_position(self, position: Vec3) -> Self {
        self.graph.set_world_position(self.handle, position);
        self
    }

    /// Sets uniform scale.
    #[inline]
    pub fn set_scale(self, s: f32) -> Self {
        self.graph.set_scale(self.handle, Vec3::splat(s));
        self
    }

    #[inline]
    pub fn set_scale_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.graph.set_scale(self.handle, Vec3::new(x, y, z));
        self
    }

    #[inline]
    pub fn set_rotation(self, rotation: Quat) -> Self {
        self.graph.set_rotation(self.handle, rotation);
        self
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    #[inline]
    pub fn set_rotation_euler(self, x: f32, y: f32, z: f32) -> Self {
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, x, y, z);
        self.graph.set_rotation(self.handle, rotation);
        self
    }

    /// Rotates around the local X axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_x(self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_x(angle), TransformSpace::Local)
    }

    /// Rotates around the local Y axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_y(self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_y(angle), TransformSpace::Local)
    }

    #[inline]
    pub fn rotate_z(self, angle: f32) -> Self {
        self.rotate(Quat::from_rotation_z(angle), TransformSpace::Local)
    }

    #[inline]
    pub fn rotate(self, delta: Quat, space: TransformSpace) -> Self {
        self.graph.rotate(self.handle, delta, space);
        self
    }

    #[inline]
    pub fn translate(self, delta: Vec3, space: TransformSpace) -> Self {
        self.graph.translate(self.handle, delta, space);
        self
    }

    /// Orients the node to face a world-space `target`, Y up.
    #[inline]
    pub fn look_at(self, target: Vec3) -> Self {
        self.graph.look_at(self.handle, target, Vec3::Y);
        self
    }

    // -- State --

    #[inline]
    pub fn set_name(self, name: &str) -> Self {
        self.graph.set_name(self.handle, name);
        self
    }

    #[inline]
    pub fn set_visible(self, visible: bool) -> Self {
        self.graph.set_visible(self.handle, visible);
        self
    }

    #[inline]
    pub fn set_static(self, is_static: bool) -> Self {
        self.graph.set_static(self.handle, is_static);
        self
    }

    #[inline]
    pub fn set_layer(self, layer: u32) -> Self {
        self.graph.set_layer(self.handle, layer);
        self
    }

    // -- Hierarchy & modules --

    /// Attaches this node under `parent`, keeping its world transform.
    #[inline]
    pub fn attach_to(self, parent: NodeHandle) -> Self {
        self.graph.attach_child(parent, self.handle, true);
        self
    }

    #[inline]
    pub fn detach(self) -> Self {
        self.graph.detach(self.handle, true);
        self
    }

    #[inline]
    pub fn with_component(self, name: &str) -> Self {
        self.graph.add_component(self.handle, name);
        self
    }

    #[inline]
    pub fn without_component(self, name: &str) -> Self {
        self.graph.remove_component(self.handle, name);
        self
    }

    /// Sets the shadow flags of the node's `Visual` (no-op without one).
    ///
    /// Edits the module in place: no observer event or scene hook is posted.
    #[inline]
    pub fn set_shadows(self, cast: bool, receive: bool) -> Self {
        if let Some(node) = self.graph.nodes.get_mut(self.handle)
            && let Some(visual) = node.components.visual_mut()
        {
            visual.cast_shadows = cast;
            visual.receive_shadows = receive;
        }
        self
    }
}
