//! Lifecycle observer chain
//!
//! A node keeps an ordered list of [`ObserverKey`]s. Posting an event calls
//! the matching handler on each referenced observer in list order. Observers
//! are stored once in the graph and referenced by key, so one instance can
//! listen to any number of nodes; removing an observer from the graph makes
//! every key to it resolve to nothing.

use std::any::Any;

use glam::Vec3;

use crate::scene::{NodeHandle, SceneKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    Stay,
    End,
}

/// Physics contact reported by the host's simulation for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Node on the other side of the contact, if it is part of the graph.
    pub other: Option<NodeHandle>,
    pub point: Vec3,
    pub normal: Vec3,
    pub impulse: f32,
    pub phase: ContactPhase,
}

/// Event delivered through the observer chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    Attached { parent: NodeHandle },
    Detached { parent: NodeHandle },
    Destroyed,
    TransformChanged,
    ScaleChanged,
    LayerChanged { old: u32, new: u32 },
    SceneChanged { old: Option<SceneKey>, new: Option<SceneKey> },
    StaticChanged(bool),
    VisibilityChanged(bool),
    Update(f32),
    Contact(Contact),
}

/// Listener for node lifecycle events. Every handler defaults to a no-op.
pub trait NodeObserver: Any {
    fn on_attached(&mut self, _node: NodeHandle, _parent: NodeHandle) {}
    fn on_detached(&mut self, _node: NodeHandle, _parent: NodeHandle) {}
    fn on_destroyed(&mut self, _node: NodeHandle) {}
    fn on_transform_changed(&mut self, _node: NodeHandle) {}
    fn on_scale_changed(&mut self, _node: NodeHandle) {}
    fn on_layer_changed(&mut self, _node: NodeHandle, _old: u32, _new: u32) {}
    fn on_scene_changed(&mut self, _node: NodeHandle, _old: Option<SceneKey>, _new: Option<SceneKey>) {}
    fn on_static_changed(&mut self, _node: NodeHandle, _is_static: bool) {}
    fn on_visibility_changed(&mut self, _node: NodeHandle, _visible: bool) {}
    fn on_update(&mut self, _node: NodeHandle, _dt: f32) {}
    fn on_contact(&mut self, _node: NodeHandle, _contact: &Contact) {}
}

/// Routes `event` to the matching handler of `observer`.
pub(crate) fn deliver(observer: &mut dyn NodeObserver, node: NodeHandle, event: &NodeEvent) {
    match *event {
        NodeEvent::Attached { parent } => observer.on_attached(node, parent),
        NodeEvent::Detached { parent } => observer.on_detached(node, parent),
        NodeEvent::Destroyed => observer.on_destroyed(node),
        NodeEvent::TransformChanged => observer.on_transform_changed(node),
        NodeEvent::ScaleChanged => observer.on_scale_changed(node),
        NodeEvent::LayerChanged { old, new } => observer.on_layer_changed(node, old, new),
        NodeEvent::SceneChanged { old, new } => observer.on_scene_changed(node, old, new),
        NodeEvent::StaticChanged(is_static) => observer.on_static_changed(node, is_static),
        NodeEvent::VisibilityChanged(visible) => observer.on_visibility_changed(node, visible),
        NodeEvent::Update(dt) => observer.on_update(node, dt),
        NodeEvent::Contact(ref contact) => observer.on_contact(node, contact),
    }
}
