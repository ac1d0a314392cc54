//! Owning-scene contract
//!
//! A node may belong to one scene. The graph reports membership, structure,
//! naming, component and transform changes to that scene through
//! [`SceneHooks`]; the scene decides what to forward to rendering, culling
//! or physics. [`Scene`] is a ready-made implementation that keeps an
//! identifier index and queues transform changes for downstream consumers.

use std::any::Any;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::scene::{Node, NodeHandle, NodeId, NodeIndex, SceneGraph};

/// Callbacks the graph invokes on a node's owning scene. All default to no-ops.
pub trait SceneHooks: Any {
    fn node_added(&mut self, _handle: NodeHandle, _node: &Node) {}
    fn node_removed(&mut self, _handle: NodeHandle, _node: &Node) {}
    fn name_changed(&mut self, _handle: NodeHandle, _node: &Node) {}
    fn parent_changed(&mut self, _handle: NodeHandle, _node: &Node) {}
    fn component_added(&mut self, _handle: NodeHandle, _name: &str) {}
    fn component_removed(&mut self, _handle: NodeHandle, _name: &str) {}
    fn transform_changed(&mut self, _handle: NodeHandle) {}
    fn scale_changed(&mut self, _handle: NodeHandle) {}
    fn static_changed(&mut self, _handle: NodeHandle, _is_static: bool) {}
    fn visibility_changed(&mut self, _handle: NodeHandle, _visible: bool) {}
}

/// Default scene: member index, static/hidden sets and a change queue.
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    index: NodeIndex,
    static_nodes: FxHashSet<NodeHandle>,
    hidden_nodes: FxHashSet<NodeHandle>,
    component_counts: FxHashMap<String, usize>,
    // Ordered queue + membership set, so each node is queued once per drain.
    pending: Vec<NodeHandle>,
    pending_set: FxHashSet<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier index of every member node.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn find_by_id(&self, id: NodeId) -> Option<NodeHandle> {
        self.index.get(id)
    }

    #[must_use]
    pub fn find_by_name(&self, graph: &SceneGraph, name: &str) -> Option<NodeHandle> {
        self.index.find_by_name(graph, name)
    }

    #[must_use]
    pub fn is_static(&self, handle: NodeHandle) -> bool {
        self.static_nodes.contains(&handle)
    }

    pub fn static_nodes(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.static_nodes.iter().copied()
    }

    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.hidden_nodes.len()
    }

    /// Number of member nodes carrying a module called `name`.
    #[must_use]
    pub fn component_count(&self, name: &str) -> usize {
        self.component_counts.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Takes the nodes whose transform or scale changed since the last drain,
    /// in order of first change.
    pub fn drain_transform_changes(&mut self) -> Vec<NodeHandle> {
        self.pending_set.clear();
        std::mem::take(&mut self.pending)
    }

    fn queue(&mut self, handle: NodeHandle) {
        if self.pending_set.insert(handle) {
            self.pending.push(handle);
        }
    }

    fn adjust_count(&mut self, name: &str, added: bool) {
        if added {
            *self.component_counts.entry(name.to_owned()).or_insert(0) += 1;
        } else if let Some(count) = self.component_counts.get_mut(name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.component_counts.remove(name);
            }
        }
    }
}

impl SceneHooks for Scene {
    fn node_added(&mut self, handle: NodeHandle, node: &Node) {
        self.index.insert(node.id(), handle);
        if node.is_static() {
            self.static_nodes.insert(handle);
        }
        if !node.is_visible() {
            self.hidden_nodes.insert(handle);
        }
        for component in node.components().iter() {
            self.adjust_count(component.name(), true);
        }
        self.queue(handle);
    }

    fn node_removed(&mut self, handle: NodeHandle, node: &Node) {
        if self.index.get(node.id()) == Some(handle) {
            self.index.remove(node.id());
        }
        self.static_nodes.remove(&handle);
        self.hidden_nodes.remove(&handle);
        for component in node.components().iter() {
            self.adjust_count(component.name(), false);
        }
        if self.pending_set.remove(&handle) {
            self.pending.retain(|&h| h != handle);
        }
    }

    fn component_added(&mut self, _handle: NodeHandle, name: &str) {
        self.adjust_count(name, true);
    }

    fn component_removed(&mut self, _handle: NodeHandle, name: &str) {
        self.adjust_count(name, false);
    }

    fn transform_changed(&mut self, handle: NodeHandle) {
        self.queue(handle);
    }

    fn scale_changed(&mut self, handle: NodeHandle) {
        self.queue(handle);
    }

    fn static_changed(&mut self, handle: NodeHandle, is_static: bool) {
        if is_static {
            self.static_nodes.insert(handle);
        } else {
            self.static_nodes.remove(&handle);
        }
    }

    fn visibility_changed(&mut self, handle: NodeHandle, visible: bool) {
        if visible {
            self.hidden_nodes.remove(&handle);
        } else {
            self.hidden_nodes.insert(handle);
        }
    }
}
