use std::ops::{Deref, DerefMut};

use crate::scene::{NodeHandle, SceneGraph};

/// Scoped suppression of a node's notifications.
///
/// While any lock on a node is alive, events posted for that node are
/// dropped, and transform/scale cascades starting at it do not reach its
/// descendants. Locks nest: the node is released when the last guard drops.
///
/// The guard borrows the graph mutably and derefs to it, so edits are made
/// through the guard:
///
/// ```ignore
/// {
///     let mut locked = graph.lock_events(node);
///     locked.set_position(node, Vec3::X);
///     locked.set_rotation(node, Quat::IDENTITY);
/// }
/// // one notification for the combined edit
/// ```
///
/// Dropping the guard after the node was destroyed is harmless.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct EventLock<'a> {
    graph: &'a mut SceneGraph,
    node: NodeHandle,
}

impl SceneGraph {
    pub fn lock_events(&mut self, node: NodeHandle) -> EventLock<'_> {
        if let Some(n) = self.nodes.get_mut(node) {
            n.event_lock += 1;
        }
        EventLock { graph: self, node }
    }

    #[must_use]
    pub fn is_event_locked(&self, node: NodeHandle) -> bool {
        self.nodes.get(node).is_some_and(|n| n.event_lock > 0)
    }
}

impl EventLock<'_> {
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }
}

impl Deref for EventLock<'_> {
    type Target = SceneGraph;

    fn deref(&self) -> &Self::Target {
        self.graph
    }
}

impl DerefMut for EventLock<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.graph
    }
}

impl Drop for EventLock<'_> {
    fn drop(&mut self) {
        if let Some(n) = self.graph.nodes.get_mut(self.node) {
            n.event_lock = n.event_lock.saturating_sub(1);
        }
    }
}
