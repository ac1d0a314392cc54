use bitflags::bitflags;
use smallvec::SmallVec;

use crate::component::ComponentSet;
use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, ObserverKey, SceneKey};

/// Persistent identifier of a node.
///
/// Unlike a [`NodeHandle`], which only lives as long as the arena slot, the
/// identifier is written to saved data and survives a save/load round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Per-node state bits. Persisted verbatim as a `u32`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Node is not expected to move; consumers may bake it.
        const STATIC                 = 1 << 0;
        /// Node is hidden. Stored inverted so the zero value means visible.
        const INVISIBLE              = 1 << 1;
        /// World position ignores the parent.
        const NO_POSITION_INHERIT    = 1 << 2;
        /// World orientation ignores the parent.
        const NO_ROTATION_INHERIT    = 1 << 3;
        /// World scale ignores the parent.
        const NO_SCALE_INHERIT       = 1 << 4;
        /// Node and its subtree are skipped by subtree saves.
        const NO_SERIALIZATION       = 1 << 5;
        /// Node is excluded from editor undo/redo staging.
        const NO_STATE_STACK_STAGING = 1 << 6;

        /// All three inheritance toggles.
        const NO_INHERIT = Self::NO_POSITION_INHERIT.bits()
            | Self::NO_ROTATION_INHERIT.bits()
            | Self::NO_SCALE_INHERIT.bits();
    }
}

/// A scene graph node.
///
/// Nodes live in the [`SceneGraph`](crate::scene::SceneGraph) arena and refer
/// to each other by [`NodeHandle`]. The child list is an intrusive doubly
/// linked list threaded through `first_child`/`last_child` and the
/// children's `prev_sibling`/`next_sibling`.
///
/// All mutation goes through the graph so that parent/child links stay
/// consistent and notifications fire; the node itself only exposes reads.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) transform: Transform,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) first_child: Option<NodeHandle>,
    pub(crate) last_child: Option<NodeHandle>,
    pub(crate) prev_sibling: Option<NodeHandle>,
    pub(crate) next_sibling: Option<NodeHandle>,
    pub(crate) child_count: usize,

    // === Membership & state ===
    pub(crate) scene: Option<SceneKey>,
    pub(crate) layer: u32,
    pub(crate) flags: NodeFlags,
    pub(crate) event_lock: u32,

    pub(crate) components: ComponentSet,
    pub(crate) observers: SmallVec<[ObserverKey; 2]>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            transform: Transform::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
            scene: None,
            layer: 0,
            flags: NodeFlags::empty(),
            event_lock: 0,
            components: ComponentSet::new(),
            observers: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local transform.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn first_child(&self) -> Option<NodeHandle> {
        self.first_child
    }

    #[inline]
    #[must_use]
    pub fn last_child(&self) -> Option<NodeHandle> {
        self.last_child
    }

    #[inline]
    #[must_use]
    pub fn prev_sibling(&self) -> Option<NodeHandle> {
        self.prev_sibling
    }

    #[inline]
    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeHandle> {
        self.next_sibling
    }

    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// Scene this node currently belongs to.
    #[inline]
    #[must_use]
    pub fn scene(&self) -> Option<SceneKey> {
        self.scene
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.layer
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(NodeFlags::STATIC)
    }

    /// Own visibility flag. See
    /// [`SceneGraph::is_visible_in_hierarchy`](crate::scene::SceneGraph::is_visible_in_hierarchy)
    /// for the effective value.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.flags.contains(NodeFlags::INVISIBLE)
    }

    #[inline]
    #[must_use]
    pub fn inherits_position(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_POSITION_INHERIT)
    }

    #[inline]
    #[must_use]
    pub fn inherits_rotation(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_ROTATION_INHERIT)
    }

    #[inline]
    #[must_use]
    pub fn inherits_scale(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_SCALE_INHERIT)
    }

    #[inline]
    #[must_use]
    pub fn is_serializable(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_SERIALIZATION)
    }

    #[inline]
    #[must_use]
    pub fn is_event_locked(&self) -> bool {
        self.event_lock > 0
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Observers attached to this node, in notification order.
    #[inline]
    #[must_use]
    pub fn observers(&self) -> &[ObserverKey] {
        &self.observers
    }
}
