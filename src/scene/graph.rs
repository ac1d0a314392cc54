use std::any::Any;

use slotmap::SlotMap;

use crate::component::{Component, ComponentFactory, DynComponent};
use crate::scene::hooks::SceneHooks;
use crate::scene::node::{Node, NodeFlags, NodeId};
use crate::scene::observer::{self, Contact, NodeEvent, NodeObserver};
use crate::scene::transform_system::WorldChange;
use crate::scene::{NodeHandle, ObserverKey, SceneKey};
use crate::settings::GraphSettings;

/// Arena-backed scene graph.
///
/// # Ownership
///
/// The graph owns every node, every registered scene and every registered
/// observer. Relations between them (parent, siblings, owning scene,
/// attached observers) are stored as handles, so reparenting or destroying
/// a node can never leave a dangling reference: a handle to something that
/// is gone simply resolves to `None`.
///
/// # Destruction policy
///
/// [`destroy_node`](Self::destroy_node) does **not** destroy the node's
/// children. They are detached and stay alive as roots; the caller owns
/// their lifetime from then on. Use [`destroy_subtree`](Self::destroy_subtree)
/// for a cascading delete.
///
/// # Errors
///
/// Structural operations never fail loudly. Cyclic attaches, stale handles,
/// removing a module that is not there, detaching a root: all are no-ops
/// reported through a `false` / `None` return.
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) scenes: SlotMap<SceneKey, Box<dyn SceneHooks>>,
    pub(crate) observers: SlotMap<ObserverKey, Box<dyn NodeObserver>>,
    factory: ComponentFactory,
    settings: GraphSettings,
    next_id: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(GraphSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: GraphSettings) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(settings.initial_node_capacity),
            scenes: SlotMap::with_key(),
            observers: SlotMap::with_key(),
            factory: ComponentFactory::new(),
            next_id: settings.first_node_id.max(1),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    /// Component factory, for registering host-defined module kinds.
    #[inline]
    pub fn factory_mut(&mut self) -> &mut ComponentFactory {
        &mut self.factory
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Creates an isolated node: no parent, no scene, identity transform,
    /// no modules.
    pub fn create_node(&mut self) -> NodeHandle {
        self.create_node_with_name("")
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let id = self.allocate_id();
        self.nodes.insert(Node::new(id, name))
    }

    /// Begins a fluent node construction.
    pub fn build_node(&mut self, name: &str) -> crate::scene::NodeBuilder<'_> {
        crate::scene::NodeBuilder::new(self, name)
    }

    /// Destroys one node.
    ///
    /// Order: leave the owning scene, detach from the parent, post
    /// `Destroyed`, orphan every child (children stay alive as roots), drop
    /// all modules, free the slot.
    pub fn destroy_node(&mut self, handle: NodeHandle) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }

        if let Some(key) = self.nodes[handle].scene {
            if let Some(scene) = self.scenes.get_mut(key) {
                scene.node_removed(handle, &self.nodes[handle]);
            }
            self.nodes[handle].scene = None;
            self.post_event(
                handle,
                NodeEvent::SceneChanged {
                    old: Some(key),
                    new: None,
                },
            );
        }

        if let Some(parent) = self.nodes[handle].parent {
            self.unlink(handle);
            self.post_event(handle, NodeEvent::Detached { parent });
        }

        self.post_event(handle, NodeEvent::Destroyed);

        while let Some(child) = self.nodes[handle].first_child {
            self.unlink(child);
            self.post_event(child, NodeEvent::Detached { parent: handle });
            self.notify_scene(child, |scene, h, node| scene.parent_changed(h, node));
            self.post_reparented(child);
        }

        self.remove_all_components(handle);
        self.nodes.remove(handle);
        true
    }

    /// Destroys `root` and its whole subtree, leaves first. Returns the
    /// number of nodes destroyed.
    pub fn destroy_subtree(&mut self, root: NodeHandle) -> usize {
        if !self.nodes.contains_key(root) {
            return 0;
        }
        let mut order = self.descendants(root);
        order.reverse();
        order.push(root);

        order
            .into_iter()
            .filter(|&handle| self.destroy_node(handle))
            .count()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Every node without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Linear search by identifier. Prefer a [`NodeIndex`](crate::scene::NodeIndex)
    /// for repeated lookups.
    #[must_use]
    pub fn find_by_id(&self, id: NodeId) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, node)| node.id == id)
            .map(|(handle, _)| handle)
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        NodeId(id)
    }

    /// Changes a node's identifier, keeping the owning scene's view in sync
    /// and moving the allocator past it.
    pub(crate) fn set_node_id(&mut self, handle: NodeHandle, id: NodeId) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        if node.id == id {
            return;
        }
        self.next_id = self.next_id.max(id.0.wrapping_add(1)).max(1);

        let scene = node.scene.and_then(|key| self.scenes.get_mut(key));
        match scene {
            Some(scene) => {
                scene.node_removed(handle, &self.nodes[handle]);
                self.nodes[handle].id = id;
                scene.node_added(handle, &self.nodes[handle]);
            }
            None => self.nodes[handle].id = id,
        }
    }

    /// Assigns a fresh identifier from the allocator.
    pub(crate) fn regenerate_id(&mut self, handle: NodeHandle) {
        if self.nodes.contains_key(handle) {
            let id = self.allocate_id();
            self.set_node_id(handle, id);
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Makes `child` the last child of `parent`.
    ///
    /// Rejected (returns `false`, graph unchanged) when either handle is
    /// stale, `child == parent`, `parent` lies in `child`'s subtree, or
    /// `child` is already a child of `parent`.
    ///
    /// With `keep_world`, the child's world position, rotation and scale are
    /// captured first and re-solved against the new parent, so it does not
    /// move visually even though its local values change.
    ///
    /// If the child's scene differs from the parent's, the child's subtree
    /// moves to the parent's scene; otherwise the scene receives
    /// `parent_changed`.
    pub fn attach_child(&mut self, parent: NodeHandle, child: NodeHandle, keep_world: bool) -> bool {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        if parent == child || self.is_ancestor_of(child, parent) {
            log::debug!("Rejected cyclic attach of {child:?} under {parent:?}");
            return false;
        }
        if self.nodes[child].parent == Some(parent) {
            return false;
        }

        let world = if keep_world {
            self.world_transform(child)
        } else {
            None
        };

        if let Some(old_parent) = self.nodes[child].parent {
            self.unlink(child);
            self.post_event(child, NodeEvent::Detached { parent: old_parent });
        }

        self.link_last(parent, child);
        self.post_event(child, NodeEvent::Attached { parent });

        if let Some(world) = world {
            self.restore_world(child, &world);
        }

        let parent_scene = self.nodes[parent].scene;
        if self.nodes[child].scene == parent_scene {
            self.notify_scene(child, |scene, h, node| scene.parent_changed(h, node));
        } else {
            self.move_subtree_to_scene(child, parent_scene);
        }

        self.post_reparented(child);
        true
    }

    /// Detaches `child` from `parent`. No-op unless `parent` is its parent.
    pub fn detach_child(&mut self, parent: NodeHandle, child: NodeHandle, keep_world: bool) -> bool {
        if self.nodes.get(child).and_then(|n| n.parent) != Some(parent) {
            return false;
        }
        self.detach(child, keep_world)
    }

    /// Detaches `child` from whatever parent it has. No-op for roots.
    ///
    /// The node stays in its scene as a root.
    pub fn detach(&mut self, child: NodeHandle, keep_world: bool) -> bool {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return false;
        };

        let world = if keep_world {
            self.world_transform(child)
        } else {
            None
        };

        self.unlink(child);
        self.post_event(child, NodeEvent::Detached { parent });

        if let Some(world) = world {
            self.restore_world(child, &world);
        }

        self.notify_scene(child, |scene, h, node| scene.parent_changed(h, node));
        self.post_reparented(child);
        true
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle)?.parent
    }

    /// Iterates the children of `handle` in order.
    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> Children<'_> {
        Children {
            graph: self,
            next: self.nodes.get(handle).and_then(|n| n.first_child),
        }
    }

    #[must_use]
    pub fn child_count(&self, handle: NodeHandle) -> usize {
        self.nodes.get(handle).map_or(0, |n| n.child_count)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.parent(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.parent(handle);
        }
        false
    }

    /// Every node below `root`, in pre-order. Excludes `root` itself.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = Vec::new();
        self.push_children_reversed(root, &mut stack);

        while let Some(handle) = stack.pop() {
            out.push(handle);
            self.push_children_reversed(handle, &mut stack);
        }
        out
    }

    fn push_children_reversed(&self, handle: NodeHandle, stack: &mut Vec<NodeHandle>) {
        let mut current = self.nodes.get(handle).and_then(|n| n.last_child);
        while let Some(child) = current {
            stack.push(child);
            current = self.nodes[child].prev_sibling;
        }
    }

    /// Topmost ancestor of `handle` (itself for a root).
    #[must_use]
    pub fn root_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let mut current = handle;
        self.nodes.get(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Number of ancestors of `handle`.
    #[must_use]
    pub fn depth(&self, handle: NodeHandle) -> Option<usize> {
        self.nodes.get(handle)?;
        let mut depth = 0;
        let mut current = handle;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// First child (or descendant, with `recursive`) called `name`.
    #[must_use]
    pub fn find_child(&self, parent: NodeHandle, name: &str, recursive: bool) -> Option<NodeHandle> {
        let matches = |handle: &NodeHandle| self.nodes[*handle].name == name;
        if recursive {
            self.descendants(parent).into_iter().find(matches)
        } else {
            self.children(parent).find(matches)
        }
    }

    fn unlink(&mut self, child: NodeHandle) {
        let (parent, prev, next) = {
            let node = &self.nodes[child];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(prev) => self.nodes[prev].next_sibling = next,
            None => self.nodes[parent].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next].prev_sibling = prev,
            None => self.nodes[parent].last_child = prev,
        }
        self.nodes[parent].child_count -= 1;

        let node = &mut self.nodes[child];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    fn link_last(&mut self, parent: NodeHandle, child: NodeHandle) {
        let last = self.nodes[parent].last_child;
        {
            let node = &mut self.nodes[child];
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        match last {
            Some(last) => self.nodes[last].next_sibling = Some(child),
            None => self.nodes[parent].first_child = Some(child),
        }
        let parent = &mut self.nodes[parent];
        parent.last_child = Some(child);
        parent.child_count += 1;
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    pub fn add_scene<S: SceneHooks>(&mut self, scene: S) -> SceneKey {
        self.scenes.insert(Box::new(scene))
    }

    /// Unregisters a scene. Its member nodes stay alive without a scene.
    pub fn remove_scene(&mut self, key: SceneKey) -> Option<Box<dyn SceneHooks>> {
        let scene = self.scenes.remove(key)?;
        let members: Vec<NodeHandle> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.scene == Some(key))
            .map(|(handle, _)| handle)
            .collect();
        for handle in members {
            self.nodes[handle].scene = None;
            self.post_event(
                handle,
                NodeEvent::SceneChanged {
                    old: Some(key),
                    new: None,
                },
            );
        }
        Some(scene)
    }

    #[must_use]
    pub fn scene<S: SceneHooks>(&self, key: SceneKey) -> Option<&S> {
        let scene: &dyn SceneHooks = &**self.scenes.get(key)?;
        let any: &dyn Any = scene;
        any.downcast_ref::<S>()
    }

    pub fn scene_mut<S: SceneHooks>(&mut self, key: SceneKey) -> Option<&mut S> {
        let scene: &mut dyn SceneHooks = &mut **self.scenes.get_mut(key)?;
        let any: &mut dyn Any = scene;
        any.downcast_mut::<S>()
    }

    /// Moves `handle` and its subtree into `scene`.
    ///
    /// A node whose parent lives in a different scene is detached first, so a
    /// tree never straddles two scenes.
    pub fn add_to_scene(&mut self, handle: NodeHandle, scene: SceneKey) -> bool {
        if !self.nodes.contains_key(handle) || !self.scenes.contains_key(scene) {
            return false;
        }
        if let Some(parent) = self.nodes[handle].parent
            && self.nodes[parent].scene != Some(scene)
        {
            self.detach(handle, false);
        }
        self.move_subtree_to_scene(handle, Some(scene));
        true
    }

    /// Takes `handle` and its subtree out of their scene, detaching `handle`
    /// from a parent that stays behind.
    pub fn remove_from_scene(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        if node.scene.is_none() {
            return false;
        }
        if node.parent.is_some() {
            self.detach(handle, false);
        }
        self.move_subtree_to_scene(handle, None);
        true
    }

    fn move_subtree_to_scene(&mut self, root: NodeHandle, target: Option<SceneKey>) {
        let mut subtree = vec![root];
        subtree.extend(self.descendants(root));

        for handle in subtree {
            let old = self.nodes[handle].scene;
            if old == target {
                continue;
            }
            if let Some(scene) = old.and_then(|key| self.scenes.get_mut(key)) {
                scene.node_removed(handle, &self.nodes[handle]);
            }
            self.nodes[handle].scene = target;
            if let Some(scene) = target.and_then(|key| self.scenes.get_mut(key)) {
                scene.node_added(handle, &self.nodes[handle]);
            }
            self.post_event(handle, NodeEvent::SceneChanged { old, new: target });
        }
    }

    /// Calls `f` on the owning scene of `handle`, if any.
    pub(crate) fn notify_scene(
        &mut self,
        handle: NodeHandle,
        f: impl FnOnce(&mut dyn SceneHooks, NodeHandle, &Node),
    ) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        if let Some(scene) = node.scene.and_then(|key| self.scenes.get_mut(key)) {
            f(scene.as_mut(), handle, node);
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn add_observer<O: NodeObserver>(&mut self, observer: O) -> ObserverKey {
        self.observers.insert(Box::new(observer))
    }

    /// Unregisters an observer. Nodes still listing its key skip it.
    pub fn remove_observer(&mut self, key: ObserverKey) -> Option<Box<dyn NodeObserver>> {
        let observer = self.observers.remove(key)?;
        for (_, node) in &mut self.nodes {
            node.observers.retain(|k| *k != key);
        }
        Some(observer)
    }

    #[must_use]
    pub fn observer<O: NodeObserver>(&self, key: ObserverKey) -> Option<&O> {
        let observer: &dyn NodeObserver = &**self.observers.get(key)?;
        let any: &dyn Any = observer;
        any.downcast_ref::<O>()
    }

    pub fn observer_mut<O: NodeObserver>(&mut self, key: ObserverKey) -> Option<&mut O> {
        let observer: &mut dyn NodeObserver = &mut **self.observers.get_mut(key)?;
        let any: &mut dyn Any = observer;
        any.downcast_mut::<O>()
    }

    /// Appends `key` to the node's observer list. A key is listed at most once.
    pub fn attach_observer(&mut self, handle: NodeHandle, key: ObserverKey) -> bool {
        if !self.observers.contains_key(key) {
            return false;
        }
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        if node.observers.contains(&key) {
            return false;
        }
        node.observers.push(key);
        true
    }

    pub fn detach_observer(&mut self, handle: NodeHandle, key: ObserverKey) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        let before = node.observers.len();
        node.observers.retain(|k| *k != key);
        node.observers.len() != before
    }

    /// Delivers `event` to the node's observers in list order.
    ///
    /// Suppressed while the node's event lock is held.
    pub(crate) fn post_event(&mut self, handle: NodeHandle, event: NodeEvent) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        if node.event_lock > 0 {
            return;
        }
        let keys = node.observers.clone();
        log::trace!("{event:?} -> {handle:?}");
        for key in keys {
            if let Some(target) = self.observers.get_mut(key) {
                observer::deliver(target.as_mut(), handle, &event);
            }
        }
    }

    /// Posts a per-frame update to `root` and its whole subtree, pre-order.
    pub fn dispatch_update(&mut self, root: NodeHandle, dt: f32) {
        if !self.nodes.contains_key(root) {
            return;
        }
        let mut order = vec![root];
        order.extend(self.descendants(root));
        for handle in order {
            self.post_event(handle, NodeEvent::Update(dt));
        }
    }

    /// Posts a physics contact reported by the host's simulation.
    pub fn dispatch_contact(&mut self, handle: NodeHandle, contact: &Contact) {
        self.post_event(handle, NodeEvent::Contact(*contact));
    }

    // ========================================================================
    // Node state
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        if node.name == name {
            return false;
        }
        name.clone_into(&mut node.name);
        self.notify_scene(handle, |scene, h, node| scene.name_changed(h, node));
        true
    }

    pub fn set_layer(&mut self, handle: NodeHandle, layer: u32) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        let old = node.layer;
        if old == layer {
            return false;
        }
        node.layer = layer;
        self.post_event(handle, NodeEvent::LayerChanged { old, new: layer });
        true
    }

    pub fn set_static(&mut self, handle: NodeHandle, is_static: bool) -> bool {
        let flags = match self.nodes.get(handle) {
            Some(node) => node.flags,
            None => return false,
        };
        self.set_flags(handle, flags_with(flags, NodeFlags::STATIC, is_static))
    }

    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) -> bool {
        let flags = match self.nodes.get(handle) {
            Some(node) => node.flags,
            None => return false,
        };
        self.set_flags(handle, flags_with(flags, NodeFlags::INVISIBLE, !visible))
    }

    /// Visible only if the node and every ancestor are visible.
    #[must_use]
    pub fn is_visible_in_hierarchy(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.nodes.get(h) {
                Some(node) if node.is_visible() => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Enables or disables inheritance for the axes in `axes`
    /// (any of [`NodeFlags::NO_INHERIT`]'s bits).
    pub fn set_inherit(&mut self, handle: NodeHandle, axes: NodeFlags, enabled: bool) -> bool {
        let flags = match self.nodes.get(handle) {
            Some(node) => node.flags,
            None => return false,
        };
        let axes = axes & NodeFlags::NO_INHERIT;
        self.set_flags(handle, flags_with(flags, axes, !enabled))
    }

    pub fn set_serializable(&mut self, handle: NodeHandle, serializable: bool) -> bool {
        let flags = match self.nodes.get(handle) {
            Some(node) => node.flags,
            None => return false,
        };
        self.set_flags(handle, flags_with(flags, NodeFlags::NO_SERIALIZATION, !serializable))
    }

    pub fn set_state_stack_staging(&mut self, handle: NodeHandle, staged: bool) -> bool {
        let flags = match self.nodes.get(handle) {
            Some(node) => node.flags,
            None => return false,
        };
        self.set_flags(
            handle,
            flags_with(flags, NodeFlags::NO_STATE_STACK_STAGING, !staged),
        )
    }

    /// Replaces the node's flag word, posting an event for every observable
    /// change: static, visibility, and (for inheritance toggles) transform
    /// and scale.
    pub fn set_flags(&mut self, handle: NodeHandle, flags: NodeFlags) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        let changed = node.flags ^ flags;
        if changed.is_empty() {
            return false;
        }
        node.flags = flags;

        if changed.contains(NodeFlags::STATIC) {
            let is_static = flags.contains(NodeFlags::STATIC);
            self.post_event(handle, NodeEvent::StaticChanged(is_static));
            self.forward_to_scene(handle, |scene, h| scene.static_changed(h, is_static));
        }
        if changed.contains(NodeFlags::INVISIBLE) {
            let visible = !flags.contains(NodeFlags::INVISIBLE);
            self.post_event(handle, NodeEvent::VisibilityChanged(visible));
            self.forward_to_scene(handle, |scene, h| scene.visibility_changed(h, visible));
        }
        let mut world = WorldChange::empty();
        world.set(WorldChange::POSITION, changed.contains(NodeFlags::NO_POSITION_INHERIT));
        world.set(WorldChange::ROTATION, changed.contains(NodeFlags::NO_ROTATION_INHERIT));
        world.set(WorldChange::SCALE, changed.contains(NodeFlags::NO_SCALE_INHERIT));
        self.post_world_change(handle, world);
        true
    }

    /// Like [`notify_scene`](Self::notify_scene) but honours the event lock.
    pub(crate) fn forward_to_scene(
        &mut self,
        handle: NodeHandle,
        f: impl FnOnce(&mut dyn SceneHooks, NodeHandle),
    ) {
        if self.nodes.get(handle).is_some_and(Node::is_event_locked) {
            return;
        }
        self.notify_scene(handle, |scene, h, _| f(scene, h));
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Returns the module called `name`, creating it through the factory if
    /// the node does not have one yet.
    ///
    /// Returns `None` (after a warning) when the name cannot be resolved.
    pub fn add_component(&mut self, handle: NodeHandle, name: &str) -> Option<&mut DynComponent> {
        let node = self.nodes.get(handle)?;
        if !node.components.contains(name) {
            let Some(component) = self.factory.create(name, handle) else {
                if self.settings.warn_on_unknown_component {
                    log::warn!("Unknown component '{name}' requested for node {}", node.id);
                }
                return None;
            };
            self.store_component(handle, component)?;
        }
        self.nodes.get_mut(handle)?.components.get_mut(name)
    }

    /// Attaches a module built by the caller.
    ///
    /// If a module with the same name is already attached, that one is kept
    /// and returned and `component` is dropped. Rejects modules whose owner
    /// is a different node.
    pub fn insert_component(
        &mut self,
        handle: NodeHandle,
        component: Box<dyn Component>,
    ) -> Option<&mut DynComponent> {
        let node = self.nodes.get(handle)?;
        if component.owner() != handle {
            log::warn!(
                "Component '{}' belongs to {:?}, not {handle:?}; not attached",
                component.name(),
                component.owner()
            );
            return None;
        }
        let name = component.name().to_owned();
        if !node.components.contains(&name) {
            self.store_component(handle, component)?;
        }
        self.nodes.get_mut(handle)?.components.get_mut(&name)
    }

    fn store_component(&mut self, handle: NodeHandle, component: Box<dyn Component>) -> Option<()> {
        let name = component.name().to_owned();
        if let Err(rejected) = self.nodes.get_mut(handle)?.components.insert(component) {
            log::warn!(
                "Component '{}' does not fit its reserved slot; not attached",
                rejected.name()
            );
            return None;
        }
        self.notify_scene(handle, |scene, h, _| scene.component_added(h, &name));
        Some(())
    }

    #[must_use]
    pub fn component(&self, handle: NodeHandle, name: &str) -> Option<&DynComponent> {
        self.nodes.get(handle)?.components.get(name)
    }

    pub fn component_mut(&mut self, handle: NodeHandle, name: &str) -> Option<&mut DynComponent> {
        self.nodes.get_mut(handle)?.components.get_mut(name)
    }

    #[must_use]
    pub fn component_as<T: Component>(&self, handle: NodeHandle, name: &str) -> Option<&T> {
        self.nodes.get(handle)?.components.get_as::<T>(name)
    }

    pub fn component_as_mut<T: Component>(&mut self, handle: NodeHandle, name: &str) -> Option<&mut T> {
        self.nodes.get_mut(handle)?.components.get_as_mut::<T>(name)
    }

    #[must_use]
    pub fn has_component(&self, handle: NodeHandle, name: &str) -> bool {
        self.nodes
            .get(handle)
            .is_some_and(|node| node.components.contains(name))
    }

    /// Removes the module called `name`. No-op if it is not attached.
    pub fn remove_component(&mut self, handle: NodeHandle, name: &str) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        if node.components.take(name).is_none() {
            return false;
        }
        self.notify_scene(handle, |scene, h, _| scene.component_removed(h, name));
        true
    }

    /// Removes every module, enumerating by name so the fast slots are
    /// cleared along with the registry. Returns the number removed.
    pub fn remove_all_components(&mut self, handle: NodeHandle) -> usize {
        self.component_names(handle)
            .iter()
            .filter(|name| self.remove_component(handle, name))
            .count()
    }

    #[must_use]
    pub fn component_names(&self, handle: NodeHandle) -> Vec<String> {
        self.nodes
            .get(handle)
            .map(|node| node.components.names())
            .unwrap_or_default()
    }
}

#[inline]
fn flags_with(flags: NodeFlags, bits: NodeFlags, set: bool) -> NodeFlags {
    if set { flags | bits } else { flags - bits }
}

/// Iterator over a node's children, following the sibling chain.
pub struct Children<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeHandle>,
}

impl Iterator for Children<'_> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.graph.nodes.get(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("nodes", &self.nodes.len())
            .field("scenes", &self.scenes.len())
            .field("observers", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
