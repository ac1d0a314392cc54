//! Transform system
//!
//! World values are derived on demand: walk from the node to its root, then
//! fold back down applying each node's inheritance flags. Nothing is cached,
//! so a world query always reflects the current local values of the whole
//! ancestor chain.
//!
//! Per level, with parent world values `pp`, `pr`, `ps` and local `lp`, `lr`,
//! `ls`:
//! - position: `pp + pr * (ps * lp)` when inheriting position, else `lp`
//! - rotation: `pr * lr` when inheriting rotation, else `lr`
//! - scale:    `ps * ls` when inheriting scale, else `ls`
//!
//! Setters solve the inverse against the parent's world values. A zero
//! parent scale component cannot be inverted and maps to zero.
//!
//! Change notifications cascade through an explicit worklist, never through
//! recursion, so arbitrarily deep hierarchies cannot exhaust the stack. Each
//! step carries a [`WorldChange`] mask, and a child is visited only if the
//! formulas above make some part of its own world transform follow that
//! change. A parent's scale change therefore also moves (and notifies)
//! position-inheriting children that sit away from the parent's origin.

use bitflags::bitflags;
use glam::{Affine3A, Quat, Vec3};
use smallvec::SmallVec;

use crate::scene::node::Node;
use crate::scene::observer::NodeEvent;
use crate::scene::transform::{self, Transform};
use crate::scene::{NodeHandle, SceneGraph};

/// Reference frame for relative transform edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSpace {
    /// The node's own axes.
    #[default]
    Local,
    /// The parent's axes (the space local values are expressed in).
    Parent,
    /// World axes.
    World,
}

bitflags! {
    /// Parts of a node's world transform touched by an edit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct WorldChange: u8 {
        const POSITION = 1 << 0;
        const ROTATION = 1 << 1;
        const SCALE    = 1 << 2;
    }
}

impl WorldChange {
    /// Parts of `node`'s world transform that follow its parent at all.
    pub(crate) fn inherited_parts(node: &Node) -> Self {
        let mut parts = Self::empty();
        parts.set(Self::POSITION, node.inherits_position());
        parts.set(Self::ROTATION, node.inherits_rotation());
        parts.set(Self::SCALE, node.inherits_scale());
        parts
    }

    /// What changes for `child` when its parent's world changed by `self`.
    ///
    /// Child world position is `pp + pr * (ps * lp)`: it moves with the
    /// parent's position and rotation, and with the parent's scale unless
    /// `lp` is zero.
    fn passed_to(self, child: &Node) -> Self {
        let mut out = Self::empty();
        let moves = self.intersects(Self::POSITION | Self::ROTATION)
            || (self.contains(Self::SCALE) && child.transform.position != Vec3::ZERO);
        out.set(Self::POSITION, child.inherits_position() && moves);
        out.set(Self::ROTATION, child.inherits_rotation() && self.contains(Self::ROTATION));
        out.set(Self::SCALE, child.inherits_scale() && self.contains(Self::SCALE));
        out
    }
}

/// Component-wise reciprocal; zero components stay zero.
#[inline]
fn safe_recip(v: Vec3) -> Vec3 {
    let recip = |x: f32| if x.abs() < f32::EPSILON { 0.0 } else { 1.0 / x };
    Vec3::new(recip(v.x), recip(v.y), recip(v.z))
}

/// One level of the world fold.
fn compose(parent: &Transform, node: &Node) -> Transform {
    let local = &node.transform;
    Transform {
        position: if node.inherits_position() {
            parent.position + parent.rotation * (parent.scale * local.position)
        } else {
            local.position
        },
        rotation: if node.inherits_rotation() {
            (parent.rotation * local.rotation).normalize()
        } else {
            local.rotation
        },
        scale: if node.inherits_scale() {
            parent.scale * local.scale
        } else {
            local.scale
        },
    }
}

impl SceneGraph {
    // ========================================================================
    // Local values
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn transform(&self, handle: NodeHandle) -> Option<&Transform> {
        self.nodes.get(handle).map(|n| &n.transform)
    }

    #[inline]
    #[must_use]
    pub fn position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.position)
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.nodes.get(handle).map(|n| n.transform.rotation)
    }

    #[inline]
    #[must_use]
    pub fn scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.scale)
    }

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        node.transform.position = position;
        self.post_world_change(handle, WorldChange::POSITION);
        true
    }

    /// Sets the local rotation. Rejects quaternions too close to zero to
    /// normalize.
    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        if !node.transform.set_rotation(rotation) {
            log::debug!("Ignored degenerate rotation for {handle:?}");
            return false;
        }
        self.post_world_change(handle, WorldChange::ROTATION);
        true
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else {
            return false;
        };
        node.transform.scale = scale;
        self.post_world_change(handle, WorldChange::SCALE);
        true
    }

    /// Sets local position and rotation with a single transform event.
    pub fn set_transform(&mut self, handle: NodeHandle, position: Vec3, rotation: Quat) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        {
            let mut locked = self.lock_events(handle);
            locked.set_position(handle, position);
            locked.set_rotation(handle, rotation);
        }
        self.post_world_change(handle, WorldChange::POSITION | WorldChange::ROTATION);
        true
    }

    /// Sets the full local transform with one transform and one scale event.
    pub fn set_local_transform(&mut self, handle: NodeHandle, transform: &Transform) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        {
            let mut locked = self.lock_events(handle);
            locked.set_position(handle, transform.position);
            locked.set_rotation(handle, transform.rotation);
            locked.set_scale(handle, transform.scale);
        }
        self.post_world_change(handle, WorldChange::all());
        true
    }

    // ========================================================================
    // World values
    // ========================================================================

    /// World position, rotation and scale of `handle`.
    #[must_use]
    pub fn world_transform(&self, handle: NodeHandle) -> Option<Transform> {
        let mut chain: SmallVec<[NodeHandle; 16]> = SmallVec::new();
        let mut current = Some(handle);
        while let Some(h) = current {
            chain.push(h);
            current = self.nodes.get(h)?.parent;
        }

        let mut world: Option<Transform> = None;
        for &h in chain.iter().rev() {
            let node = &self.nodes[h];
            world = Some(match world {
                None => node.transform,
                Some(parent) => compose(&parent, node),
            });
        }
        world
    }

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_transform(handle).map(|t| t.position)
    }

    #[must_use]
    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.world_transform(handle).map(|t| t.rotation)
    }

    #[must_use]
    pub fn world_scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_transform(handle).map(|t| t.scale)
    }

    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        self.world_transform(handle).map(|t| t.local_matrix())
    }

    /// Maps a point from the node's local space to world space.
    #[must_use]
    pub fn local_to_world(&self, handle: NodeHandle, point: Vec3) -> Option<Vec3> {
        let world = self.world_transform(handle)?;
        Some(world.position + world.rotation * (world.scale * point))
    }

    /// Maps a world-space point into the node's local space.
    #[must_use]
    pub fn world_to_local(&self, handle: NodeHandle, point: Vec3) -> Option<Vec3> {
        let world = self.world_transform(handle)?;
        Some((world.rotation.inverse() * (point - world.position)) * safe_recip(world.scale))
    }

    /// World values of the parent, or `None` for roots.
    fn parent_world(&self, handle: NodeHandle) -> Option<Transform> {
        let parent = self.nodes.get(handle)?.parent?;
        self.world_transform(parent)
    }

    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let local = match self.parent_world(handle) {
            Some(parent) if node.inherits_position() => {
                (parent.rotation.inverse() * (position - parent.position)) * safe_recip(parent.scale)
            }
            _ => position,
        };
        self.set_position(handle, local)
    }

    pub fn set_world_rotation(&mut self, handle: NodeHandle, rotation: Quat) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let Some(rotation) = transform::normalize_rotation(rotation) else {
            return false;
        };
        let local = match self.parent_world(handle) {
            Some(parent) if node.inherits_rotation() => parent.rotation.inverse() * rotation,
            _ => rotation,
        };
        self.set_rotation(handle, local)
    }

    pub fn set_world_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let local = match self.parent_world(handle) {
            Some(parent) if node.inherits_scale() => scale * safe_recip(parent.scale),
            _ => scale,
        };
        self.set_scale(handle, local)
    }

    /// Sets world position and rotation with a single transform event.
    pub fn set_world_transform(&mut self, handle: NodeHandle, position: Vec3, rotation: Quat) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        {
            let mut locked = self.lock_events(handle);
            locked.set_world_position(handle, position);
            locked.set_world_rotation(handle, rotation);
        }
        self.post_world_change(handle, WorldChange::POSITION | WorldChange::ROTATION);
        true
    }

    /// Sets world position, rotation and scale with one transform and one
    /// scale event.
    pub fn set_world_transform_scaled(
        &mut self,
        handle: NodeHandle,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> bool {
        if !self.nodes.contains_key(handle) {
            return false;
        }
        {
            let mut locked = self.lock_events(handle);
            locked.set_world_scale(handle, scale);
            locked.set_world_position(handle, position);
            locked.set_world_rotation(handle, rotation);
        }
        self.post_world_change(handle, WorldChange::all());
        true
    }

    /// Re-applies captured world values silently after a reparent.
    pub(crate) fn restore_world(&mut self, handle: NodeHandle, world: &Transform) {
        let mut locked = self.lock_events(handle);
        locked.set_world_scale(handle, world.scale);
        locked.set_world_position(handle, world.position);
        locked.set_world_rotation(handle, world.rotation);
    }

    // ========================================================================
    // Relative edits
    // ========================================================================

    pub fn translate(&mut self, handle: NodeHandle, delta: Vec3, space: TransformSpace) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let local = &node.transform;
        let position = match space {
            TransformSpace::Local => local.position + local.rotation * delta,
            TransformSpace::Parent => local.position + delta,
            TransformSpace::World => match self.parent_world(handle) {
                Some(parent) if node.inherits_position() => {
                    local.position + (parent.rotation.inverse() * delta) * safe_recip(parent.scale)
                }
                _ => local.position + delta,
            },
        };
        self.set_position(handle, position)
    }

    pub fn rotate(&mut self, handle: NodeHandle, delta: Quat, space: TransformSpace) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let Some(delta) = transform::normalize_rotation(delta) else {
            return false;
        };
        let current = node.transform.rotation;
        let rotation = match space {
            TransformSpace::Local => current * delta,
            TransformSpace::Parent => delta * current,
            TransformSpace::World => match self.parent_world(handle) {
                Some(parent) if node.inherits_rotation() => {
                    let parent_rotation = parent.rotation;
                    parent_rotation.inverse() * delta * parent_rotation * current
                }
                _ => delta * current,
            },
        };
        self.set_rotation(handle, rotation)
    }

    /// Multiplies the local scale component-wise.
    pub fn scale_by(&mut self, handle: NodeHandle, factor: Vec3) -> bool {
        let Some(scale) = self.scale(handle) else {
            return false;
        };
        self.set_scale(handle, scale * factor)
    }

    /// Turns the node so its forward axis (-Z) points at a world-space target.
    ///
    /// Returns `false` and leaves the node untouched when the target
    /// coincides with the node's position or the direction is parallel to
    /// `up`.
    pub fn look_at(&mut self, handle: NodeHandle, target: Vec3, up: Vec3) -> bool {
        let Some(position) = self.world_position(handle) else {
            return false;
        };
        match transform::look_rotation(target - position, up) {
            Some(rotation) => self.set_world_rotation(handle, rotation),
            None => false,
        }
    }

    // ========================================================================
    // Change propagation
    // ========================================================================

    /// Posts `change` to `root` and its scene, then walks every descendant
    /// whose world transform follows it. Each visited node receives
    /// `TransformChanged` if its position or rotation moved, then
    /// `ScaleChanged` if its scale did.
    ///
    /// A locked node swallows its events and stops the cascade below it.
    pub(crate) fn post_world_change(&mut self, root: NodeHandle, change: WorldChange) {
        if change.is_empty() {
            return;
        }
        let mut work = vec![(root, change)];
        while let Some((handle, change)) = work.pop() {
            match self.nodes.get(handle) {
                Some(node) if !node.is_event_locked() => {}
                _ => continue,
            }

            if change.intersects(WorldChange::POSITION | WorldChange::ROTATION) {
                self.post_event(handle, NodeEvent::TransformChanged);
                self.forward_to_scene(handle, |scene, h| scene.transform_changed(h));
            }
            if change.contains(WorldChange::SCALE) {
                self.post_event(handle, NodeEvent::ScaleChanged);
                self.forward_to_scene(handle, |scene, h| scene.scale_changed(h));
            }

            let first = work.len();
            work.extend(self.children(handle).filter_map(|child| {
                let passed = change.passed_to(&self.nodes[child]);
                (!passed.is_empty()).then_some((child, passed))
            }));
            work[first..].reverse();
        }
    }

    /// Notifies a node whose parent just changed. Every part of its world
    /// transform that follows a parent may have moved.
    pub(crate) fn post_reparented(&mut self, child: NodeHandle) {
        if let Some(node) = self.nodes.get(child) {
            let change = WorldChange::inherited_parts(node);
            self.post_world_change(child, change);
        }
    }
}
