//! Scene graph module
//!
//! Hierarchy, transforms and notifications:
//! - [`Node`]: a hierarchical spatial entity (arena-stored, handle-addressed)
//! - [`Transform`]: local position / rotation / scale
//! - [`SceneGraph`]: the arena, hierarchy edits, world-transform derivation
//! - [`NodeObserver`]: lifecycle listeners shared between nodes
//! - [`SceneHooks`] / [`Scene`]: the owning-scene back-reference contract
//! - [`NodeIndex`]: sorted id → handle lookup

pub mod builder;
pub mod event_lock;
pub mod graph;
pub mod hooks;
pub mod index;
pub mod node;
pub mod observer;
pub mod transform;
pub mod transform_system;
pub mod wrapper;

pub use builder::NodeBuilder;
pub use event_lock::EventLock;
pub use graph::{Children, SceneGraph};
pub use hooks::{Scene, SceneHooks};
pub use index::NodeIndex;
pub use node::{Node, NodeFlags, NodeId};
pub use observer::{Contact, ContactPhase, NodeEvent, NodeObserver};
pub use transform::Transform;
pub use transform_system::TransformSpace;
pub use wrapper::SceneNode;

use slotmap::new_key_type;

new_key_type! {
    /// Arena handle of a node. Stale handles resolve to nothing.
    pub struct NodeHandle;
    /// Handle of a scene registered with a graph.
    pub struct SceneKey;
    /// Handle of an observer registered with a graph.
    pub struct ObserverKey;
}
