//! Component (capability module) system
//!
//! A component is a named unit of behaviour or data owned by exactly one
//! node. Its name doubles as the lookup key on the node and as the type tag
//! written to saved data.
//!
//! - [`Component`]: the contract every module implements
//! - [`ComponentSet`]: per-node storage (fast slots + sorted registry)
//! - [`ComponentFactory`]: name → constructor resolution for host-defined kinds
//! - Built-in kinds: [`Visual`], [`PointLight`], [`SpotLight`], [`EditorData`]

pub mod editor;
pub mod factory;
pub mod light;
pub mod set;
pub mod visual;

use std::any::Any;

use crate::errors::{Result, SceneError};
use crate::persist::chunk::{ChunkReader, ChunkWriter};
use crate::scene::NodeHandle;

pub use editor::EditorData;
pub use factory::{ComponentConstructor, ComponentFactory, ComponentProvider};
pub use light::{PointLight, ShadowConfig, SpotLight};
pub use set::ComponentSet;
pub use visual::Visual;

/// A capability module attached to a node.
///
/// Implementations store their owner handle at construction and never change
/// it. The core wraps each serialized body in a length-prefixed envelope, so
/// a module owns its body format entirely (including any versioning of it).
pub trait Component: Any {
    /// Stable name: lookup key on the node and persisted type tag.
    fn name(&self) -> &str;

    /// Node this module belongs to.
    fn owner(&self) -> NodeHandle;

    /// Writes the module body.
    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()>;

    /// Reads a module body produced by [`serialize`](Self::serialize).
    ///
    /// `reader` covers exactly this module's body.
    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()>;

    /// Called once every module in a node load has been read.
    ///
    /// `siblings` holds the node's other modules; use it to rebuild data
    /// derived from them.
    fn on_post_node_deserialized(&mut self, _siblings: &ComponentSet) {}
}

/// Reads the leading `u32` body version of a built-in module and rejects
/// anything other than `expected`.
pub(crate) fn expect_body_version(
    reader: &mut ChunkReader<'_>,
    what: &'static str,
    expected: u32,
) -> Result<()> {
    let version = reader.read_u32()?;
    if version == expected {
        Ok(())
    } else {
        Err(SceneError::UnsupportedVersion { what, version })
    }
}

/// Owned-object form of a module, as stored on nodes.
pub type DynComponent = dyn Component;

impl dyn Component {
    #[inline]
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<T>()
    }
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("owner", &self.owner())
            .finish()
    }
}

/// Converts a boxed module into its concrete type, handing it back on mismatch.
pub(crate) fn downcast_box<T: Component>(
    component: Box<dyn Component>,
) -> std::result::Result<Box<T>, Box<dyn Component>> {
    if !component.is::<T>() {
        return Err(component);
    }
    let any: Box<dyn Any> = component;
    any.downcast::<T>()
        .map_err(|_| unreachable!("component type checked above"))
}
