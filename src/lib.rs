#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod component;
pub mod errors;
pub mod persist;
pub mod scene;
pub mod settings;

pub use component::{
    Component, ComponentFactory, ComponentProvider, ComponentSet, DynComponent, EditorData, PointLight,
    ShadowConfig, SpotLight, Visual,
};
pub use errors::{Result, SceneError};
pub use persist::{ChunkReader, ChunkWriter, IdPolicy, LoadedSubtree};
pub use scene::{
    Contact, ContactPhase, EventLock, Node, NodeBuilder, NodeEvent, NodeFlags, NodeHandle, NodeId, NodeIndex,
    NodeObserver, ObserverKey, Scene, SceneGraph, SceneHooks, SceneKey, SceneNode, Transform, TransformSpace,
};
pub use settings::GraphSettings;
