//! Scene Graph Settings
//!
//! Construction-time configuration for a [`SceneGraph`](crate::scene::SceneGraph).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_scene::{GraphSettings, SceneGraph};
//!
//! // Defaults are fine for most hosts
//! let graph = SceneGraph::new();
//!
//! // Tools that load many saved files start identifiers high to keep
//! // freshly created nodes clear of persisted ones
//! let graph = SceneGraph::with_settings(GraphSettings {
//!     first_node_id: 1 << 32,
//!     ..Default::default()
//! });
//! ```
//!
//! Settings are `serde`-enabled with field defaults, so a partial JSON or TOML
//! document only needs to mention what it overrides.

use serde::{Deserialize, Serialize};

/// Configuration applied when a [`SceneGraph`](crate::scene::SceneGraph) is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Number of node slots reserved up front.
    pub initial_node_capacity: usize,

    /// First identifier handed out by the id allocator.
    ///
    /// Must be non-zero; zero is reserved as "no identifier".
    pub first_node_id: u64,

    /// Whether an unresolvable component name logs a warning.
    ///
    /// Hosts that look up names speculatively can turn this off.
    pub warn_on_unknown_component: bool,
}

impl Default for GraphSettings {
    #[inline]
    fn default() -> Self {
        Self {
            initial_node_capacity: 64,
            first_node_id: 1,
            warn_on_unknown_component: true,
        }
    }
}
