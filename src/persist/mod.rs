//! Chunked persistence
//!
//! A node record is two chunks back to back:
//!
//! ```text
//! NODE v1 : {id:u64}{name:str}{position:3×f32}{rotation:4×f32}{scale:3×f32}{flags:u32}
//! COMP v1 : {count:u32} count × {name:str}{body_len:u32}{body}
//! ```
//!
//! Subtree saves append a third chunk holding the child records:
//!
//! ```text
//! KIDS v1 : {count:u32} count × (NODE COMP KIDS)
//! ```
//!
//! Readers skip chunk versions they do not know by the declared length, and
//! skip module bodies whose name no factory resolves by their body length.

pub mod chunk;
pub mod node_codec;
pub mod tree;

pub use chunk::{ChunkHeader, ChunkReader, ChunkWriter, fourcc};
pub use tree::{IdPolicy, LoadedSubtree};

/// General attributes chunk.
pub const GENERAL_CHUNK: u32 = fourcc(b"NODE");
/// Modules chunk.
pub const COMPONENTS_CHUNK: u32 = fourcc(b"COMP");
/// Child records chunk (subtree saves only).
pub const CHILDREN_CHUNK: u32 = fourcc(b"KIDS");

pub const GENERAL_VERSION: u32 = 1;
pub const COMPONENTS_VERSION: u32 = 1;
pub const CHILDREN_VERSION: u32 = 1;
