//! Error Types
//!
//! This module defines the error types used by the scene graph core.
//!
//! # Overview
//!
//! Structural operations (attach, detach, add/remove component, ...) never
//! fail with an error: they report what happened through `bool` / `Option`
//! returns and leave the graph untouched when rejected. [`SceneError`] only
//! covers the persistence surface, where malformed or truncated input has to
//! be reported to the caller:
//! - Truncated or oversized chunk data
//! - Unexpected chunk kinds
//! - Invalid UTF-8 in persisted strings
//! - Component bodies that their own decoder rejected
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, SceneError>`.
//!
//! ```rust,ignore
//! use myth_scene::errors::Result;
//!
//! fn reload(graph: &mut SceneGraph, node: NodeHandle, bytes: &[u8]) -> Result<()> {
//!     graph.deserialize_node(node, bytes)
//! }
//! ```

use thiserror::Error;

/// The main error type for the scene graph core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// The input ended before a value could be read.
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes required by the read
        needed: usize,
        /// Bytes left in the input
        remaining: usize,
    },

    /// A persisted string was not valid UTF-8.
    #[error("Invalid UTF-8 in persisted string")]
    InvalidUtf8,

    /// A chunk header carried a different kind than the reader expected.
    #[error("Unexpected chunk kind: expected {expected:#010x}, found {found:#010x}")]
    UnexpectedChunk {
        /// Kind the reader was looking for
        expected: u32,
        /// Kind present in the data
        found: u32,
    },

    /// A chunk or field grew beyond what a `u32` length prefix can describe.
    #[error("Chunk too large to encode: {0} bytes")]
    ChunkTooLarge(usize),

    /// A component body uses a format version its decoder does not know.
    #[error("Unsupported {what} version {version}")]
    UnsupportedVersion {
        /// Which format was being decoded
        what: &'static str,
        /// The version found in the data
        version: u32,
    },

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// The handle passed to a codec entry point does not refer to a live node.
    #[error("Node handle is stale or was never allocated")]
    StaleHandle,
}

/// Alias for `Result<T, SceneError>`.
pub type Result<T> = std::result::Result<T, SceneError>;
