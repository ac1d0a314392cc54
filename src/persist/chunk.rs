//! Chunk primitives
//!
//! Every persisted unit is a chunk: a fixed 12-byte header followed by
//! `length` bytes of body.
//!
//! ```text
//! ┌───────────────┬───────────────┬───────────────┬──────────────────┐
//! │ kind: u32     │ version: u32  │ length: u32   │ body (length B)  │
//! └───────────────┴───────────────┴───────────────┴──────────────────┘
//! ```
//!
//! All integers and floats are little-endian. Strings are `{len:u32}{bytes}`
//! without a terminator. Because the body length is always known up front, a
//! reader that does not understand a chunk (or a version of it) can step over
//! it without understanding its contents.

use glam::{Quat, Vec3};

use crate::errors::{Result, SceneError};

/// Size of a chunk header in bytes.
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Builds a chunk kind from a four-character code.
#[inline]
#[must_use]
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// Decoded chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub kind: u32,
    pub version: u32,
    pub length: u32,
}

/// Marks an open chunk whose length is patched by [`ChunkWriter::end_chunk`].
#[derive(Debug)]
#[must_use = "an open chunk must be closed with ChunkWriter::end_chunk"]
pub struct ChunkMark {
    length_at: usize,
}

/// Marks an open length prefix patched by [`ChunkWriter::end_length_prefixed`].
#[derive(Debug)]
#[must_use = "an open length prefix must be closed with ChunkWriter::end_length_prefixed"]
pub struct LengthMark {
    length_at: usize,
}

// ============================================================================
// Writer
// ============================================================================

/// Append-only little-endian writer.
#[derive(Debug, Default, Clone)]
pub struct ChunkWriter {
    buf: Vec<u8>,
}

impl ChunkWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_vec3(&mut self, v: Vec3) {
        self.write_f32(v.x);
        self.write_f32(v.y);
        self.write_f32(v.z);
    }

    /// Writes a quaternion as `x, y, z, w`.
    pub fn write_quat(&mut self, q: Quat) {
        self.write_f32(q.x);
        self.write_f32(q.y);
        self.write_f32(q.z);
        self.write_f32(q.w);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes `{len:u32}{bytes}`.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_u32(length_u32(s.len())?);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Writes a header with a placeholder length and returns a mark for it.
    pub fn begin_chunk(&mut self, kind: u32, version: u32) -> ChunkMark {
        self.write_u32(kind);
        self.write_u32(version);
        let length_at = self.buf.len();
        self.write_u32(0);
        ChunkMark { length_at }
    }

    /// Patches the length of the chunk opened by `mark`.
    pub fn end_chunk(&mut self, mark: ChunkMark) -> Result<()> {
        self.patch_length(mark.length_at)
    }

    /// Writes a placeholder `u32` length for a body that follows.
    pub fn begin_length_prefixed(&mut self) -> LengthMark {
        let length_at = self.buf.len();
        self.write_u32(0);
        LengthMark { length_at }
    }

    pub fn end_length_prefixed(&mut self, mark: LengthMark) -> Result<()> {
        self.patch_length(mark.length_at)
    }

    fn patch_length(&mut self, length_at: usize) -> Result<()> {
        let body = self.buf.len() - length_at - 4;
        let len = length_u32(body)?;
        self.buf[length_at..length_at + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }
}

#[inline]
fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SceneError::ChunkTooLarge(len))
}

// ============================================================================
// Reader
// ============================================================================

/// Bounds-checked little-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes `n` bytes and returns them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(SceneError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Splits off the next `n` bytes as an independent reader.
    ///
    /// The parent advances past the whole range whatever the sub-reader
    /// consumes, so a misbehaving decoder cannot desynchronise the stream.
    pub fn sub_reader(&mut self, n: usize) -> Result<ChunkReader<'a>> {
        self.read_bytes(n).map(ChunkReader::new)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_quat(&mut self) -> Result<Quat> {
        Ok(Quat::from_xyzw(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| SceneError::InvalidUtf8)
    }

    pub fn read_header(&mut self) -> Result<ChunkHeader> {
        Ok(ChunkHeader {
            kind: self.read_u32()?,
            version: self.read_u32()?,
            length: self.read_u32()?,
        })
    }

    /// Reads a header and checks its kind.
    pub fn expect_header(&mut self, kind: u32) -> Result<ChunkHeader> {
        let header = self.read_header()?;
        if header.kind != kind {
            return Err(SceneError::UnexpectedChunk {
                expected: kind,
                found: header.kind,
            });
        }
        Ok(header)
    }
}
