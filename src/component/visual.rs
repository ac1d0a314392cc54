use crate::component::{Component, expect_body_version};
use crate::errors::Result;
use crate::persist::chunk::{ChunkReader, ChunkWriter};
use crate::scene::NodeHandle;

const FORMAT_VERSION: u32 = 1;

const FLAG_CAST_SHADOWS: u8 = 1 << 0;
const FLAG_RECEIVE_SHADOWS: u8 = 1 << 1;

/// Renderable appearance of a node.
///
/// Only references are stored here (mesh and material asset paths); the
/// renderer resolves them.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    owner: NodeHandle,
    /// Mesh asset path. Empty means no mesh.
    pub mesh: String,
    /// Material asset path. Empty means the renderer default.
    pub material: String,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Sort key within a render queue; lower draws first.
    pub render_order: i32,
}

impl Visual {
    pub const NAME: &'static str = "Visual";

    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        Self {
            owner,
            mesh: String::new(),
            material: String::new(),
            cast_shadows: true,
            receive_shadows: true,
            render_order: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        !self.mesh.is_empty()
    }
}

impl Component for Visual {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()> {
        writer.write_u32(FORMAT_VERSION);
        writer.write_str(&self.mesh)?;
        writer.write_str(&self.material)?;
        let mut flags = 0u8;
        if self.cast_shadows {
            flags |= FLAG_CAST_SHADOWS;
        }
        if self.receive_shadows {
            flags |= FLAG_RECEIVE_SHADOWS;
        }
        writer.write_u8(flags);
        writer.write_i32(self.render_order);
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        expect_body_version(reader, Self::NAME, FORMAT_VERSION)?;
        let mesh = reader.read_string()?;
        let material = reader.read_string()?;
        let flags = reader.read_u8()?;
        let render_order = reader.read_i32()?;

        self.mesh = mesh;
        self.material = material;
        self.cast_shadows = flags & FLAG_CAST_SHADOWS != 0;
        self.receive_shadows = flags & FLAG_RECEIVE_SHADOWS != 0;
        self.render_order = render_order;
        Ok(())
    }
}
