use crate::component::{Component, ComponentSet, expect_body_version};
use crate::errors::{Result, SceneError};
use crate::persist::chunk::{ChunkReader, ChunkWriter};
use crate::scene::NodeHandle;

const FORMAT_VERSION: u32 = 1;

/// Editor-side bookkeeping for a node (notes, tags, lock/fold state).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorData {
    owner: NodeHandle,
    pub comment: String,
    pub tags: Vec<String>,
    /// Locked nodes cannot be picked in the viewport.
    pub locked: bool,
    /// Fold state in the hierarchy panel.
    pub expanded: bool,
    /// Names of the other modules on the node, shown by the inspector.
    /// Derived; never persisted.
    sibling_summary: Vec<String>,
}

impl EditorData {
    pub const NAME: &'static str = "EditorData";

    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        Self {
            owner,
            expanded: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[inline]
    #[must_use]
    pub fn sibling_summary(&self) -> &[String] {
        &self.sibling_summary
    }

    /// Rebuilds the sibling summary from `siblings`.
    pub fn refresh_summary(&mut self, siblings: &ComponentSet) {
        self.sibling_summary = siblings
            .iter()
            .map(|c| c.name())
            .filter(|name| *name != Self::NAME)
            .map(str::to_owned)
            .collect();
    }
}

impl Component for EditorData {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()> {
        writer.write_u32(FORMAT_VERSION);
        writer.write_str(&self.comment)?;
        writer.write_bool(self.locked);
        writer.write_bool(self.expanded);
        writer.write_u32(
            u32::try_from(self.tags.len()).map_err(|_| SceneError::ChunkTooLarge(self.tags.len()))?,
        );
        for tag in &self.tags {
            writer.write_str(tag)?;
        }
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        expect_body_version(reader, Self::NAME, FORMAT_VERSION)?;
        let comment = reader.read_string()?;
        let locked = reader.read_bool()?;
        let expanded = reader.read_bool()?;
        let count = reader.read_u32()? as usize;
        let tags = (0..count)
            .map(|_| reader.read_string())
            .collect::<Result<Vec<_>>>()?;

        self.comment = comment;
        self.locked = locked;
        self.expanded = expanded;
        self.tags = tags;
        Ok(())
    }

    fn on_post_node_deserialized(&mut self, siblings: &ComponentSet) {
        self.refresh_summary(siblings);
    }
}
