use crate::errors::{Result, SceneError};
use crate::persist::chunk::{ChunkMark, ChunkReader, ChunkWriter};
use crate::persist::{CHILDREN_CHUNK, CHILDREN_VERSION};
use crate::scene::{NodeHandle, NodeIndex, SceneGraph};

/// What happens to persisted node identifiers on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Keep the identifiers from the data. Loading the same data twice into
    /// one graph yields duplicate identifiers.
    #[default]
    Preserve,
    /// Give every loaded node a fresh identifier.
    Regenerate,
}

/// Result of [`SceneGraph::load_subtree`].
#[derive(Debug, Clone)]
pub struct LoadedSubtree {
    pub root: NodeHandle,
    /// Persisted identifier → handle of the node created for it, for
    /// resolving references stored inside module data.
    pub index: NodeIndex,
}

enum SaveStep {
    Enter(NodeHandle),
    Close(ChunkMark),
}

impl SceneGraph {
    /// Encodes `root` and its subtree.
    ///
    /// Descendants flagged `NO_SERIALIZATION` are left out together with
    /// their own subtrees. `root` itself is always written.
    pub fn save_subtree(&self, root: NodeHandle) -> Result<Vec<u8>> {
        if !self.nodes.contains_key(root) {
            return Err(SceneError::StaleHandle);
        }

        let mut writer = ChunkWriter::new();
        let mut steps = vec![SaveStep::Enter(root)];

        while let Some(step) = steps.pop() {
            match step {
                SaveStep::Enter(handle) => {
                    self.write_node(handle, &mut writer)?;

                    let kids: Vec<NodeHandle> = self
                        .children(handle)
                        .filter(|&c| self.nodes[c].is_serializable())
                        .collect();
                    let mark = writer.begin_chunk(CHILDREN_CHUNK, CHILDREN_VERSION);
                    let count =
                        u32::try_from(kids.len()).map_err(|_| SceneError::ChunkTooLarge(kids.len()))?;
                    writer.write_u32(count);

                    steps.push(SaveStep::Close(mark));
                    steps.extend(kids.into_iter().rev().map(SaveStep::Enter));
                }
                SaveStep::Close(mark) => writer.end_chunk(mark)?,
            }
        }

        log::debug!("Saved subtree {root:?}: {} bytes", writer.len());
        Ok(writer.into_inner())
    }

    /// Rebuilds a subtree written by [`save_subtree`](Self::save_subtree).
    ///
    /// The new root is attached under `parent` (joining its scene) when one
    /// is given. On error every node created so far is destroyed again and
    /// the graph is left as it was.
    pub fn load_subtree(
        &mut self,
        bytes: &[u8],
        parent: Option<NodeHandle>,
        policy: IdPolicy,
    ) -> Result<LoadedSubtree> {
        let mut created = Vec::new();
        match self.load_records(bytes, parent, policy, &mut created) {
            Ok(loaded) => {
                log::debug!("Loaded subtree of {} nodes", created.len());
                Ok(loaded)
            }
            Err(err) => {
                for &handle in created.iter().rev() {
                    self.destroy_node(handle);
                }
                Err(err)
            }
        }
    }

    fn load_records(
        &mut self,
        bytes: &[u8],
        parent: Option<NodeHandle>,
        policy: IdPolicy,
        created: &mut Vec<NodeHandle>,
    ) -> Result<LoadedSubtree> {
        if parent.is_some_and(|p| !self.nodes.contains_key(p)) {
            return Err(SceneError::StaleHandle);
        }

        let mut reader = ChunkReader::new(bytes);
        let mut index = NodeIndex::new();
        let mut root = None;
        // (parent of the next record, records still to read at this level)
        let mut levels: Vec<(Option<NodeHandle>, u32)> = vec![(parent, 1)];

        while let Some(level) = levels.last_mut() {
            if level.1 == 0 {
                levels.pop();
                continue;
            }
            level.1 -= 1;
            let parent = level.0;

            let handle = self.create_node();
            created.push(handle);
            self.read_node(handle, &mut reader)?;

            if let Some(id) = self.nodes.get(handle).map(|n| n.id) {
                index.insert(id, handle);
            }
            if policy == IdPolicy::Regenerate {
                self.regenerate_id(handle);
            }
            if let Some(parent) = parent {
                self.attach_child(parent, handle, false);
            }
            root.get_or_insert(handle);

            let header = reader.expect_header(CHILDREN_CHUNK)?;
            if header.version == CHILDREN_VERSION {
                let count = reader.read_u32()?;
                levels.push((Some(handle), count));
            } else {
                log::warn!(
                    "Skipping children chunk v{} ({} bytes) under {handle:?}",
                    header.version,
                    header.length
                );
                reader.skip(header.length as usize)?;
            }
        }

        let root = root.ok_or(SceneError::UnexpectedEof {
            needed: 1,
            remaining: 0,
        })?;
        Ok(LoadedSubtree { root, index })
    }
}
