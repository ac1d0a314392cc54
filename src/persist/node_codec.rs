use glam::Quat;
use rustc_hash::FxHashSet;

use crate::errors::{Result, SceneError};
use crate::persist::chunk::{ChunkReader, ChunkWriter};
use crate::persist::{COMPONENTS_CHUNK, COMPONENTS_VERSION, GENERAL_CHUNK, GENERAL_VERSION};
use crate::scene::transform::{self, Transform};
use crate::scene::{NodeFlags, NodeHandle, NodeId, SceneGraph};

impl SceneGraph {
    /// Encodes one node (general attributes and modules) into a fresh buffer.
    pub fn serialize_node(&self, handle: NodeHandle) -> Result<Vec<u8>> {
        let mut writer = ChunkWriter::new();
        self.write_node(handle, &mut writer)?;
        Ok(writer.into_inner())
    }

    /// Appends the general and modules chunks of `handle` to `writer`.
    pub fn write_node(&self, handle: NodeHandle, writer: &mut ChunkWriter) -> Result<()> {
        let node = self.nodes.get(handle).ok_or(SceneError::StaleHandle)?;

        let general = writer.begin_chunk(GENERAL_CHUNK, GENERAL_VERSION);
        writer.write_u64(node.id.get());
        writer.write_str(&node.name)?;
        writer.write_vec3(node.transform.position);
        writer.write_quat(node.transform.rotation);
        writer.write_vec3(node.transform.scale);
        writer.write_u32(node.flags.bits());
        writer.end_chunk(general)?;

        let modules = writer.begin_chunk(COMPONENTS_CHUNK, COMPONENTS_VERSION);
        let count = u32::try_from(node.components.len())
            .map_err(|_| SceneError::ChunkTooLarge(node.components.len()))?;
        writer.write_u32(count);
        for component in node.components.iter() {
            writer.write_str(component.name())?;
            let body = writer.begin_length_prefixed();
            component.serialize(writer)?;
            writer.end_length_prefixed(body)?;
        }
        writer.end_chunk(modules)
    }

    /// Decodes a node record from `bytes` into the existing node `handle`.
    pub fn deserialize_node(&mut self, handle: NodeHandle, bytes: &[u8]) -> Result<()> {
        let mut reader = ChunkReader::new(bytes);
        self.read_node(handle, &mut reader)
    }

    /// Reads a general chunk and a modules chunk into `handle`.
    ///
    /// - Unknown general versions are skipped by length; the node keeps its
    ///   current attributes.
    /// - Modules are added or updated by name. Modules the node had before
    ///   the read but that are absent from the data are removed.
    /// - Module names no factory resolves are skipped by their body length.
    /// - A module whose own decoder fails is left attached and reported with
    ///   a warning; the read continues with the next module.
    /// - Every successfully decoded module then receives
    ///   `on_post_node_deserialized` with its siblings in view.
    ///
    /// The reader always ends after the two chunks, whatever was skipped.
    pub fn read_node(&mut self, handle: NodeHandle, reader: &mut ChunkReader<'_>) -> Result<()> {
        if !self.nodes.contains_key(handle) {
            return Err(SceneError::StaleHandle);
        }

        let header = reader.expect_header(GENERAL_CHUNK)?;
        let mut body = reader.sub_reader(header.length as usize)?;
        match header.version {
            GENERAL_VERSION => self.read_general_v1(handle, &mut body)?,
            version => log::warn!(
                "Skipping general chunk v{version} ({} bytes) for {handle:?}",
                header.length
            ),
        }

        let header = reader.expect_header(COMPONENTS_CHUNK)?;
        let mut body = reader.sub_reader(header.length as usize)?;
        match header.version {
            COMPONENTS_VERSION => self.read_components_v1(handle, &mut body)?,
            version => log::warn!(
                "Skipping modules chunk v{version} ({} bytes) for {handle:?}",
                header.length
            ),
        }
        Ok(())
    }

    fn read_general_v1(&mut self, handle: NodeHandle, body: &mut ChunkReader<'_>) -> Result<()> {
        // Decode everything before touching the node so a truncated body
        // leaves it as it was.
        let id = NodeId(body.read_u64()?);
        let name = body.read_string()?;
        let position = body.read_vec3()?;
        let rotation = body.read_quat()?;
        let scale = body.read_vec3()?;
        let flags = NodeFlags::from_bits_retain(body.read_u32()?);

        let rotation = transform::normalize_rotation(rotation).unwrap_or_else(|| {
            log::warn!("Degenerate rotation in data for {id}; using identity");
            Quat::IDENTITY
        });

        self.set_node_id(handle, id);
        self.set_name(handle, &name);
        self.set_local_transform(
            handle,
            &Transform {
                position,
                rotation,
                scale,
            },
        );
        self.set_flags(handle, flags);
        Ok(())
    }

    fn read_components_v1(&mut self, handle: NodeHandle, body: &mut ChunkReader<'_>) -> Result<()> {
        let previous = self.component_names(handle);
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut loaded: Vec<String> = Vec::new();

        let count = body.read_u32()?;
        for _ in 0..count {
            let name = body.read_string()?;
            let length = body.read_u32()? as usize;
            let mut module = body.sub_reader(length)?;
            seen.insert(name.clone());

            let Some(component) = self.add_component(handle, &name) else {
                log::debug!("Skipped {length} bytes of unresolved module '{name}'");
                continue;
            };
            match component.deserialize(&mut module) {
                Ok(()) => {
                    if !loaded.contains(&name) {
                        loaded.push(name);
                    }
                }
                Err(err) => log::warn!("Module '{name}' on {handle:?} failed to decode: {err}"),
            }
        }

        for name in previous.iter().filter(|name| !seen.contains(*name)) {
            self.remove_component(handle, name);
        }

        let Some(node) = self.nodes.get_mut(handle) else {
            return Ok(());
        };
        for name in &loaded {
            // Taken out so it can see its siblings without aliasing itself.
            let Some(mut component) = node.components.take(name) else {
                continue;
            };
            component.on_post_node_deserialized(&node.components);
            if let Err(rejected) = node.components.insert(component) {
                log::error!("Module '{}' could not be restored after post-load", rejected.name());
            }
        }
        Ok(())
    }
}
