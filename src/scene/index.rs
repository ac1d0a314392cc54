use crate::scene::{NodeHandle, NodeId, SceneGraph};

/// Sorted identifier → handle lookup table.
///
/// Entries are kept ordered by [`NodeId`] so identifier lookup is a binary
/// search. Name lookup is a linear scan because names are neither unique nor
/// part of the sort key.
///
/// The index does not own or track the nodes it points to. Whoever destroys
/// a node must also remove it here (or call [`retain_live`](Self::retain_live));
/// until then the entry is stale and lookups through the graph yield `None`.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    entries: Vec<(NodeId, NodeHandle)>,
}

impl NodeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn position(&self, id: NodeId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |&(entry_id, _)| entry_id)
    }

    /// Maps `id` to `handle`, returning the handle it replaced.
    pub fn insert(&mut self, id: NodeId, handle: NodeHandle) -> Option<NodeHandle> {
        match self.position(id) {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, handle)),
            Err(i) => {
                self.entries.insert(i, (id, handle));
                None
            }
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<NodeHandle> {
        self.position(id).ok().map(|i| self.entries.remove(i).1)
    }

    /// Removes every entry pointing at `handle`. Returns whether any existed.
    pub fn remove_handle(&mut self, handle: NodeHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&(_, h)| h != handle);
        self.entries.len() != before
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeHandle> {
        self.position(id).ok().map(|i| self.entries[i].1)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_ok()
    }

    /// First live node (in identifier order) called `name`.
    #[must_use]
    pub fn find_by_name(&self, graph: &SceneGraph, name: &str) -> Option<NodeHandle> {
        self.entries
            .iter()
            .map(|&(_, handle)| handle)
            .find(|&handle| graph.node(handle).is_some_and(|node| node.name() == name))
    }

    /// Every live node called `name`, in identifier order.
    #[must_use]
    pub fn find_all_by_name(&self, graph: &SceneGraph, name: &str) -> Vec<NodeHandle> {
        self.entries
            .iter()
            .map(|&(_, handle)| handle)
            .filter(|&handle| graph.node(handle).is_some_and(|node| node.name() == name))
            .collect()
    }

    /// Drops entries whose node is gone or whose node now carries a different
    /// identifier. Returns the number of entries removed.
    pub fn retain_live(&mut self, graph: &SceneGraph) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|&(id, handle)| graph.node(handle).is_some_and(|node| node.id() == id));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeHandle)> + '_ {
        self.entries.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<NodeHandle> {
        let mut map: SlotMap<NodeHandle, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn entries_stay_sorted_by_id() {
        let h = handles(3);
        let mut index = NodeIndex::new();
        index.insert(NodeId(30), h[0]);
        index.insert(NodeId(10), h[1]);
        index.insert(NodeId(20), h[2]);

        let ids: Vec<u64> = index.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(index.get(NodeId(20)), Some(h[2]));
    }

    #[test]
    fn insert_replaces_existing_id() {
        let h = handles(2);
        let mut index = NodeIndex::new();
        assert_eq!(index.insert(NodeId(5), h[0]), None);
        assert_eq!(index.insert(NodeId(5), h[1]), Some(h[0]));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(NodeId(5)), Some(h[1]));
    }

    #[test]
    fn remove_keeps_order() {
        let h = handles(3);
        let mut index = NodeIndex::new();
        for (i, handle) in h.iter().enumerate() {
            index.insert(NodeId(i as u64 + 1), *handle);
        }
        assert_eq!(index.remove(NodeId(2)), Some(h[1]));
        assert_eq!(index.remove(NodeId(2)), None);
        assert!(index.contains(NodeId(1)));
        assert!(index.contains(NodeId(3)));
        assert!(index.remove_handle(h[2]));
        assert_eq!(index.len(), 1);
    }
}
