//! Node storage.
//!
//! Every node of a tree lives in one [`SlotMap`] owned by the tree.
//! Collections and parent links hold [`NodeKey`] handles, so removing a
//! subtree frees it outright and stale handles simply stop resolving.

mod collection;
mod data;
mod node;
mod state;

use std::collections::{HashMap, HashSet};
use std::fmt;

use slotmap::SlotMap;

pub use collection::NodeCollection;
pub use data::{ChildrenData, NodeData};
pub use node::{Children, Node};
pub use state::{NodeState, StateFlag};

use crate::error::TreeError;

slotmap::new_key_type! {
    /// Handle to a node of one tree.
    ///
    /// Handles are non-owning. A handle to a removed node never resolves
    /// again, even after its slot is reused.
    pub struct NodeKey;
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct Model {
    nodes: SlotMap<NodeKey, Node>,
    roots: NodeCollection,
    index: HashMap<String, NodeKey>,
    /// Dirty nodes not yet visited by a render pass.
    dirty: HashSet<NodeKey>,
    /// Freed keys whose render cache entries are still to be dropped.
    freed: Vec<NodeKey>,
}

impl Model {
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get(&self, key: NodeKey) -> Result<&Node, TreeError> {
        self.nodes.get(key).ok_or(TreeError::NodeNotFound(key))
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(key).ok_or(TreeError::NodeNotFound(key))
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn roots(&self) -> &NodeCollection {
        &self.roots
    }

    /// Collection owned by `context`, the root collection for `None`.
    pub fn collection(&self, context: Option<NodeKey>) -> Option<&NodeCollection> {
        match context {
            None => Some(&self.roots),
            Some(key) => self.nodes.get(key)?.children.collection(),
        }
    }

    pub fn collection_mut(&mut self, context: Option<NodeKey>) -> Option<&mut NodeCollection> {
        match context {
            None => Some(&mut self.roots),
            Some(key) => self.nodes.get_mut(key)?.children.collection_mut(),
        }
    }

    /// Members of the collection owned by `context`; empty when not loaded.
    pub fn child_keys(&self, context: Option<NodeKey>) -> &[NodeKey] {
        self.collection(context)
            .map(NodeCollection::keys)
            .unwrap_or_default()
    }

    pub fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Store a new node and register its id.
    pub fn alloc(&mut self, node: Node) -> NodeKey {
        let id = node.id.clone();
        let key = self.nodes.insert(node);
        self.index.insert(id, key);
        key
    }

    /// Free `key` and all of its descendants. The caller unlinks `key`
    /// from its collection.
    pub fn free_subtree(&mut self, key: NodeKey) -> usize {
        let mut stack = vec![key];
        let mut freed = 0;
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.remove(key) else {
                continue;
            };
            if self.index.get(&node.id) == Some(&key) {
                self.index.remove(&node.id);
            }
            self.dirty.remove(&key);
            self.freed.push(key);
            stack.extend(node.children.keys().iter().copied());
            freed += 1;
        }
        freed
    }

    /// Drop every node.
    pub fn clear(&mut self) -> usize {
        let roots = self.roots.take();
        roots.into_iter().map(|key| self.free_subtree(key)).sum()
    }

    /// Mark `key` dirty and propagate to its ancestors, stopping at the
    /// first ancestor that is already dirty.
    pub fn mark_dirty(&mut self, key: NodeKey) {
        let mut current = Some(key);
        while let Some(key) = current {
            let Some(node) = self.nodes.get_mut(key) else {
                return;
            };
            if node.dirty {
                return;
            }
            node.dirty = true;
            self.dirty.insert(key);
            current = node.parent;
        }
    }

    /// Mark every node dirty.
    pub fn mark_all_dirty(&mut self) {
        let keys: Vec<NodeKey> = self.descendants(None);
        for key in keys {
            if let Some(node) = self.nodes.get_mut(key) {
                node.dirty = true;
                self.dirty.insert(key);
            }
        }
    }

    pub fn clear_dirty(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.dirty = false;
        }
        self.dirty.remove(&key);
    }

    /// Dirty nodes left over after a render pass.
    pub fn take_dirty(&mut self) -> Vec<NodeKey> {
        self.dirty.drain().collect()
    }

    pub fn take_freed(&mut self) -> Vec<NodeKey> {
        std::mem::take(&mut self.freed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> Node {
        Node::new(id.to_string(), id.to_uppercase(), None)
    }

    #[test]
    fn test_stale_key_does_not_resolve_after_reuse() {
        let mut model = Model::default();
        let first = model.alloc(leaf("a"));
        assert_eq!(model.free_subtree(first), 1);

        let second = model.alloc(leaf("b"));
        assert_ne!(first, second);
        assert!(!model.contains(first));
        assert!(matches!(model.get(first), Err(TreeError::NodeNotFound(_))));
        assert_eq!(model.get(second).unwrap().id(), "b");
        assert_eq!(model.len(), 1);
        assert_eq!(model.take_freed(), vec![first]);
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut model = Model::default();
        let key = model.alloc(leaf("a"));
        model.free_subtree(key);
        assert_eq!(model.free_subtree(key), 0);
        assert_eq!(model.len(), 0);
        assert_eq!(model.key_of("a"), None);
    }
}
