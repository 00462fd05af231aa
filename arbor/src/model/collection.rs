use super::NodeKey;

/// Ordered members of one structural context: a parent node, or the root.
///
/// Holds handles only; the nodes themselves live in the tree's slot map.
/// Deep copies go through [`Tree::clone_collection`](crate::Tree::clone_collection).
#[derive(Debug, Default)]
pub struct NodeCollection {
    context: Option<NodeKey>,
    keys: Vec<NodeKey>,
}

impl NodeCollection {
    pub(crate) fn new(context: Option<NodeKey>) -> Self {
        Self {
            context,
            keys: Vec::new(),
        }
    }

    /// Owning node, or `None` for the root collection.
    pub fn context(&self) -> Option<NodeKey> {
        self.context
    }

    pub fn keys(&self) -> &[NodeKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeKey> {
        self.keys.get(index).copied()
    }

    pub fn position(&self, key: NodeKey) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.keys.iter().copied()
    }

    pub(crate) fn insert(&mut self, index: usize, key: NodeKey) {
        let index = index.min(self.keys.len());
        self.keys.insert(index, key);
    }

    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<usize> {
        let index = self.position(key)?;
        self.keys.remove(index);
        Some(index)
    }

    pub(crate) fn take(&mut self) -> Vec<NodeKey> {
        std::mem::take(&mut self.keys)
    }
}
