//! Read-only queries.

use crate::error::TreeError;
use crate::model::{Node, NodeCollection, NodeKey, StateFlag};
use crate::traverse::Walk;

use super::Tree;

impl Tree {
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.model.node(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&Node, TreeError> {
        self.model.get(key)
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.model.key_of(id)
    }

    /// Key of the node with `id`, or [`TreeError::UnknownId`].
    pub fn lookup(&self, id: &str) -> Result<NodeKey, TreeError> {
        self.model
            .key_of(id)
            .ok_or_else(|| TreeError::UnknownId(id.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.model.key_of(id).and_then(|key| self.model.node(key))
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.model.contains(key)
    }

    /// Number of nodes, soft-removed ones included.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.len() == 0
    }

    pub fn roots(&self) -> &NodeCollection {
        self.model.roots()
    }

    /// Loaded children of `key`; empty for leaves and unloaded nodes.
    pub fn children(&self, key: NodeKey) -> Result<&[NodeKey], TreeError> {
        Ok(self.model.get(key)?.children().keys())
    }

    /// The collection `key` belongs to.
    pub fn context(&self, key: NodeKey) -> Result<&NodeCollection, TreeError> {
        let parent = self.model.get(key)?.parent();
        self.model
            .collection(parent)
            .ok_or(TreeError::NodeNotFound(key))
    }

    /// Not hidden or removed, with every ancestor expanded and visible.
    pub fn visible(&self, key: NodeKey) -> Result<bool, TreeError> {
        self.model.get(key)?;
        Ok(self.model.is_visible(key))
    }

    /// Neither the node nor any ancestor is hidden or removed.
    pub fn available(&self, key: NodeKey) -> Result<bool, TreeError> {
        self.model.get(key)?;
        Ok(self.model.is_available(key))
    }

    /// Number of ancestors.
    pub fn depth(&self, key: NodeKey) -> Result<usize, TreeError> {
        Ok(self.parents(key)?.len())
    }

    /// Ancestors, nearest first.
    pub fn parents(&self, key: NodeKey) -> Result<Vec<NodeKey>, TreeError> {
        self.model.get(key)?;
        Ok(self.model.ancestors(key))
    }

    /// Position of `key` in each collection from the root down.
    pub fn index_path(&self, key: NodeKey) -> Result<Vec<usize>, TreeError> {
        let mut path = Vec::new();
        let mut current = Some(key);
        while let Some(key) = current {
            let parent = self.model.get(key)?.parent();
            let index = self
                .model
                .collection(parent)
                .and_then(|c| c.position(key))
                .ok_or(TreeError::NodeNotFound(key))?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Ok(path)
    }

    pub fn selected(&self) -> Vec<NodeKey> {
        self.nodes_with(StateFlag::Selected)
    }

    /// Nodes with `flag` set, pre-order.
    pub fn nodes_with(&self, flag: StateFlag) -> Vec<NodeKey> {
        self.model.flatten(None, |n| n.is(flag))
    }

    /// Visible nodes in display order.
    pub fn visible_nodes(&self) -> Vec<NodeKey> {
        self.model.visible_order()
    }

    /// Available nodes, pre-order.
    pub fn available_nodes(&self) -> Vec<NodeKey> {
        self.model.available_order()
    }

    /// Every node matching `predicate`, pre-order.
    pub fn flatten(&self, predicate: impl FnMut(&Node) -> bool) -> Vec<NodeKey> {
        self.model.flatten(None, predicate)
    }

    /// Direct members of the collection owned by `context` that match.
    pub fn filter(
        &self,
        context: Option<NodeKey>,
        predicate: impl FnMut(&Node) -> bool,
    ) -> Vec<NodeKey> {
        self.model.filter(context, predicate)
    }

    /// Visit `key` and all of its descendants, pre-order.
    pub fn recurse_down(
        &self,
        key: NodeKey,
        visitor: impl FnMut(NodeKey, &Node),
    ) -> Result<(), TreeError> {
        self.model.get(key)?;
        self.model.recurse_down(key, visitor);
        Ok(())
    }

    /// Visit `key` and then each ancestor until the visitor stops.
    /// Returns false if it stopped early.
    pub fn recurse_up(
        &self,
        key: NodeKey,
        visitor: impl FnMut(NodeKey, &Node) -> Walk,
    ) -> Result<bool, TreeError> {
        self.model.get(key)?;
        Ok(self.model.recurse_up(key, visitor))
    }

    pub fn first_visible(&self) -> Option<NodeKey> {
        self.model.visible_order().first().copied()
    }

    pub fn last_visible(&self) -> Option<NodeKey> {
        self.model.visible_order().last().copied()
    }

    /// The visible node displayed after `key`.
    pub fn next_visible(&self, key: NodeKey) -> Option<NodeKey> {
        let order = self.model.visible_order();
        let index = order.iter().position(|k| *k == key)?;
        order.get(index + 1).copied()
    }

    /// The visible node displayed before `key`.
    pub fn previous_visible(&self, key: NodeKey) -> Option<NodeKey> {
        let order = self.model.visible_order();
        let index = order.iter().position(|k| *k == key)?;
        index.checked_sub(1).and_then(|i| order.get(i).copied())
    }
}
