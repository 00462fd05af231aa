//! Export, copy and clone.

use crate::error::TreeError;
use crate::model::{Children, ChildrenData, NodeData, NodeKey};

use super::Tree;

impl Tree {
    /// Detached snapshot of `key` and its subtree.
    ///
    /// Bookkeeping (dirty marks, parent links, render cache, `rendered` and
    /// `loading`) is left out; only flags that differ from import defaults
    /// are listed.
    pub fn export(&self, key: NodeKey) -> Result<NodeData, TreeError> {
        let node = self.model.get(key)?;
        let children = match &node.children {
            Children::Absent => None,
            Children::Unloaded => Some(ChildrenData::Unloaded),
            Children::Loaded(collection) => Some(ChildrenData::Nodes(
                collection
                    .iter()
                    .map(|child| self.export(child))
                    .collect::<Result<_, _>>()?,
            )),
        };
        Ok(NodeData {
            id: Some(node.id.clone()),
            text: node.text.clone(),
            children,
            state: NodeData::state_map(node.state),
            extra: node.extra.clone(),
        })
    }

    /// Snapshot of every root node.
    pub fn export_all(&self) -> Vec<NodeData> {
        self.model
            .roots()
            .iter()
            .filter_map(|key| self.export(key).ok())
            .collect()
    }

    /// Deep copy of the collection owned by `context`, detached from this
    /// tree.
    pub fn clone_collection(&self, context: Option<NodeKey>) -> Result<Vec<NodeData>, TreeError> {
        if let Some(key) = context {
            self.model.get(key)?;
        }
        self.model
            .child_keys(context)
            .iter()
            .map(|key| self.export(*key))
            .collect()
    }

    /// The subtree of `key` wrapped in its ancestor chain.
    ///
    /// Each ancestor is exported without its other children, so inserting
    /// the result elsewhere recreates the path down to `key`.
    pub fn copy_hierarchy(&self, key: NodeKey) -> Result<NodeData, TreeError> {
        let mut data = self.export(key)?;
        for parent in self.model.ancestors(key) {
            let mut wrapper = self.export_shallow(parent)?;
            wrapper.children = Some(ChildrenData::Nodes(vec![data]));
            data = wrapper;
        }
        Ok(data)
    }

    /// Copy `key` into `destination` under `parent`.
    ///
    /// With `with_hierarchy` the ancestor chain is copied too, merging
    /// into ancestors the destination already has. Returns the key of the
    /// copy in `destination`.
    pub fn copy_to(
        &self,
        key: NodeKey,
        destination: &mut Tree,
        parent: Option<NodeKey>,
        with_hierarchy: bool,
    ) -> Result<NodeKey, TreeError> {
        let id = self.model.get(key)?.id().to_string();
        let data = if with_hierarchy {
            self.copy_hierarchy(key)?
        } else {
            self.export(key)?
        };
        destination.add_node(parent, data)?;
        destination.lookup(&id)
    }

    fn export_shallow(&self, key: NodeKey) -> Result<NodeData, TreeError> {
        let node = self.model.get(key)?;
        Ok(NodeData {
            id: Some(node.id.clone()),
            text: node.text.clone(),
            children: None,
            state: NodeData::state_map(node.state),
            extra: node.extra.clone(),
        })
    }
}
