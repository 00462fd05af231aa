//! Insertion and merge.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::error::TreeError;
use crate::event::TreeEvent;
use crate::model::{Children, ChildrenData, Node, NodeCollection, NodeData, NodeKey, StateFlag};

use super::Tree;

impl Tree {
    /// Insert `data` into the collection owned by `parent` (the root for
    /// `None`).
    ///
    /// With a sort configured the node goes to its sorted position,
    /// otherwise to the end. Data whose id already exists in the tree is
    /// merged into the existing node instead; see [`Tree::insert_at`].
    pub fn add_node(&mut self, parent: Option<NodeKey>, data: NodeData) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            let key = tree.insert_data(parent, data, None, true)?;
            tree.settle_parent(key)?;
            Ok(key)
        })
    }

    /// Insert `data` at `index` of the collection owned by `parent`.
    ///
    /// If a node with the same id exists anywhere in the tree it is updated
    /// in place: shown, restored when soft-removed (unless
    /// `restore_on_merge` is off), relabeled when the incoming text is not
    /// empty, and its children are extended with the incoming ones. No
    /// duplicate id is ever created.
    pub fn insert_at(
        &mut self,
        parent: Option<NodeKey>,
        index: usize,
        data: NodeData,
    ) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            let key = tree.insert_data(parent, data, Some(index), true)?;
            tree.settle_parent(key)?;
            Ok(key)
        })
    }

    /// Insert several nodes with a single render pass.
    pub fn add_nodes(
        &mut self,
        parent: Option<NodeKey>,
        nodes: Vec<NodeData>,
    ) -> Result<Vec<NodeKey>, TreeError> {
        self.batched(|tree| {
            let keys = nodes
                .into_iter()
                .map(|data| tree.insert_data(parent, data, None, true))
                .collect::<Result<Vec<_>, _>>()?;
            for key in &keys {
                tree.settle_parent(*key)?;
            }
            Ok(keys)
        })
    }

    /// Replace the whole tree with `nodes`.
    pub fn load(&mut self, nodes: Vec<NodeData>) -> Result<Vec<NodeKey>, TreeError> {
        self.batched(|tree| {
            tree.remove_all()?;
            tree.add_nodes(None, nodes)
        })
    }

    pub(crate) fn insert_data(
        &mut self,
        parent: Option<NodeKey>,
        data: NodeData,
        index: Option<usize>,
        announce: bool,
    ) -> Result<NodeKey, TreeError> {
        if let Some(parent) = parent {
            self.model.get(parent)?;
        }
        if let Some(existing) = data.id.as_deref().and_then(|id| self.model.key_of(id)) {
            log::trace!("merging into existing node {existing}");
            return self.merge(existing, data);
        }
        self.ensure_collection(parent)?;

        let state = data.initial_state();
        let NodeData {
            id,
            text,
            children,
            extra,
            ..
        } = data;
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut node = Node::new(id.clone(), text, parent);
        node.state = state;
        node.extra = extra;
        let key = self.model.alloc(node);

        match children {
            None => {}
            Some(ChildrenData::Unloaded) => self.model.get_mut(key)?.children = Children::Unloaded,
            Some(ChildrenData::Nodes(nodes)) => {
                self.model.get_mut(key)?.children = Children::Loaded(NodeCollection::new(Some(key)));
                for child in nodes {
                    self.insert_data(Some(key), child, None, false)?;
                }
            }
        }

        let position = match index {
            Some(index) => index,
            None => self.sorted_position(parent, key),
        };
        if let Some(collection) = self.model.collection_mut(parent) {
            collection.insert(position, key);
        }
        self.model.mark_dirty(key);

        if announce {
            self.emit_event(TreeEvent::NodeAdded { id });
        }
        Ok(key)
    }

    /// Bring the tri-state of `key`'s ancestors in line after an insert.
    pub(crate) fn settle_parent(&mut self, key: NodeKey) -> Result<(), TreeError> {
        if self.config.checkbox {
            self.refresh_indeterminate(self.model.parent_of(key))?;
        }
        Ok(())
    }

    fn merge(&mut self, existing: NodeKey, data: NodeData) -> Result<NodeKey, TreeError> {
        let NodeData {
            text,
            children,
            extra,
            ..
        } = data;

        if self.config.restore_on_merge
            && self.restore_node(existing)?
            && self.config.checkbox
        {
            self.refresh_indeterminate(self.model.parent_of(existing))?;
        }
        self.set_shown(existing, StateFlag::Hidden, false)?;
        if !text.is_empty() {
            self.replace_text(existing, text)?;
        }

        let node = self.model.get_mut(existing)?;
        node.extra.extend(extra);
        match children {
            Some(ChildrenData::Nodes(nodes)) => {
                if !matches!(node.children, Children::Loaded(_)) {
                    node.children = Children::Loaded(NodeCollection::new(Some(existing)));
                }
                for child in nodes {
                    self.insert_data(Some(existing), child, None, false)?;
                }
            }
            Some(ChildrenData::Unloaded) if matches!(node.children, Children::Absent) => {
                node.children = Children::Unloaded;
            }
            _ => {}
        }
        self.model.mark_dirty(existing);
        Ok(existing)
    }

    /// Make sure `parent` owns a collection that can take a new child.
    fn ensure_collection(&mut self, parent: Option<NodeKey>) -> Result<(), TreeError> {
        let Some(key) = parent else {
            return Ok(());
        };
        let node = self.model.get_mut(key)?;
        match node.children {
            Children::Loaded(_) => Ok(()),
            Children::Unloaded => Err(TreeError::ChildrenNotLoaded(node.id.clone())),
            Children::Absent => {
                node.children = Children::Loaded(NodeCollection::new(Some(key)));
                self.model.mark_dirty(key);
                Ok(())
            }
        }
    }

    /// First index whose member does not sort before `key`.
    fn sorted_position(&self, parent: Option<NodeKey>, key: NodeKey) -> usize {
        let members = self.model.child_keys(parent);
        let (Some(sort), Some(new)) = (&self.config.sort, self.model.node(key)) else {
            return members.len();
        };
        members
            .iter()
            .position(|member| {
                self.model
                    .node(*member)
                    .is_some_and(|existing| sort.compare(existing, new) != Ordering::Less)
            })
            .unwrap_or(members.len())
    }
}
