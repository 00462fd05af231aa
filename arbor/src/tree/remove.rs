//! Hard and soft removal.

use crate::error::TreeError;
use crate::event::TreeEvent;
use crate::model::{NodeData, NodeKey, StateFlag};

use super::Tree;

impl Tree {
    /// Remove a node and its subtree from the tree for good.
    ///
    /// Returns a detached export of the removed subtree. Handles to removed
    /// nodes stop resolving.
    pub fn remove(&mut self, key: NodeKey) -> Result<NodeData, TreeError> {
        let export = self.export(key)?;
        let parent = self.model.parent_of(key);

        self.batched(|tree| {
            if let Some(collection) = tree.model.collection_mut(parent) {
                collection.remove(key);
            }
            let freed = tree.model.free_subtree(key);
            log::trace!("freed {freed} nodes under {key}");

            if let Some(parent) = parent {
                tree.model.mark_dirty(parent);
                if tree.config.checkbox {
                    tree.refresh_indeterminate(Some(parent))?;
                }
            }
            tree.emit_event(TreeEvent::NodeRemoved {
                id: export.id.clone().unwrap_or_default(),
                export: export.clone(),
            });
            Ok(())
        })?;
        Ok(export)
    }

    /// Remove every node.
    pub fn remove_all(&mut self) -> Result<(), TreeError> {
        let exports = self.export_all();
        self.batched(|tree| {
            let freed = tree.model.clear();
            log::debug!("removed all {freed} nodes");
            for export in exports {
                tree.emit_event(TreeEvent::NodeRemoved {
                    id: export.id.clone().unwrap_or_default(),
                    export,
                });
            }
            Ok(())
        })
    }

    /// Flag a node as removed. It stays in its collection but is excluded
    /// from display and availability until restored.
    pub fn soft_remove(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.set_shown(key, StateFlag::Removed, true)
    }

    /// Undo [`soft_remove`](Self::soft_remove).
    pub fn restore(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            if tree.restore_node(key)? && tree.config.checkbox {
                tree.refresh_indeterminate(tree.model.parent_of(key))?;
            }
            Ok(key)
        })
    }

    /// Clear `removed`, resetting selection, focus and expansion when
    /// configured to. Returns whether the node was removed.
    pub(crate) fn restore_node(&mut self, key: NodeKey) -> Result<bool, TreeError> {
        if !self.change_state(key, StateFlag::Removed, false, true)? {
            return Ok(false);
        }
        if self.config.reset_state_on_restore {
            self.change_state(key, StateFlag::Selected, false, true)?;
            self.change_state(key, StateFlag::Indeterminate, false, false)?;
            self.change_state(key, StateFlag::Focused, false, true)?;
            self.change_state(key, StateFlag::Collapsed, true, true)?;
        }
        Ok(true)
    }
}
