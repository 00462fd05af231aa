//! State flags and selection.

use std::collections::HashSet;

use crate::error::TreeError;
use crate::event::TreeEvent;
use crate::model::{NodeKey, StateFlag};

use super::Tree;

impl Tree {
    /// Run `op` inside a batch so it renders once, even when it fails halfway.
    pub(crate) fn batched<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, TreeError>,
    ) -> Result<T, TreeError> {
        self.batch();
        let result = op(self);
        self.end();
        result
    }

    /// Set a flag, mark the node dirty and notify. Returns false when the
    /// flag already had `value`.
    ///
    /// `announce` also emits the verb notification of the transition
    /// (`node.selected`, `node.expanded`, ...).
    pub(crate) fn change_state(
        &mut self,
        key: NodeKey,
        flag: StateFlag,
        value: bool,
        announce: bool,
    ) -> Result<bool, TreeError> {
        let node = self.model.get_mut(key)?;
        let old = node.state.contains(flag.bit());
        if old == value {
            return Ok(false);
        }
        node.state.set(flag.bit(), value);
        let id = node.id.clone();
        self.model.mark_dirty(key);

        self.events.emit(TreeEvent::NodeStateChanged {
            id: id.clone(),
            flag,
            old,
            new: value,
        });
        if announce {
            if let Some(event) = TreeEvent::for_transition(flag, value, id) {
                self.events.emit(event);
            }
        }
        Ok(true)
    }

    pub fn state(&self, key: NodeKey, flag: StateFlag) -> Result<bool, TreeError> {
        Ok(self.model.get(key)?.is(flag))
    }

    /// Write a single flag without enforcing any cross-node rule.
    pub fn set_state(&mut self, key: NodeKey, flag: StateFlag, value: bool) -> Result<bool, TreeError> {
        self.batched(|tree| tree.change_state(key, flag, value, false))
    }

    // Selection

    /// Select a node.
    ///
    /// Unselectable nodes are left alone. In single selection every other
    /// node is deselected first, even when `key` already was selected.
    /// With `auto_select_children` all selectable descendants are selected
    /// too, and in checkbox mode the ancestors' tri-state is recomputed.
    pub fn select(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        let node = self.model.get(key)?;
        if !node.selectable() {
            return Ok(key);
        }
        let stray = if self.config.can_auto_deselect() {
            self.stray_selection(key)
        } else {
            Vec::new()
        };
        if self.model.get(key)?.selected() && stray.is_empty() {
            return Ok(key);
        }

        self.batched(|tree| {
            for other in stray {
                tree.change_state(other, StateFlag::Selected, false, true)?;
            }

            tree.change_state(key, StateFlag::Selected, true, true)?;
            tree.change_state(key, StateFlag::Indeterminate, false, false)?;
            if tree.config.selection.auto_select_children {
                tree.select_descendants(key)?;
            }
            if tree.config.checkbox {
                tree.refresh_indeterminate(tree.model.parent_of(key))?;
            }
            Ok(key)
        })
    }

    /// Deselect a node.
    ///
    /// A no-op for unselected nodes, and for the last selected node when
    /// selection is required.
    pub fn deselect(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        if !self.model.get(key)?.selected() {
            return Ok(key);
        }
        if self.config.selection.require && self.selected().len() <= 1 {
            log::trace!("keeping {key} selected: selection is required");
            return Ok(key);
        }

        self.batched(|tree| {
            tree.change_state(key, StateFlag::Selected, false, true)?;
            if tree.config.selection.auto_select_children {
                tree.deselect_descendants(key)?;
            }
            if tree.config.checkbox {
                tree.refresh_indeterminate(tree.model.parent_of(key))?;
            }
            Ok(key)
        })
    }

    /// Select or deselect. With `disable_direct_deselection` a selected
    /// node stays selected.
    pub fn toggle_select(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        if !self.model.get(key)?.selected() {
            return self.select(key);
        }
        if self.config.selection.disable_direct_deselection {
            return Ok(key);
        }
        self.deselect(key)
    }

    /// Deselect every node, ignoring `require`.
    pub fn clear_selection(&mut self) -> Result<(), TreeError> {
        self.batched(|tree| {
            for key in tree.model.flatten(None, |n| n.selected() || n.indeterminate()) {
                tree.change_state(key, StateFlag::Selected, false, true)?;
                tree.change_state(key, StateFlag::Indeterminate, false, false)?;
            }
            Ok(())
        })
    }

    /// Select every selectable node of a collection and its descendants.
    pub fn select_deep(&mut self, context: Option<NodeKey>) -> Result<(), TreeError> {
        self.batched(|tree| {
            for key in tree.model.descendants(context) {
                if tree.model.get(key)?.selectable() {
                    tree.change_state(key, StateFlag::Selected, true, true)?;
                }
                tree.change_state(key, StateFlag::Indeterminate, false, false)?;
            }
            if tree.config.checkbox {
                tree.refresh_indeterminate(context)?;
            }
            Ok(())
        })
    }

    /// Deselect every node of a collection and its descendants.
    pub fn deselect_deep(&mut self, context: Option<NodeKey>) -> Result<(), TreeError> {
        self.batched(|tree| {
            for key in tree.model.descendants(context) {
                tree.change_state(key, StateFlag::Selected, false, true)?;
                tree.change_state(key, StateFlag::Indeterminate, false, false)?;
            }
            if tree.config.checkbox {
                tree.refresh_indeterminate(context)?;
            }
            Ok(())
        })
    }

    /// Selected nodes that single selection of `key` has to clear. The
    /// descendants `key` selects itself are kept.
    fn stray_selection(&self, key: NodeKey) -> Vec<NodeKey> {
        let kept: HashSet<NodeKey> = if self.config.selection.auto_select_children {
            self.model.descendants(Some(key)).into_iter().collect()
        } else {
            HashSet::new()
        };
        self.model
            .flatten(None, |n| n.selected())
            .into_iter()
            .filter(|other| *other != key && !kept.contains(other))
            .collect()
    }

    fn select_descendants(&mut self, key: NodeKey) -> Result<(), TreeError> {
        for child in self.model.descendants(Some(key)) {
            if self.model.get(child)?.selectable() {
                self.change_state(child, StateFlag::Selected, true, true)?;
            }
            self.change_state(child, StateFlag::Indeterminate, false, false)?;
        }
        Ok(())
    }

    fn deselect_descendants(&mut self, key: NodeKey) -> Result<(), TreeError> {
        for child in self.model.descendants(Some(key)) {
            self.change_state(child, StateFlag::Selected, false, true)?;
            self.change_state(child, StateFlag::Indeterminate, false, false)?;
        }
        Ok(())
    }

    /// Recompute tri-state selection from `start` up to the root.
    ///
    /// Only available children count. A selectable node is selected iff
    /// all of them are; it is indeterminate iff it is not, yet some child
    /// is selected or indeterminate. Nodes without available children keep
    /// their own state.
    pub(crate) fn refresh_indeterminate(&mut self, start: Option<NodeKey>) -> Result<(), TreeError> {
        let mut current = start;
        while let Some(key) = current {
            let node = self.model.get(key)?;
            current = node.parent;
            let selectable = node.selectable();

            let children = self.model.filter(Some(key), |n| n.shown());
            if children.is_empty() {
                continue;
            }
            let mut all = true;
            let mut any = false;
            for child in children {
                let child = self.model.get(child)?;
                all &= child.selected();
                any |= child.selected() || child.indeterminate();
            }

            if selectable {
                self.change_state(key, StateFlag::Selected, all, true)?;
            }
            self.change_state(key, StateFlag::Indeterminate, !all && any, false)?;
        }
        Ok(())
    }

    // Visibility, focus, editing

    pub fn hide(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.set_shown(key, StateFlag::Hidden, true)
    }

    pub fn show(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.set_shown(key, StateFlag::Hidden, false)
    }

    /// Flip a flag that takes the node out of its parent's available
    /// children, keeping the parent's tri-state consistent.
    pub(crate) fn set_shown(&mut self, key: NodeKey, flag: StateFlag, value: bool) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            if tree.change_state(key, flag, value, true)? && tree.config.checkbox {
                tree.refresh_indeterminate(tree.model.parent_of(key))?;
            }
            Ok(key)
        })
    }

    /// Focus a node, blurring the previously focused one.
    pub fn focus(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        if self.model.get(key)?.focused() {
            return Ok(key);
        }
        self.batched(|tree| {
            for other in tree.model.flatten(None, |n| n.focused()) {
                tree.change_state(other, StateFlag::Focused, false, true)?;
            }
            tree.change_state(key, StateFlag::Focused, true, true)?;
            Ok(key)
        })
    }

    pub fn blur(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            tree.change_state(key, StateFlag::Focused, false, true)?;
            Ok(key)
        })
    }

    /// Currently focused node.
    pub fn focused(&self) -> Option<NodeKey> {
        self.model.flatten(None, |n| n.focused()).into_iter().next()
    }

    pub fn set_editing(&mut self, key: NodeKey, editing: bool) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            tree.change_state(key, StateFlag::Editing, editing, false)?;
            Ok(key)
        })
    }

    /// Change a node's label.
    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) -> Result<NodeKey, TreeError> {
        let text = text.into();
        self.batched(|tree| {
            tree.replace_text(key, text)?;
            Ok(key)
        })
    }

    pub(crate) fn replace_text(&mut self, key: NodeKey, text: String) -> Result<bool, TreeError> {
        let node = self.model.get_mut(key)?;
        if node.text == text {
            return Ok(false);
        }
        let old = std::mem::replace(&mut node.text, text.clone());
        let id = node.id.clone();
        self.model.mark_dirty(key);
        self.events.emit(TreeEvent::NodePropertyChanged {
            id,
            property: "text",
            old,
            new: text,
        });
        Ok(true)
    }
}
