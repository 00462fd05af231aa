//! Depth-first walks over the node model.
//!
//! Downward walks are pre-order in collection order. Walks use an explicit
//! stack, so arbitrarily deep trees cannot overflow.

use crate::model::{Model, Node, NodeKey};

/// Visitor signal for walks that can stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

impl Model {
    /// Every node below `context` (the whole tree for `None`), pre-order.
    pub(crate) fn descendants(&self, context: Option<NodeKey>) -> Vec<NodeKey> {
        self.flatten(context, |_| true)
    }

    /// Nodes below `context` matching `predicate`, pre-order. Non-matching
    /// nodes are still descended into.
    pub(crate) fn flatten(
        &self,
        context: Option<NodeKey>,
        mut predicate: impl FnMut(&Node) -> bool,
    ) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.walk_from(self.child_keys(context), |key, node| {
            if predicate(node) {
                out.push(key);
            }
            true
        });
        out
    }

    /// Direct members of the collection owned by `context` that match.
    pub(crate) fn filter(
        &self,
        context: Option<NodeKey>,
        mut predicate: impl FnMut(&Node) -> bool,
    ) -> Vec<NodeKey> {
        self.child_keys(context)
            .iter()
            .copied()
            .filter(|key| self.node(*key).is_some_and(&mut predicate))
            .collect()
    }

    /// Visit `key` and then all of its descendants.
    pub(crate) fn recurse_down(&self, key: NodeKey, mut visitor: impl FnMut(NodeKey, &Node)) {
        self.walk_from(&[key], |key, node| {
            visitor(key, node);
            true
        });
    }

    /// Visit `key`, then its parent, grandparent and so on until the
    /// visitor stops. Returns false if the visitor stopped the ascent.
    pub(crate) fn recurse_up(
        &self,
        key: NodeKey,
        mut visitor: impl FnMut(NodeKey, &Node) -> Walk,
    ) -> bool {
        let mut current = Some(key);
        while let Some(key) = current {
            let Some(node) = self.node(key) else {
                break;
            };
            if visitor(key, node) == Walk::Stop {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Ancestors of `key`, nearest first.
    pub(crate) fn ancestors(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut current = self.parent_of(key);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// Not hidden, not removed, and every ancestor is expanded and visible.
    pub(crate) fn is_visible(&self, key: NodeKey) -> bool {
        let mut first = true;
        self.recurse_up(key, |_, node| {
            let ok = node.shown() && (first || !node.collapsed());
            first = false;
            if ok { Walk::Continue } else { Walk::Stop }
        })
    }

    /// No ancestor-or-self is hidden or removed.
    pub(crate) fn is_available(&self, key: NodeKey) -> bool {
        self.recurse_up(key, |_, node| {
            if node.shown() { Walk::Continue } else { Walk::Stop }
        })
    }

    /// Visible nodes in display order.
    pub(crate) fn visible_order(&self) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.walk_from(self.roots().keys(), |key, node| {
            if !node.shown() {
                return false;
            }
            out.push(key);
            !node.collapsed()
        });
        out
    }

    /// Available nodes in pre-order.
    pub(crate) fn available_order(&self) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.walk_from(self.roots().keys(), |key, node| {
            if !node.shown() {
                return false;
            }
            out.push(key);
            true
        });
        out
    }

    /// Pre-order walk; the visitor returns whether to descend.
    fn walk_from(&self, start: &[NodeKey], mut visit: impl FnMut(NodeKey, &Node) -> bool) {
        let mut stack: Vec<NodeKey> = start.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            let Some(node) = self.node(key) else {
                continue;
            };
            if visit(key, node) {
                stack.extend(node.children.keys().iter().rev().copied());
            }
        }
    }
}
