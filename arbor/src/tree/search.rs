use std::collections::HashSet;

use crate::error::TreeError;
use crate::model::{Node, NodeKey, StateFlag};

use super::Tree;

impl Tree {
    /// Show only the nodes matching `predicate` and their ancestors.
    ///
    /// Ancestors of matches are expanded; everything else is hidden.
    /// Soft-removed nodes never match. Returns the matches, pre-order.
    pub fn search(&mut self, mut predicate: impl FnMut(&Node) -> bool) -> Result<Vec<NodeKey>, TreeError> {
        let matches = self.model.flatten(None, |n| !n.removed() && predicate(n));
        let mut keep: HashSet<NodeKey> = matches.iter().copied().collect();
        let mut ancestors: HashSet<NodeKey> = HashSet::new();
        for key in &matches {
            ancestors.extend(self.model.ancestors(*key));
        }
        keep.extend(ancestors.iter().copied());

        self.batched(|tree| {
            for key in tree.model.descendants(None) {
                let kept = keep.contains(&key);
                tree.change_state(key, StateFlag::Hidden, !kept, true)?;
                if ancestors.contains(&key) {
                    tree.change_state(key, StateFlag::Collapsed, false, true)?;
                }
            }
            Ok(())
        })?;
        log::debug!("search matched {} nodes", matches.len());
        Ok(matches)
    }

    /// Show every node hidden by a search.
    pub fn clear_search(&mut self) -> Result<(), TreeError> {
        self.batched(|tree| {
            for key in tree.model.flatten(None, |n| n.hidden()) {
                tree.change_state(key, StateFlag::Hidden, false, true)?;
            }
            Ok(())
        })
    }
}
