//! Expansion and dynamic loading.

use crate::error::{LoadError, TreeError};
use crate::event::TreeEvent;
use crate::loader::{LoadHandle, LoadOutcome};
use crate::model::{Children, NodeCollection, NodeData, NodeKey, StateFlag};

use super::Tree;

impl Tree {
    /// Expand a node, showing it if it was hidden.
    ///
    /// Expanding a node with unloaded children starts a load. The returned
    /// handle resolves when the children are in place, and is already
    /// resolved when nothing had to load or the loader answered at once.
    /// Leaves and nodes with no children are left alone.
    pub fn expand(&mut self, key: NodeKey) -> Result<LoadHandle, TreeError> {
        let node = self.model.get(key)?;
        if !node.has_children() {
            return Ok(LoadHandle::done());
        }
        let toggle = node.collapsed() || node.hidden();
        let unloaded = node.children.is_unloaded();
        let loading = node.loading();

        if toggle {
            self.batched(|tree| {
                tree.change_state(key, StateFlag::Hidden, false, true)?;
                tree.change_state(key, StateFlag::Collapsed, false, true)?;
                Ok(())
            })?;
        }

        match (unloaded, loading) {
            (true, false) => self.load_children(key),
            (true, true) => Ok(self.loads.wait(Some(key))),
            _ => Ok(LoadHandle::done()),
        }
    }

    /// Collapse a node. Children stay in place.
    pub fn collapse(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.batched(|tree| {
            tree.change_state(key, StateFlag::Collapsed, true, true)?;
            Ok(key)
        })
    }

    pub fn toggle_collapse(&mut self, key: NodeKey) -> Result<LoadHandle, TreeError> {
        if self.model.get(key)?.collapsed() {
            self.expand(key)
        } else {
            self.collapse(key)?;
            Ok(LoadHandle::done())
        }
    }

    /// Expand every node of a collection and its descendants.
    ///
    /// Loaded nodes expand in one batch; unloaded ones then start loading
    /// and their handles are returned.
    pub fn expand_deep(&mut self, context: Option<NodeKey>) -> Result<Vec<LoadHandle>, TreeError> {
        let mut unloaded = Vec::new();
        self.batched(|tree| {
            for key in tree.model.descendants(context) {
                let node = tree.model.get(key)?;
                if !node.has_children() {
                    continue;
                }
                if node.children.is_unloaded() && !node.loading() {
                    unloaded.push(key);
                }
                tree.change_state(key, StateFlag::Collapsed, false, true)?;
            }
            Ok(())
        })?;
        unloaded.into_iter().map(|key| self.load_children(key)).collect()
    }

    /// Collapse every node with children in a collection and below.
    pub fn collapse_deep(&mut self, context: Option<NodeKey>) -> Result<(), TreeError> {
        self.batched(|tree| {
            for key in tree.model.flatten(context, |n| n.has_children()) {
                tree.change_state(key, StateFlag::Collapsed, true, true)?;
            }
            Ok(())
        })
    }

    /// Expand and show every ancestor so that `key` can be seen.
    pub fn expand_parents(&mut self, key: NodeKey) -> Result<NodeKey, TreeError> {
        self.model.get(key)?;
        self.batched(|tree| {
            for parent in tree.model.ancestors(key) {
                tree.change_state(parent, StateFlag::Hidden, false, true)?;
                tree.change_state(parent, StateFlag::Collapsed, false, true)?;
            }
            Ok(key)
        })
    }

    /// Fetch the unloaded children of `key` through the data loader.
    ///
    /// Fails with [`TreeError::LoadInProgress`] while a fetch for the same
    /// node is in flight. Already loaded children resolve at once.
    pub fn load_children(&mut self, key: NodeKey) -> Result<LoadHandle, TreeError> {
        let node = self.model.get(key)?;
        match node.children {
            Children::Absent => return Err(TreeError::NoChildren(node.id.clone())),
            Children::Loaded(_) => return Ok(LoadHandle::done()),
            Children::Unloaded => {}
        }
        if node.loading() {
            return Err(TreeError::LoadInProgress(node.id.clone()));
        }
        let id = node.id.clone();
        let loader = self.loader.clone().ok_or(TreeError::NoLoader)?;

        self.batched(|tree| tree.change_state(key, StateFlag::Loading, true, false))?;
        log::debug!("loading children of '{id}'");
        let (request, handle) = self.loads.start(Some(key), Some(id));
        loader.load(request);
        self.process_loads();
        Ok(handle)
    }

    /// Replace the root collection with data fetched through the loader.
    pub fn reload(&mut self) -> Result<LoadHandle, TreeError> {
        let loader = self.loader.clone().ok_or(TreeError::NoLoader)?;
        if self.loads.root_loading() {
            return Err(TreeError::LoadInProgress("root".to_string()));
        }
        self.remove_all()?;
        log::debug!("reloading root collection");
        let (request, handle) = self.loads.start(None, None);
        loader.load(request);
        self.process_loads();
        Ok(handle)
    }

    /// Apply every load answer received so far. Returns how many were applied.
    ///
    /// Call this after a loader answered outside of the triggering call,
    /// e.g. from an event loop once a fetch completed.
    pub fn process_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.loads.next_outcome() {
            self.finish_load(outcome);
            applied += 1;
        }
        applied
    }

    fn finish_load(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { target, result } = outcome;
        let Some(key) = target else {
            self.finish_root_load(result);
            return;
        };

        let Some(node) = self.model.node(key) else {
            log::debug!("dropping load result for {key}: node removed");
            self.loads.abandon(Some(key));
            return;
        };
        let id = node.id.clone();
        if !node.children.is_unloaded() {
            // Children arrived through a merge while the fetch was running.
            log::debug!("dropping load result for '{id}': children already loaded");
            let settled = self.batched(|tree| tree.change_state(key, StateFlag::Loading, false, false));
            if let Err(err) = settled {
                log::warn!("settling load of '{id}' failed: {err}");
            }
            self.loads.finish(Some(key), Ok(()));
            return;
        }

        let inherit_selection = self.config.selection.auto_select_children
            && self.model.get(key).is_ok_and(|node| node.selected());
        let outcome = self.batched(|tree| {
            tree.change_state(key, StateFlag::Loading, false, false)?;
            tree.model.get_mut(key)?.children = Children::Loaded(NodeCollection::new(Some(key)));
            tree.model.mark_dirty(key);

            match result {
                Ok(nodes) => {
                    let count = nodes.len();
                    tree.insert_loaded(Some(key), nodes)?;
                    if inherit_selection {
                        tree.select_deep(Some(key))?;
                    } else if tree.config.checkbox {
                        tree.refresh_indeterminate(Some(key))?;
                    }
                    log::debug!("loaded {count} children of '{id}'");
                    tree.emit_event(TreeEvent::ChildrenLoaded {
                        id: Some(id.clone()),
                        count,
                    });
                    Ok(Ok(()))
                }
                Err(error) => Ok(tree.load_failed(Some(id.clone()), error)),
            }
        });

        let result = outcome.unwrap_or_else(|err| {
            log::warn!("applying children of '{id}' failed: {err}");
            Err(LoadError::failed(err.to_string()))
        });
        self.loads.finish(Some(key), result);
    }

    fn finish_root_load(&mut self, result: Result<Vec<NodeData>, LoadError>) {
        let result = match result {
            Ok(nodes) => {
                let count = nodes.len();
                match self.batched(|tree| tree.insert_loaded(None, nodes)) {
                    Ok(()) => {
                        log::debug!("loaded {count} root nodes");
                        self.emit_event(TreeEvent::ChildrenLoaded { id: None, count });
                        Ok(())
                    }
                    Err(err) => {
                        log::warn!("applying root nodes failed: {err}");
                        Err(LoadError::failed(err.to_string()))
                    }
                }
            }
            Err(error) => self.load_failed(None, error),
        };
        self.loads.finish(None, result);
    }

    fn insert_loaded(&mut self, parent: Option<NodeKey>, nodes: Vec<NodeData>) -> Result<(), TreeError> {
        for data in nodes {
            self.insert_data(parent, data, None, true)?;
        }
        Ok(())
    }

    fn load_failed(&mut self, id: Option<String>, error: LoadError) -> Result<(), LoadError> {
        log::warn!("loading children of {} failed: {error}", id.as_deref().unwrap_or("root"));
        self.emit_event(TreeEvent::LoadError {
            id,
            error: error.clone(),
        });
        Err(error)
    }
}
