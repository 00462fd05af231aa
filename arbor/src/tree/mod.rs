//! The tree: node model, mutation protocol and render pipeline together.

mod expand;
mod export;
mod insert;
mod query;
mod remove;
mod search;
mod state;

use std::rc::Rc;

use arbor_dom::element::find_first;
use arbor_dom::{Element, Kind, Surface};

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::event::{EventBus, ListenerId, Notification, TreeEvent};
use crate::loader::{DataLoader, LoadQueue};
use crate::model::{Model, NodeData, NodeKey};
use crate::render::{Pipeline, RenderStats};

/// A mutable hierarchy of nodes rendered incrementally to a [`Surface`].
///
/// Every mutation applies to the model immediately and then asks for a
/// render pass. Passes are suppressed while a batch is open and run once
/// when the outermost batch ends.
///
/// ```
/// use arbor::{NodeData, Tree, TreeConfig};
///
/// let mut tree = Tree::new(TreeConfig::new().checkbox());
/// tree.add_node(None, NodeData::new("B").with_id("2").with_children([
///     NodeData::new("C").with_id("3"),
/// ]))
/// .unwrap();
///
/// let c = tree.key_of("3").unwrap();
/// tree.select(c).unwrap();
/// assert!(tree.find("2").unwrap().selected());
/// ```
pub struct Tree {
    model: Model,
    config: TreeConfig,
    events: EventBus,
    pipeline: Pipeline,
    loader: Option<Rc<dyn DataLoader>>,
    loads: LoadQueue,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl Tree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            model: Model::default(),
            config,
            events: EventBus::new(),
            pipeline: Pipeline::default(),
            loader: None,
            loads: LoadQueue::default(),
        }
    }

    /// Build a tree holding `nodes` at the root.
    pub fn with_data(config: TreeConfig, nodes: Vec<NodeData>) -> Result<Self, TreeError> {
        let mut tree = Self::new(config);
        tree.add_nodes(None, nodes)?;
        Ok(tree)
    }

    /// Use `loader` for nodes whose children are unloaded.
    pub fn with_loader(mut self, loader: impl DataLoader + 'static) -> Self {
        self.loader = Some(Rc::new(loader));
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replace the configuration and redraw everything.
    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
        self.pipeline.invalidate();
        self.model.mark_all_dirty();
        self.apply_changes();
    }

    // Events

    pub fn on(&mut self, listener: impl FnMut(&Notification) + 'static) -> ListenerId {
        self.events.on(listener)
    }

    pub fn on_event(
        &mut self,
        name: &'static str,
        listener: impl FnMut(&Notification) + 'static,
    ) -> ListenerId {
        self.events.on_event(name, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Emit an event on this tree's bus. Input wiring uses the result to
    /// skip its default action when a listener prevented it.
    pub fn emit(&mut self, event: TreeEvent) -> bool {
        self.events.emit(event)
    }

    // Batching

    /// Open a batch. Render passes are held until the matching [`end`](Self::end).
    pub fn batch(&mut self) {
        self.pipeline.batch.begin();
    }

    /// Close a batch. Closing the outermost batch runs one render pass and
    /// returns true.
    pub fn end(&mut self) -> bool {
        let flushed = self.pipeline.batch.end();
        if flushed {
            self.apply_changes();
        }
        flushed
    }

    pub fn is_batching(&self) -> bool {
        self.pipeline.batch.is_batching()
    }

    // Rendering

    /// Render pending changes to the attached surface.
    ///
    /// Does nothing while a batch is open or when no surface is attached.
    /// Surface failures are logged; use [`render_nodes`](Self::render_nodes)
    /// to observe them.
    pub fn apply_changes(&mut self) {
        if self.pipeline.batch.is_batching() || !self.pipeline.is_attached() {
            return;
        }
        if let Err(err) = self.render_nodes(None) {
            log::warn!("render failed: {err}");
        }
    }

    /// Build the visual for the collection owned by `scope` (the root for
    /// `None`), diff it against the previous visual and patch the surface.
    ///
    /// Returns the new visual, or the previous one when a pass was already
    /// running.
    pub fn render_nodes(&mut self, scope: Option<NodeKey>) -> Result<Option<Rc<Element>>, TreeError> {
        if let Some(key) = scope {
            self.model.get(key)?;
        }
        let visual = self
            .pipeline
            .render(&mut self.model, self.config.checkbox, scope)?;
        if visual.is_some() {
            self.events.emit(TreeEvent::ChangesApplied);
        }
        Ok(visual)
    }

    /// Mount `surface` and render the whole tree into it.
    pub fn attach(&mut self, surface: impl Surface + 'static) -> Result<(), TreeError> {
        if self.pipeline.is_attached() {
            return Err(TreeError::AlreadyAttached);
        }
        self.pipeline.attach(Box::new(surface));
        if let Err(err) = self.render_nodes(None) {
            self.pipeline.detach();
            return Err(err);
        }
        Ok(())
    }

    /// Stop rendering and hand the surface back.
    pub fn detach(&mut self) -> Option<Box<dyn Surface>> {
        self.pipeline.detach()
    }

    pub fn is_attached(&self) -> bool {
        self.pipeline.is_attached()
    }

    /// The attached surface, if it is an `S`.
    pub fn surface_as<S: Surface + 'static>(&self) -> Option<&S> {
        self.pipeline.surface()?.as_any().downcast_ref::<S>()
    }

    /// The last rendered visual tree.
    pub fn visual(&self) -> Option<&Rc<Element>> {
        self.pipeline.visual()
    }

    pub fn render_stats(&self) -> &RenderStats {
        self.pipeline.stats()
    }

    /// Scroll the surface to the first selected row. Returns its key.
    pub fn scroll_selected_into_view(&mut self) -> Result<Option<String>, TreeError> {
        if !self.pipeline.is_attached() {
            return Err(TreeError::NotAttached);
        }
        let key = self.pipeline.visual().and_then(|root| {
            find_first(root, &|el: &Element| el.kind == Kind::Item && el.has_class("selected"))
                .map(|el| el.key.clone())
        });
        if let (Some(key), Some(surface)) = (&key, self.pipeline.surface_mut()) {
            surface.scroll_to(key)?;
        }
        Ok(key)
    }

    /// Force `key`'s row to rebuild on the next pass.
    pub fn mark_dirty(&mut self, key: NodeKey) -> Result<(), TreeError> {
        self.model.get(key)?;
        self.model.mark_dirty(key);
        Ok(())
    }

    pub fn is_dirty(&self, key: NodeKey) -> Result<bool, TreeError> {
        Ok(self.model.get(key)?.is_dirty())
    }

    // Helpers

    pub(crate) fn emit_event(&mut self, event: TreeEvent) {
        self.events.emit(event);
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.model.len())
            .field("config", &self.config)
            .field("attached", &self.pipeline.is_attached())
            .field("events", &self.events)
            .finish()
    }
}
