use std::rc::Rc;
use std::time::Instant;

use arbor_dom::{Element, Surface, SurfaceError};

use super::batch::BatchCounter;
use super::view::{Builder, RenderCache};
use super::RenderStats;
use crate::model::{Model, NodeKey};

/// Render state of one tree: batching, the diff baseline and the surface.
#[derive(Default)]
pub(crate) struct Pipeline {
    pub batch: BatchCounter,
    rendering: bool,
    root_visual: Option<Rc<Element>>,
    /// Collection the baseline was built from.
    scope: Option<NodeKey>,
    surface: Option<Box<dyn Surface>>,
    mounted: bool,
    cache: RenderCache,
    stats: RenderStats,
}

impl Pipeline {
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn visual(&self) -> Option<&Rc<Element>> {
        self.root_visual.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&dyn Surface> {
        self.surface.as_deref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut (dyn Surface + 'static)> {
        self.surface.as_deref_mut()
    }

    pub fn attach(&mut self, surface: Box<dyn Surface>) {
        self.surface = Some(surface);
        self.mounted = false;
    }

    pub fn detach(&mut self) -> Option<Box<dyn Surface>> {
        let mut surface = self.surface.take()?;
        surface.unmount();
        self.mounted = false;
        self.root_visual = None;
        Some(surface)
    }

    /// Drop every memoized row and list.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Run one pass for the collection owned by `scope`.
    ///
    /// Returns `None` when a pass is already running.
    pub fn render(
        &mut self,
        model: &mut Model,
        checkbox: bool,
        scope: Option<NodeKey>,
    ) -> Result<Option<Rc<Element>>, SurfaceError> {
        if !self.begin_pass() {
            log::debug!("render suppressed: a pass is already running");
            return Ok(None);
        }
        let result = self.run_pass(model, checkbox, scope);
        self.end_pass();
        result.map(Some)
    }

    fn begin_pass(&mut self) -> bool {
        if self.rendering {
            return false;
        }
        self.rendering = true;
        true
    }

    fn end_pass(&mut self) {
        self.rendering = false;
    }

    fn run_pass(
        &mut self,
        model: &mut Model,
        checkbox: bool,
        scope: Option<NodeKey>,
    ) -> Result<Rc<Element>, SurfaceError> {
        let t0 = Instant::now();

        for key in model.take_freed() {
            self.cache.evict(key);
        }
        if scope != self.scope {
            self.scope = scope;
            self.root_visual = None;
            self.mounted = false;
        }

        let mut stats = RenderStats {
            passes: self.stats.passes + 1,
            ..RenderStats::default()
        };
        let visual = Builder {
            model: &mut *model,
            cache: &mut self.cache,
            stats: &mut stats,
            checkbox,
        }
        .list(scope);
        let t1 = Instant::now();

        // Dirty nodes the pass did not reach are hidden or collapsed away.
        // Their rows are rebuilt from scratch once they show up again.
        for key in model.take_dirty() {
            model.clear_dirty(key);
            self.cache.evict(key);
            stats.swept += 1;
        }

        let baseline = self.root_visual.replace(Rc::clone(&visual));
        let result = match self.surface.as_deref_mut() {
            Some(surface) if self.mounted => match baseline {
                Some(old) => {
                    let patches = arbor_dom::diff(&old, &visual);
                    stats.patches = patches.len();
                    if patches.is_empty() {
                        Ok(())
                    } else {
                        surface.patch(&patches)
                    }
                }
                None => surface.mount(Rc::clone(&visual)),
            },
            Some(surface) => {
                self.mounted = true;
                surface.mount(Rc::clone(&visual))
            }
            None => Ok(()),
        };
        if result.is_err() {
            // The surface state is unknown; remount on the next pass.
            self.mounted = false;
        }
        let t2 = Instant::now();

        log::debug!(
            "render pass {}: build={:>6.2}µs patch={:>6.2}µs rows built={} reused={} lists built={} reused={} swept={} patches={} cached_rows={}",
            stats.passes,
            t1.duration_since(t0).as_secs_f64() * 1_000_000.0,
            t2.duration_since(t1).as_secs_f64() * 1_000_000.0,
            stats.rows_built,
            stats.rows_reused,
            stats.lists_built,
            stats.lists_reused,
            stats.swept,
            stats.patches,
            self.cache.rows(),
        );

        self.stats = stats;
        result.map(|()| visual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_pass_is_suppressed() {
        let mut pipeline = Pipeline::default();
        assert!(pipeline.begin_pass());
        assert!(!pipeline.begin_pass());

        let mut model = Model::default();
        assert!(pipeline.render(&mut model, false, None).unwrap().is_none());

        pipeline.end_pass();
        assert!(pipeline.render(&mut model, false, None).unwrap().is_some());
        assert_eq!(pipeline.stats().passes, 1);
    }

    #[test]
    fn test_empty_model_renders_root_list() {
        let mut pipeline = Pipeline::default();
        let mut model = Model::default();
        let visual = pipeline.render(&mut model, false, None).unwrap().unwrap();
        assert_eq!(visual.key, crate::render::view::ROOT_LIST_KEY);
        assert!(visual.child_elements().is_empty());
    }
}
