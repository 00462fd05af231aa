//! Incremental rendering.
//!
//! Each pass rebuilds the visual rows of dirty nodes only. Rows and lists
//! are memoized in [`CacheNode`]s, so unchanged subtrees come back as the
//! very same `Rc` and the keyed diff skips them without descending.

mod batch;
mod cache;
mod pipeline;
mod view;

pub use cache::{CacheInput, CacheNode, Comparison};

pub(crate) use pipeline::Pipeline;

/// Counters of the last render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Passes run since the tree was created.
    pub passes: usize,
    pub rows_built: usize,
    pub rows_reused: usize,
    pub lists_built: usize,
    pub lists_reused: usize,
    /// Dirty nodes that were not displayed and had their cache dropped.
    pub swept: usize,
    pub patches: usize,
}
