use std::any::Any;
use std::rc::Rc;

use super::{Surface, SurfaceError};
use crate::diff::Patch;
use crate::element::{find_element, Element};
use crate::patch::apply_all;
use crate::text::{lines, Line};

/// A surface that keeps its own copy of the mounted tree.
///
/// Patches are applied to the copy, so the result can be compared against
/// the tree the pipeline believes is shown.
#[derive(Debug, Default)]
pub struct MemorySurface {
    root: Option<Rc<Element>>,
    mounts: usize,
    patch_batches: usize,
    patches_applied: usize,
    scrolled_to: Option<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&Rc<Element>> {
        self.root.as_ref()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.root.as_deref().map(lines).unwrap_or_default()
    }

    pub fn find(&self, key: &str) -> Option<&Element> {
        self.root.as_deref().and_then(|root| find_element(root, key))
    }

    /// Number of full mounts.
    pub fn mounts(&self) -> usize {
        self.mounts
    }

    /// Number of non-empty patch streams received.
    pub fn patch_batches(&self) -> usize {
        self.patch_batches
    }

    /// Total patches applied across all streams.
    pub fn patches_applied(&self) -> usize {
        self.patches_applied
    }

    pub fn scrolled_to(&self) -> Option<&str> {
        self.scrolled_to.as_deref()
    }
}

impl Surface for MemorySurface {
    fn mount(&mut self, root: Rc<Element>) -> Result<(), SurfaceError> {
        self.root = Some(root);
        self.mounts += 1;
        Ok(())
    }

    fn patch(&mut self, patches: &[Patch]) -> Result<(), SurfaceError> {
        let root = self.root.as_mut().ok_or(SurfaceError::NotMounted)?;
        apply_all(root, patches)?;
        if !patches.is_empty() {
            self.patch_batches += 1;
            self.patches_applied += patches.len();
        }
        Ok(())
    }

    fn scroll_to(&mut self, key: &str) -> Result<(), SurfaceError> {
        if self.find(key).is_none() {
            return Err(SurfaceError::Patch(crate::patch::PatchError::MissingKey(
                key.to_string(),
            )));
        }
        self.scrolled_to = Some(key.to_string());
        Ok(())
    }

    fn unmount(&mut self) {
        self.root = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
