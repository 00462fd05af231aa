//! Live targets that mount a visual tree and receive patches.

mod memory;
mod terminal;

use std::any::Any;
use std::rc::Rc;

use crate::diff::Patch;
use crate::element::Element;
use crate::patch::PatchError;

pub use memory::MemorySurface;
pub use terminal::TerminalSurface;

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("patch rejected: {0}")]
    Patch(#[from] PatchError),

    #[error("surface unavailable: {0}")]
    Unavailable(String),

    #[error("surface has nothing mounted")]
    NotMounted,
}

/// A live UI target for rendered trees.
///
/// The render pipeline mounts a full tree once and then only sends the
/// patches between consecutive trees.
pub trait Surface {
    /// Replace whatever is shown with `root`.
    fn mount(&mut self, root: Rc<Element>) -> Result<(), SurfaceError>;

    /// Apply an ordered patch stream to the mounted tree.
    fn patch(&mut self, patches: &[Patch]) -> Result<(), SurfaceError>;

    /// Bring the element with `key` into view.
    fn scroll_to(&mut self, _key: &str) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// Drop the mounted tree.
    fn unmount(&mut self) {}

    fn as_any(&self) -> &dyn Any;
}
