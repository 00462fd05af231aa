pub mod buffer;
pub mod diff;
pub mod element;
pub mod patch;
pub mod surface;
pub mod text;

pub use buffer::{Buffer, Cell, Rgb};
pub use diff::{diff, Patch};
pub use element::{find_element, Content, Element, Kind};
pub use patch::{apply, apply_all, PatchError};
pub use surface::{MemorySurface, Surface, SurfaceError, TerminalSurface};
pub use text::{lines, Line};
