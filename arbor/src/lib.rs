//! Hierarchical node state with incremental rendering.
//!
//! A [`Tree`] owns every node in a slot map, enforces the cross-node
//! selection and visibility rules on each mutation, and projects its state
//! into an [`arbor_dom::Element`] tree. Only subtrees whose nodes were
//! marked dirty are rebuilt; unchanged rows are reused by pointer and the
//! surface receives just the diff.

pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod model;
pub mod render;
pub mod traverse;
pub mod tree;

pub use config::{SelectionConfig, SortBy, TreeConfig};
pub use error::{LoadError, TreeError};
pub use event::{EventBus, ListenerId, Notification, TreeEvent};
pub use loader::{DataLoader, LoadHandle, LoadRequest, LoadResponder};
pub use model::{Children, ChildrenData, Node, NodeCollection, NodeData, NodeKey, NodeState, StateFlag};
pub use render::{CacheInput, CacheNode, Comparison, RenderStats};
pub use traverse::Walk;
pub use tree::Tree;

pub mod prelude {
    pub use crate::config::{SelectionConfig, SortBy, TreeConfig};
    pub use crate::error::{LoadError, TreeError};
    pub use crate::event::{Notification, TreeEvent};
    pub use crate::loader::{DataLoader, LoadHandle, LoadRequest};
    pub use crate::model::{Children, Node, NodeData, NodeKey, StateFlag};
    pub use crate::traverse::Walk;
    pub use crate::tree::Tree;

    pub use arbor_dom::{MemorySurface, Surface, TerminalSurface};
}
