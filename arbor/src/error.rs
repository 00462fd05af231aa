//! Error types.

use arbor_dom::SurfaceError;

use crate::model::NodeKey;

/// Errors returned by tree operations.
///
/// Invariant no-ops (deselecting the last required selection, selecting an
/// unselectable node) and id collisions on insert are not errors.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("node {0} does not exist in this tree")]
    NodeNotFound(NodeKey),

    #[error("no node with id '{0}'")]
    UnknownId(String),

    #[error("node '{0}' cannot have children")]
    NoChildren(String),

    #[error("children of '{0}' are not loaded yet")]
    ChildrenNotLoaded(String),

    #[error("no data loader configured")]
    NoLoader,

    #[error("children of '{0}' are already loading")]
    LoadInProgress(String),

    #[error("no surface attached")]
    NotAttached,

    #[error("a surface is already attached")]
    AlreadyAttached,

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Failure of a dynamic child load.
///
/// Cloneable so the same error can be emitted as a notification and
/// delivered to the caller waiting on the load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("load failed: {message}")]
    Failed { message: String },

    #[error("loader dropped the request without answering")]
    Abandoned,

    #[error("tree dropped before the load resolved")]
    Dropped,
}

impl LoadError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
