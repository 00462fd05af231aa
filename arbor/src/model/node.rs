use serde_json::{Map, Value};

use super::{NodeCollection, NodeKey, NodeState, StateFlag};

/// Children of a node.
#[derive(Debug, Default)]
pub enum Children {
    /// A leaf. It can never have children.
    #[default]
    Absent,
    /// Children exist but must be fetched through the data loader.
    Unloaded,
    Loaded(NodeCollection),
}

impl Children {
    pub fn collection(&self) -> Option<&NodeCollection> {
        match self {
            Children::Loaded(collection) => Some(collection),
            _ => None,
        }
    }

    pub(crate) fn collection_mut(&mut self) -> Option<&mut NodeCollection> {
        match self {
            Children::Loaded(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn keys(&self) -> &[NodeKey] {
        self.collection().map(NodeCollection::keys).unwrap_or_default()
    }

    pub fn is_unloaded(&self) -> bool {
        matches!(self, Children::Unloaded)
    }
}

/// A single tree entity.
///
/// Nodes live in the tree's slot map and are only mutated through
/// [`Tree`](crate::Tree) so that cross-node rules hold after every call.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) children: Children,
    pub(crate) state: NodeState,
    pub(crate) dirty: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) extra: Map<String, Value>,
}

impl Node {
    pub(crate) fn new(id: String, text: String, parent: Option<NodeKey>) -> Self {
        Self {
            id,
            text,
            children: Children::Absent,
            state: NodeState::IMPORT_DEFAULT,
            dirty: false,
            parent,
            extra: Map::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is(&self, flag: StateFlag) -> bool {
        self.state.contains(flag.bit())
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Custom fields carried through import and export.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// True if the node has loaded children or children still to load.
    pub fn has_children(&self) -> bool {
        match &self.children {
            Children::Absent => false,
            Children::Unloaded => true,
            Children::Loaded(collection) => !collection.is_empty(),
        }
    }

    pub fn selected(&self) -> bool {
        self.state.contains(NodeState::SELECTED)
    }

    pub fn collapsed(&self) -> bool {
        self.state.contains(NodeState::COLLAPSED)
    }

    pub fn hidden(&self) -> bool {
        self.state.contains(NodeState::HIDDEN)
    }

    pub fn removed(&self) -> bool {
        self.state.contains(NodeState::REMOVED)
    }

    pub fn indeterminate(&self) -> bool {
        self.state.contains(NodeState::INDETERMINATE)
    }

    pub fn loading(&self) -> bool {
        self.state.contains(NodeState::LOADING)
    }

    pub fn focused(&self) -> bool {
        self.state.contains(NodeState::FOCUSED)
    }

    pub fn editing(&self) -> bool {
        self.state.contains(NodeState::EDITING)
    }

    pub fn rendered(&self) -> bool {
        self.state.contains(NodeState::RENDERED)
    }

    pub fn selectable(&self) -> bool {
        self.state.contains(NodeState::SELECTABLE)
    }

    /// Neither hidden nor soft-removed. Ancestors are not considered.
    pub(crate) fn shown(&self) -> bool {
        !self.state.intersects(NodeState::HIDDEN | NodeState::REMOVED)
    }
}
