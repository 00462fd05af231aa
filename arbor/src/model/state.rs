use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// State flags of a node. A clear bit means the flag is false.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeState: u16 {
        const SELECTED      = 1 << 0;
        const COLLAPSED     = 1 << 1;
        const HIDDEN        = 1 << 2;
        const REMOVED       = 1 << 3;
        const INDETERMINATE = 1 << 4;
        const LOADING       = 1 << 5;
        const FOCUSED       = 1 << 6;
        const EDITING       = 1 << 7;
        const RENDERED      = 1 << 8;
        const SELECTABLE    = 1 << 9;
    }
}

impl NodeState {
    /// Flags a freshly imported node starts with.
    pub const IMPORT_DEFAULT: NodeState = NodeState::SELECTABLE.union(NodeState::COLLAPSED);

    /// Flags that affect how a row looks.
    pub const VISUAL: NodeState = NodeState::SELECTED
        .union(NodeState::COLLAPSED)
        .union(NodeState::HIDDEN)
        .union(NodeState::REMOVED)
        .union(NodeState::INDETERMINATE)
        .union(NodeState::LOADING)
        .union(NodeState::FOCUSED)
        .union(NodeState::EDITING);

    /// Bookkeeping flags never exported.
    pub const TRANSIENT: NodeState = NodeState::RENDERED.union(NodeState::LOADING);
}

/// Named state flag, as used in notifications and serialized state maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFlag {
    Selected,
    Collapsed,
    Hidden,
    Removed,
    Indeterminate,
    Loading,
    Focused,
    Editing,
    Rendered,
    Selectable,
}

impl StateFlag {
    pub const ALL: [StateFlag; 10] = [
        StateFlag::Selected,
        StateFlag::Collapsed,
        StateFlag::Hidden,
        StateFlag::Removed,
        StateFlag::Indeterminate,
        StateFlag::Loading,
        StateFlag::Focused,
        StateFlag::Editing,
        StateFlag::Rendered,
        StateFlag::Selectable,
    ];

    pub fn bit(self) -> NodeState {
        match self {
            StateFlag::Selected => NodeState::SELECTED,
            StateFlag::Collapsed => NodeState::COLLAPSED,
            StateFlag::Hidden => NodeState::HIDDEN,
            StateFlag::Removed => NodeState::REMOVED,
            StateFlag::Indeterminate => NodeState::INDETERMINATE,
            StateFlag::Loading => NodeState::LOADING,
            StateFlag::Focused => NodeState::FOCUSED,
            StateFlag::Editing => NodeState::EDITING,
            StateFlag::Rendered => NodeState::RENDERED,
            StateFlag::Selectable => NodeState::SELECTABLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StateFlag::Selected => "selected",
            StateFlag::Collapsed => "collapsed",
            StateFlag::Hidden => "hidden",
            StateFlag::Removed => "removed",
            StateFlag::Indeterminate => "indeterminate",
            StateFlag::Loading => "loading",
            StateFlag::Focused => "focused",
            StateFlag::Editing => "editing",
            StateFlag::Rendered => "rendered",
            StateFlag::Selectable => "selectable",
        }
    }
}

impl std::fmt::Display for StateFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
