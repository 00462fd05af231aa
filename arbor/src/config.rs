//! Tree configuration.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::model::Node;

/// Configuration for a [`Tree`](crate::Tree).
///
/// # Example
///
/// ```
/// use arbor::{SortBy, TreeConfig};
///
/// let config = TreeConfig::new()
///     .checkbox()
///     .with_sort(SortBy::Text);
/// assert!(config.selection.auto_select_children);
/// ```
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Selection policy.
    pub selection: SelectionConfig,

    /// Checkbox mode: tri-state selection with `indeterminate` parents.
    pub checkbox: bool,

    /// Comparator used for sorted insertion. `None` keeps insertion order.
    pub sort: Option<SortBy>,

    /// Clear selection, focus and expansion when a soft-removed node is restored.
    pub reset_state_on_restore: bool,

    /// Inserting data whose id already exists restores the existing node
    /// if it was soft-removed.
    pub restore_on_merge: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            checkbox: false,
            sort: None,
            reset_state_on_restore: false,
            restore_on_merge: true,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable checkbox mode. Implies multiple selection and
    /// auto-selection of children.
    pub fn checkbox(mut self) -> Self {
        self.checkbox = true;
        self.selection.multiple = true;
        self.selection.auto_select_children = true;
        self
    }

    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_sort(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn reset_state_on_restore(mut self) -> Self {
        self.reset_state_on_restore = true;
        self
    }

    /// Keep soft-removed nodes removed when the same id is inserted again.
    pub fn without_restore_on_merge(mut self) -> Self {
        self.restore_on_merge = false;
        self
    }

    /// Whether selecting a node first clears every other selection.
    pub(crate) fn can_auto_deselect(&self) -> bool {
        self.selection.auto_deselect && !self.selection.multiple && !self.checkbox
    }
}

/// Selection policy flags.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Allow more than one selected node.
    pub multiple: bool,

    /// Refuse to deselect the last selected node.
    pub require: bool,

    /// Selecting a node selects all of its descendants.
    pub auto_select_children: bool,

    /// In single selection, selecting a node deselects the others.
    pub auto_deselect: bool,

    /// `toggle_select` never deselects; only explicit `deselect` does.
    pub disable_direct_deselection: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            require: false,
            auto_select_children: false,
            auto_deselect: true,
            disable_direct_deselection: false,
        }
    }
}

impl SelectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn require(mut self) -> Self {
        self.require = true;
        self
    }

    pub fn auto_select_children(mut self) -> Self {
        self.auto_select_children = true;
        self
    }

    pub fn without_auto_deselect(mut self) -> Self {
        self.auto_deselect = false;
        self
    }

    pub fn disable_direct_deselection(mut self) -> Self {
        self.disable_direct_deselection = true;
        self
    }
}

/// Ordering applied to sibling nodes on insertion.
#[derive(Clone)]
pub enum SortBy {
    /// Lexicographic by label.
    Text,
    /// Caller-provided comparator.
    Custom(Rc<dyn Fn(&Node, &Node) -> Ordering>),
}

impl SortBy {
    pub fn custom(compare: impl Fn(&Node, &Node) -> Ordering + 'static) -> Self {
        Self::Custom(Rc::new(compare))
    }

    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        match self {
            SortBy::Text => a.text().cmp(b.text()),
            SortBy::Custom(compare) => compare(a, b),
        }
    }
}

impl fmt::Debug for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Text => write!(f, "Text"),
            SortBy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
