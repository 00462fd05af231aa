//! Projection of nodes into visual elements.
//!
//! Keys: the root list is `::root`, a node's child list `{id}::children`,
//! a node's row `{id}` and its parts `{id}:toggle`, `{id}:checkbox`,
//! `{id}:title` and `{id}:loading`. Inside keys, `\\` and `:` in node ids
//! are escaped with a backslash, so a node id never reads as a part suffix.

use std::borrow::Cow;
use std::rc::Rc;

use arbor_dom::{Element, Kind};
use slotmap::SecondaryMap;

use super::cache::{memoize, refresh_slot, CacheInput, CacheNode, Comparison};
use super::RenderStats;
use crate::model::{Children, Model, NodeKey, NodeState};

pub(crate) const ROOT_LIST_KEY: &str = "::root";

/// Element key of the row for node `id`.
pub(crate) fn row_key(id: &str) -> Cow<'_, str> {
    if !id.contains(['\\', ':']) {
        return Cow::Borrowed(id);
    }
    let mut key = String::with_capacity(id.len() + 2);
    for c in id.chars() {
        if matches!(c, '\\' | ':') {
            key.push('\\');
        }
        key.push(c);
    }
    Cow::Owned(key)
}

pub(crate) fn list_key(id: &str) -> String {
    format!("{}::children", row_key(id))
}

fn part_key(id: &str, part: &str) -> String {
    format!("{}:{part}", row_key(id))
}

/// Shape of a node's children as far as its row is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildShape {
    Leaf,
    Unloaded,
    Empty,
    Filled,
}

impl ChildShape {
    fn of(children: &Children) -> Self {
        match children {
            Children::Absent => ChildShape::Leaf,
            Children::Unloaded => ChildShape::Unloaded,
            Children::Loaded(c) if c.is_empty() => ChildShape::Empty,
            Children::Loaded(_) => ChildShape::Filled,
        }
    }

    fn expandable(self) -> bool {
        matches!(self, ChildShape::Unloaded | ChildShape::Filled)
    }
}

/// Everything a row's appearance depends on.
///
/// Only visual flags are recorded, so bookkeeping such as `rendered` never
/// forces a rebuild. The child list is compared by identity: an unchanged
/// list means no descendant row changed.
#[derive(Debug, Clone)]
pub(crate) struct RowInput {
    id: String,
    text: String,
    state: NodeState,
    shape: ChildShape,
    checkbox: bool,
    child_list: Option<Rc<Element>>,
}

impl CacheInput for RowInput {
    fn matches(&self, previous: &Self, _rule: Comparison) -> bool {
        self.id == previous.id
            && self.text == previous.text
            && self.state == previous.state
            && self.shape == previous.shape
            && self.checkbox == previous.checkbox
            && match (&self.child_list, &previous.child_list) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Rows in display order; compared by identity and count.
pub(crate) type ListInput = Vec<Rc<Element>>;

#[derive(Default)]
pub(crate) struct RenderCache {
    rows: SecondaryMap<NodeKey, CacheNode<RowInput, Element>>,
    lists: SecondaryMap<NodeKey, CacheNode<ListInput, Element>>,
    root: Option<CacheNode<ListInput, Element>>,
}

impl RenderCache {
    pub fn evict(&mut self, key: NodeKey) {
        self.rows.remove(key);
        self.lists.remove(key);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.lists.clear();
        self.root = None;
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }
}

/// One render pass over the model.
pub(crate) struct Builder<'a> {
    pub model: &'a mut Model,
    pub cache: &'a mut RenderCache,
    pub stats: &'a mut RenderStats,
    pub checkbox: bool,
}

impl Builder<'_> {
    /// Visual list for the collection owned by `context`.
    pub fn list(&mut self, context: Option<NodeKey>) -> Rc<Element> {
        let members = self.model.child_keys(context).to_vec();
        let mut items: ListInput = Vec::with_capacity(members.len());
        for key in members {
            if let Some(row) = self.row(key) {
                items.push(row);
            }
        }

        let key = match context.and_then(|k| self.model.node(k)) {
            Some(node) => list_key(node.id()),
            None => ROOT_LIST_KEY.to_string(),
        };
        let build = |_: Option<(&ListInput, &Rc<Element>)>, items: &ListInput| {
            Element::list(key).children(items.iter().cloned())
        };
        let (list, built) = match context {
            Some(context) => memoize(&mut self.cache.lists, context, items, Comparison::Ordered, build),
            None => refresh_slot(&mut self.cache.root, items, Comparison::Ordered, build),
        };
        if built {
            self.stats.lists_built += 1;
        } else {
            self.stats.lists_reused += 1;
        }
        list
    }

    /// Row of `key`, or `None` when the node is not displayed.
    fn row(&mut self, key: NodeKey) -> Option<Rc<Element>> {
        let node = self.model.node(key).filter(|node| node.shown())?;

        // A clean node has no dirty descendant, so its whole row stands.
        if !node.dirty {
            if let Some(cached) = self.cache.rows.get(key) {
                self.stats.rows_reused += 1;
                return Some(Rc::clone(cached.value()));
            }
        }

        let expanded = !node.collapsed() && matches!(node.children, Children::Loaded(_));
        let mut input = RowInput {
            id: node.id.clone(),
            text: node.text.clone(),
            state: node.state & NodeState::VISUAL,
            shape: ChildShape::of(&node.children),
            checkbox: self.checkbox,
            child_list: None,
        };
        if expanded {
            input.child_list = Some(self.list(Some(key)));
        }

        let (row, built) = memoize(&mut self.cache.rows, key, input, Comparison::Scalar, build_row);
        if built {
            self.stats.rows_built += 1;
        } else {
            self.stats.rows_reused += 1;
        }

        self.model.clear_dirty(key);
        if let Ok(node) = self.model.get_mut(key) {
            node.state.insert(NodeState::RENDERED);
        }
        Some(row)
    }
}

fn build_row(previous: Option<(&RowInput, &Rc<Element>)>, input: &RowInput) -> Element {
    let id = input.id.as_str();
    let state = input.state;
    let selected = state.contains(NodeState::SELECTED);
    let indeterminate = state.contains(NodeState::INDETERMINATE);
    let collapsed = state.contains(NodeState::COLLAPSED);
    let loading = state.contains(NodeState::LOADING);
    let editing = state.contains(NodeState::EDITING);

    let mut row = Element::item(row_key(id))
        .data("id", id)
        .class("node")
        .class_if("selected", selected)
        .class_if("indeterminate", indeterminate)
        .class_if("focused", state.contains(NodeState::FOCUSED))
        .class_if("editing", editing)
        .class_if("loading", loading)
        .class_if("leaf", !input.shape.expandable())
        .class_if("collapsed", input.shape.expandable() && collapsed)
        .class_if("expanded", input.shape.expandable() && !collapsed);

    if input.shape.expandable() {
        let glyph = if collapsed { "▸" } else { "▾" };
        row = row.child(Element::toggle(part_key(id, "toggle"), glyph));
    }

    if input.checkbox {
        let glyph = if selected {
            "[x]"
        } else if indeterminate {
            "[-]"
        } else {
            "[ ]"
        };
        row = row.child(Element::checkbox(part_key(id, "checkbox"), glyph));
    }

    // The title only depends on the label and editing state.
    let title = previous
        .filter(|(prev, _)| {
            prev.text == input.text
                && prev.state.contains(NodeState::EDITING) == editing
        })
        .and_then(|(_, prev_row)| prev_row.child_of_kind(Kind::Title).cloned());
    row = match title {
        Some(title) => row.child(title),
        None => row.child(
            Element::title(part_key(id, "title"), input.text.as_str()).class_if("editing", editing),
        ),
    };

    if let Some(list) = &input.child_list {
        row = row.child(Rc::clone(list));
    } else if loading && !collapsed {
        row = row.child(Element::placeholder(part_key(id, "loading"), "Loading...").class("loading"));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str, state: NodeState) -> RowInput {
        RowInput {
            id: "n".into(),
            text: text.into(),
            state,
            shape: ChildShape::Filled,
            checkbox: true,
            child_list: None,
        }
    }

    #[test]
    fn test_keys_escape_separators() {
        assert_eq!(row_key("a"), "a");
        assert_eq!(row_key("a:title"), "a\\:title");
        assert_eq!(row_key("a\\"), "a\\\\");
        assert_ne!(part_key("a", "title"), row_key("a:title"));
        assert_ne!(list_key("a"), row_key("a::children"));
        assert_ne!(part_key("a\\", "title"), row_key("a\\:title"));
    }

    #[test]
    fn test_row_parts() {
        let row = build_row(None, &input("Docs", NodeState::SELECTED));
        assert!(row.has_class("selected"));
        assert!(row.has_class("expanded"));
        assert_eq!(row.child_of_kind(Kind::Toggle).unwrap().text_content(), Some("▾"));
        assert_eq!(row.child_of_kind(Kind::Checkbox).unwrap().text_content(), Some("[x]"));
        assert_eq!(row.child_of_kind(Kind::Title).unwrap().text_content(), Some("Docs"));
    }

    #[test]
    fn test_title_reused_when_label_unchanged() {
        let first = Rc::new(build_row(None, &input("Docs", NodeState::empty())));
        let prev = input("Docs", NodeState::empty());
        let second = build_row(Some((&prev, &first)), &input("Docs", NodeState::SELECTED));

        let a = first.child_of_kind(Kind::Title).unwrap();
        let b = second.child_of_kind(Kind::Title).unwrap();
        assert!(Rc::ptr_eq(a, b));

        let third = build_row(Some((&prev, &first)), &input("Notes", NodeState::empty()));
        assert!(!Rc::ptr_eq(a, third.child_of_kind(Kind::Title).unwrap()));
    }

    #[test]
    fn test_child_list_compared_by_identity() {
        let list = Rc::new(Element::list("n::children"));
        let mut a = input("x", NodeState::empty());
        a.child_list = Some(Rc::clone(&list));
        let mut b = a.clone();
        assert!(b.matches(&a, Comparison::Scalar));

        b.child_list = Some(Rc::new(Element::list("n::children")));
        assert!(!b.matches(&a, Comparison::Scalar));
    }
}
