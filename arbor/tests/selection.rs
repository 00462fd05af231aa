use std::cell::RefCell;
use std::rc::Rc;

use arbor::prelude::*;
use serde_json::json;

fn tree_from(value: serde_json::Value, config: TreeConfig) -> Tree {
    let nodes: Vec<NodeData> = serde_json::from_value(value).unwrap();
    Tree::with_data(config, nodes).unwrap()
}

fn key(tree: &Tree, id: &str) -> NodeKey {
    tree.key_of(id).unwrap()
}

fn selected_ids(tree: &Tree) -> Vec<String> {
    tree.selected()
        .into_iter()
        .map(|k| tree.node(k).unwrap().id().to_string())
        .collect()
}

// ============================================================================
// Checkbox mode
// ============================================================================

#[test]
fn test_only_child_selects_parent() {
    let mut tree = tree_from(
        json!([
            { "id": "1", "text": "A" },
            { "id": "2", "text": "B", "children": [{ "id": "3", "text": "C" }] },
        ]),
        TreeConfig::new().checkbox(),
    );

    tree.select(key(&tree, "3")).unwrap();

    let b = tree.find("2").unwrap();
    assert!(b.selected());
    assert!(!b.indeterminate());
    assert!(!tree.find("1").unwrap().selected());
}

#[test]
fn test_partial_children_make_parent_indeterminate() {
    let mut tree = tree_from(
        json!([
            { "id": "1", "text": "A" },
            { "id": "2", "text": "B", "children": [
                { "id": "3", "text": "C" },
                { "id": "4", "text": "D" },
            ]},
        ]),
        TreeConfig::new().checkbox(),
    );

    tree.select(key(&tree, "3")).unwrap();
    let b = tree.find("2").unwrap();
    assert!(!b.selected());
    assert!(b.indeterminate());

    tree.select(key(&tree, "4")).unwrap();
    let b = tree.find("2").unwrap();
    assert!(b.selected());
    assert!(!b.indeterminate());

    tree.deselect(key(&tree, "4")).unwrap();
    let b = tree.find("2").unwrap();
    assert!(!b.selected());
    assert!(b.indeterminate());

    tree.deselect(key(&tree, "3")).unwrap();
    let b = tree.find("2").unwrap();
    assert!(!b.selected());
    assert!(!b.indeterminate());
}

fn nested() -> Tree {
    tree_from(
        json!([{ "id": "r", "text": "R", "children": [
            { "id": "a", "text": "A", "children": [
                { "id": "a1", "text": "A1" },
                { "id": "a2", "text": "A2", "children": [{ "id": "a2x", "text": "A2X" }] },
            ]},
            { "id": "b", "text": "B" },
        ]}]),
        TreeConfig::new().checkbox(),
    )
}

#[test]
fn test_select_propagates_down_and_up() {
    let mut tree = nested();
    tree.select(key(&tree, "a")).unwrap();

    for id in ["a", "a1", "a2", "a2x"] {
        assert!(tree.find(id).unwrap().selected(), "{id} should be selected");
    }
    let r = tree.find("r").unwrap();
    assert!(!r.selected());
    assert!(r.indeterminate());

    tree.select(key(&tree, "b")).unwrap();
    let r = tree.find("r").unwrap();
    assert!(r.selected());
    assert!(!r.indeterminate());
}

#[test]
fn test_deep_indeterminate_reaches_root() {
    let mut tree = nested();
    tree.select(key(&tree, "a2x")).unwrap();

    assert!(tree.find("a2").unwrap().selected());
    let a = tree.find("a").unwrap();
    assert!(!a.selected());
    assert!(a.indeterminate());
    assert!(tree.find("r").unwrap().indeterminate());
}

#[test]
fn test_deselect_parent_clears_descendants() {
    let mut tree = nested();
    let r = key(&tree, "r");
    tree.select(r).unwrap();
    assert_eq!(tree.selected().len(), 6);

    tree.deselect(key(&tree, "a")).unwrap();
    assert_eq!(selected_ids(&tree), ["b"]);
    assert!(tree.find("r").unwrap().indeterminate());
}

#[test]
fn test_unselectable_descendant_is_skipped() {
    let mut tree = tree_from(
        json!([{ "id": "p", "children": [
            { "id": "c1" },
            { "id": "c2", "state": { "selectable": false } },
        ]}]),
        TreeConfig::new().checkbox(),
    );
    tree.select(key(&tree, "p")).unwrap();
    assert!(tree.find("c1").unwrap().selected());
    assert!(!tree.find("c2").unwrap().selected());

    let c2 = key(&tree, "c2");
    tree.select(c2).unwrap();
    assert!(!tree.node(c2).unwrap().selected());
}

#[test]
fn test_hidden_children_do_not_count() {
    let mut tree = tree_from(
        json!([{ "id": "p", "children": [{ "id": "c1" }, { "id": "c2" }] }]),
        TreeConfig::new().checkbox(),
    );
    tree.select(key(&tree, "c1")).unwrap();
    assert!(tree.find("p").unwrap().indeterminate());

    tree.hide(key(&tree, "c2")).unwrap();
    let p = tree.find("p").unwrap();
    assert!(p.selected());
    assert!(!p.indeterminate());

    tree.soft_remove(key(&tree, "c1")).unwrap();
    tree.show(key(&tree, "c2")).unwrap();
    assert!(!tree.find("p").unwrap().selected());
}

#[test]
fn test_removing_unselected_child_completes_parent() {
    let mut tree = tree_from(
        json!([{ "id": "p", "children": [{ "id": "c1" }, { "id": "c2" }] }]),
        TreeConfig::new().checkbox(),
    );
    tree.select(key(&tree, "c1")).unwrap();
    tree.remove(key(&tree, "c2")).unwrap();
    assert!(tree.find("p").unwrap().selected());
}

#[test]
fn test_select_deep_over_collection() {
    let mut tree = nested();
    tree.select_deep(None).unwrap();
    assert_eq!(tree.selected().len(), 6);

    tree.deselect_deep(tree.key_of("a")).unwrap();
    assert_eq!(selected_ids(&tree), ["b"]);
    let r = tree.find("r").unwrap();
    assert!(!r.selected());
    assert!(r.indeterminate());
}

// ============================================================================
// Selection policy
// ============================================================================

fn flat(config: TreeConfig) -> Tree {
    tree_from(
        json!([{ "id": "1" }, { "id": "2" }, { "id": "3" }]),
        config,
    )
}

#[test]
fn test_single_selection_deselects_others() {
    let mut tree = flat(TreeConfig::new());
    tree.select(key(&tree, "1")).unwrap();
    tree.select(key(&tree, "2")).unwrap();
    assert_eq!(selected_ids(&tree), ["2"]);
}

#[test]
fn test_multiple_selection_keeps_others() {
    let mut tree = flat(TreeConfig::new().with_selection(SelectionConfig::new().multiple()));
    tree.select(key(&tree, "1")).unwrap();
    tree.select(key(&tree, "2")).unwrap();
    assert_eq!(selected_ids(&tree), ["1", "2"]);
}

#[test]
fn test_without_auto_deselect() {
    let config = TreeConfig::new().with_selection(SelectionConfig::new().without_auto_deselect());
    let mut tree = flat(config);
    tree.select(key(&tree, "1")).unwrap();
    tree.select(key(&tree, "3")).unwrap();
    assert_eq!(selected_ids(&tree), ["1", "3"]);
}

#[test]
fn test_require_keeps_last_selection() {
    let mut tree = flat(TreeConfig::new().with_selection(SelectionConfig::new().require()));
    let one = key(&tree, "1");
    tree.select(one).unwrap();

    tree.deselect(one).unwrap();
    assert!(tree.node(one).unwrap().selected());

    tree.clear_selection().unwrap();
    assert!(tree.selected().is_empty());
}

#[test]
fn test_toggle_select() {
    let mut tree = flat(TreeConfig::new());
    let one = key(&tree, "1");
    tree.toggle_select(one).unwrap();
    assert!(tree.node(one).unwrap().selected());
    tree.toggle_select(one).unwrap();
    assert!(!tree.node(one).unwrap().selected());

    let config = TreeConfig::new()
        .with_selection(SelectionConfig::new().disable_direct_deselection());
    let mut tree = flat(config);
    let one = key(&tree, "1");
    tree.toggle_select(one).unwrap();
    tree.toggle_select(one).unwrap();
    assert!(tree.node(one).unwrap().selected());
    tree.deselect(one).unwrap();
    assert!(!tree.node(one).unwrap().selected());
}

#[test]
fn test_auto_select_children_without_checkbox() {
    let config = TreeConfig::new().with_selection(SelectionConfig::new().auto_select_children());
    let mut tree = tree_from(
        json!([{ "id": "p", "children": [{ "id": "c" }] }, { "id": "q" }]),
        config,
    );
    tree.select(key(&tree, "p")).unwrap();
    assert!(tree.find("c").unwrap().selected());
    assert!(!tree.find("p").unwrap().indeterminate());
}

#[test]
fn test_reselecting_descendant_clears_the_rest_in_single_selection() {
    let config = TreeConfig::new().with_selection(SelectionConfig::new().auto_select_children());
    let mut tree = tree_from(
        json!([{ "id": "p", "children": [{ "id": "c1" }, { "id": "c2" }] }]),
        config,
    );
    tree.select(key(&tree, "p")).unwrap();
    assert_eq!(selected_ids(&tree), ["p", "c1", "c2"]);

    tree.select(key(&tree, "c1")).unwrap();
    assert_eq!(selected_ids(&tree), ["c1"]);

    // Reselecting the parent keeps its children without churn.
    tree.select(key(&tree, "p")).unwrap();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    tree.on_event("node.deselected", move |_| *sink.borrow_mut() += 1);
    tree.select(key(&tree, "p")).unwrap();
    assert_eq!(*count.borrow(), 0);
    assert_eq!(selected_ids(&tree), ["p", "c1", "c2"]);
}

#[test]
fn test_selection_events() {
    let mut tree = flat(TreeConfig::new());
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    tree.on(move |n| sink.borrow_mut().push(n.name()));

    tree.select(key(&tree, "1")).unwrap();
    tree.select(key(&tree, "2")).unwrap();

    assert_eq!(
        *names.borrow(),
        [
            "node.state.changed",
            "node.selected",
            "node.state.changed",
            "node.deselected",
            "node.state.changed",
            "node.selected",
        ]
    );
}

#[test]
fn test_noop_select_emits_nothing() {
    let mut tree = flat(TreeConfig::new());
    let one = key(&tree, "1");
    tree.select(one).unwrap();

    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    tree.on(move |_| *sink.borrow_mut() += 1);
    tree.select(one).unwrap();
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn test_single_focus() {
    let mut tree = flat(TreeConfig::new());
    let one = key(&tree, "1");
    let two = key(&tree, "2");
    tree.focus(one).unwrap();
    tree.focus(two).unwrap();
    assert_eq!(tree.focused(), Some(two));
    assert!(!tree.node(one).unwrap().focused());

    tree.blur(two).unwrap();
    assert_eq!(tree.focused(), None);
}
