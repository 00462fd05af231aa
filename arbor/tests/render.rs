use std::cell::RefCell;
use std::rc::Rc;

use arbor::prelude::*;
use arbor_dom::{lines, Element, Kind};
use futures::FutureExt;
use serde_json::json;

fn attached() -> Tree {
    let nodes: Vec<NodeData> = serde_json::from_value(json!([
        { "id": "1", "text": "A" },
        { "id": "2", "text": "B", "children": [
            { "id": "3", "text": "C" },
            { "id": "4", "text": "D" },
        ]},
    ]))
    .unwrap();
    let mut tree = Tree::with_data(TreeConfig::new(), nodes).unwrap();
    tree.attach(MemorySurface::new()).unwrap();
    tree
}

fn key(tree: &Tree, id: &str) -> NodeKey {
    tree.key_of(id).unwrap()
}

fn surface(tree: &Tree) -> &MemorySurface {
    tree.surface_as::<MemorySurface>().unwrap()
}

fn row<'a>(visual: &'a Rc<Element>, id: &str) -> &'a Rc<Element> {
    arbor_dom::element::find_first(visual, &|el: &Element| el.kind == Kind::Item && el.key == id)
        .unwrap()
}

fn assert_mirrors(tree: &Tree) {
    let mounted = surface(tree).root().unwrap();
    let visual = tree.visual().unwrap();
    assert_eq!(**mounted, **visual);
}

fn texts(tree: &Tree) -> Vec<String> {
    lines(surface(tree).root().unwrap())
        .into_iter()
        .map(|line| format!("{}{}", "  ".repeat(line.depth), line.text))
        .collect()
}

// ============================================================================
// Attach
// ============================================================================

#[test]
fn test_attach_mounts_full_tree() {
    let tree = attached();
    assert_eq!(surface(&tree).mounts(), 1);
    assert_eq!(texts(&tree), ["A", "▸ B"]);
    assert_eq!(tree.render_stats().passes, 1);
}

#[test]
fn test_attach_twice_fails() {
    let mut tree = attached();
    assert!(matches!(tree.attach(MemorySurface::new()), Err(TreeError::AlreadyAttached)));
}

#[test]
fn test_detach_drops_baseline() {
    let mut tree = attached();
    let surface = tree.detach().unwrap();
    assert!(surface.as_any().downcast_ref::<MemorySurface>().is_some());
    assert!(tree.visual().is_none());
    assert!(!tree.is_attached());

    // Mutations without a surface do not render.
    let passes = tree.render_stats().passes;
    tree.select(key(&tree, "1")).unwrap();
    assert_eq!(tree.render_stats().passes, passes);

    tree.attach(MemorySurface::new()).unwrap();
    assert!(tree.visual().unwrap().child_elements()[0].has_class("selected"));
}

// ============================================================================
// Incremental updates
// ============================================================================

#[test]
fn test_mutations_patch_surface() {
    let mut tree = attached();
    let b = key(&tree, "2");

    tree.expand(b).unwrap().now_or_never();
    assert_eq!(texts(&tree), ["A", "▾ B", "  C", "  D"]);
    assert_eq!(surface(&tree).mounts(), 1);
    assert!(surface(&tree).patch_batches() >= 1);
    assert_mirrors(&tree);

    tree.select(key(&tree, "4")).unwrap();
    tree.set_text(key(&tree, "3"), "C2").unwrap();
    tree.hide(key(&tree, "1")).unwrap();
    assert_eq!(texts(&tree), ["▾ B", "  C2", "  D"]);
    assert!(surface(&tree).find("4").unwrap().has_class("selected"));
    assert_mirrors(&tree);

    tree.collapse(b).unwrap();
    assert_eq!(texts(&tree), ["▸ B"]);
    assert_mirrors(&tree);
}

#[test]
fn test_unchanged_rows_are_reused() {
    let mut tree = attached();
    let before = Rc::clone(tree.visual().unwrap());

    tree.expand(key(&tree, "2")).unwrap().now_or_never();
    let after = Rc::clone(tree.visual().unwrap());

    assert!(Rc::ptr_eq(row(&before, "1"), row(&after, "1")));
    assert!(!Rc::ptr_eq(row(&before, "2"), row(&after, "2")));
    let stats = tree.render_stats();
    assert_eq!(stats.rows_reused, 1);
    assert_eq!(stats.rows_built, 3);
}

#[test]
fn test_sibling_change_keeps_other_rows() {
    let mut tree = attached();
    tree.expand(key(&tree, "2")).unwrap().now_or_never();
    let before = Rc::clone(tree.visual().unwrap());

    tree.select(key(&tree, "3")).unwrap();
    let after = Rc::clone(tree.visual().unwrap());

    assert!(Rc::ptr_eq(row(&before, "1"), row(&after, "1")));
    assert!(Rc::ptr_eq(row(&before, "4"), row(&after, "4")));
    assert!(!Rc::ptr_eq(row(&before, "3"), row(&after, "3")));
    // The title of a row whose label did not change is carried over.
    let title = |r: &Rc<Element>| Rc::clone(r.child_of_kind(Kind::Title).unwrap());
    assert!(Rc::ptr_eq(&title(row(&before, "3")), &title(row(&after, "3"))));
}

#[test]
fn test_render_without_changes_is_identity() {
    let mut tree = attached();
    let first = tree.render_nodes(None).unwrap().unwrap();
    let second = tree.render_nodes(None).unwrap().unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(tree.render_stats().patches, 0);
    assert_eq!(tree.render_stats().rows_built, 0);
}

#[test]
fn test_scoped_render() {
    let mut tree = attached();
    let b = key(&tree, "2");
    let visual = tree.render_nodes(Some(b)).unwrap().unwrap();

    assert_eq!(visual.key, "2::children");
    assert_eq!(visual.child_elements().len(), 2);
    assert_eq!(surface(&tree).mounts(), 2);
}

#[test]
fn test_ids_shaped_like_part_keys_do_not_collide() {
    let nodes: Vec<NodeData> = serde_json::from_value(json!([
        { "id": "a", "text": "A", "children": [{ "id": "c", "text": "C" }] },
        { "id": "a:title", "text": "T" },
        { "id": "a::children", "text": "L" },
        { "id": "a\\", "text": "S" },
    ]))
    .unwrap();
    let mut tree = Tree::with_data(TreeConfig::new(), nodes).unwrap();
    tree.attach(MemorySurface::new()).unwrap();
    tree.expand(key(&tree, "a")).unwrap().now_or_never();

    tree.select(key(&tree, "a:title")).unwrap();
    tree.set_text(key(&tree, "a::children"), "L2").unwrap();
    assert_mirrors(&tree);

    let mounted = surface(&tree).root().unwrap();
    let by_id = |id: &str| {
        arbor_dom::element::find_first(mounted, &|el: &Element| {
            el.kind == Kind::Item && el.data.get("id").map(String::as_str) == Some(id)
        })
        .unwrap()
    };
    assert!(by_id("a:title").has_class("selected"));
    assert!(!by_id("a").has_class("selected"));
    assert_eq!(texts(&tree), ["▾ A", "  C", "T", "L2", "S"]);
}

// ============================================================================
// Dirty sweep
// ============================================================================

#[test]
fn test_dirty_rows_under_collapsed_parent_are_swept() {
    let mut tree = attached();
    let b = key(&tree, "2");
    let c = key(&tree, "3");
    tree.expand(b).unwrap().now_or_never();
    tree.collapse(b).unwrap();

    tree.set_text(c, "hidden edit").unwrap();

    assert!(!tree.is_dirty(c).unwrap());
    assert!(!tree.is_dirty(b).unwrap());
    assert!(tree.render_stats().swept >= 1);

    tree.expand(b).unwrap().now_or_never();
    assert_eq!(texts(&tree), ["A", "▾ B", "  hidden edit", "  D"]);
    assert_mirrors(&tree);
}

#[test]
fn test_shown_node_is_rebuilt() {
    let mut tree = attached();
    let a = key(&tree, "1");
    tree.hide(a).unwrap();
    tree.set_text(a, "A2").unwrap();
    assert!(!tree.is_dirty(a).unwrap());

    tree.show(a).unwrap();
    assert_eq!(texts(&tree), ["A2", "▸ B"]);
    assert_mirrors(&tree);
}

#[test]
fn test_removed_node_leaves_surface() {
    let mut tree = attached();
    tree.expand(key(&tree, "2")).unwrap().now_or_never();
    tree.remove(key(&tree, "3")).unwrap();
    assert_eq!(texts(&tree), ["A", "▾ B", "  D"]);

    tree.soft_remove(key(&tree, "4")).unwrap();
    assert_eq!(texts(&tree), ["A", "▾ B"]);
    assert!(surface(&tree).find("4").is_none());
    assert_mirrors(&tree);
}

// ============================================================================
// Batching
// ============================================================================

#[test]
fn test_nested_batches_render_once() {
    let mut tree = attached();
    let applied = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&applied);
    tree.on_event("changes.applied", move |_| *sink.borrow_mut() += 1);
    let passes = tree.render_stats().passes;

    tree.batch();
    tree.batch();
    tree.batch();
    tree.select(key(&tree, "1")).unwrap();
    tree.expand(key(&tree, "2")).unwrap().now_or_never();
    tree.apply_changes();
    assert!(!tree.end());
    assert!(!tree.end());
    assert_eq!(tree.render_stats().passes, passes);
    assert!(tree.is_batching());

    assert!(tree.end());
    assert_eq!(tree.render_stats().passes, passes + 1);
    assert_eq!(*applied.borrow(), 1);
    assert_eq!(texts(&tree), ["A", "▾ B", "  C", "  D"]);
}

#[test]
fn test_unmatched_end_does_not_render() {
    let mut tree = attached();
    let passes = tree.render_stats().passes;
    assert!(!tree.end());
    assert_eq!(tree.render_stats().passes, passes);
    assert!(!tree.is_batching());
}

#[test]
fn test_single_mutation_renders_once() {
    let mut tree = attached();
    tree.set_config(TreeConfig::new().checkbox());
    let passes = tree.render_stats().passes;

    tree.select(key(&tree, "2")).unwrap();
    assert_eq!(tree.render_stats().passes, passes + 1);
}

// ============================================================================
// Checkbox glyphs and scrolling
// ============================================================================

#[test]
fn test_checkbox_glyphs() {
    let mut tree = attached();
    tree.set_config(TreeConfig::new().checkbox());
    tree.expand(key(&tree, "2")).unwrap().now_or_never();
    tree.select(key(&tree, "3")).unwrap();

    assert_eq!(
        texts(&tree),
        ["[ ] A", "▾ [-] B", "  [x] C", "  [ ] D"]
    );
    assert!(surface(&tree).find("2").unwrap().has_class("indeterminate"));
    assert_mirrors(&tree);
}

#[test]
fn test_scroll_selected_into_view() {
    let mut tree = Tree::default();
    assert!(matches!(tree.scroll_selected_into_view(), Err(TreeError::NotAttached)));

    let mut tree = attached();
    assert_eq!(tree.scroll_selected_into_view().unwrap(), None);

    let b = key(&tree, "2");
    tree.expand(b).unwrap().now_or_never();
    tree.select(key(&tree, "4")).unwrap();

    assert_eq!(tree.scroll_selected_into_view().unwrap().as_deref(), Some("4"));
    assert_eq!(surface(&tree).scrolled_to(), Some("4"));
}
