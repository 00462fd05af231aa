mod content;
mod node;

use std::rc::Rc;

pub use content::Content;
pub use node::{Element, Kind};

/// Find an element by key in the tree.
pub fn find_element<'a>(root: &'a Element, key: &str) -> Option<&'a Element> {
    if root.key == key {
        return Some(root);
    }

    for child in root.child_elements() {
        if let Some(found) = find_element(child, key) {
            return Some(found);
        }
    }

    None
}

/// Child-index path from `root` to the element with `key`.
///
/// An empty path addresses the root itself.
pub fn find_path(root: &Element, key: &str) -> Option<Vec<usize>> {
    fn walk(element: &Element, key: &str, path: &mut Vec<usize>) -> bool {
        if element.key == key {
            return true;
        }
        for (index, child) in element.child_elements().iter().enumerate() {
            path.push(index);
            if walk(child, key, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(root, key, &mut path).then_some(path)
}

/// First element (depth-first, pre-order) matching the predicate.
pub fn find_first<'a>(
    root: &'a Rc<Element>,
    predicate: &impl Fn(&Element) -> bool,
) -> Option<&'a Rc<Element>> {
    if predicate(root) {
        return Some(root);
    }
    root.child_elements()
        .iter()
        .find_map(|child| find_first(child, predicate))
}
