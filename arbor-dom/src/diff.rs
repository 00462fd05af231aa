//! Keyed diff between two visual trees.
//!
//! Patches are ordered: applying them one after another to the old tree
//! yields the new tree. Subtrees that are the same allocation in both trees
//! are skipped without being inspected, which is what makes memoized
//! rendering cheap to diff.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::element::{Content, Element};

/// A single edit to a mounted visual tree, addressed by element key.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Swap the element (and its subtree) for a new one.
    Replace { key: String, element: Rc<Element> },
    /// Replace the text run of an element.
    SetText { key: String, text: String },
    /// Replace the class list of an element.
    SetClasses {
        key: String,
        classes: Vec<&'static str>,
    },
    /// Replace the data attributes of an element.
    SetData {
        key: String,
        data: BTreeMap<String, String>,
    },
    /// Insert a new child under `parent` at `index`.
    Insert {
        parent: String,
        index: usize,
        element: Rc<Element>,
    },
    /// Remove the child `key` from `parent`.
    Remove { parent: String, key: String },
    /// Move the existing child `key` of `parent` to `index`.
    Move {
        parent: String,
        key: String,
        index: usize,
    },
}

impl Patch {
    /// Key of the element this patch edits (the parent, for structural patches).
    pub fn target(&self) -> &str {
        match self {
            Patch::Replace { key, .. }
            | Patch::SetText { key, .. }
            | Patch::SetClasses { key, .. }
            | Patch::SetData { key, .. } => key,
            Patch::Insert { parent, .. }
            | Patch::Remove { parent, .. }
            | Patch::Move { parent, .. } => parent,
        }
    }
}

/// Compute the patches that turn `old` into `new`.
pub fn diff(old: &Rc<Element>, new: &Rc<Element>) -> Vec<Patch> {
    let mut patches = Vec::new();
    diff_element(old, new, &mut patches);
    patches
}

fn diff_element(old: &Rc<Element>, new: &Rc<Element>, patches: &mut Vec<Patch>) {
    if Rc::ptr_eq(old, new) {
        return;
    }

    if old.key != new.key || old.kind != new.kind || !same_content_shape(&old.content, &new.content)
    {
        patches.push(Patch::Replace {
            key: old.key.clone(),
            element: Rc::clone(new),
        });
        return;
    }

    if old.classes != new.classes {
        patches.push(Patch::SetClasses {
            key: new.key.clone(),
            classes: new.classes.clone(),
        });
    }
    if old.data != new.data {
        patches.push(Patch::SetData {
            key: new.key.clone(),
            data: new.data.clone(),
        });
    }

    match (&old.content, &new.content) {
        (Content::Text(a), Content::Text(b)) if a != b => {
            patches.push(Patch::SetText {
                key: new.key.clone(),
                text: b.clone(),
            });
        }
        (Content::None, Content::Text(b)) => {
            patches.push(Patch::SetText {
                key: new.key.clone(),
                text: b.clone(),
            });
        }
        (Content::Children(a), Content::Children(b)) => {
            diff_children(&new.key, a, b, patches);
        }
        (Content::None, Content::Children(b)) => {
            diff_children(&new.key, &[], b, patches);
        }
        _ => {}
    }
}

/// Text and child lists are not interchangeable in place. `None` can grow
/// into either, but nothing shrinks back to `None`.
fn same_content_shape(old: &Content, new: &Content) -> bool {
    match (old, new) {
        (Content::Text(_), Content::Children(_)) | (Content::Children(_), Content::Text(_)) => {
            false
        }
        (Content::Text(_), Content::None) | (Content::Children(_), Content::None) => false,
        _ => true,
    }
}

fn diff_children(
    parent: &str,
    old: &[Rc<Element>],
    new: &[Rc<Element>],
    patches: &mut Vec<Patch>,
) {
    if old.len() == new.len() && old.iter().zip(new).all(|(a, b)| Rc::ptr_eq(a, b)) {
        return;
    }

    let new_keys: HashSet<&str> = new.iter().map(|e| e.key.as_str()).collect();
    let old_by_key: HashMap<&str, &Rc<Element>> =
        old.iter().map(|e| (e.key.as_str(), e)).collect();

    // Removals first, so indices below refer to surviving children only.
    let mut current: Vec<&str> = Vec::with_capacity(old.len());
    for element in old {
        if new_keys.contains(element.key.as_str()) {
            current.push(&element.key);
        } else {
            patches.push(Patch::Remove {
                parent: parent.to_string(),
                key: element.key.clone(),
            });
        }
    }

    for (index, element) in new.iter().enumerate() {
        let key = element.key.as_str();
        match old_by_key.get(key) {
            Some(previous) => {
                if current.get(index) != Some(&key) {
                    if let Some(from) = current.iter().position(|k| *k == key) {
                        current.remove(from);
                    }
                    current.insert(index, key);
                    patches.push(Patch::Move {
                        parent: parent.to_string(),
                        key: key.to_string(),
                        index,
                    });
                }
                diff_element(previous, element, patches);
            }
            None => {
                current.insert(index, key);
                patches.push(Patch::Insert {
                    parent: parent.to_string(),
                    index,
                    element: Rc::clone(element),
                });
            }
        }
    }
}
