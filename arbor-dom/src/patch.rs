//! Applying [`Patch`] streams to a mounted visual tree.

use std::rc::Rc;

use crate::diff::Patch;
use crate::element::{find_path, Content, Element};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("no element with key '{0}' in the mounted tree")]
    MissingKey(String),

    #[error("element '{0}' does not hold children")]
    NotAContainer(String),

    #[error("index {index} out of bounds for '{parent}' with {len} children")]
    OutOfBounds {
        parent: String,
        index: usize,
        len: usize,
    },
}

/// Apply one patch to `root` in place.
///
/// Shared subtrees along the edited path are cloned on write; everything
/// else stays shared with whoever else holds it.
pub fn apply(root: &mut Rc<Element>, patch: &Patch) -> Result<(), PatchError> {
    match patch {
        Patch::Replace { key, element } => {
            if root.key == *key {
                *root = Rc::clone(element);
                return Ok(());
            }
            let target = element_mut(root, key)?;
            *target = Element::clone(element);
        }
        Patch::SetText { key, text } => {
            element_mut(root, key)?.content = Content::Text(text.clone());
        }
        Patch::SetClasses { key, classes } => {
            element_mut(root, key)?.classes = classes.clone();
        }
        Patch::SetData { key, data } => {
            element_mut(root, key)?.data = data.clone();
        }
        Patch::Insert {
            parent,
            index,
            element,
        } => {
            let children = children_mut(root, parent)?;
            if *index > children.len() {
                return Err(PatchError::OutOfBounds {
                    parent: parent.clone(),
                    index: *index,
                    len: children.len(),
                });
            }
            children.insert(*index, Rc::clone(element));
        }
        Patch::Remove { parent, key } => {
            let children = children_mut(root, parent)?;
            let position = children
                .iter()
                .position(|c| c.key == *key)
                .ok_or_else(|| PatchError::MissingKey(key.clone()))?;
            children.remove(position);
        }
        Patch::Move { parent, key, index } => {
            let children = children_mut(root, parent)?;
            let position = children
                .iter()
                .position(|c| c.key == *key)
                .ok_or_else(|| PatchError::MissingKey(key.clone()))?;
            let child = children.remove(position);
            if *index > children.len() {
                return Err(PatchError::OutOfBounds {
                    parent: parent.clone(),
                    index: *index,
                    len: children.len(),
                });
            }
            children.insert(*index, child);
        }
    }
    Ok(())
}

/// Apply a whole patch stream, stopping at the first failure.
pub fn apply_all(root: &mut Rc<Element>, patches: &[Patch]) -> Result<(), PatchError> {
    for patch in patches {
        apply(root, patch)?;
    }
    Ok(())
}

fn element_mut<'a>(root: &'a mut Rc<Element>, key: &str) -> Result<&'a mut Element, PatchError> {
    let path = find_path(root, key).ok_or_else(|| PatchError::MissingKey(key.to_string()))?;
    let mut current = Rc::make_mut(root);
    for index in path {
        current = match &mut current.content {
            Content::Children(children) => match children.get_mut(index) {
                Some(child) => Rc::make_mut(child),
                None => return Err(PatchError::MissingKey(key.to_string())),
            },
            _ => return Err(PatchError::MissingKey(key.to_string())),
        };
    }
    Ok(current)
}

fn children_mut<'a>(
    root: &'a mut Rc<Element>,
    key: &str,
) -> Result<&'a mut Vec<Rc<Element>>, PatchError> {
    let element = element_mut(root, key)?;
    if element.content.is_none() {
        element.content = Content::Children(Vec::new());
    }
    match &mut element.content {
        Content::Children(children) => Ok(children),
        _ => Err(PatchError::NotAContainer(key.to_string())),
    }
}
