use std::rc::Rc;

use super::Element;

/// What an element holds: nothing, a text run, or child elements.
///
/// Children are reference counted so that unchanged subtrees can be shared
/// between consecutive visual trees and compared by pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Content {
    #[default]
    None,
    Text(String),
    Children(Vec<Rc<Element>>),
}

impl Content {
    pub fn is_none(&self) -> bool {
        matches!(self, Content::None)
    }
}
