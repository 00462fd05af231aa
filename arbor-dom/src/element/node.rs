use std::collections::BTreeMap;
use std::rc::Rc;

use super::Content;

/// Role of an element inside a rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Ordered container of items.
    List,
    /// One tree node: toggle, checkbox, title and an optional nested list.
    Item,
    /// Expand/collapse affordance.
    Toggle,
    /// Tri-state checkbox.
    Checkbox,
    /// Node label.
    Title,
    /// Stand-in content such as a loading marker.
    Placeholder,
}

/// An immutable node of the visual tree.
///
/// Keys are unique within one visual tree; the diff addresses patches by key.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: String,
    pub kind: Kind,
    pub content: Content,
    pub classes: Vec<&'static str>,
    pub data: BTreeMap<String, String>,
}

impl Element {
    pub fn new(kind: Kind, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            content: Content::None,
            classes: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn list(key: impl Into<String>) -> Self {
        Self::new(Kind::List, key)
    }

    pub fn item(key: impl Into<String>) -> Self {
        Self::new(Kind::Item, key)
    }

    pub fn toggle(key: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self::new(Kind::Toggle, key).text(glyph)
    }

    pub fn checkbox(key: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self::new(Kind::Checkbox, key).text(glyph)
    }

    pub fn title(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Kind::Title, key).text(text)
    }

    pub fn placeholder(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Kind::Placeholder, key).text(text)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn class(mut self, class: &'static str) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add `class` only when `on` is true.
    pub fn class_if(self, class: &'static str, on: bool) -> Self {
        if on {
            self.class(class)
        } else {
            self
        }
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get_data(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn child_elements(&self) -> &[Rc<Element>] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    pub fn child_of_kind(&self, kind: Kind) -> Option<&Rc<Element>> {
        self.child_elements().iter().find(|c| c.kind == kind)
    }

    // Children
    pub fn child(mut self, child: impl Into<Rc<Element>>) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child.into()),
            _ => self.content = Content::Children(vec![child.into()]),
        }
        self
    }

    pub fn children<I>(mut self, new_children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Rc<Element>>,
    {
        let new_children = new_children.into_iter().map(Into::into);
        match &mut self.content {
            Content::Children(children) => children.extend(new_children),
            _ => self.content = Content::Children(new_children.collect()),
        }
        self
    }

    /// Count of elements in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .child_elements()
            .iter()
            .map(|c| c.subtree_len())
            .sum::<usize>()
    }
}
