//! Memoized builders.

use std::rc::Rc;

use slotmap::secondary::Entry;
use slotmap::{Key, SecondaryMap};

/// How a cache node decides whether its input changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Field-by-field equality of a flat record.
    Scalar,
    /// Same length and the same members, by identity, in the same order.
    Ordered,
}

/// Input record of a cache node.
pub trait CacheInput {
    /// Whether `self` equals `previous` under `rule`.
    fn matches(&self, previous: &Self, rule: Comparison) -> bool;
}

impl<T> CacheInput for Vec<Rc<T>> {
    fn matches(&self, previous: &Self, _rule: Comparison) -> bool {
        self.len() == previous.len() && self.iter().zip(previous).all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

/// The last input a value was built from, and that value.
///
/// Refreshing with an input that matches the stored one returns the stored
/// value itself; the builder only runs when the input changed. Builders
/// get the previous input and value so they can reuse parts of it.
#[derive(Debug)]
pub struct CacheNode<I, V> {
    input: I,
    rule: Comparison,
    value: Rc<V>,
}

impl<I: CacheInput, V> CacheNode<I, V> {
    pub fn new(
        input: I,
        rule: Comparison,
        build: impl FnOnce(Option<(&I, &Rc<V>)>, &I) -> V,
    ) -> Self {
        let value = Rc::new(build(None, &input));
        Self { input, rule, value }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn rule(&self) -> Comparison {
        self.rule
    }

    pub fn value(&self) -> &Rc<V> {
        &self.value
    }

    /// Return the value for `input`, and whether it had to be rebuilt.
    pub fn refresh(
        &mut self,
        input: I,
        build: impl FnOnce(Option<(&I, &Rc<V>)>, &I) -> V,
    ) -> (Rc<V>, bool) {
        if input.matches(&self.input, self.rule) {
            return (Rc::clone(&self.value), false);
        }
        self.value = Rc::new(build(Some((&self.input, &self.value)), &input));
        self.input = input;
        (Rc::clone(&self.value), true)
    }
}

/// Refresh `slot`, creating its node on first use.
pub(crate) fn refresh_slot<I: CacheInput, V>(
    slot: &mut Option<CacheNode<I, V>>,
    input: I,
    rule: Comparison,
    build: impl FnOnce(Option<(&I, &Rc<V>)>, &I) -> V,
) -> (Rc<V>, bool) {
    match slot {
        Some(node) => node.refresh(input, build),
        None => {
            let node = slot.insert(CacheNode::new(input, rule, build));
            (Rc::clone(&node.value), true)
        }
    }
}

/// Refresh the entry for `key`, creating it on first use.
///
/// A stale key gets a fresh value that is not kept.
pub(crate) fn memoize<K: Key, I: CacheInput, V>(
    entries: &mut SecondaryMap<K, CacheNode<I, V>>,
    key: K,
    input: I,
    rule: Comparison,
    build: impl FnOnce(Option<(&I, &Rc<V>)>, &I) -> V,
) -> (Rc<V>, bool) {
    match entries.entry(key) {
        Some(Entry::Occupied(entry)) => entry.into_mut().refresh(input, build),
        Some(Entry::Vacant(entry)) => {
            let node = entry.insert(CacheNode::new(input, rule, build));
            (Rc::clone(&node.value), true)
        }
        None => (Rc::new(build(None, &input)), true),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use slotmap::{DefaultKey, SlotMap};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Label(String);

    impl CacheInput for Label {
        fn matches(&self, previous: &Self, _rule: Comparison) -> bool {
            self == previous
        }
    }

    #[test]
    fn test_equal_input_returns_same_value() {
        let builds = Cell::new(0);
        let build = |_: Option<(&Label, &Rc<String>)>, input: &Label| {
            builds.set(builds.get() + 1);
            input.0.to_uppercase()
        };

        let mut node = CacheNode::new(Label("a".into()), Comparison::Scalar, build);
        let first = Rc::clone(node.value());

        let (again, rebuilt) = node.refresh(Label("a".into()), build);
        assert!(!rebuilt);
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(builds.get(), 1);

        let (changed, rebuilt) = node.refresh(Label("b".into()), build);
        assert!(rebuilt);
        assert_eq!(*changed, "B");
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn test_builder_sees_previous_pair() {
        let mut node = CacheNode::new(Label("a".into()), Comparison::Scalar, |prev, input| {
            assert!(prev.is_none());
            input.0.clone()
        });
        node.refresh(Label("b".into()), |prev, input| {
            let (prev_input, prev_value) = prev.unwrap();
            assert_eq!(prev_input.0, "a");
            format!("{}{}", prev_value, input.0)
        });
        assert_eq!(node.value().as_str(), "ab");
    }

    #[test]
    fn test_ordered_compares_identity() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(vec![Rc::clone(&a)].matches(&vec![Rc::clone(&a)], Comparison::Ordered));
        assert!(!vec![Rc::clone(&a)].matches(&vec![b], Comparison::Ordered));
        assert!(!vec![Rc::clone(&a)].matches(&vec![], Comparison::Ordered));
    }

    #[test]
    fn test_memoize_creates_then_reuses() {
        let mut slots: SlotMap<DefaultKey, ()> = SlotMap::new();
        let key = slots.insert(());
        let mut entries: SecondaryMap<DefaultKey, CacheNode<Label, String>> = SecondaryMap::new();
        let build = |_: Option<(&Label, &Rc<String>)>, input: &Label| input.0.clone();

        let (first, built) = memoize(&mut entries, key, Label("x".into()), Comparison::Scalar, build);
        assert!(built);
        let (second, built) = memoize(&mut entries, key, Label("x".into()), Comparison::Scalar, build);
        assert!(!built);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_empty_slot_is_filled_once() {
        let mut slot: Option<CacheNode<Label, String>> = None;
        let build = |_: Option<(&Label, &Rc<String>)>, input: &Label| input.0.clone();

        let (first, built) = refresh_slot(&mut slot, Label("x".into()), Comparison::Scalar, build);
        assert!(built);
        let (second, built) = refresh_slot(&mut slot, Label("x".into()), Comparison::Scalar, build);
        assert!(!built);
        assert!(Rc::ptr_eq(&first, &second));
        assert!(slot.is_some());
    }
}
