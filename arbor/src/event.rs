//! Notifications emitted by tree mutations.
//!
//! Listeners receive a [`Notification`] by reference and never get access to
//! the tree itself, so a listener cannot re-enter a mutation in progress.

use std::cell::Cell;

use crate::error::LoadError;
use crate::model::{NodeData, StateFlag};

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    NodeSelected { id: String },
    NodeDeselected { id: String },
    NodeExpanded { id: String },
    NodeCollapsed { id: String },
    NodeHidden { id: String },
    NodeShown { id: String },
    NodeSoftRemoved { id: String },
    NodeRestored { id: String },
    NodeFocused { id: String },
    NodeBlurred { id: String },
    NodeStateChanged {
        id: String,
        flag: StateFlag,
        old: bool,
        new: bool,
    },
    NodePropertyChanged {
        id: String,
        property: &'static str,
        old: String,
        new: String,
    },
    NodeAdded { id: String },
    NodeRemoved { id: String, export: NodeData },
    /// `id` is `None` for a root-level load.
    ChildrenLoaded { id: Option<String>, count: usize },
    LoadError {
        id: Option<String>,
        error: LoadError,
    },
    /// A render pass ran.
    ChangesApplied,
}

impl TreeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TreeEvent::NodeSelected { .. } => "node.selected",
            TreeEvent::NodeDeselected { .. } => "node.deselected",
            TreeEvent::NodeExpanded { .. } => "node.expanded",
            TreeEvent::NodeCollapsed { .. } => "node.collapsed",
            TreeEvent::NodeHidden { .. } => "node.hidden",
            TreeEvent::NodeShown { .. } => "node.shown",
            TreeEvent::NodeSoftRemoved { .. } => "node.softremoved",
            TreeEvent::NodeRestored { .. } => "node.restored",
            TreeEvent::NodeFocused { .. } => "node.focused",
            TreeEvent::NodeBlurred { .. } => "node.blurred",
            TreeEvent::NodeStateChanged { .. } => "node.state.changed",
            TreeEvent::NodePropertyChanged { .. } => "node.property.changed",
            TreeEvent::NodeAdded { .. } => "node.added",
            TreeEvent::NodeRemoved { .. } => "node.removed",
            TreeEvent::ChildrenLoaded { .. } => "children.loaded",
            TreeEvent::LoadError { .. } => "tree.loaderror",
            TreeEvent::ChangesApplied => "changes.applied",
        }
    }

    /// Id of the node the event is about, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            TreeEvent::NodeSelected { id }
            | TreeEvent::NodeDeselected { id }
            | TreeEvent::NodeExpanded { id }
            | TreeEvent::NodeCollapsed { id }
            | TreeEvent::NodeHidden { id }
            | TreeEvent::NodeShown { id }
            | TreeEvent::NodeSoftRemoved { id }
            | TreeEvent::NodeRestored { id }
            | TreeEvent::NodeFocused { id }
            | TreeEvent::NodeBlurred { id }
            | TreeEvent::NodeStateChanged { id, .. }
            | TreeEvent::NodePropertyChanged { id, .. }
            | TreeEvent::NodeAdded { id }
            | TreeEvent::NodeRemoved { id, .. } => Some(id),
            TreeEvent::ChildrenLoaded { id, .. } | TreeEvent::LoadError { id, .. } => {
                id.as_deref()
            }
            TreeEvent::ChangesApplied => None,
        }
    }

    /// The verb notification for a flag transition, if the flag has one.
    pub(crate) fn for_transition(flag: StateFlag, value: bool, id: String) -> Option<Self> {
        Some(match (flag, value) {
            (StateFlag::Selected, true) => TreeEvent::NodeSelected { id },
            (StateFlag::Selected, false) => TreeEvent::NodeDeselected { id },
            (StateFlag::Collapsed, false) => TreeEvent::NodeExpanded { id },
            (StateFlag::Collapsed, true) => TreeEvent::NodeCollapsed { id },
            (StateFlag::Hidden, true) => TreeEvent::NodeHidden { id },
            (StateFlag::Hidden, false) => TreeEvent::NodeShown { id },
            (StateFlag::Removed, true) => TreeEvent::NodeSoftRemoved { id },
            (StateFlag::Removed, false) => TreeEvent::NodeRestored { id },
            (StateFlag::Focused, true) => TreeEvent::NodeFocused { id },
            (StateFlag::Focused, false) => TreeEvent::NodeBlurred { id },
            _ => return None,
        })
    }
}

/// An event as seen by listeners.
///
/// Any listener may mark it default-prevented; input wiring consults the
/// result of [`EventBus::emit`] before running its default action.
#[derive(Debug)]
pub struct Notification {
    event: TreeEvent,
    prevented: Cell<bool>,
}

impl Notification {
    pub fn event(&self) -> &TreeEvent {
        &self.event
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }

    pub fn prevent_default(&self) {
        self.prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

/// Handle returned by [`EventBus::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener = Box<dyn FnMut(&Notification)>;

/// Synchronous fan-out of notifications to listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Option<&'static str>, Listener)>,
    next_id: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every notification.
    pub fn on(&mut self, listener: impl FnMut(&Notification) + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    /// Listen to notifications with the given name (e.g. `"node.selected"`).
    pub fn on_event(
        &mut self,
        name: &'static str,
        listener: impl FnMut(&Notification) + 'static,
    ) -> ListenerId {
        self.register(Some(name), Box::new(listener))
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to matching listeners in registration order.
    ///
    /// Returns true when a listener prevented the default action.
    pub fn emit(&mut self, event: TreeEvent) -> bool {
        let notification = Notification {
            event,
            prevented: Cell::new(false),
        };
        let name = notification.name();
        log::trace!("emit {name} {:?}", notification.event.node_id());

        for (_, filter, listener) in &mut self.listeners {
            if filter.is_none_or(|f| f == name) {
                listener(&notification);
            }
        }
        notification.is_default_prevented()
    }

    fn register(&mut self, filter: Option<&'static str>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, filter, listener));
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_filtered_listener_only_sees_its_event() {
        let seen = Rc::new(Cell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&seen);
        bus.on_event("node.selected", move |_| counter.set(counter.get() + 1));

        bus.emit(TreeEvent::NodeSelected { id: "a".into() });
        bus.emit(TreeEvent::NodeDeselected { id: "a".into() });
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_prevent_default_is_reported() {
        let mut bus = EventBus::new();
        let id = bus.on(|n| n.prevent_default());
        assert!(bus.emit(TreeEvent::ChangesApplied));

        assert!(bus.off(id));
        assert!(!bus.emit(TreeEvent::ChangesApplied));
    }
}
