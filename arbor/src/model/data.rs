//! Plain hierarchical node data used for import and export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{NodeState, StateFlag};

/// Detached description of a node and its subtree.
///
/// Serializes as `{ "id", "text", "children", "state", ...extra }`. The
/// `children` field is absent for a leaf, `true` for children that must be
/// loaded on demand, or an array of nodes.
///
/// ```
/// use arbor::NodeData;
///
/// let data: NodeData = serde_json::from_value(serde_json::json!({
///     "id": "docs",
///     "text": "Docs",
///     "children": true,
///     "icon": "folder",
/// }))
/// .unwrap();
/// assert!(data.children.is_some());
/// assert_eq!(data.extra["icon"], "folder");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub text: String,

    #[serde(
        default,
        with = "children_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<ChildrenData>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state: BTreeMap<StateFlag, bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Children carried by [`NodeData`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChildrenData {
    Unloaded,
    Nodes(Vec<NodeData>),
}

impl NodeData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeData>) -> Self {
        self.children = Some(ChildrenData::Nodes(children.into_iter().collect()));
        self
    }

    /// Mark the children as loadable on demand.
    pub fn unloaded(mut self) -> Self {
        self.children = Some(ChildrenData::Unloaded);
        self
    }

    pub fn with_state(mut self, flag: StateFlag, value: bool) -> Self {
        self.state.insert(flag, value);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Nested children, empty for leaves and unloaded nodes.
    pub fn child_nodes(&self) -> &[NodeData] {
        match &self.children {
            Some(ChildrenData::Nodes(nodes)) => nodes,
            _ => &[],
        }
    }

    /// Initial flags for a node imported from this data.
    pub(crate) fn initial_state(&self) -> NodeState {
        let mut state = NodeState::IMPORT_DEFAULT;
        for (flag, value) in &self.state {
            state.set(flag.bit(), *value);
        }
        state.remove(NodeState::TRANSIENT);
        state
    }

    /// State map holding only the flags that differ from import defaults.
    pub(crate) fn state_map(state: NodeState) -> BTreeMap<StateFlag, bool> {
        StateFlag::ALL
            .into_iter()
            .filter(|flag| !NodeState::TRANSIENT.contains(flag.bit()))
            .filter_map(|flag| {
                let value = state.contains(flag.bit());
                let default = NodeState::IMPORT_DEFAULT.contains(flag.bit());
                (value != default).then_some((flag, value))
            })
            .collect()
    }
}

mod children_field {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{ChildrenData, NodeData};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Nodes(Vec<NodeData>),
    }

    pub fn serialize<S: Serializer>(
        children: &Option<ChildrenData>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match children {
            None => serializer.serialize_none(),
            Some(ChildrenData::Unloaded) => true.serialize(serializer),
            Some(ChildrenData::Nodes(nodes)) => nodes.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ChildrenData>, D::Error> {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(false)) => None,
            Some(Raw::Flag(true)) => Some(ChildrenData::Unloaded),
            Some(Raw::Nodes(nodes)) => Some(ChildrenData::Nodes(nodes)),
        })
    }
}
